pub mod basis;
pub mod card;
pub mod reweight;
pub mod run;

use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use rwgt_core::{read_parameter_file, ReweightParameter};
use rwgt_exec::SessionConfig;

/// Where the reweight parameters come from.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct ParameterSource {
    /// Session configuration file.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Parameter listing with one `name [scale [offset]]` per line.
    #[arg(long)]
    pub parameter_file: Option<PathBuf>,
}

impl ParameterSource {
    pub fn parameters(&self) -> Result<Vec<ReweightParameter>, Box<dyn Error>> {
        match (&self.config, &self.parameter_file) {
            (Some(config), _) => Ok(SessionConfig::load(config)?.declared_parameters()?),
            (None, Some(file)) => Ok(read_parameter_file(file)?),
            (None, None) => Err("either --config or --parameter-file is required".into()),
        }
    }
}
