use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use log::info;
use rwgt_exec::{Session, SessionConfig};

use crate::emit;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Session configuration file.
    #[arg(long)]
    pub config: PathBuf,
    /// Write the JSON session report here instead of stdout.
    #[arg(long)]
    pub report: Option<PathBuf>,
    /// Keep per-pass artefacts regardless of the configuration.
    #[arg(long)]
    pub keep_workspace: bool,
}

pub fn run(args: &RunArgs) -> Result<(), Box<dyn Error>> {
    let mut config = SessionConfig::load(&args.config)?;
    if config.declared_parameters()?.is_empty() {
        info!("no reweight parameters declared; nothing to do");
        return Ok(());
    }
    config.keep_workspace |= args.keep_workspace;

    let session = Session::new(config)?;
    let report = session.run()?;
    info!(
        "session complete: {} events evaluated, {} dropped, {} exported",
        report.evaluated,
        report.dropped.len(),
        report.export.exported
    );
    emit(&report.to_json()?, args.report.as_deref())
}
