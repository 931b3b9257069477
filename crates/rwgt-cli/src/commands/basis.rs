use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use log::info;
use rwgt_basis::BilinearBasis;
use rwgt_core::{to_pretty_json_string, ParameterSet};
use serde_json::json;

use super::ParameterSource;
use crate::emit;

#[derive(Args, Debug)]
pub struct BasisArgs {
    #[command(flatten)]
    pub source: ParameterSource,
    /// Write the JSON description here instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub fn run(args: &BasisArgs) -> Result<(), Box<dyn Error>> {
    let parameters = args.source.parameters()?;
    if parameters.is_empty() {
        info!("no reweight parameters declared; nothing to do");
        return Ok(());
    }
    let basis = BilinearBasis::build(&ParameterSet::new(parameters)?)?;
    let rows: Vec<&[f64]> = basis.evaluation_matrix().row_iter().collect();
    let inverse: Vec<&[f64]> = basis.inverse_design().row_iter().collect();
    let view = json!({
        "hash": basis.fingerprint()?,
        "parameters": basis.parameters(),
        "sample_count": basis.sample_count(),
        "evaluation_matrix": rows,
        "coefficient_names": basis.coefficient_names(),
        "determinant": basis.determinant(),
        "min_relative_pivot": basis.min_relative_pivot(),
        "inverse_design": inverse,
    });
    emit(&to_pretty_json_string(&view)?, args.out.as_deref())
}
