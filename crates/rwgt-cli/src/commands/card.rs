use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use rwgt_basis::BilinearBasis;
use rwgt_exec::{read_card_template, SessionConfig};

use crate::emit;

#[derive(Args, Debug)]
pub struct CardArgs {
    /// Session configuration file.
    #[arg(long)]
    pub config: PathBuf,
    /// Evaluation row, counted from zero.
    #[arg(long)]
    pub row: usize,
    /// Write the card here instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub fn run(args: &CardArgs) -> Result<(), Box<dyn Error>> {
    let config = SessionConfig::load(&args.config)?;
    let template_path = config
        .card_template
        .as_ref()
        .ok_or("the configuration has no card_template")?;
    let basis = BilinearBasis::build(&config.parameter_set()?)?;
    let assignment = basis.assignment(args.row).ok_or_else(|| {
        format!(
            "row {} is outside the sampling design ({} rows)",
            args.row,
            basis.sample_count()
        )
    })?;
    let card = config
        .model
        .render(&read_card_template(template_path)?, &assignment)?;
    emit(card.trim_end(), args.out.as_deref())
}
