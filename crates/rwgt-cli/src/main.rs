use std::error::Error;
use std::fs;
use std::path::Path;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::error;

use commands::{
    basis::{self, BasisArgs},
    card::{self, CardArgs},
    reweight::{self, ReweightArgs},
    run::{self, RunArgs},
};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "rwgt", about = "Bilinear matrix-element reweighting")]
struct Cli {
    /// Default log filter; `RUST_LOG` takes precedence.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the sampling design, coefficient names and inverse design matrix.
    Basis(BasisArgs),
    /// Render the parameter card of one evaluation row.
    Card(CardArgs),
    /// Evaluate every sample point and attach coefficients to the events.
    Run(RunArgs),
    /// Evaluate stored coefficients at a new parameter point.
    Reweight(ReweightArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log_level))
        .init();

    let result = match cli.command {
        Command::Basis(args) => basis::run(&args),
        Command::Card(args) => card::run(&args),
        Command::Run(args) => run::run(&args),
        Command::Reweight(args) => reweight::run(&args),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

/// Writes `text` to `path`, or to stdout when no path is given.
pub(crate) fn emit(text: &str, path: Option<&Path>) -> Result<(), Box<dyn Error>> {
    match path {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            fs::write(path, text)?;
        }
        None => println!("{text}"),
    }
    Ok(())
}
