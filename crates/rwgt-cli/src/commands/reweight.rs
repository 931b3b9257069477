use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use log::info;
use rwgt_basis::BilinearBasis;
use rwgt_events::{write_weight_table, EventFormat, EventSample};
use rwgt_exec::{reweight_sample, ReweightMode, SessionConfig};

#[derive(Args, Debug)]
pub struct ReweightArgs {
    /// Session configuration the coefficients were produced with.
    #[arg(long)]
    pub config: PathBuf,
    /// Event file with attached coefficients; defaults to the configured output.
    #[arg(long)]
    pub events: Option<PathBuf>,
    /// Encoding of `--events`; guessed from the extension when absent.
    #[arg(long)]
    pub format: Option<EventFormat>,
    /// Parameter value as `name=value`; every parameter must be set.
    #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment, required = true)]
    pub values: Vec<(String, f64)>,
    /// Report weights relative to the central sample point.
    #[arg(long)]
    pub ratio: bool,
    /// Destination weight table (`event_id,weight`).
    #[arg(long)]
    pub out: PathBuf,
}

fn parse_assignment(raw: &str) -> Result<(String, f64), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got `{raw}`"))?;
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|err| format!("invalid value for {name}: {err}"))?;
    Ok((name.trim().to_string(), value))
}

pub fn run(args: &ReweightArgs) -> Result<(), Box<dyn Error>> {
    let config = SessionConfig::load(&args.config)?;
    let basis = BilinearBasis::build(&config.parameter_set()?)?;
    let point = basis.point_from_named(&args.values)?;
    let sample = match &args.events {
        Some(path) => match args.format {
            Some(format) => EventSample::new(path, format),
            None => EventSample::detect(path),
        },
        None => config.events.output_sample(),
    };
    let mode = if args.ratio {
        ReweightMode::RatioToBaseline
    } else {
        ReweightMode::Absolute
    };

    let records = reweight_sample(&basis, &sample, &point, mode)?;
    write_weight_table(&args.out, &records)?;
    info!(
        "wrote {} weights for {} to {}",
        records.len(),
        sample.path.display(),
        args.out.display()
    );
    Ok(())
}
