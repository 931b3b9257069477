//! Writing coefficients back onto the event sample.

use log::{info, warn};
use rwgt_core::errors::RwgtError;
use rwgt_events::{create_writer, EventSample};
use serde::{Deserialize, Serialize};

use crate::store::EventCoefficientStore;

/// Counters reported by [`export_events`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSummary {
    /// Events written to the output sample.
    pub exported: u64,
    /// Events written with zero coefficients because none were available.
    pub without_coefficients: u64,
}

/// Whether the `n`-th processed item (1-based) should be logged: the first
/// ten, then every tenth, then every hundredth, and so on.
pub fn progress_checkpoint(n: u64) -> bool {
    if n == 0 {
        return false;
    }
    let mut step = 1;
    while step <= n / 10 {
        step *= 10;
    }
    n % step == 0
}

/// Copies every input event to `output` with its coefficient vector attached.
///
/// Events missing from the store are written with zeros and a warning.
pub fn export_events(
    input: &EventSample,
    output: &EventSample,
    coefficient_names: &[String],
    store: &EventCoefficientStore,
) -> Result<ExportSummary, RwgtError> {
    let mut reader = input.open()?;
    let mut writer = create_writer(&output.path, output.format)?;
    writer.set_coefficient_names(coefficient_names)?;
    info!(
        "exporting {} events to {}",
        reader
            .count()
            .map_or_else(|| "all".to_string(), |count| count.to_string()),
        output.path.display()
    );

    let mut summary = ExportSummary::default();
    while let Some(mut event) = reader.read_event()? {
        let mut coefficients = store.coefficient_values(event.id);
        if coefficients.is_empty() {
            warn!("event {}: no coefficients, writing zeros", event.id);
            coefficients = vec![0.0; coefficient_names.len()];
            summary.without_coefficients += 1;
        }
        event.coefficients = coefficients;
        writer.write_event(&event)?;
        summary.exported += 1;
        if progress_checkpoint(summary.exported) {
            info!("exported event {} (id {})", summary.exported, event.id);
        }
    }
    let written = writer.finish()?;
    debug_assert_eq!(written, summary.exported);
    info!(
        "export finished: {} events, {} without coefficients",
        summary.exported, summary.without_coefficients
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::progress_checkpoint;

    #[test]
    fn checkpoints_back_off_by_decades() {
        let logged: Vec<u64> = (1..=1000).filter(|n| progress_checkpoint(*n)).collect();
        assert_eq!(&logged[..10], &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
        assert_eq!(&logged[10..13], &[20, 30, 40]);
        assert!(logged.contains(&100) && logged.contains(&200));
        assert!(!logged.contains(&110));
        assert_eq!(logged.last(), Some(&1000));
    }
}
