//! Surrogate weights for stored coefficients at new parameter points.

use log::warn;
use rwgt_basis::{ratio_at, weight_at, BilinearBasis};
use rwgt_core::errors::{ErrorInfo, RwgtError};
use rwgt_events::{EventSample, WeightRecord};
use serde::{Deserialize, Serialize};

/// What a reweighted value expresses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReweightMode {
    /// The surrogate matrix-element weight itself.
    #[default]
    Absolute,
    /// The weight relative to the central sample point.
    RatioToBaseline,
}

/// Evaluates the surrogate of every event in `sample` at `point`.
///
/// The sample must carry the coefficient names of `basis`. Events whose
/// baseline weight is zero get a ratio of zero.
pub fn reweight_sample(
    basis: &BilinearBasis,
    sample: &EventSample,
    point: &[f64],
    mode: ReweightMode,
) -> Result<Vec<WeightRecord>, RwgtError> {
    let mut reader = sample.open()?;
    if reader.coefficient_names() != basis.coefficient_names() {
        return Err(RwgtError::EventFile(
            ErrorInfo::new(
                "coefficient-names-mismatch",
                "event sample was not produced with this parameter set",
            )
            .with_context("path", sample.path.display())
            .with_context("expected", basis.coefficient_names().join(","))
            .with_context("found", reader.coefficient_names().join(",")),
        ));
    }
    let baseline = basis.evaluation_matrix().row(0);
    let mut records = Vec::new();
    while let Some(event) = reader.read_event()? {
        let weight = match mode {
            ReweightMode::Absolute => weight_at(&event.coefficients, point),
            ReweightMode::RatioToBaseline => ratio_at(&event.coefficients, point, baseline)
                .map(|ratio| {
                    ratio.unwrap_or_else(|| {
                        warn!("event {}: zero baseline weight", event.id);
                        0.0
                    })
                }),
        }
        .map_err(|err| err.with_context("event_id", event.id))?;
        records.push(WeightRecord {
            event_id: event.id,
            weight,
        });
    }
    Ok(records)
}
