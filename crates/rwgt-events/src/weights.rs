//! Weight table artefact exchanged with evaluators: a CSV file with the
//! header `event_id,weight` and one row per event in any order.

use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};
use rwgt_core::errors::{ErrorInfo, RwgtError};
use rwgt_core::EventId;
use serde::{Deserialize, Serialize};

/// One row of a weight table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightRecord {
    /// Event the weight belongs to.
    pub event_id: EventId,
    /// Matrix-element weight at the pass's parameter point.
    pub weight: f64,
}

fn wrap_csv(code: &str, path: &Path, err: csv::Error) -> RwgtError {
    RwgtError::Serde(
        ErrorInfo::new(code, err.to_string()).with_context("path", path.display()),
    )
}

/// Writes a weight table, replacing any existing file.
pub fn write_weight_table(path: &Path, records: &[WeightRecord]) -> Result<(), RwgtError> {
    let mut writer = WriterBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|err| wrap_csv("weight-table-create", path, err))?;
    for record in records {
        writer
            .serialize(record)
            .map_err(|err| wrap_csv("weight-table-write", path, err))?;
    }
    writer
        .flush()
        .map_err(|err| wrap_csv("weight-table-flush", path, err.into()))
}

/// Reads a weight table written by [`write_weight_table`] or an external
/// evaluator.
pub fn read_weight_table(path: &Path) -> Result<Vec<WeightRecord>, RwgtError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|err| wrap_csv("weight-table-open", path, err))?;
    reader
        .deserialize::<WeightRecord>()
        .enumerate()
        .map(|(index, row)| {
            row.map_err(|err| {
                RwgtError::Serde(
                    ErrorInfo::new("weight-table-row", err.to_string())
                        .with_context("path", path.display())
                        .with_context("row", index + 1),
                )
            })
        })
        .collect()
}
