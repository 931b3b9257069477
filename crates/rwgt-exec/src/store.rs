//! Per-event accumulation of sampled weights and their projection onto
//! polynomial coefficients.

use std::collections::BTreeMap;

use log::warn;
use rwgt_basis::{BilinearBasis, DenseMatrix};
use rwgt_core::EventId;
use serde::{Deserialize, Serialize};

/// An event removed because it was not evaluated at every sample point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DroppedEvent {
    /// Event identifier.
    pub event_id: EventId,
    /// Number of weights recorded for the event.
    pub observed: usize,
    /// Number of weights a complete event carries.
    pub required: usize,
}

/// Sampled weights keyed by event id, in evaluation-row order.
#[derive(Debug, Clone, PartialEq)]
pub struct EventCoefficientStore {
    inverse_design: DenseMatrix,
    weights: BTreeMap<EventId, Vec<f64>>,
}

impl EventCoefficientStore {
    /// Creates an empty store projecting through `inverse_design` (`M x M`).
    pub fn new(inverse_design: DenseMatrix) -> Self {
        Self {
            inverse_design,
            weights: BTreeMap::new(),
        }
    }

    /// Creates an empty store for the inverse design matrix of `basis`.
    pub fn for_basis(basis: &BilinearBasis) -> Self {
        Self::new(basis.inverse_design().clone())
    }

    /// Number of sample points a complete event needs (M).
    pub fn required(&self) -> usize {
        self.inverse_design.nrows()
    }

    /// Drops every accumulated weight.
    pub fn clear(&mut self) {
        self.weights.clear();
    }

    /// Appends the weight sampled for `event_id` in the current pass.
    pub fn append(&mut self, event_id: EventId, weight: f64) {
        self.weights.entry(event_id).or_default().push(weight);
    }

    /// Removes events without exactly `M` weights and reports them.
    pub fn retain_complete(&mut self) -> Vec<DroppedEvent> {
        let required = self.required();
        let mut dropped = Vec::new();
        self.weights.retain(|&event_id, weights| {
            if weights.len() == required {
                return true;
            }
            warn!(
                "discarding event {event_id}: evaluations {}, required {required}",
                weights.len()
            );
            dropped.push(DroppedEvent {
                event_id,
                observed: weights.len(),
                required,
            });
            false
        });
        dropped
    }

    /// Weights recorded for `event_id`; empty for an unknown event.
    pub fn matrix_elements(&self, event_id: EventId) -> &[f64] {
        self.weights.get(&event_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Polynomial coefficients of `event_id`.
    ///
    /// Empty when the event is unknown or does not hold exactly `M` weights.
    pub fn coefficient_values(&self, event_id: EventId) -> Vec<f64> {
        let samples = self.matrix_elements(event_id);
        if samples.len() != self.required() {
            return Vec::new();
        }
        self.inverse_design.mul_vec(samples).unwrap_or_default()
    }

    /// Whether the store holds weights for `event_id`.
    pub fn contains(&self, event_id: EventId) -> bool {
        self.weights.contains_key(&event_id)
    }

    /// Stored event ids in ascending order.
    pub fn event_ids(&self) -> impl Iterator<Item = EventId> + '_ {
        self.weights.keys().copied()
    }

    /// Number of events with recorded weights.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Whether no event has recorded weights.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}
