//! Sequential evaluation passes over an event sample.

use log::{debug, info};
use rwgt_basis::BilinearBasis;
use rwgt_core::errors::{ErrorInfo, RwgtError};
use rwgt_events::EventSample;
use serde::{Deserialize, Serialize};

use crate::card::{write_card, ParameterSubstitutionStrategy};
use crate::evaluator::{EvaluationPass, MatrixElementEvaluator};
use crate::store::{DroppedEvent, EventCoefficientStore};
use crate::workspace::Workspace;

/// Card template and the strategy used to fill it in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardTemplate {
    /// Substitution strategy.
    pub strategy: ParameterSubstitutionStrategy,
    /// Template text.
    pub text: String,
}

/// Result of running every evaluation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationOutcome {
    /// Complete events only.
    pub store: EventCoefficientStore,
    /// Events discarded for missing evaluations.
    pub dropped: Vec<DroppedEvent>,
    /// One summary per executed pass, in row order.
    pub passes: Vec<PassSummary>,
}

/// Counters for one finished pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassSummary {
    /// Evaluation row.
    pub row: usize,
    /// Weights returned by the evaluator.
    pub weights: usize,
}

/// Drives one evaluation pass per evaluation-matrix row, strictly in row
/// order, and collects the returned weights per event.
#[derive(Debug)]
pub struct EvaluationOrchestrator<'a> {
    basis: &'a BilinearBasis,
    workspace: &'a Workspace,
    card: Option<CardTemplate>,
}

impl<'a> EvaluationOrchestrator<'a> {
    /// Creates an orchestrator that writes pass artefacts into `workspace`.
    pub fn new(basis: &'a BilinearBasis, workspace: &'a Workspace) -> Self {
        Self {
            basis,
            workspace,
            card: None,
        }
    }

    /// Renders a parameter card per pass from `template`.
    pub fn with_card(mut self, template: CardTemplate) -> Self {
        self.card = Some(template);
        self
    }

    /// Runs all `M` passes and filters out incomplete events.
    ///
    /// Any failing pass aborts the run; nothing collected so far is returned.
    pub fn run(
        &self,
        events: &EventSample,
        evaluator: &mut dyn MatrixElementEvaluator,
    ) -> Result<EvaluationOutcome, RwgtError> {
        let mut store = EventCoefficientStore::for_basis(self.basis);
        let mut passes = Vec::with_capacity(self.basis.sample_count());
        for row in 0..self.basis.sample_count() {
            passes.push(self.run_pass(row, events, evaluator, &mut store)?);
        }
        let dropped = store.retain_complete();
        info!(
            "evaluation finished: {} complete events, {} dropped",
            store.len(),
            dropped.len()
        );
        Ok(EvaluationOutcome {
            store,
            dropped,
            passes,
        })
    }

    fn run_pass(
        &self,
        row: usize,
        events: &EventSample,
        evaluator: &mut dyn MatrixElementEvaluator,
        store: &mut EventCoefficientStore,
    ) -> Result<PassSummary, RwgtError> {
        let assignment = self.basis.assignment(row).ok_or_else(|| {
            RwgtError::Matrix(
                ErrorInfo::new("row-out-of-range", "evaluation row outside the sampling design")
                    .with_context("row", row),
            )
        })?;
        info!(
            "evaluation pass {}/{}: {}",
            row + 1,
            self.basis.sample_count(),
            assignment.to_key_values()
        );

        let directory = self.workspace.prepare_pass(row)?;
        let card_path = match &self.card {
            Some(card) => {
                let path = self.workspace.card_path(row);
                write_card(card.strategy, &card.text, &assignment, &path)?;
                debug!("wrote parameter card {}", path.display());
                Some(path)
            }
            None => None,
        };

        let pass = EvaluationPass {
            row,
            assignment: &assignment,
            events,
            card: card_path.as_deref(),
            directory: &directory,
        };
        let records = evaluator
            .evaluate(&pass)
            .map_err(|err| err.with_context("row", row))?;
        for record in &records {
            store.append(record.event_id, record.weight);
        }
        debug!("pass {} returned {} weights", row + 1, records.len());
        Ok(PassSummary {
            row,
            weights: records.len(),
        })
    }
}
