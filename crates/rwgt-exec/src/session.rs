//! One complete reweighting session: basis, evaluation passes, export.

use std::path::PathBuf;

use log::info;
use rwgt_basis::BilinearBasis;
use rwgt_core::errors::RwgtError;
use rwgt_core::to_pretty_json_string;
use serde::Serialize;

use crate::card::read_card_template;
use crate::config::SessionConfig;
use crate::evaluator::{MatrixElementEvaluator, SubprocessEvaluator};
use crate::export::{export_events, ExportSummary};
use crate::orchestrator::{CardTemplate, EvaluationOrchestrator, PassSummary};
use crate::store::DroppedEvent;
use crate::workspace::Workspace;

/// Summary of a finished session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionReport {
    /// Stable hash of the basis the coefficients refer to.
    pub basis_hash: String,
    /// Number of reweight parameters (N).
    pub parameters: usize,
    /// Number of coefficients per event (M).
    pub coefficients: usize,
    /// Coefficient names in monomial order.
    pub coefficient_names: Vec<String>,
    /// Per-pass counters.
    pub passes: Vec<PassSummary>,
    /// Events with a complete set of evaluations.
    pub evaluated: usize,
    /// Events discarded for incomplete evaluations.
    pub dropped: Vec<DroppedEvent>,
    /// Export counters.
    pub export: ExportSummary,
    /// Output event file.
    pub output: PathBuf,
}

impl SessionReport {
    /// Pretty, key-sorted JSON rendering.
    pub fn to_json(&self) -> Result<String, RwgtError> {
        to_pretty_json_string(self)
    }
}

/// A configured session whose basis has been built and validated.
#[derive(Debug, Clone)]
pub struct Session {
    config: SessionConfig,
    basis: BilinearBasis,
}

impl Session {
    /// Validates the configuration and builds the basis. Configuration and
    /// singular-design errors surface here, before any evaluation work.
    pub fn new(config: SessionConfig) -> Result<Self, RwgtError> {
        config.validate()?;
        let parameters = config.parameter_set()?;
        let basis = BilinearBasis::build(&parameters)?;
        Ok(Self { config, basis })
    }

    /// Session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Sampling design and inverse design matrix.
    pub fn basis(&self) -> &BilinearBasis {
        &self.basis
    }

    /// Runs the session with the configured external evaluator.
    pub fn run(&self) -> Result<SessionReport, RwgtError> {
        let mut evaluator = SubprocessEvaluator::new(
            &self.config.evaluator.program,
            self.config.evaluator.args.clone(),
        );
        self.run_with(&mut evaluator)
    }

    /// Runs the session with `evaluator`.
    ///
    /// The pass directories are removed after success unless
    /// `keep_workspace` is set; they are always left behind on failure.
    /// Other files in the workspace directory are never touched.
    pub fn run_with(
        &self,
        evaluator: &mut dyn MatrixElementEvaluator,
    ) -> Result<SessionReport, RwgtError> {
        let input = self.config.events.input_sample();
        let output = self.config.events.output_sample();
        info!(
            "reweighting {} with {} parameters ({} passes)",
            input.path.display(),
            self.basis.parameter_count(),
            self.basis.sample_count()
        );

        let workspace = Workspace::create(&self.config.workspace)?;
        let mut orchestrator = EvaluationOrchestrator::new(&self.basis, &workspace);
        if let Some(path) = &self.config.card_template {
            orchestrator = orchestrator.with_card(CardTemplate {
                strategy: self.config.model,
                text: read_card_template(path)?,
            });
        }
        let outcome = orchestrator.run(&input, evaluator)?;
        let export = export_events(
            &input,
            &output,
            self.basis.coefficient_names(),
            &outcome.store,
        )?;

        if self.config.keep_workspace {
            info!("workspace kept at {}", workspace.root().display());
        } else {
            workspace.remove(self.basis.sample_count())?;
        }

        Ok(SessionReport {
            basis_hash: self.basis.fingerprint()?,
            parameters: self.basis.parameter_count(),
            coefficients: self.basis.sample_count(),
            coefficient_names: self.basis.coefficient_names().to_vec(),
            evaluated: outcome.store.len(),
            passes: outcome.passes,
            dropped: outcome.dropped,
            export,
            output: output.path,
        })
    }
}
