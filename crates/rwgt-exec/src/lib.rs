#![deny(missing_docs)]
#![doc = "Evaluation passes, the event coefficient store and the reweighting session driver."]

pub mod card;
/// YAML session configuration.
pub mod config;
pub mod evaluator;
pub mod export;
pub mod orchestrator;
pub mod reweight;
pub mod session;
pub mod store;
/// Per-pass scratch directories.
pub mod workspace;

pub use card::{format_card_value, read_card_template, write_card, ParameterSubstitutionStrategy};
pub use config::{EvaluatorConfig, EventsConfig, SessionConfig};
pub use evaluator::{EvaluationPass, InProcessEvaluator, MatrixElementEvaluator, SubprocessEvaluator};
pub use export::{export_events, progress_checkpoint, ExportSummary};
pub use orchestrator::{CardTemplate, EvaluationOrchestrator, EvaluationOutcome, PassSummary};
pub use reweight::{reweight_sample, ReweightMode};
pub use session::{Session, SessionReport};
pub use store::{DroppedEvent, EventCoefficientStore};
pub use workspace::Workspace;
