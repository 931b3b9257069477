//! Matrix-element evaluators: one call evaluates the whole event sample at
//! a single parameter assignment.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use log::{debug, info};
use rwgt_basis::ParameterAssignment;
use rwgt_core::errors::{ErrorInfo, RwgtError};
use rwgt_events::{read_weight_table, Event, EventSample, WeightRecord};

const STDERR_TAIL_LINES: usize = 20;

/// Anchors a relative path at the current directory. Evaluators run inside
/// their pass directory, where relative paths would no longer resolve.
fn absolute(path: &Path, row: usize) -> Result<PathBuf, RwgtError> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .map_err(|err| {
            RwgtError::Evaluation(
                ErrorInfo::new("working-directory", err.to_string())
                    .with_context("row", row)
                    .with_context("path", path.display()),
            )
        })
}

/// Everything an evaluator needs for one pass.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationPass<'a> {
    /// Evaluation-matrix row being evaluated.
    pub row: usize,
    /// Parameter values for this row.
    pub assignment: &'a ParameterAssignment,
    /// The event sample to evaluate.
    pub events: &'a EventSample,
    /// Rendered parameter card, when a card template is configured.
    pub card: Option<&'a Path>,
    /// Scratch directory reserved for this row.
    pub directory: &'a Path,
}

/// Evaluates every event of a sample at one parameter assignment.
///
/// Implementations return one weight per event they could evaluate, in any
/// order. A failure aborts the whole session.
pub trait MatrixElementEvaluator {
    /// Runs one full pass over the sample.
    fn evaluate(&mut self, pass: &EvaluationPass<'_>) -> Result<Vec<WeightRecord>, RwgtError>;
}

/// Runs an external program once per pass.
///
/// Arguments may contain the placeholders `{events}`, `{output}`, `{card}`
/// and `{row}`. The program must write its weight table to `{output}` and
/// exit with status zero.
#[derive(Debug, Clone)]
pub struct SubprocessEvaluator {
    program: PathBuf,
    args: Vec<String>,
}

impl SubprocessEvaluator {
    /// Name of the weight table written inside each pass directory.
    pub const OUTPUT_FILE: &'static str = "weights.csv";

    /// Creates an evaluator for `program` with argument templates `args`.
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Program that is spawned per pass.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Expands the argument templates for one pass. Path placeholders expand
    /// to absolute paths.
    pub fn command_args(&self, pass: &EvaluationPass<'_>, output: &Path) -> Result<Vec<String>, RwgtError> {
        let events = absolute(&pass.events.path, pass.row)?.display().to_string();
        let output = absolute(output, pass.row)?.display().to_string();
        let card = match pass.card {
            Some(path) => absolute(path, pass.row)?.display().to_string(),
            None => String::new(),
        };
        self.args
            .iter()
            .map(|template| {
                if template.contains("{card}") && pass.card.is_none() {
                    return Err(RwgtError::Evaluation(
                        ErrorInfo::new("card-unavailable", "evaluator arguments reference {card}")
                            .with_context("row", pass.row)
                            .with_hint("configure a card template"),
                    ));
                }
                Ok(template
                    .replace("{events}", &events)
                    .replace("{output}", &output)
                    .replace("{card}", &card)
                    .replace("{row}", &pass.row.to_string()))
            })
            .collect()
    }

    fn failure(&self, code: &str, message: impl Into<String>, row: usize) -> ErrorInfo {
        ErrorInfo::new(code, message)
            .with_context("row", row)
            .with_context("program", self.program.display())
    }
}

impl MatrixElementEvaluator for SubprocessEvaluator {
    fn evaluate(&mut self, pass: &EvaluationPass<'_>) -> Result<Vec<WeightRecord>, RwgtError> {
        let output = pass.directory.join(Self::OUTPUT_FILE);
        let args = self.command_args(pass, &output)?;
        // A bare name is looked up on PATH; anything with a directory part
        // is anchored before the working directory changes.
        let program = if self.program.components().count() > 1 {
            absolute(&self.program, pass.row)?
        } else {
            self.program.clone()
        };
        info!("running {} {}", program.display(), args.join(" "));

        let result = Command::new(&program)
            .args(&args)
            .current_dir(pass.directory)
            .stdin(Stdio::null())
            .output()
            .map_err(|err| {
                RwgtError::Evaluation(self.failure(
                    "evaluator-spawn",
                    format!("failed to spawn evaluator: {err}"),
                    pass.row,
                ))
            })?;
        let stdout = String::from_utf8_lossy(&result.stdout);
        for line in stdout.lines() {
            debug!("[row {}] {line}", pass.row);
        }

        if !result.status.success() {
            let status = result
                .status
                .code()
                .map_or_else(|| "signal".to_string(), |code| code.to_string());
            let mut err = self
                .failure("evaluator-exit", "evaluation failed", pass.row)
                .with_context("status", status);
            let stderr = stderr_tail(&result.stderr);
            if !stderr.is_empty() {
                err = err.with_context("stderr", stderr);
            }
            return Err(RwgtError::Evaluation(err));
        }

        read_weight_table(&output).map_err(|err| {
            RwgtError::Evaluation(
                ErrorInfo::new("evaluator-output", "evaluator result table is missing or unreadable")
                    .with_context("row", pass.row)
                    .with_context("path", output.display())
                    .with_context("cause", err.info().message.clone()),
            )
        })
    }
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.trim_end().lines().collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}

/// Evaluates events with a function inside the current process.
///
/// The sample is read again on every pass.
pub struct InProcessEvaluator<F> {
    weight: F,
}

impl<F> InProcessEvaluator<F>
where
    F: FnMut(&Event, &ParameterAssignment) -> Result<f64, RwgtError>,
{
    /// Wraps a per-event weight function.
    pub fn new(weight: F) -> Self {
        Self { weight }
    }
}

impl<F> MatrixElementEvaluator for InProcessEvaluator<F>
where
    F: FnMut(&Event, &ParameterAssignment) -> Result<f64, RwgtError>,
{
    fn evaluate(&mut self, pass: &EvaluationPass<'_>) -> Result<Vec<WeightRecord>, RwgtError> {
        let mut reader = pass.events.open()?;
        let mut records = Vec::new();
        while let Some(event) = reader.read_event()? {
            let weight = (self.weight)(&event, pass.assignment)
                .map_err(|err| err.with_context("event_id", event.id))?;
            records.push(WeightRecord {
                event_id: event.id,
                weight,
            });
        }
        Ok(records)
    }
}
