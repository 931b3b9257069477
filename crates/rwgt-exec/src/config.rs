use std::fs;
use std::path::{Path, PathBuf};

use rwgt_core::errors::{ErrorInfo, RwgtError};
use rwgt_core::{read_parameter_file, ParameterSet, ReweightParameter};
use rwgt_events::{EventFormat, EventSample};
use serde::{Deserialize, Serialize};

use crate::card::ParameterSubstitutionStrategy;

/// YAML document describing one reweighting session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Parameters declared inline.
    #[serde(default)]
    pub parameters: Vec<ReweightParameter>,
    /// Optional parameter listing appended after the inline parameters.
    #[serde(default)]
    pub parameter_file: Option<PathBuf>,
    /// Card substitution strategy.
    #[serde(default)]
    pub model: ParameterSubstitutionStrategy,
    /// Parameter card template rendered once per pass.
    #[serde(default)]
    pub card_template: Option<PathBuf>,
    /// Scratch directory for per-pass artefacts.
    #[serde(default = "default_workspace")]
    pub workspace: PathBuf,
    /// External evaluator invocation.
    pub evaluator: EvaluatorConfig,
    /// Input and output event samples.
    pub events: EventsConfig,
    /// Keep the workspace after a successful session.
    #[serde(default)]
    pub keep_workspace: bool,
}

fn default_workspace() -> PathBuf {
    PathBuf::from("rwgt-work")
}

/// External evaluator program and its argument templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EvaluatorConfig {
    /// Program to spawn; a bare name is looked up on `PATH`.
    pub program: String,
    /// Arguments with `{events}`, `{output}`, `{card}` and `{row}` placeholders.
    #[serde(default = "default_evaluator_args")]
    pub args: Vec<String>,
}

fn default_evaluator_args() -> Vec<String> {
    ["{events}", "{output}", "{card}"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Event sample locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventsConfig {
    /// Sample to evaluate.
    pub input: PathBuf,
    /// Destination of the events with attached coefficients.
    pub output: PathBuf,
    /// Encoding of both files; guessed from each extension when absent.
    #[serde(default)]
    pub format: Option<EventFormat>,
}

impl EventsConfig {
    /// Input sample descriptor.
    pub fn input_sample(&self) -> EventSample {
        self.sample(&self.input)
    }

    /// Output sample descriptor.
    pub fn output_sample(&self) -> EventSample {
        self.sample(&self.output)
    }

    fn sample(&self, path: &Path) -> EventSample {
        match self.format {
            Some(format) => EventSample::new(path, format),
            None => EventSample::detect(path),
        }
    }
}

fn config_error(code: &str, path: &Path, err: impl ToString) -> RwgtError {
    RwgtError::Config(ErrorInfo::new(code, err.to_string()).with_context("path", path.display()))
}

impl SessionConfig {
    /// Parses a YAML document. Relative paths stay relative to the current
    /// directory until [`SessionConfig::resolve_paths`] rebases them; the
    /// subprocess evaluator anchors them before entering a pass directory.
    pub fn from_yaml_str(text: &str) -> Result<Self, RwgtError> {
        serde_yaml::from_str(text)
            .map_err(|err| RwgtError::Config(ErrorInfo::new("config-parse", err.to_string())))
    }

    /// Loads a YAML file and resolves relative paths against its directory.
    pub fn load(path: &Path) -> Result<Self, RwgtError> {
        let text = fs::read_to_string(path).map_err(|err| config_error("config-read", path, err))?;
        let mut config =
            Self::from_yaml_str(&text).map_err(|err| err.with_context("path", path.display()))?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        let base = if base.is_absolute() {
            base.to_path_buf()
        } else {
            std::env::current_dir()
                .map_err(|err| config_error("config-read", path, err))?
                .join(base)
        };
        config.resolve_paths(&base);
        Ok(config)
    }

    /// Rebases every relative path onto `base`.
    ///
    /// The evaluator program is only rebased when it contains a path
    /// separator; bare program names are resolved through `PATH`.
    pub fn resolve_paths(&mut self, base: &Path) {
        let rebase = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };
        if let Some(file) = self.parameter_file.as_mut() {
            rebase(file);
        }
        if let Some(card) = self.card_template.as_mut() {
            rebase(card);
        }
        rebase(&mut self.workspace);
        rebase(&mut self.events.input);
        rebase(&mut self.events.output);
        if self.evaluator.program.contains(['/', std::path::MAIN_SEPARATOR]) {
            let program = Path::new(&self.evaluator.program);
            if program.is_relative() {
                self.evaluator.program = base.join(program).display().to_string();
            }
        }
    }

    /// Inline parameters followed by those of the parameter file.
    pub fn declared_parameters(&self) -> Result<Vec<ReweightParameter>, RwgtError> {
        let mut parameters = self.parameters.clone();
        if let Some(file) = &self.parameter_file {
            parameters.extend(read_parameter_file(file)?);
        }
        Ok(parameters)
    }

    /// Finalized parameter set.
    pub fn parameter_set(&self) -> Result<ParameterSet, RwgtError> {
        ParameterSet::new(self.declared_parameters()?)
    }

    /// Rejects configurations whose output would overwrite the input.
    pub fn validate(&self) -> Result<(), RwgtError> {
        if self.events.input == self.events.output {
            return Err(RwgtError::Config(
                ErrorInfo::new("output-is-input", "output event file cannot be the input event file")
                    .with_context("path", self.events.input.display()),
            ));
        }
        let uses_card = self.evaluator.args.iter().any(|arg| arg.contains("{card}"));
        if uses_card && self.card_template.is_none() {
            return Err(RwgtError::Config(
                ErrorInfo::new("card-template-missing", "evaluator arguments reference {card}")
                    .with_hint("set `card_template` or drop the {card} placeholder"),
            ));
        }
        Ok(())
    }
}
