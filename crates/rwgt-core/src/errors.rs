//! Structured error types shared across the reweighting crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Code, message and reproduction context carried by every [`RwgtError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Kebab-case identifier that tests and callers match on.
    pub code: String,
    /// Diagnostic text for humans.
    pub message: String,
    /// Row index, event id, path and similar reproduction details.
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Suggested remedy, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Payload with an empty context and no hint.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        ErrorInfo {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Records `key=value`, replacing any earlier value for `key`.
    pub fn with_context(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.context.insert(key.into(), value.to_string());
        self
    }

    /// Attaches a remedy hint.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the reweighting engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum RwgtError {
    /// Invalid parameter sets and configuration documents.
    #[error("configuration error: {0}")]
    Config(ErrorInfo),
    /// Sampling or design matrix construction failures.
    #[error("matrix error: {0}")]
    Matrix(ErrorInfo),
    /// External matrix-element evaluation failures.
    #[error("evaluation error: {0}")]
    Evaluation(ErrorInfo),
    /// Parameter card substitution failures.
    #[error("substitution error: {0}")]
    Substitution(ErrorInfo),
    /// Event file encoding and decoding failures.
    #[error("event file error: {0}")]
    EventFile(ErrorInfo),
    /// Serialization, schema and artefact I/O errors.
    #[error("serialization error: {0}")]
    Serde(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        let mut entries = self.context.iter();
        if let Some((key, value)) = entries.next() {
            write!(f, " ({key}={value}")?;
            for (key, value) in entries {
                write!(f, " {key}={value}")?;
            }
            f.write_str(")")?;
        }
        match &self.hint {
            Some(hint) => write!(f, "; hint: {hint}"),
            None => Ok(()),
        }
    }
}

impl RwgtError {
    /// Payload shared by every family.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            RwgtError::Config(info)
            | RwgtError::Matrix(info)
            | RwgtError::Evaluation(info)
            | RwgtError::Substitution(info)
            | RwgtError::EventFile(info)
            | RwgtError::Serde(info) => info,
        }
    }

    fn info_mut(&mut self) -> &mut ErrorInfo {
        match self {
            RwgtError::Config(info)
            | RwgtError::Matrix(info)
            | RwgtError::Evaluation(info)
            | RwgtError::Substitution(info)
            | RwgtError::EventFile(info)
            | RwgtError::Serde(info) => info,
        }
    }

    /// Machine readable code, e.g. `singular-design`.
    pub fn code(&self) -> &str {
        &self.info().code
    }

    /// Adds a context entry unless one with the same key is already present.
    pub fn with_context(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.info_mut()
            .context
            .entry(key.into())
            .or_insert_with(|| value.to_string());
        self
    }
}
