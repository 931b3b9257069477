//! Format-independent reader and writer contracts.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use rwgt_core::errors::{ErrorInfo, RwgtError};
use serde::{Deserialize, Serialize};

use crate::binary::{BinaryEventReader, BinaryEventWriter};
use crate::event::Event;
use crate::jsonl::{JsonLinesEventReader, JsonLinesEventWriter};

/// On-disk encodings of an event sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventFormat {
    /// One JSON record per line, preceded by a header record.
    #[serde(rename = "jsonl")]
    JsonLines,
    /// Length-prefixed bincode records behind a fixed header.
    Binary,
}

impl EventFormat {
    /// Guesses the format from a file extension; anything unrecognized is
    /// treated as JSON lines.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("bin") | Some("rwgt") => EventFormat::Binary,
            _ => EventFormat::JsonLines,
        }
    }

    /// Canonical tag used in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventFormat::JsonLines => "jsonl",
            EventFormat::Binary => "binary",
        }
    }
}

impl fmt::Display for EventFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventFormat {
    type Err = RwgtError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "jsonl" | "json-lines" => Ok(EventFormat::JsonLines),
            "binary" | "bin" => Ok(EventFormat::Binary),
            other => Err(RwgtError::Config(
                ErrorInfo::new("unknown-event-format", "event format must be `jsonl` or `binary`")
                    .with_context("format", other),
            )),
        }
    }
}

/// Forward-only source of events.
pub trait EventReader {
    /// Number of events in the sample, `None` when not known in advance.
    fn count(&self) -> Option<u64>;

    /// Coefficient names declared by the writer of this sample.
    fn coefficient_names(&self) -> &[String];

    /// Reads the next event, `None` at the end of the sample.
    fn read_event(&mut self) -> Result<Option<Event>, RwgtError>;
}

/// Sequential sink for events with attached coefficients.
pub trait EventWriter {
    /// Declares the coefficient names. Allowed at most once and only before
    /// the first event is written.
    fn set_coefficient_names(&mut self, names: &[String]) -> Result<(), RwgtError>;

    /// Appends one event. Its coefficient vector must be empty when no names
    /// were declared, otherwise exactly as long as the declared names.
    fn write_event(&mut self, event: &Event) -> Result<(), RwgtError>;

    /// Flushes the sink and returns the number of events written.
    fn finish(self: Box<Self>) -> Result<u64, RwgtError>;
}

/// Location and encoding of an event sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSample {
    /// Path of the event file.
    pub path: PathBuf,
    /// Encoding of the event file.
    pub format: EventFormat,
}

impl EventSample {
    /// Describes a sample with an explicit format.
    pub fn new(path: impl Into<PathBuf>, format: EventFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    /// Describes a sample whose format follows from its extension.
    pub fn detect(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let format = EventFormat::from_path(&path);
        Self { path, format }
    }

    /// Opens a fresh reader positioned at the first event.
    pub fn open(&self) -> Result<Box<dyn EventReader>, RwgtError> {
        open_reader(&self.path, self.format)
    }
}

/// Opens an event reader for `path`.
pub fn open_reader(path: &Path, format: EventFormat) -> Result<Box<dyn EventReader>, RwgtError> {
    Ok(match format {
        EventFormat::JsonLines => Box::new(JsonLinesEventReader::open(path)?),
        EventFormat::Binary => Box::new(BinaryEventReader::open(path)?),
    })
}

/// Creates (or truncates) an event file for writing, creating missing
/// parent directories.
pub fn create_writer(path: &Path, format: EventFormat) -> Result<Box<dyn EventWriter>, RwgtError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| io_error("event-file-create", parent, err))?;
    }
    Ok(match format {
        EventFormat::JsonLines => Box::new(JsonLinesEventWriter::create(path)?),
        EventFormat::Binary => Box::new(BinaryEventWriter::create(path)?),
    })
}

/// Drains a reader into memory.
pub fn read_all(reader: &mut dyn EventReader) -> Result<Vec<Event>, RwgtError> {
    let mut events = Vec::new();
    if let Some(count) = reader.count() {
        events.reserve(usize::try_from(count).unwrap_or(0));
    }
    while let Some(event) = reader.read_event()? {
        events.push(event);
    }
    Ok(events)
}

pub(crate) fn io_error(code: &str, path: &Path, err: impl ToString) -> RwgtError {
    RwgtError::EventFile(
        ErrorInfo::new(code, err.to_string()).with_context("path", path.display()),
    )
}

/// Tracks the coefficient declaration rules shared by every writer.
#[derive(Debug, Default)]
pub(crate) struct CoefficientLayout {
    names: Option<Vec<String>>,
    written: u64,
}

impl CoefficientLayout {
    pub(crate) fn declare(&mut self, names: &[String]) -> Result<(), RwgtError> {
        if self.names.is_some() {
            return Err(RwgtError::EventFile(ErrorInfo::new(
                "coefficient-names-redeclared",
                "coefficient names may be declared only once",
            )));
        }
        if self.written > 0 {
            return Err(RwgtError::EventFile(
                ErrorInfo::new(
                    "coefficient-names-late",
                    "coefficient names must be declared before the first event",
                )
                .with_context("written", self.written),
            ));
        }
        self.names = Some(names.to_vec());
        Ok(())
    }

    pub(crate) fn names(&self) -> &[String] {
        self.names.as_deref().unwrap_or(&[])
    }

    pub(crate) fn check(&self, event: &Event) -> Result<(), RwgtError> {
        let expected = self.names().len();
        if event.coefficients.len() != expected {
            return Err(RwgtError::EventFile(
                ErrorInfo::new(
                    "coefficient-length",
                    "event coefficients do not match the declared coefficient names",
                )
                .with_context("event_id", event.id)
                .with_context("expected", expected)
                .with_context("found", event.coefficients.len()),
            ));
        }
        Ok(())
    }

    pub(crate) fn record_write(&mut self) {
        self.written += 1;
    }

    pub(crate) fn written(&self) -> u64 {
        self.written
    }
}
