//! JSON lines encoding: a header record naming the coefficients, followed by
//! one event per line.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Lines, Write};
use std::path::{Path, PathBuf};

use log::debug;
use rwgt_core::errors::{ErrorInfo, RwgtError};
use serde::{Deserialize, Serialize};

use crate::event::Event;
use crate::format::{io_error, CoefficientLayout, EventReader, EventWriter};

const HEADER_TAG: &str = "rwgt-events";
const HEADER_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    format: String,
    version: u32,
    #[serde(default)]
    coefficient_names: Vec<String>,
}

/// Reader for the JSON lines encoding. The event count is never known up
/// front.
pub struct JsonLinesEventReader {
    path: PathBuf,
    lines: Lines<BufReader<File>>,
    line_no: usize,
    coefficient_names: Vec<String>,
}

impl JsonLinesEventReader {
    /// Opens `path` and consumes its header record.
    pub fn open(path: &Path) -> Result<Self, RwgtError> {
        let file = File::open(path).map_err(|err| io_error("event-file-open", path, err))?;
        let mut reader = Self {
            path: path.to_path_buf(),
            lines: BufReader::new(file).lines(),
            line_no: 0,
            coefficient_names: Vec::new(),
        };
        if let Some(line) = reader.next_line()? {
            let header: Header = serde_json::from_str(&line).map_err(|err| {
                reader.decode_error("event-header-decode", err)
            })?;
            if header.format != HEADER_TAG || header.version != HEADER_VERSION {
                return Err(RwgtError::EventFile(
                    ErrorInfo::new("event-header-unsupported", "unsupported event file header")
                        .with_context("path", path.display())
                        .with_context("format", header.format)
                        .with_context("version", header.version),
                ));
            }
            reader.coefficient_names = header.coefficient_names;
        }
        Ok(reader)
    }

    fn next_line(&mut self) -> Result<Option<String>, RwgtError> {
        for line in self.lines.by_ref() {
            self.line_no += 1;
            let line = line.map_err(|err| io_error("event-file-read", &self.path, err))?;
            if !line.trim().is_empty() {
                return Ok(Some(line));
            }
            debug!("{}:{}: skipping blank line", self.path.display(), self.line_no);
        }
        Ok(None)
    }

    fn decode_error(&self, code: &str, err: serde_json::Error) -> RwgtError {
        RwgtError::EventFile(
            ErrorInfo::new(code, err.to_string())
                .with_context("path", self.path.display())
                .with_context("line", self.line_no),
        )
    }
}

impl EventReader for JsonLinesEventReader {
    fn count(&self) -> Option<u64> {
        None
    }

    fn coefficient_names(&self) -> &[String] {
        &self.coefficient_names
    }

    fn read_event(&mut self) -> Result<Option<Event>, RwgtError> {
        match self.next_line()? {
            Some(line) => serde_json::from_str(&line)
                .map(Some)
                .map_err(|err| self.decode_error("event-decode", err)),
            None => Ok(None),
        }
    }
}

/// Writer for the JSON lines encoding.
pub struct JsonLinesEventWriter {
    path: PathBuf,
    out: BufWriter<File>,
    layout: CoefficientLayout,
    header_written: bool,
}

impl JsonLinesEventWriter {
    /// Creates or truncates `path`.
    pub fn create(path: &Path) -> Result<Self, RwgtError> {
        let file = File::create(path).map_err(|err| io_error("event-file-create", path, err))?;
        Ok(Self {
            path: path.to_path_buf(),
            out: BufWriter::new(file),
            layout: CoefficientLayout::default(),
            header_written: false,
        })
    }

    fn write_line<T: Serialize>(&mut self, value: &T) -> Result<(), RwgtError> {
        serde_json::to_writer(&mut self.out, value)
            .map_err(|err| io_error("event-encode", &self.path, err))?;
        self.out
            .write_all(b"\n")
            .map_err(|err| io_error("event-file-write", &self.path, err))
    }

    fn ensure_header(&mut self) -> Result<(), RwgtError> {
        if self.header_written {
            return Ok(());
        }
        let header = Header {
            format: HEADER_TAG.to_string(),
            version: HEADER_VERSION,
            coefficient_names: self.layout.names().to_vec(),
        };
        self.write_line(&header)?;
        self.header_written = true;
        Ok(())
    }
}

impl EventWriter for JsonLinesEventWriter {
    fn set_coefficient_names(&mut self, names: &[String]) -> Result<(), RwgtError> {
        self.layout.declare(names)
    }

    fn write_event(&mut self, event: &Event) -> Result<(), RwgtError> {
        self.layout.check(event)?;
        self.ensure_header()?;
        self.write_line(event)?;
        self.layout.record_write();
        Ok(())
    }

    fn finish(mut self: Box<Self>) -> Result<u64, RwgtError> {
        self.ensure_header()?;
        self.out
            .flush()
            .map_err(|err| io_error("event-file-flush", &self.path, err))?;
        let written = self.layout.written();
        debug!("wrote {written} events to {}", self.path.display());
        Ok(written)
    }
}
