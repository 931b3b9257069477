//! Binary encoding.
//!
//! Layout: 8 byte magic, little-endian `u64` event count (`u64::MAX` while
//! unknown), then length-prefixed bincode frames: one for the coefficient
//! names, one per event. The count is patched in when the writer finishes.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use log::{debug, warn};
use rwgt_core::errors::{ErrorInfo, RwgtError};
use rwgt_core::EventId;
use serde::{Deserialize, Serialize};

use crate::event::{Event, Particle};
use crate::format::{io_error, CoefficientLayout, EventReader, EventWriter};

const MAGIC: &[u8; 8] = b"RWGTBIN1";
const COUNT_OFFSET: u64 = MAGIC.len() as u64;
const UNKNOWN_COUNT: u64 = u64::MAX;
const MAX_FRAME_BYTES: u32 = 64 * 1024 * 1024;

#[derive(Serialize)]
struct RecordRef<'a> {
    id: EventId,
    input: &'a [Particle],
    output: &'a [Particle],
    coefficients: &'a [f64],
}

#[derive(Deserialize)]
struct Record {
    id: EventId,
    input: Vec<Particle>,
    output: Vec<Particle>,
    coefficients: Vec<f64>,
}

/// Reader for the binary encoding.
pub struct BinaryEventReader {
    path: PathBuf,
    input: BufReader<File>,
    count: Option<u64>,
    coefficient_names: Vec<String>,
    frames_read: u64,
}

impl BinaryEventReader {
    /// Opens `path`, validating the magic and reading the header frames.
    pub fn open(path: &Path) -> Result<Self, RwgtError> {
        let file = File::open(path).map_err(|err| io_error("event-file-open", path, err))?;
        let mut input = BufReader::new(file);
        let mut magic = [0u8; 8];
        input
            .read_exact(&mut magic)
            .map_err(|err| io_error("event-header-read", path, err))?;
        if &magic != MAGIC {
            return Err(RwgtError::EventFile(
                ErrorInfo::new("event-header-unsupported", "file is not a binary event sample")
                    .with_context("path", path.display()),
            ));
        }
        let mut count = [0u8; 8];
        input
            .read_exact(&mut count)
            .map_err(|err| io_error("event-header-read", path, err))?;
        let count = u64::from_le_bytes(count);
        if count == UNKNOWN_COUNT {
            warn!(
                "{} carries no event count; its writer did not finish",
                path.display()
            );
        }

        let mut reader = Self {
            path: path.to_path_buf(),
            input,
            count: (count != UNKNOWN_COUNT).then_some(count),
            coefficient_names: Vec::new(),
            frames_read: 0,
        };
        let names = reader
            .next_frame()?
            .ok_or_else(|| io_error("event-header-read", path, "missing coefficient name frame"))?;
        reader.coefficient_names = bincode::deserialize(&names)
            .map_err(|err| io_error("event-header-decode", path, err))?;
        debug!(
            "opened {} ({} coefficients, count {:?})",
            path.display(),
            reader.coefficient_names.len(),
            reader.count
        );
        Ok(reader)
    }

    fn next_frame(&mut self) -> Result<Option<Vec<u8>>, RwgtError> {
        let at_end = self
            .input
            .fill_buf()
            .map_err(|err| io_error("event-file-read", &self.path, err))?
            .is_empty();
        if at_end {
            return Ok(None);
        }
        let mut len = [0u8; 4];
        self.input
            .read_exact(&mut len)
            .map_err(|err| self.frame_error(err))?;
        let len = u32::from_le_bytes(len);
        if len > MAX_FRAME_BYTES {
            return Err(self.frame_error(format!("frame of {len} bytes exceeds limit")));
        }
        let mut payload = vec![0u8; len as usize];
        self.input
            .read_exact(&mut payload)
            .map_err(|err| self.frame_error(err))?;
        self.frames_read += 1;
        Ok(Some(payload))
    }

    fn frame_error(&self, err: impl ToString) -> RwgtError {
        RwgtError::EventFile(
            ErrorInfo::new("event-frame-read", err.to_string())
                .with_context("path", self.path.display())
                .with_context("frame", self.frames_read),
        )
    }
}

impl EventReader for BinaryEventReader {
    fn count(&self) -> Option<u64> {
        self.count
    }

    fn coefficient_names(&self) -> &[String] {
        &self.coefficient_names
    }

    fn read_event(&mut self) -> Result<Option<Event>, RwgtError> {
        let Some(frame) = self.next_frame()? else {
            return Ok(None);
        };
        let record: Record = bincode::deserialize(&frame).map_err(|err| {
            RwgtError::EventFile(
                ErrorInfo::new("event-decode", err.to_string())
                    .with_context("path", self.path.display())
                    .with_context("frame", self.frames_read),
            )
        })?;
        Ok(Some(Event {
            id: record.id,
            input: record.input,
            output: record.output,
            coefficients: record.coefficients,
        }))
    }
}

/// Writer for the binary encoding.
pub struct BinaryEventWriter {
    path: PathBuf,
    out: BufWriter<File>,
    layout: CoefficientLayout,
    header_written: bool,
}

impl BinaryEventWriter {
    /// Creates or truncates `path` and writes the magic and a placeholder count.
    pub fn create(path: &Path) -> Result<Self, RwgtError> {
        let file = File::create(path).map_err(|err| io_error("event-file-create", path, err))?;
        let mut out = BufWriter::new(file);
        out.write_all(MAGIC)
            .and_then(|_| out.write_all(&UNKNOWN_COUNT.to_le_bytes()))
            .map_err(|err| io_error("event-file-write", path, err))?;
        Ok(Self {
            path: path.to_path_buf(),
            out,
            layout: CoefficientLayout::default(),
            header_written: false,
        })
    }

    fn write_frame<T: Serialize>(&mut self, value: &T) -> Result<(), RwgtError> {
        let payload =
            bincode::serialize(value).map_err(|err| io_error("event-encode", &self.path, err))?;
        let len = u32::try_from(payload.len())
            .ok()
            .filter(|len| *len <= MAX_FRAME_BYTES)
            .ok_or_else(|| io_error("event-encode", &self.path, "event frame too large"))?;
        self.out
            .write_all(&len.to_le_bytes())
            .and_then(|_| self.out.write_all(&payload))
            .map_err(|err| io_error("event-file-write", &self.path, err))
    }

    fn ensure_header(&mut self) -> Result<(), RwgtError> {
        if !self.header_written {
            let names = self.layout.names().to_vec();
            self.write_frame(&names)?;
            self.header_written = true;
        }
        Ok(())
    }
}

impl EventWriter for BinaryEventWriter {
    fn set_coefficient_names(&mut self, names: &[String]) -> Result<(), RwgtError> {
        self.layout.declare(names)
    }

    fn write_event(&mut self, event: &Event) -> Result<(), RwgtError> {
        self.layout.check(event)?;
        self.ensure_header()?;
        self.write_frame(&RecordRef {
            id: event.id,
            input: &event.input,
            output: &event.output,
            coefficients: &event.coefficients,
        })?;
        self.layout.record_write();
        Ok(())
    }

    fn finish(mut self: Box<Self>) -> Result<u64, RwgtError> {
        self.ensure_header()?;
        let written = self.layout.written();
        self.out
            .seek(SeekFrom::Start(COUNT_OFFSET))
            .and_then(|_| self.out.write_all(&written.to_le_bytes()))
            .and_then(|_| self.out.flush())
            .map_err(|err| io_error("event-file-flush", &self.path, err))?;
        debug!("wrote {written} events to {}", self.path.display());
        Ok(written)
    }
}
