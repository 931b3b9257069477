#![deny(missing_docs)]
#![doc = "Event samples on disk: the event model, streaming readers and writers, and weight tables."]

mod binary;
/// Event and particle records.
pub mod event;
pub mod format;
mod jsonl;
pub mod weights;

pub use binary::{BinaryEventReader, BinaryEventWriter};
pub use event::{Event, Particle};
pub use format::{
    create_writer, open_reader, read_all, EventFormat, EventReader, EventSample, EventWriter,
};
pub use jsonl::{JsonLinesEventReader, JsonLinesEventWriter};
pub use weights::{read_weight_table, write_weight_table, WeightRecord};
