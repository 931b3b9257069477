#![deny(missing_docs)]
#![doc = "Core data types, parameter sets and the error model shared by the bilinear reweighting crates."]

pub mod errors;
pub mod hash;
pub mod params;
pub mod serde;

pub use errors::{ErrorInfo, RwgtError};
pub use hash::stable_hash_string;
pub use params::{
    parse_parameter_listing, read_parameter_file, sample_count, ParameterSet, ReweightParameter,
};
pub use self::serde::{to_canonical_json_bytes, to_pretty_json_string};

/// Identifier of a simulated event, unique within one event sample.
pub type EventId = i32;
