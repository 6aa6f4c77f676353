//! Change detection and persistence of classified fuel price observations.
//!
//! Each station worker drives a [`Pipeline`]: observations are classified,
//! compared with the stored record under the same identity key and written
//! only when something changed.

pub mod detect;
pub mod error;
pub mod memory;
pub mod pipeline;
pub mod source;
pub mod writer;

pub use detect::{compare, decide, Decision};
pub use error::{IngestError, SourceError};
pub use memory::MemoryStore;
pub use pipeline::{IngestSummary, Pipeline};
pub use source::{parse_dataset, parse_price, DatasetFileSource, ObservationSource};
pub use writer::{apply, WriteResult};
