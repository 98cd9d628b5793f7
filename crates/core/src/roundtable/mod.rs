//! Roundtable event protocol: wire events, the incremental NDJSON decoder,
//! the client-side state reducer and the paced consumer loop.

pub mod consumer;
pub mod decoder;
pub mod events;
pub mod reducer;

pub use consumer::{consume, ConsumeEnd};
pub use decoder::{DecodeError, NdjsonDecoder};
pub use events::{RoundtableEvent, Shot, Stage};
pub use reducer::{Pacing, PacingConfig, RoundtableState};
