//! Multi-agent roundtable.
//!
//! Four specialist agents discuss a segment brief in two rounds, then a
//! synthesis pass produces the final generation prompt and a shot list.
//! Every step is reported as a [`RoundtableEvent`] on an mpsc channel that
//! the HTTP layer turns into an NDJSON response body.
//!
//! [`RoundtableEvent`]: scenra_core::roundtable::RoundtableEvent

mod agents;
mod brief;
mod orchestrator;

pub use agents::{Agent, AGENTS};
pub use brief::{CastMember, RoundtableBrief, SettingBrief, StyleBrief};
pub use orchestrator::{
    chunk_words, run_roundtable, RoundtableError, RoundtableOutcome, TranscriptEntry,
    CHUNK_WORDS,
};
