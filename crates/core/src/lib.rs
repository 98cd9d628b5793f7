//! Domain core for Scenra Studio.
//!
//! Pure logic shared by the database, AI and HTTP layers: error and id
//! types, enum validation for the content hierarchy, the local object
//! store, and the roundtable streaming protocol (wire events, NDJSON
//! decoding, the client-side state reducer and its consumer loop).

pub mod error;
pub mod roundtable;
pub mod storage;
pub mod types;
pub mod validation;
