//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod character;
pub mod character_image;
pub mod episode;
pub mod relationship;
pub mod segment;
pub mod series;
pub mod session;
pub mod setting;
pub mod user;
pub mod video;
pub mod visual_style;
