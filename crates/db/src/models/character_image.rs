//! Character reference image model.

use scenra_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A reference image row. The bytes live in object storage under
/// `storage_key`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CharacterImage {
    pub id: DbId,
    pub character_id: DbId,
    #[serde(skip_serializing)]
    pub storage_key: String,
    pub content_type: String,
    pub byte_size: i64,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub is_primary: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for recording an uploaded image.
#[derive(Debug, Clone)]
pub struct CreateCharacterImage {
    pub character_id: DbId,
    pub storage_key: String,
    pub content_type: String,
    pub byte_size: i64,
    pub width: Option<i32>,
    pub height: Option<i32>,
}
