//! Character relationship model and DTOs.

use scenra_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An unordered relationship between two characters of the same series.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CharacterRelationship {
    pub id: DbId,
    pub series_id: DbId,
    pub character_a_id: DbId,
    pub character_b_id: DbId,
    pub relationship_type: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Relationship joined with both character names, for listings.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RelationshipWithNames {
    pub id: DbId,
    pub series_id: DbId,
    pub character_a_id: DbId,
    pub character_a_name: String,
    pub character_b_id: DbId,
    pub character_b_name: String,
    pub relationship_type: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a relationship.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRelationship {
    pub character_a_id: DbId,
    pub character_b_id: DbId,
    pub relationship_type: String,
    pub description: Option<String>,
}

/// DTO for updating a relationship. The pair itself is immutable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRelationship {
    pub relationship_type: Option<String>,
    pub description: Option<String>,
}
