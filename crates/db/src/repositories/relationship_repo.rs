//! Repository for the `character_relationships` table.

use scenra_core::types::DbId;
use sqlx::PgPool;

use crate::models::relationship::{
    CharacterRelationship, CreateRelationship, RelationshipWithNames, UpdateRelationship,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, series_id, character_a_id, character_b_id, relationship_type, \
                       description, created_at, updated_at";

/// Joined projection used by the listing queries.
const NAMED_SELECT: &str = "SELECT r.id, r.series_id,
            r.character_a_id, a.name AS character_a_name,
            r.character_b_id, b.name AS character_b_name,
            r.relationship_type, r.description, r.created_at, r.updated_at
     FROM character_relationships r
     JOIN characters a ON a.id = r.character_a_id
     JOIN characters b ON b.id = r.character_b_id";

/// Provides CRUD operations for character relationships.
pub struct RelationshipRepo;

impl RelationshipRepo {
    /// Insert a new relationship. A duplicate pair in either order violates
    /// `uq_relationships_pair`.
    pub async fn create(
        pool: &PgPool,
        series_id: DbId,
        input: &CreateRelationship,
    ) -> Result<CharacterRelationship, sqlx::Error> {
        let query = format!(
            "INSERT INTO character_relationships
                (series_id, character_a_id, character_b_id, relationship_type, description)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CharacterRelationship>(&query)
            .bind(series_id)
            .bind(input.character_a_id)
            .bind(input.character_b_id)
            .bind(&input.relationship_type)
            .bind(&input.description)
            .fetch_one(pool)
            .await
    }

    /// Find a relationship only if it belongs to `series_id`.
    pub async fn find_in_series(
        pool: &PgPool,
        series_id: DbId,
        id: DbId,
    ) -> Result<Option<RelationshipWithNames>, sqlx::Error> {
        let query = format!("{NAMED_SELECT} WHERE r.id = $1 AND r.series_id = $2");
        sqlx::query_as::<_, RelationshipWithNames>(&query)
            .bind(id)
            .bind(series_id)
            .fetch_optional(pool)
            .await
    }

    /// List all relationships of a series.
    pub async fn list_by_series(
        pool: &PgPool,
        series_id: DbId,
    ) -> Result<Vec<RelationshipWithNames>, sqlx::Error> {
        let query = format!("{NAMED_SELECT} WHERE r.series_id = $1 ORDER BY r.created_at, r.id");
        sqlx::query_as::<_, RelationshipWithNames>(&query)
            .bind(series_id)
            .fetch_all(pool)
            .await
    }

    /// List relationships in which `character_id` takes part, on either side.
    pub async fn list_for_character(
        pool: &PgPool,
        character_id: DbId,
    ) -> Result<Vec<RelationshipWithNames>, sqlx::Error> {
        let query = format!(
            "{NAMED_SELECT}
             WHERE r.character_a_id = $1 OR r.character_b_id = $1
             ORDER BY r.created_at, r.id"
        );
        sqlx::query_as::<_, RelationshipWithNames>(&query)
            .bind(character_id)
            .fetch_all(pool)
            .await
    }

    /// Update a relationship. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateRelationship,
    ) -> Result<Option<CharacterRelationship>, sqlx::Error> {
        let query = format!(
            "UPDATE character_relationships SET
                relationship_type = COALESCE($2, relationship_type),
                description = COALESCE($3, description)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CharacterRelationship>(&query)
            .bind(id)
            .bind(&input.relationship_type)
            .bind(&input.description)
            .fetch_optional(pool)
            .await
    }

    /// Delete a relationship. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM character_relationships WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
