//! Repository for the `character_images` table.
//!
//! At most one image per character is primary (enforced by the partial
//! unique index `uq_character_images_primary`). The first image uploaded
//! for a character becomes primary, and deleting the primary promotes the
//! oldest remaining image.

use scenra_core::types::DbId;
use sqlx::PgPool;

use crate::models::character_image::{CharacterImage, CreateCharacterImage};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, character_id, storage_key, content_type, byte_size, width, height, \
                       is_primary, created_at, updated_at";

/// Provides CRUD operations for character reference images.
pub struct CharacterImageRepo;

impl CharacterImageRepo {
    /// Record an uploaded image. Becomes primary if the character has none.
    pub async fn create(
        pool: &PgPool,
        input: &CreateCharacterImage,
    ) -> Result<CharacterImage, sqlx::Error> {
        let query = format!(
            "INSERT INTO character_images
                (character_id, storage_key, content_type, byte_size, width, height, is_primary)
             VALUES ($1, $2, $3, $4, $5, $6,
                NOT EXISTS (SELECT 1 FROM character_images
                            WHERE character_id = $1 AND is_primary))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CharacterImage>(&query)
            .bind(input.character_id)
            .bind(&input.storage_key)
            .bind(&input.content_type)
            .bind(input.byte_size)
            .bind(input.width)
            .bind(input.height)
            .fetch_one(pool)
            .await
    }

    /// Find an image only if it belongs to `character_id`.
    pub async fn find_for_character(
        pool: &PgPool,
        character_id: DbId,
        id: DbId,
    ) -> Result<Option<CharacterImage>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM character_images WHERE id = $1 AND character_id = $2"
        );
        sqlx::query_as::<_, CharacterImage>(&query)
            .bind(id)
            .bind(character_id)
            .fetch_optional(pool)
            .await
    }

    /// List a character's images, primary first then oldest first.
    pub async fn list_by_character(
        pool: &PgPool,
        character_id: DbId,
    ) -> Result<Vec<CharacterImage>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM character_images
             WHERE character_id = $1
             ORDER BY is_primary DESC, created_at ASC, id ASC"
        );
        sqlx::query_as::<_, CharacterImage>(&query)
            .bind(character_id)
            .fetch_all(pool)
            .await
    }

    /// Make `id` the character's primary image.
    ///
    /// Returns `None` if the image does not belong to the character.
    pub async fn set_primary(
        pool: &PgPool,
        character_id: DbId,
        id: DbId,
    ) -> Result<Option<CharacterImage>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query(
            "UPDATE character_images SET is_primary = FALSE
             WHERE character_id = $1 AND is_primary AND id <> $2",
        )
        .bind(character_id)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let query = format!(
            "UPDATE character_images SET is_primary = TRUE
             WHERE id = $1 AND character_id = $2
             RETURNING {COLUMNS}"
        );
        let image = sqlx::query_as::<_, CharacterImage>(&query)
            .bind(id)
            .bind(character_id)
            .fetch_optional(&mut *tx)
            .await?;

        if image.is_some() {
            tx.commit().await?;
        } else {
            tx.rollback().await?;
        }
        Ok(image)
    }

    /// Delete an image, returning the removed row so the caller can delete
    /// the stored file. Promotes a new primary when needed.
    pub async fn delete(
        pool: &PgPool,
        character_id: DbId,
        id: DbId,
    ) -> Result<Option<CharacterImage>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "DELETE FROM character_images
             WHERE id = $1 AND character_id = $2
             RETURNING {COLUMNS}"
        );
        let removed = sqlx::query_as::<_, CharacterImage>(&query)
            .bind(id)
            .bind(character_id)
            .fetch_optional(&mut *tx)
            .await?;

        if removed.as_ref().is_some_and(|img| img.is_primary) {
            sqlx::query(
                "UPDATE character_images SET is_primary = TRUE
                 WHERE id = (SELECT id FROM character_images
                             WHERE character_id = $1
                             ORDER BY created_at ASC, id ASC
                             LIMIT 1)",
            )
            .bind(character_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(removed)
    }

    /// Storage keys of every image of a character.
    pub async fn keys_for_character(
        pool: &PgPool,
        character_id: DbId,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "SELECT storage_key FROM character_images WHERE character_id = $1",
        )
        .bind(character_id)
        .fetch_all(pool)
        .await
    }

    /// Storage keys of every image of every character in a series.
    pub async fn keys_for_series(
        pool: &PgPool,
        series_id: DbId,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "SELECT ci.storage_key
             FROM character_images ci
             JOIN characters c ON c.id = ci.character_id
             WHERE c.series_id = $1",
        )
        .bind(series_id)
        .fetch_all(pool)
        .await
    }
}
