//! PostgreSQL photo repository

use async_trait::async_trait;
use gallery::ReorderPayload;
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use super::{PhotoRepository, RepositoryError, RepositoryResult, resolve_order};
use crate::models::{Asset, NewPhoto, Photo};

/// Schema statements, applied in order at start-up
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS photos (
        id UUID PRIMARY KEY,
        parent_id UUID NOT NULL,
        caption TEXT,
        seq INTEGER NOT NULL CHECK (seq >= 0),
        is_main BOOLEAN NOT NULL DEFAULT FALSE,
        file_name TEXT NOT NULL,
        content_type TEXT NOT NULL,
        data BYTEA NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS photos_parent_seq_idx ON photos (parent_id, seq)",
    "CREATE UNIQUE INDEX IF NOT EXISTS photos_one_main_idx ON photos (parent_id) WHERE is_main",
];

/// Photo repository backed by the `photos` table
#[derive(Clone)]
pub struct PgPhotoRepository {
    pool: PgPool,
}

impl PgPhotoRepository {
    /// Create a new photo repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the `photos` table and its indexes if they do not exist
    pub async fn ensure_schema(&self) -> RepositoryResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        info!("Photo schema is ready");
        Ok(())
    }

    /// Open a transaction holding the gallery's advisory lock
    ///
    /// Mutations of one gallery run one at a time so `seq` stays dense.
    async fn lock_gallery(&self, parent_id: Uuid) -> RepositoryResult<Transaction<'static, Postgres>> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1::text, 0))")
            .bind(parent_id)
            .execute(&mut *tx)
            .await?;
        Ok(tx)
    }
}

fn photo_from_row(row: &PgRow) -> Photo {
    let seq: i32 = row.get("seq");
    Photo {
        id: row.get("id"),
        parent_id: row.get("parent_id"),
        caption: row.get("caption"),
        seq: seq.max(0) as u32,
        is_main: row.get("is_main"),
        file_name: row.get("file_name"),
        content_type: row.get("content_type"),
        created_at: row.get("created_at"),
    }
}

fn not_found(photo_id: Uuid) -> RepositoryError {
    RepositoryError::NotFound(format!("Photo {} not found", photo_id))
}

#[async_trait]
impl PhotoRepository for PgPhotoRepository {
    async fn list(&self, parent_id: Uuid) -> RepositoryResult<Vec<Photo>> {
        let rows = sqlx::query(
            r#"
            SELECT id, parent_id, caption, seq, is_main, file_name, content_type, created_at
            FROM photos
            WHERE parent_id = $1
            ORDER BY seq
            "#,
        )
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(photo_from_row).collect())
    }

    async fn insert_batch(
        &self,
        parent_id: Uuid,
        photos: Vec<NewPhoto>,
    ) -> RepositoryResult<Vec<Photo>> {
        let mut tx = self.lock_gallery(parent_id).await?;

        let row = sqlx::query(
            r#"
            SELECT COALESCE(MAX(seq) + 1, 0) AS next_seq,
                   COALESCE(BOOL_OR(is_main), FALSE) AS has_main
            FROM photos
            WHERE parent_id = $1
            "#,
        )
        .bind(parent_id)
        .fetch_one(&mut *tx)
        .await?;

        let mut next_seq: i32 = row.get("next_seq");
        let mut needs_main = !row.get::<bool, _>("has_main");

        let mut created = Vec::with_capacity(photos.len());
        for new_photo in photos {
            let row = sqlx::query(
                r#"
                INSERT INTO photos (id, parent_id, caption, seq, is_main, file_name, content_type, data)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING id, parent_id, caption, seq, is_main, file_name, content_type, created_at
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(parent_id)
            .bind(&new_photo.caption)
            .bind(next_seq)
            .bind(needs_main)
            .bind(&new_photo.file_name)
            .bind(&new_photo.content_type)
            .bind(&new_photo.bytes)
            .fetch_one(&mut *tx)
            .await?;

            created.push(photo_from_row(&row));
            next_seq += 1;
            needs_main = false;
        }

        tx.commit().await?;
        info!("Stored {} photos for {}", created.len(), parent_id);
        Ok(created)
    }

    async fn set_main(&self, parent_id: Uuid, photo_id: Uuid) -> RepositoryResult<()> {
        let mut tx = self.lock_gallery(parent_id).await?;

        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM photos WHERE parent_id = $1 AND id = $2)",
        )
        .bind(parent_id)
        .bind(photo_id)
        .fetch_one(&mut *tx)
        .await?;

        if !exists {
            return Err(not_found(photo_id));
        }

        // Clear first: the partial unique index is checked row by row
        sqlx::query("UPDATE photos SET is_main = FALSE WHERE parent_id = $1 AND is_main")
            .bind(parent_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE photos SET is_main = TRUE WHERE parent_id = $1 AND id = $2")
            .bind(parent_id)
            .bind(photo_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn reorder(&self, parent_id: Uuid, payload: ReorderPayload) -> RepositoryResult<()> {
        let mut tx = self.lock_gallery(parent_id).await?;

        let current: Vec<Uuid> =
            sqlx::query_scalar("SELECT id FROM photos WHERE parent_id = $1 ORDER BY seq")
                .bind(parent_id)
                .fetch_all(&mut *tx)
                .await?;

        let ordered = resolve_order(&current, &payload)?;

        sqlx::query(
            r#"
            UPDATE photos AS p
            SET seq = (o.position - 1)::INTEGER
            FROM UNNEST($2::UUID[]) WITH ORDINALITY AS o(id, position)
            WHERE p.parent_id = $1 AND p.id = o.id
            "#,
        )
        .bind(parent_id)
        .bind(&ordered)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn delete(&self, parent_id: Uuid, photo_id: Uuid) -> RepositoryResult<()> {
        let mut tx = self.lock_gallery(parent_id).await?;

        let removed: Option<i32> =
            sqlx::query_scalar("DELETE FROM photos WHERE parent_id = $1 AND id = $2 RETURNING seq")
                .bind(parent_id)
                .bind(photo_id)
                .fetch_optional(&mut *tx)
                .await?;

        let removed_seq = removed.ok_or_else(|| not_found(photo_id))?;

        sqlx::query("UPDATE photos SET seq = seq - 1 WHERE parent_id = $1 AND seq > $2")
            .bind(parent_id)
            .bind(removed_seq)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn asset(&self, photo_id: Uuid) -> RepositoryResult<Asset> {
        let row = sqlx::query("SELECT content_type, data FROM photos WHERE id = $1")
            .bind(photo_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found(photo_id))?;

        Ok(Asset {
            content_type: row.get("content_type"),
            bytes: row.get("data"),
        })
    }

    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(common::database::health_check(&self.pool)
            .await
            .unwrap_or(false))
    }
}
