// PromptReel Media Catalog
// Copyright (c) 2026 Xing_The_Creator | PromptReel
//
// SQLite persistence for generated images and videos. Rows are written once
// on success and afterwards only their favorite flag changes.

use chrono::{SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::{debug, info};

use super::models::{page_window, GeneratedImage, GeneratedVideo, Page};

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS generated_images (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        prompt TEXT NOT NULL,
        image_filename TEXT NOT NULL,
        created_at TEXT NOT NULL,
        is_favorite INTEGER NOT NULL DEFAULT 0,
        generation_time INTEGER NOT NULL DEFAULT 0
    )",
    "CREATE INDEX IF NOT EXISTS idx_images_created ON generated_images(created_at DESC)",
    "CREATE TABLE IF NOT EXISTS generated_videos (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        prompt TEXT NOT NULL,
        video_filename TEXT NOT NULL,
        created_at TEXT NOT NULL,
        is_favorite INTEGER NOT NULL DEFAULT 0,
        generation_time INTEGER NOT NULL DEFAULT 0,
        video_length INTEGER NOT NULL DEFAULT 0
    )",
    "CREATE INDEX IF NOT EXISTS idx_videos_created ON generated_videos(created_at DESC)",
];

/// Shared handle to the catalog; cheap to clone.
#[derive(Clone, Debug)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if needed) the database and its schema.
    ///
    /// In-memory URLs get a single long-lived connection so every query
    /// sees the same database.
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let in_memory = database_url.contains(":memory:");
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        let mut pool_options = SqlitePoolOptions::new().max_connections(if in_memory { 1 } else { 5 });
        if in_memory {
            pool_options = pool_options.idle_timeout(None).max_lifetime(None);
        }
        let pool = pool_options.connect_with(options).await?;

        let db = Self { pool };
        db.init_schema().await?;
        info!("[DB] Connected to {}", database_url);
        Ok(db)
    }

    async fn init_schema(&self) -> Result<(), sqlx::Error> {
        for stmt in SCHEMA {
            sqlx::query(stmt).execute(&self.pool).await?;
        }
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }

    pub async fn insert_image(
        &self,
        prompt: &str,
        image_filename: &str,
        generation_time: i64,
    ) -> Result<GeneratedImage, sqlx::Error> {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
        let row = sqlx::query_as::<_, GeneratedImage>(
            "INSERT INTO generated_images (prompt, image_filename, created_at, is_favorite, generation_time)
             VALUES (?, ?, ?, 0, ?)
             RETURNING *",
        )
        .bind(prompt)
        .bind(image_filename)
        .bind(&now)
        .bind(generation_time)
        .fetch_one(&self.pool)
        .await?;
        debug!("[DB] Inserted image #{} ({})", row.id, row.image_filename);
        Ok(row)
    }

    pub async fn insert_video(
        &self,
        prompt: &str,
        video_filename: &str,
        generation_time: i64,
        video_length: i64,
    ) -> Result<GeneratedVideo, sqlx::Error> {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
        let row = sqlx::query_as::<_, GeneratedVideo>(
            "INSERT INTO generated_videos (prompt, video_filename, created_at, is_favorite, generation_time, video_length)
             VALUES (?, ?, ?, 0, ?, ?)
             RETURNING *",
        )
        .bind(prompt)
        .bind(video_filename)
        .bind(&now)
        .bind(generation_time)
        .bind(video_length)
        .fetch_one(&self.pool)
        .await?;
        debug!("[DB] Inserted video #{} ({})", row.id, row.video_filename);
        Ok(row)
    }

    pub async fn get_image(&self, id: i64) -> Result<Option<GeneratedImage>, sqlx::Error> {
        sqlx::query_as::<_, GeneratedImage>("SELECT * FROM generated_images WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn get_video(&self, id: i64) -> Result<Option<GeneratedVideo>, sqlx::Error> {
        sqlx::query_as::<_, GeneratedVideo>("SELECT * FROM generated_videos WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn list_images(&self, page: u32, per_page: u32) -> Result<Page<GeneratedImage>, sqlx::Error> {
        let (page, per_page, offset) = page_window(page, per_page);
        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM generated_images")
            .fetch_one(&self.pool)
            .await?;
        let items = sqlx::query_as::<_, GeneratedImage>(
            "SELECT * FROM generated_images ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
        )
        .bind(per_page as i64)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(Page::new(items, page, per_page, total.max(0) as u64))
    }

    pub async fn list_videos(&self, page: u32, per_page: u32) -> Result<Page<GeneratedVideo>, sqlx::Error> {
        let (page, per_page, offset) = page_window(page, per_page);
        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM generated_videos")
            .fetch_one(&self.pool)
            .await?;
        let items = sqlx::query_as::<_, GeneratedVideo>(
            "SELECT * FROM generated_videos ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
        )
        .bind(per_page as i64)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(Page::new(items, page, per_page, total.max(0) as u64))
    }

    pub async fn recent_videos(&self, limit: u32) -> Result<Vec<GeneratedVideo>, sqlx::Error> {
        sqlx::query_as::<_, GeneratedVideo>(
            "SELECT * FROM generated_videos ORDER BY created_at DESC, id DESC LIMIT ?",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
    }

    /// Flip the flag; `None` when no such image exists.
    pub async fn toggle_image_favorite(&self, id: i64) -> Result<Option<bool>, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "UPDATE generated_images SET is_favorite = NOT is_favorite WHERE id = ? RETURNING is_favorite",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn toggle_video_favorite(&self, id: i64) -> Result<Option<bool>, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "UPDATE generated_videos SET is_favorite = NOT is_favorite WHERE id = ? RETURNING is_favorite",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_db() -> Database {
        Database::connect("sqlite::memory:").await.unwrap()
    }

    #[tokio::test]
    async fn insert_and_fetch_video() {
        let db = memory_db().await;
        let row = db.insert_video("a cat", "video_a.mp4", 42, 10).await.unwrap();
        assert_eq!(row.id, 1);
        assert!(!row.is_favorite);
        assert_eq!(row.video_length, 10);
        assert!(chrono::DateTime::parse_from_rfc3339(&row.created_at).is_ok());

        let fetched = db.get_video(row.id).await.unwrap().unwrap();
        assert_eq!(fetched, row);
        assert!(db.get_video(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn favorite_toggles_back_and_forth() {
        let db = memory_db().await;
        let img = db.insert_image("a dog", "generated_a.png", 3).await.unwrap();
        assert_eq!(db.toggle_image_favorite(img.id).await.unwrap(), Some(true));
        assert_eq!(db.toggle_image_favorite(img.id).await.unwrap(), Some(false));
        assert_eq!(db.toggle_image_favorite(404).await.unwrap(), None);
    }

    #[tokio::test]
    async fn listing_is_newest_first_and_paginated() {
        let db = memory_db().await;
        for i in 0..5 {
            db.insert_video(&format!("prompt {i}"), &format!("video_{i}.mp4"), 1, 10)
                .await
                .unwrap();
        }
        let first = db.list_videos(0, 2).await.unwrap();
        assert_eq!(first.page, 1);
        assert_eq!(first.total, 5);
        assert_eq!(first.total_pages, 3);
        assert_eq!(first.items[0].prompt, "prompt 4");
        assert!(first.has_next && !first.has_prev);

        let last = db.list_videos(3, 2).await.unwrap();
        assert_eq!(last.items.len(), 1);
        assert_eq!(last.items[0].prompt, "prompt 0");

        let recent = db.recent_videos(3).await.unwrap();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].video_filename, "video_4.mp4");
    }

    #[tokio::test]
    async fn file_database_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite:{}", dir.path().join("catalog.db").display());
        let db = Database::connect(&url).await.unwrap();
        db.health_check().await.unwrap();
        assert!(dir.path().join("catalog.db").exists());
    }
}
