//! SQLite backend for the post cache.

use super::PostTable;
use crate::config::CacheConfig;
use crate::error::{StorageError, StorageResult};
use async_trait::async_trait;
use post_types::{AuthorId, Post, PostId};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

/// Version of the `posts` table layout.
///
/// Stored in `PRAGMA user_version`. A database carrying any other non-zero
/// version has its table dropped and recreated empty on open.
pub const SCHEMA_VERSION: i64 = 1;

/// SQLite-based post table.
///
/// Uses WAL mode for concurrent reads/writes.
#[derive(Clone)]
pub struct SqliteTable {
    pool: SqlitePool,
}

impl std::fmt::Debug for SqliteTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteTable")
            .field("connections", &self.pool.size())
            .finish_non_exhaustive()
    }
}

impl SqliteTable {
    /// Open (or create) the database at `path`.
    pub async fn open(path: &Path, max_connections: u32) -> StorageResult<Self> {
        if path.as_os_str().is_empty() || path.is_dir() {
            return Err(StorageError::InvalidPath {
                path: path.to_path_buf(),
            });
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .busy_timeout(std::time::Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await
            .map_err(StorageError::Database)?;

        let table = Self { pool };
        table.run_migrations().await?;
        tracing::debug!("Opened post cache at {}", path.display());
        Ok(table)
    }

    /// Open the database described by `config`.
    pub async fn from_config(config: &CacheConfig) -> StorageResult<Self> {
        Self::open(&config.database, config.max_connections).await
    }

    /// Create an in-memory SQLite table (for testing).
    pub async fn in_memory() -> StorageResult<Self> {
        let options = SqliteConnectOptions::from_str(":memory:").map_err(StorageError::Database)?;

        // A single connection that is never recycled: the database lives
        // exactly as long as it does.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None::<std::time::Duration>)
            .max_lifetime(None::<std::time::Duration>)
            .connect_with(options)
            .await
            .map_err(StorageError::Database)?;

        let table = Self { pool };
        table.run_migrations().await?;
        Ok(table)
    }

    /// Current `user_version` of the database.
    pub async fn schema_version(&self) -> StorageResult<i64> {
        sqlx::query_scalar("PRAGMA user_version")
            .fetch_one(&self.pool)
            .await
            .map_err(StorageError::Database)
    }

    /// Create the table, recreating it if the stored layout is from another version.
    async fn run_migrations(&self) -> StorageResult<()> {
        let mut tx = self.pool.begin().await.map_err(StorageError::Database)?;

        let version: i64 = sqlx::query_scalar("PRAGMA user_version")
            .fetch_one(&mut *tx)
            .await
            .map_err(StorageError::Database)?;

        if version != 0 && version != SCHEMA_VERSION {
            tracing::info!(
                "Post cache schema version {} does not match {}, recreating",
                version,
                SCHEMA_VERSION
            );
            sqlx::query("DROP TABLE IF EXISTS posts")
                .execute(&mut *tx)
                .await
                .map_err(|e| StorageError::Migration(e.to_string()))?;
        }

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS posts (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL,
                title TEXT NOT NULL,
                body TEXT NOT NULL
            )
            "#,
        )
        .execute(&mut *tx)
        .await
        .map_err(|e| StorageError::Migration(e.to_string()))?;

        // PRAGMA arguments cannot be bound.
        sqlx::query(&format!("PRAGMA user_version = {}", SCHEMA_VERSION))
            .execute(&mut *tx)
            .await
            .map_err(|e| StorageError::Migration(e.to_string()))?;

        tx.commit().await.map_err(StorageError::Database)?;
        Ok(())
    }
}

#[async_trait]
impl PostTable for SqliteTable {
    async fn select_all(&self) -> StorageResult<Vec<Post>> {
        let rows = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, user_id, title, body
            FROM posts
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::Database)?;

        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn select_by_id(&self, id: PostId) -> StorageResult<Option<Post>> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, user_id, title, body
            FROM posts
            WHERE id = ?1
            "#,
        )
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(StorageError::Database)?;

        Ok(row.map(Post::from))
    }

    async fn upsert_many(&self, posts: &[Post]) -> StorageResult<()> {
        if posts.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await.map_err(StorageError::Database)?;

        for post in posts {
            sqlx::query(
                r#"
                INSERT INTO posts (id, user_id, title, body)
                VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT(id) DO UPDATE SET
                    user_id = excluded.user_id,
                    title = excluded.title,
                    body = excluded.body
                "#,
            )
            .bind(post.id.value())
            .bind(post.author_id.value())
            .bind(&post.title)
            .bind(&post.body)
            .execute(&mut *tx)
            .await
            .map_err(StorageError::Database)?;
        }

        tx.commit().await.map_err(StorageError::Database)?;
        Ok(())
    }

    async fn update(&self, post: &Post) -> StorageResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE posts SET user_id = ?2, title = ?3, body = ?4
            WHERE id = ?1
            "#,
        )
        .bind(post.id.value())
        .bind(post.author_id.value())
        .bind(&post.title)
        .bind(&post.body)
        .execute(&self.pool)
        .await
        .map_err(StorageError::Database)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_all(&self) -> StorageResult<u64> {
        let result = sqlx::query("DELETE FROM posts")
            .execute(&self.pool)
            .await
            .map_err(StorageError::Database)?;

        Ok(result.rows_affected())
    }
}

/// Internal row type for SQLite queries.
#[derive(sqlx::FromRow)]
struct PostRow {
    id: i64,
    user_id: i64,
    title: String,
    body: String,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Post {
            id: PostId::new(row.id),
            author_id: AuthorId::new(row.user_id),
            title: row.title,
            body: row.body,
        }
    }
}
