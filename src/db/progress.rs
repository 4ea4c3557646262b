//! Reading progress database operations

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::progress::ProgressResponse;

/// Reading progress row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReadingProgress {
    pub id: String,
    pub user_id: String,
    pub book_id: String,
    pub book_title: String,
    pub current_page: i64,
    pub last_read_at: String,
}

impl TryFrom<ReadingProgress> for ProgressResponse {
    type Error = AppError;

    fn try_from(row: ReadingProgress) -> Result<Self> {
        let last_read_at = DateTime::parse_from_rfc3339(&row.last_read_at)
            .map_err(|e| AppError::Internal(format!("Bad timestamp on progress {}: {}", row.id, e)))?
            .with_timezone(&Utc);
        let current_page = u32::try_from(row.current_page)
            .map_err(|_| AppError::Internal(format!("Bad page on progress {}: {}", row.id, row.current_page)))?;

        Ok(ProgressResponse {
            book_id: row.book_id,
            book_title: row.book_title,
            current_page,
            last_read_at,
        })
    }
}

/// Fixed-width timestamps so text ordering matches time ordering
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Progress repository, scoped per reader
pub struct ProgressRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ProgressRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get progress for a specific book
    pub async fn get(&self, user_id: &str, book_id: &str) -> Result<Option<ProgressResponse>> {
        let row = sqlx::query_as::<_, ReadingProgress>(
            r#"
            SELECT id, user_id, book_id, book_title, current_page, last_read_at
            FROM reading_progress
            WHERE user_id = ? AND book_id = ?
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .fetch_optional(self.pool)
        .await?;

        row.map(ProgressResponse::try_from).transpose()
    }

    /// Get all progress for a reader, most recently read first
    pub async fn list(&self, user_id: &str) -> Result<Vec<ProgressResponse>> {
        let rows = sqlx::query_as::<_, ReadingProgress>(
            r#"
            SELECT id, user_id, book_id, book_title, current_page, last_read_at
            FROM reading_progress
            WHERE user_id = ?
            ORDER BY last_read_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(ProgressResponse::try_from).collect()
    }

    /// Update or create progress for a book, stamped with the current time.
    ///
    /// A missing `title` keeps the stored one; new rows fall back to
    /// `default_title`.
    pub async fn upsert(
        &self,
        user_id: &str,
        book_id: &str,
        current_page: u32,
        title: Option<&str>,
        default_title: &str,
    ) -> Result<ProgressResponse> {
        let now = timestamp(Utc::now());
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            r#"
            INSERT INTO reading_progress (id, user_id, book_id, book_title, current_page, last_read_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(user_id, book_id) DO UPDATE SET
                book_title = COALESCE(?, reading_progress.book_title),
                current_page = excluded.current_page,
                last_read_at = excluded.last_read_at
            "#,
        )
        .bind(&id)
        .bind(user_id)
        .bind(book_id)
        .bind(title.unwrap_or(default_title))
        .bind(i64::from(current_page))
        .bind(&now)
        .bind(title)
        .execute(self.pool)
        .await?;

        tracing::debug!("Stored page {} of {} for reader", current_page, book_id);

        // Fetch the updated record
        self.get(user_id, book_id)
            .await?
            .ok_or_else(|| AppError::Internal("Failed to fetch upserted progress".to_string()))
    }

    /// Delete progress for a book
    pub async fn delete(&self, user_id: &str, book_id: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM reading_progress
            WHERE user_id = ? AND book_id = ?
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_pool;

    async fn pool() -> SqlitePool {
        create_pool("sqlite::memory:").await.unwrap()
    }

    #[tokio::test]
    async fn test_upsert_and_get() {
        let pool = pool().await;
        let repo = ProgressRepository::new(&pool);

        assert!(repo.get("alice", "moby").await.unwrap().is_none());

        let saved = repo.upsert("alice", "moby", 4, Some("Moby Dick"), "moby").await.unwrap();
        assert_eq!(saved.current_page, 4);
        assert_eq!(saved.book_title, "Moby Dick");

        let updated = repo.upsert("alice", "moby", 9, None, "moby").await.unwrap();
        assert_eq!(updated.current_page, 9);
        assert_eq!(updated.book_title, "Moby Dick");
        assert!(updated.last_read_at >= saved.last_read_at);
    }

    #[tokio::test]
    async fn test_default_title_on_insert() {
        let pool = pool().await;
        let repo = ProgressRepository::new(&pool);

        let saved = repo.upsert("alice", "emma", 0, None, "Emma").await.unwrap();
        assert_eq!(saved.book_title, "Emma");
        assert_eq!(saved.current_page, 0);
    }

    #[tokio::test]
    async fn test_records_are_reader_scoped() {
        let pool = pool().await;
        let repo = ProgressRepository::new(&pool);

        repo.upsert("alice", "moby", 3, Some("Moby Dick"), "").await.unwrap();
        repo.upsert("bob", "moby", 7, Some("Moby Dick"), "").await.unwrap();

        assert_eq!(repo.get("alice", "moby").await.unwrap().unwrap().current_page, 3);
        assert_eq!(repo.get("bob", "moby").await.unwrap().unwrap().current_page, 7);
        assert_eq!(repo.list("carol").await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_list_most_recent_first() {
        let pool = pool().await;
        let repo = ProgressRepository::new(&pool);

        repo.upsert("alice", "first", 1, Some("First"), "").await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        repo.upsert("alice", "second", 2, Some("Second"), "").await.unwrap();

        let ids: Vec<String> = repo.list("alice").await.unwrap().into_iter().map(|p| p.book_id).collect();
        assert_eq!(ids, vec!["second", "first"]);
    }

    #[tokio::test]
    async fn test_delete() {
        let pool = pool().await;
        let repo = ProgressRepository::new(&pool);

        repo.upsert("alice", "moby", 3, Some("Moby Dick"), "").await.unwrap();
        assert!(repo.delete("alice", "moby").await.unwrap());
        assert!(!repo.delete("alice", "moby").await.unwrap());
        assert!(repo.get("alice", "moby").await.unwrap().is_none());
    }

    #[test]
    fn test_timestamp_is_fixed_width() {
        let a = timestamp(DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z").unwrap().with_timezone(&Utc));
        let b = timestamp(DateTime::parse_from_rfc3339("2024-01-01T00:00:00.5Z").unwrap().with_timezone(&Utc));
        assert_eq!(a.len(), b.len());
        assert!(a < b);
    }
}
