use sqlx::sqlite::SqlitePool;

#[derive(Clone)]
pub struct PaperStore {
    pool: SqlitePool,
}

/// A research paper owned by a user.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Paper {
    pub id: i64,
    pub user_id: i64,
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
}

/// Fields for creating a paper. The owner comes from the request principal.
#[derive(Debug, Clone)]
pub struct NewPaper {
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
}

impl PaperStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new paper for the given owner. Returns the paper ID.
    pub async fn create(&self, user_id: i64, paper: &NewPaper) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO papers (user_id, title, description, content) VALUES (?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(&paper.title)
        .bind(&paper.description)
        .bind(&paper.content)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Get a paper by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Paper>, sqlx::Error> {
        sqlx::query_as("SELECT id, user_id, title, description, content FROM papers WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// List all papers owned by a user, oldest first.
    pub async fn list_by_user(&self, user_id: i64) -> Result<Vec<Paper>, sqlx::Error> {
        sqlx::query_as(
            "SELECT id, user_id, title, description, content FROM papers WHERE user_id = ? ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Delete a paper by ID.
    pub async fn delete(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM papers WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
