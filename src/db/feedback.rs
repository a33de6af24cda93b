use sqlx::sqlite::SqlitePool;

#[derive(Clone)]
pub struct FeedbackStore {
    pool: SqlitePool,
}

/// Feedback left by one user on one paper. One row per (paper, user);
/// resubmission updates the existing row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Feedback {
    pub id: i64,
    pub paper_id: i64,
    pub user_id: i64,
    pub feedback_type: Option<String>,
    pub role: Option<String>,
    pub rating: Option<i64>,
    pub feedback_text: Option<String>,
    pub created_at: String,
}

impl FeedbackStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert new feedback. Returns the row ID.
    pub async fn create(
        &self,
        paper_id: i64,
        user_id: i64,
        feedback_type: Option<&str>,
        role: Option<&str>,
        rating: i64,
        feedback_text: Option<&str>,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO feedback (paper_id, user_id, feedback_type, role, rating, feedback_text)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(paper_id)
        .bind(user_id)
        .bind(feedback_type)
        .bind(role)
        .bind(rating)
        .bind(feedback_text)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Update the mutable fields of an existing feedback row.
    pub async fn update(
        &self,
        id: i64,
        feedback_type: Option<&str>,
        role: Option<&str>,
        rating: i64,
        feedback_text: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE feedback SET feedback_type = ?, role = ?, rating = ?, feedback_text = ?
             WHERE id = ?",
        )
        .bind(feedback_type)
        .bind(role)
        .bind(rating)
        .bind(feedback_text)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Get feedback by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Feedback>, sqlx::Error> {
        sqlx::query_as(
            "SELECT id, paper_id, user_id, feedback_type, role, rating, feedback_text, created_at
             FROM feedback WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Get the one feedback row a user left on a paper, if any.
    pub async fn get_by_paper_and_user(
        &self,
        paper_id: i64,
        user_id: i64,
    ) -> Result<Option<Feedback>, sqlx::Error> {
        sqlx::query_as(
            "SELECT id, paper_id, user_id, feedback_type, role, rating, feedback_text, created_at
             FROM feedback WHERE paper_id = ? AND user_id = ?",
        )
        .bind(paper_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }
}
