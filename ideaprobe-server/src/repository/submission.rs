//! Submission Repository
//!
//! Handles all database operations related to idea submissions.

use ideaprobe_core::domain::submission::Submission;
use ideaprobe_core::dto::submission::CreateSubmission;
use sqlx::PgPool;
use uuid::Uuid;

/// Create a new submission in the database
pub async fn create(pool: &PgPool, req: CreateSubmission) -> Result<Submission, sqlx::Error> {
    let submission = Submission {
        id: Uuid::new_v4(),
        idea: req.idea,
        target_market: req.target_market,
        email: req.email,
        created_at: chrono::Utc::now(),
    };

    sqlx::query(
        r#"
        INSERT INTO submissions (id, idea, target_market, email, created_at)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(submission.id)
    .bind(&submission.idea)
    .bind(&submission.target_market)
    .bind(&submission.email)
    .bind(submission.created_at)
    .execute(pool)
    .await?;

    Ok(submission)
}

/// Find a submission by ID
pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Submission>, sqlx::Error> {
    let row = sqlx::query_as::<_, SubmissionRow>(
        r#"
        SELECT id, idea, target_market, email, created_at
        FROM submissions
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.into()))
}

/// List all submissions, newest first
pub async fn list_all(pool: &PgPool) -> Result<Vec<Submission>, sqlx::Error> {
    let rows = sqlx::query_as::<_, SubmissionRow>(
        r#"
        SELECT id, idea, target_market, email, created_at
        FROM submissions
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| r.into()).collect())
}

/// Delete a submission by ID
///
/// Its validations are removed by the foreign key cascade.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM submissions WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct SubmissionRow {
    id: Uuid,
    idea: String,
    target_market: String,
    email: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<SubmissionRow> for Submission {
    fn from(row: SubmissionRow) -> Self {
        Submission {
            id: row.id,
            idea: row.idea,
            target_market: row.target_market,
            email: row.email,
            created_at: row.created_at,
        }
    }
}
