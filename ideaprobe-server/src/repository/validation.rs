//! Validation Repository
//!
//! Handles all database operations related to validation feedback.

use ideaprobe_core::domain::validation::{Validation, ValidationStatus};
use ideaprobe_core::dto::submission::{CreateValidation, UpdateValidation};
use sqlx::PgPool;
use uuid::Uuid;

const COLUMNS: &str =
    "id, submission_id, feedback, execution_id, status, created_at, updated_at";

/// Create a new validation in the database
pub async fn create(pool: &PgPool, req: CreateValidation) -> Result<Validation, sqlx::Error> {
    let now = chrono::Utc::now();

    let validation = Validation {
        id: Uuid::new_v4(),
        submission_id: req.submission_id,
        feedback: req.feedback,
        execution_id: None,
        status: ValidationStatus::Delivered,
        created_at: now,
        updated_at: now,
    };

    sqlx::query(
        r#"
        INSERT INTO validations (id, submission_id, feedback, status, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(validation.id)
    .bind(validation.submission_id)
    .bind(&validation.feedback)
    .bind(validation.status.as_str())
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(validation)
}

/// Find a validation by ID
pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Validation>, sqlx::Error> {
    let row = sqlx::query_as::<_, ValidationRow>(&format!(
        "SELECT {COLUMNS} FROM validations WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.into()))
}

/// List all validations, newest first
pub async fn list_all(pool: &PgPool) -> Result<Vec<Validation>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ValidationRow>(&format!(
        "SELECT {COLUMNS} FROM validations ORDER BY created_at DESC"
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| r.into()).collect())
}

/// List validations of one submission, oldest first
pub async fn find_by_submission(
    pool: &PgPool,
    submission_id: Uuid,
) -> Result<Vec<Validation>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ValidationRow>(&format!(
        "SELECT {COLUMNS} FROM validations WHERE submission_id = $1 ORDER BY created_at ASC"
    ))
    .bind(submission_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| r.into()).collect())
}

/// Apply a partial update, returning the updated validation if it exists
pub async fn update(
    pool: &PgPool,
    id: Uuid,
    req: UpdateValidation,
) -> Result<Option<Validation>, sqlx::Error> {
    let row = sqlx::query_as::<_, ValidationRow>(&format!(
        r#"
        UPDATE validations
        SET feedback = COALESCE($1, feedback),
            execution_id = COALESCE($2, execution_id),
            status = COALESCE($3, status),
            updated_at = $4
        WHERE id = $5
        RETURNING {COLUMNS}
        "#
    ))
    .bind(req.feedback)
    .bind(req.execution_id)
    .bind(req.status.map(|s| s.as_str()))
    .bind(chrono::Utc::now())
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.into()))
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct ValidationRow {
    id: Uuid,
    submission_id: Uuid,
    feedback: String,
    execution_id: Option<String>,
    status: String,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<ValidationRow> for Validation {
    fn from(row: ValidationRow) -> Self {
        let status = ValidationStatus::parse(&row.status).unwrap_or_else(|| {
            tracing::warn!("Unknown validation status '{}' for {}", row.status, row.id);
            ValidationStatus::Delivered
        });

        Validation {
            id: row.id,
            submission_id: row.submission_id,
            feedback: row.feedback,
            execution_id: row.execution_id,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
