//! Submission Service
//!
//! Business logic for idea submissions.

use ideaprobe_core::domain::submission::Submission;
use ideaprobe_core::dto::submission::CreateSubmission;
use sqlx::PgPool;
use uuid::Uuid;

use crate::repository::submission_repository;

const MAX_IDEA_LEN: usize = 5000;
const MAX_MARKET_LEN: usize = 255;

/// Service error type
#[derive(Debug)]
pub enum SubmissionError {
    NotFound(Uuid),
    ValidationError(String),
    DatabaseError(sqlx::Error),
}

impl From<sqlx::Error> for SubmissionError {
    fn from(err: sqlx::Error) -> Self {
        SubmissionError::DatabaseError(err)
    }
}

pub type Result<T> = std::result::Result<T, SubmissionError>;

/// Store a new submission
pub async fn create_submission(pool: &PgPool, req: CreateSubmission) -> Result<Submission> {
    let req = normalize_submission_request(req)?;

    let submission = submission_repository::create(pool, req).await?;

    tracing::info!(
        "Submission created: {} ({})",
        submission.id,
        submission.target_market
    );

    Ok(submission)
}

/// Get a submission by ID
pub async fn get_submission(pool: &PgPool, id: Uuid) -> Result<Submission> {
    submission_repository::find_by_id(pool, id)
        .await?
        .ok_or(SubmissionError::NotFound(id))
}

/// List all submissions
pub async fn list_submissions(pool: &PgPool) -> Result<Vec<Submission>> {
    let submissions = submission_repository::list_all(pool).await?;
    Ok(submissions)
}

/// Delete a submission and its validations
pub async fn delete_submission(pool: &PgPool, id: Uuid) -> Result<()> {
    let deleted = submission_repository::delete(pool, id).await?;

    if !deleted {
        return Err(SubmissionError::NotFound(id));
    }

    tracing::info!("Submission deleted: {}", id);

    Ok(())
}

// =============================================================================
// Validation
// =============================================================================

/// Trim fields, drop a blank email and enforce length limits
fn normalize_submission_request(req: CreateSubmission) -> Result<CreateSubmission> {
    let idea = req.idea.trim().to_string();
    let target_market = req.target_market.trim().to_string();
    let email = req
        .email
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty());

    if idea.is_empty() {
        return Err(SubmissionError::ValidationError(
            "Idea cannot be empty".to_string(),
        ));
    }

    if idea.chars().count() > MAX_IDEA_LEN {
        return Err(SubmissionError::ValidationError(format!(
            "Idea is too long (max {} characters)",
            MAX_IDEA_LEN
        )));
    }

    if target_market.is_empty() {
        return Err(SubmissionError::ValidationError(
            "Target market cannot be empty".to_string(),
        ));
    }

    if target_market.chars().count() > MAX_MARKET_LEN {
        return Err(SubmissionError::ValidationError(format!(
            "Target market is too long (max {} characters)",
            MAX_MARKET_LEN
        )));
    }

    if let Some(email) = &email {
        if !email.contains('@') {
            return Err(SubmissionError::ValidationError(
                "Email address is invalid".to_string(),
            ));
        }
    }

    Ok(CreateSubmission {
        idea,
        target_market,
        email,
    })
}
