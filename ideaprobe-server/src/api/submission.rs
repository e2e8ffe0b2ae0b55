//! Submission API Handlers
//!
//! HTTP endpoints for idea submissions.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use ideaprobe_core::domain::submission::Submission;
use ideaprobe_core::domain::validation::Validation;
use ideaprobe_core::dto::submission::CreateSubmission;
use sqlx::PgPool;
use uuid::Uuid;

use crate::api::auth::RequireAdmin;
use crate::api::error::ApiResult;
use crate::service::{submission_service, validation_service};

/// POST /api/submissions
/// Store a new idea submission
pub async fn create_submission(
    State(pool): State<PgPool>,
    Json(req): Json<CreateSubmission>,
) -> ApiResult<(StatusCode, Json<Submission>)> {
    tracing::info!("Creating submission for market: {}", req.target_market);

    let submission = submission_service::create_submission(&pool, req).await?;

    Ok((StatusCode::CREATED, Json(submission)))
}

/// GET /api/submissions
/// List all submissions (admin)
pub async fn list_submissions(
    _admin: RequireAdmin,
    State(pool): State<PgPool>,
) -> ApiResult<Json<Vec<Submission>>> {
    tracing::debug!("Listing all submissions");

    let submissions = submission_service::list_submissions(&pool).await?;

    Ok(Json(submissions))
}

/// GET /api/submissions/{id}
/// Get submission by ID
pub async fn get_submission(
    State(pool): State<PgPool>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Submission>> {
    tracing::debug!("Getting submission: {}", id);

    let submission = submission_service::get_submission(&pool, id).await?;

    Ok(Json(submission))
}

/// DELETE /api/submissions/{id}
/// Delete a submission and its validations (admin)
pub async fn delete_submission(
    _admin: RequireAdmin,
    State(pool): State<PgPool>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    tracing::info!("Deleting submission: {}", id);

    submission_service::delete_submission(&pool, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/submissions/{id}/validations
/// List validations for a submission
pub async fn list_submission_validations(
    State(pool): State<PgPool>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<Validation>>> {
    tracing::debug!("Listing validations for submission: {}", id);

    let validations = validation_service::list_validations_by_submission(&pool, id).await?;

    Ok(Json(validations))
}
