//! Validation API Handlers
//!
//! HTTP endpoints for validation feedback.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use ideaprobe_core::domain::validation::Validation;
use ideaprobe_core::dto::submission::{CreateValidation, UpdateValidation};
use sqlx::PgPool;
use uuid::Uuid;

use crate::api::auth::RequireAdmin;
use crate::api::error::ApiResult;
use crate::service::validation_service;

/// POST /api/validations
/// Store validation feedback for a submission
pub async fn create_validation(
    State(pool): State<PgPool>,
    Json(req): Json<CreateValidation>,
) -> ApiResult<(StatusCode, Json<Validation>)> {
    tracing::info!("Creating validation for submission: {}", req.submission_id);

    let validation = validation_service::create_validation(&pool, req).await?;

    Ok((StatusCode::CREATED, Json(validation)))
}

/// GET /api/validations
/// List all validations (admin)
pub async fn list_validations(
    _admin: RequireAdmin,
    State(pool): State<PgPool>,
) -> ApiResult<Json<Vec<Validation>>> {
    tracing::debug!("Listing all validations");

    let validations = validation_service::list_validations(&pool).await?;

    Ok(Json(validations))
}

/// GET /api/validations/{id}
/// Get validation by ID
pub async fn get_validation(
    State(pool): State<PgPool>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Validation>> {
    tracing::debug!("Getting validation: {}", id);

    let validation = validation_service::get_validation(&pool, id).await?;

    Ok(Json(validation))
}

/// PUT /api/validations/{id}
/// Update feedback, report execution or status
pub async fn update_validation(
    State(pool): State<PgPool>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateValidation>,
) -> ApiResult<Json<Validation>> {
    tracing::info!("Updating validation: {}", id);

    let validation = validation_service::update_validation(&pool, id, req).await?;

    Ok(Json(validation))
}
