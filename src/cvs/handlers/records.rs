// src/cvs/handlers/records.rs
//! Read and update endpoints for stored CV records

use axum::{extract::Path, Extension, Json};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::common::{ApiError, AppState, Validator};
use crate::cvs::models::{
    AnonymousCandidate, Candidate, InternalCvRow, ProcessedCvRow, QualityReport,
};
use crate::cvs::validators::AnonymousCandidateValidator;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedCvRecord {
    pub id: String,
    pub original_file_name: String,
    pub original_content: String,
    pub extracted_data: Candidate,
    pub personal_info_removed: String,
    pub quality_report: Option<QualityReport>,
    pub created_at: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalCvRecord {
    pub id: String,
    pub candidate_id: String,
    pub original_file_name: String,
    pub anonymous_data: AnonymousCandidate,
    pub created_at: String,
    pub updated_at: String,
}

fn processed_record(row: ProcessedCvRow) -> Result<ProcessedCvRecord, ApiError> {
    let extracted_data: Candidate = serde_json::from_str(&row.extracted_data)
        .map_err(|e| ApiError::InternalServer(format!("Stored record is corrupt: {}", e)))?;
    let quality_report = match row.quality_report {
        Some(raw) => Some(
            serde_json::from_str(&raw)
                .map_err(|e| ApiError::InternalServer(format!("Stored record is corrupt: {}", e)))?,
        ),
        None => None,
    };

    Ok(ProcessedCvRecord {
        id: row.id,
        original_file_name: row.original_file_name,
        original_content: row.original_content,
        extracted_data,
        personal_info_removed: row.personal_info_removed,
        quality_report,
        created_at: row.created_at,
    })
}

fn internal_record(row: InternalCvRow) -> Result<InternalCvRecord, ApiError> {
    let anonymous_data: AnonymousCandidate = serde_json::from_str(&row.anonymous_data)
        .map_err(|e| ApiError::InternalServer(format!("Stored record is corrupt: {}", e)))?;

    Ok(InternalCvRecord {
        id: row.id,
        candidate_id: row.candidate_id,
        original_file_name: row.original_file_name,
        anonymous_data,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

// ============================================================================
// GET /api/cvs - list processed CVs, newest first
// ============================================================================
pub async fn list_processed_cvs(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
) -> Result<Json<Vec<ProcessedCvRecord>>, ApiError> {
    let db = state.read().await.db.clone();

    let rows = sqlx::query_as::<_, ProcessedCvRow>(
        "SELECT * FROM processed_cvs ORDER BY created_at DESC LIMIT 100",
    )
    .fetch_all(&db)
    .await
    .map_err(ApiError::DatabaseError)?;

    rows.into_iter()
        .map(processed_record)
        .collect::<Result<Vec<_>, _>>()
        .map(Json)
}

// ============================================================================
// GET /api/cvs/:id - fetch one processed CV
// ============================================================================
pub async fn get_processed_cv(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    Path(id): Path<String>,
) -> Result<Json<ProcessedCvRecord>, ApiError> {
    let db = state.read().await.db.clone();

    let row = sqlx::query_as::<_, ProcessedCvRow>("SELECT * FROM processed_cvs WHERE id = ?")
        .bind(&id)
        .fetch_optional(&db)
        .await
        .map_err(ApiError::DatabaseError)?
        .ok_or_else(|| ApiError::NotFound(format!("CV with id {} not found", id)))?;

    processed_record(row).map(Json)
}

// ============================================================================
// GET /api/internal/cvs - list anonymous records, newest first
// ============================================================================
pub async fn list_internal_cvs(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
) -> Result<Json<Vec<InternalCvRecord>>, ApiError> {
    let db = state.read().await.db.clone();

    let rows =
        sqlx::query_as::<_, InternalCvRow>("SELECT * FROM internal_cvs ORDER BY created_at DESC")
            .fetch_all(&db)
            .await
            .map_err(ApiError::DatabaseError)?;

    rows.into_iter()
        .map(internal_record)
        .collect::<Result<Vec<_>, _>>()
        .map(Json)
}

// ============================================================================
// GET /api/internal/cvs/:id - fetch one anonymous record
// ============================================================================
pub async fn get_internal_cv(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    Path(id): Path<String>,
) -> Result<Json<InternalCvRecord>, ApiError> {
    let db = state.read().await.db.clone();

    let row = sqlx::query_as::<_, InternalCvRow>("SELECT * FROM internal_cvs WHERE id = ?")
        .bind(&id)
        .fetch_optional(&db)
        .await
        .map_err(ApiError::DatabaseError)?
        .ok_or_else(|| ApiError::NotFound(format!("Internal CV with id {} not found", id)))?;

    internal_record(row).map(Json)
}

// ============================================================================
// PUT /api/internal/cvs/:id - replace the anonymous record
// ============================================================================
pub async fn update_internal_cv(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    Path(id): Path<String>,
    Json(anonymous_data): Json<AnonymousCandidate>,
) -> Result<Json<InternalCvRecord>, ApiError> {
    let validation = AnonymousCandidateValidator.validate(&anonymous_data);
    if !validation.is_valid {
        return Err(validation.into());
    }

    let db = state.read().await.db.clone();

    let anonymous_json = serde_json::to_string(&anonymous_data)
        .map_err(|e| ApiError::InternalServer(format!("Serialization failed: {}", e)))?;

    let result = sqlx::query(
        r#"
        UPDATE internal_cvs
        SET anonymous_data = ?, candidate_id = ?, updated_at = datetime('now')
        WHERE id = ?
        "#,
    )
    .bind(&anonymous_json)
    .bind(&anonymous_data.id)
    .bind(&id)
    .execute(&db)
    .await
    .map_err(ApiError::DatabaseError)?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound(format!(
            "Internal CV with id {} not found",
            id
        )));
    }

    info!(id = %id, "Internal CV updated");

    let row = sqlx::query_as::<_, InternalCvRow>("SELECT * FROM internal_cvs WHERE id = ?")
        .bind(&id)
        .fetch_one(&db)
        .await
        .map_err(ApiError::DatabaseError)?;

    internal_record(row).map(Json)
}

// ============================================================================
// GET /api/health - liveness and database reachability
// ============================================================================
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
}

pub async fn health_check(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
) -> Json<HealthResponse> {
    let db = state.read().await.db.clone();

    let database = match sqlx::query("SELECT 1").execute(&db).await {
        Ok(_) => "connected".to_string(),
        Err(_) => "unavailable".to_string(),
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        database,
    })
}
