// src/cvs/handlers/upload.rs
//! CV upload: multipart intake, extraction, structuring, anonymization,
//! quality analysis, persistence

use axum::{extract::Multipart, Extension, Json};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::common::helpers::text_preview;
use crate::common::{
    generate_internal_cv_id, generate_processed_cv_id, safe_email_log, ApiError, AppState,
    Validator,
};
use crate::cvs::anonymizer::remove_personal_info;
use crate::cvs::models::{AnonymousCandidate, ProcessedCvData, QualityReport};
use crate::cvs::quality::analyze_cv_quality;
use crate::cvs::structurer::extract_cv_data;
use crate::cvs::validators::{UploadRequest, UploadValidator};
use crate::extract::{extract_text_from_file, ExtractError, FileFormat};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub data: ProcessedCvData,
    pub anonymous_data: AnonymousCandidate,
    pub analysis: QualityReport,
}

// ============================================================================
// POST /api/cvs - upload and process a CV document
// ============================================================================
pub async fn upload_cv(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut file_name: Option<String> = None;
    let mut file_bytes: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart request: {}", e)))?
    {
        if field.name() == Some("file") {
            file_name = field.file_name().map(|name| name.to_string());
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Failed to read file field: {}", e)))?;
            file_bytes = Some(bytes.to_vec());
        }
    }

    let file_name =
        file_name.ok_or_else(|| ApiError::BadRequest("No file provided".to_string()))?;
    let file_bytes =
        file_bytes.ok_or_else(|| ApiError::BadRequest("No file provided".to_string()))?;

    let (max_upload_bytes, db, openai) = {
        let state = state.read().await;
        (
            state.max_upload_bytes,
            state.db.clone(),
            state.openai_service.clone(),
        )
    };

    // Extension gate first so unsupported types get the dedicated error code
    if FileFormat::from_filename(&file_name).is_none() {
        let extension = file_name.rsplit('.').next().unwrap_or(&file_name);
        return Err(ApiError::UnsupportedFormat(extension.to_lowercase()));
    }

    let validator = UploadValidator { max_upload_bytes };
    let validation = validator.validate(&UploadRequest {
        filename: &file_name,
        size_bytes: file_bytes.len(),
    });
    if !validation.is_valid {
        return Err(validation.into());
    }

    // Advisory only: the extension stays authoritative for dispatch, but a
    // mismatch against the magic bytes is worth a log line
    if let Some(kind) = infer::get(&file_bytes) {
        debug!(
            filename = %file_name,
            detected_mime = kind.mime_type(),
            size_bytes = file_bytes.len(),
            "Upload received"
        );
    }

    let cv_text =
        extract_text_from_file(&file_bytes, &file_name).map_err(|e| match e {
            ExtractError::UnsupportedFormat(ext) => ApiError::UnsupportedFormat(ext),
            ExtractError::ExtractionFailed { format } => ApiError::ExtractionFailed {
                filename: file_name.clone(),
                format: format.to_string(),
            },
        })?;

    if cv_text.trim().is_empty() {
        return Err(ApiError::EmptyExtraction(
            "The document appears to be empty or contains no extractable text".to_string(),
        ));
    }

    info!(
        filename = %file_name,
        chars = cv_text.len(),
        preview = %text_preview(&cv_text, 80),
        "Text extracted, starting processing pipeline"
    );

    // The three stages are independent given the extracted text
    let (extracted_data, personal_info_removed, analysis) = tokio::join!(
        extract_cv_data(&openai, &cv_text),
        remove_personal_info(&openai, &cv_text),
        analyze_cv_quality(&openai, &cv_text),
    );

    let anonymous_data = AnonymousCandidate::from_candidate(&extracted_data);

    let processed_id = generate_processed_cv_id();
    let internal_id = generate_internal_cv_id();
    let created_at = Utc::now().to_rfc3339();

    // Persistence is best effort: a storage failure must not lose the
    // processing result the caller is waiting for
    let extracted_json = serde_json::to_string(&extracted_data)
        .map_err(|e| ApiError::InternalServer(format!("Serialization failed: {}", e)))?;
    let quality_json = serde_json::to_string(&analysis)
        .map_err(|e| ApiError::InternalServer(format!("Serialization failed: {}", e)))?;
    let anonymous_json = serde_json::to_string(&anonymous_data)
        .map_err(|e| ApiError::InternalServer(format!("Serialization failed: {}", e)))?;

    let insert_processed = sqlx::query(
        r#"
        INSERT INTO processed_cvs
            (id, original_file_name, original_content, extracted_data, personal_info_removed, quality_report, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&processed_id)
    .bind(&file_name)
    .bind(&cv_text)
    .bind(&extracted_json)
    .bind(&personal_info_removed)
    .bind(&quality_json)
    .bind(&created_at)
    .execute(&db)
    .await;

    if let Err(e) = insert_processed {
        warn!(error = %e, id = %processed_id, "Failed to store processed CV");
    }

    let insert_internal = sqlx::query(
        r#"
        INSERT INTO internal_cvs
            (id, candidate_id, original_file_name, anonymous_data, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&internal_id)
    .bind(&anonymous_data.id)
    .bind(&file_name)
    .bind(&anonymous_json)
    .bind(&created_at)
    .bind(&created_at)
    .execute(&db)
    .await;

    if let Err(e) = insert_internal {
        warn!(error = %e, id = %internal_id, "Failed to store internal CV");
    }

    info!(
        processed_id = %processed_id,
        internal_id = %internal_id,
        candidate_id = %anonymous_data.id,
        email = %safe_email_log(&extracted_data.email),
        score = analysis.overall_score,
        "CV processing complete"
    );

    Ok(Json(UploadResponse {
        success: true,
        data: ProcessedCvData {
            id: processed_id,
            original_file_name: file_name,
            original_content: cv_text,
            extracted_data,
            personal_info_removed,
            created_at,
        },
        anonymous_data,
        analysis,
    }))
}
