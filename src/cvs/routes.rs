// src/cvs/routes.rs

use axum::{
    routing::{get, post},
    Router,
};

use crate::cvs::handlers::{records, upload};

/// All CV pipeline routes; state is attached via Extension in main
pub fn cvs_routes() -> Router {
    Router::new()
        .route(
            "/api/cvs",
            post(upload::upload_cv).get(records::list_processed_cvs),
        )
        .route("/api/cvs/:id", get(records::get_processed_cv))
        .route("/api/internal/cvs", get(records::list_internal_cvs))
        .route(
            "/api/internal/cvs/:id",
            get(records::get_internal_cv).put(records::update_internal_cv),
        )
        .route("/api/health", get(records::health_check))
}
