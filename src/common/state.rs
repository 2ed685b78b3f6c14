// Application state shared across all modules

use sqlx::SqlitePool;
use std::sync::Arc;

use crate::services::{OpenAiService, SettingsService};

/// Application state containing database pool, services, and configuration
///
/// The OpenAI client is constructed once at startup and injected everywhere
/// it is consumed; there is deliberately no ambient/global client, so the
/// fallback paths stay testable without environment manipulation.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub max_upload_bytes: usize,
    pub settings_service: Arc<SettingsService>,
    pub openai_service: Arc<OpenAiService>,
}
