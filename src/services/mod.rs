// src/services/mod.rs
//
// Shared services module containing infrastructure services
// that can be used across different domain modules

pub mod openai;
pub mod settings;

// Re-export commonly used types for convenience
pub use openai::OpenAiService;
pub use settings::SettingsService;
