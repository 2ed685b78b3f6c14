// src/cvs/mod.rs
//
// CV processing domain: models, the structuring/anonymization/quality
// pipeline, validators, and the HTTP surface

pub mod anonymizer;
pub mod handlers;
pub mod models;
pub mod quality;
pub mod routes;
pub mod structurer;
pub mod validators;

#[cfg(test)]
mod tests;

// Re-export commonly used items
pub use routes::cvs_routes;
