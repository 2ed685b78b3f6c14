// src/cvs/handlers/mod.rs

pub mod records;
pub mod upload;
