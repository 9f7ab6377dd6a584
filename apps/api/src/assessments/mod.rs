// Assessments: authoring (builder), runtime evaluation (engine) and storage.

pub mod builder;
pub mod engine;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod validation;
