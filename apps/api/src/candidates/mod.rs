// Candidate roster: pipeline stages, timelines and notes.

pub mod handlers;
pub mod models;
pub mod pipeline;
pub mod repository;
