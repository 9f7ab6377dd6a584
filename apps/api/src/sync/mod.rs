//! Client-side state for the board, candidate pipeline and assessment
//! library.
//!
//! Each collection lives in a [`Coordinator`], which applies a mutation
//! locally, persists it through a [`TalentApi`], and restores the exact
//! pre-mutation collection when the remote write fails.

pub mod assessments;
pub mod candidates;
pub mod coordinator;
pub mod error;
pub mod http;
pub mod jobs;
pub mod local;
pub mod remote;

pub use coordinator::{Coordinator, Entity, Mutation};
pub use error::PersistError;
pub use remote::TalentApi;
