//! TalentFlow: hiring-pipeline service and client-side sync layer.
//!
//! The server half (`routes`, `store`, `network`) is the mock REST surface the
//! board, candidate pipeline and assessment runtime talk to. The client half
//! (`sync`) applies mutations optimistically and rolls them back when the
//! remote write fails. `assessments::engine` decides which questions are
//! visible and whether a response set may be submitted.

pub mod assessments;
pub mod candidates;
pub mod config;
pub mod errors;
pub mod jobs;
pub mod network;
pub mod routes;
pub mod state;
pub mod store;
pub mod sync;
