//! In-memory record store standing in for the browser-local database.
//!
//! The store is a plain set of tables. Query and mutation logic lives next
//! to each entity (`jobs::repository`, `candidates::repository`,
//! `assessments::repository`) and takes the store by reference.

pub mod pagination;
pub mod seed;

use crate::assessments::models::{Assessment, AssessmentSubmission};
use crate::candidates::models::Candidate;
use crate::jobs::models::Job;

#[derive(Debug, Default, Clone)]
pub struct Store {
    pub jobs: Vec<Job>,
    pub candidates: Vec<Candidate>,
    pub assessments: Vec<Assessment>,
    pub submissions: Vec<AssessmentSubmission>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }
}
