// Jobs board: postings, status, and manual ordering.

pub mod handlers;
pub mod models;
pub mod ordering;
pub mod repository;
