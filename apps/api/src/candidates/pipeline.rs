//! Stage transitions and timeline bookkeeping.
//!
//! Both the store and the optimistic client go through these functions, so a
//! stage change and its timeline entry are always written together.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::candidates::models::{Candidate, Stage, TimelineEntry};

/// Actor recorded when the caller does not name one.
pub const DEFAULT_ACTOR: &str = "Current User";

pub fn stage_note(stage: Stage) -> String {
    format!("Moved to {stage} stage")
}

/// Sets the stage and appends exactly one matching timeline entry.
pub fn transition(candidate: &mut Candidate, stage: Stage, actor: &str, now: DateTime<Utc>) {
    candidate.stage = stage;
    candidate.timeline.push(TimelineEntry {
        id: Uuid::new_v4(),
        stage,
        timestamp: now,
        note: stage_note(stage),
        actor: actor.to_string(),
    });
    candidate.updated_at = now;
}

/// Replaces the notes and records the edit against the current stage.
pub fn record_notes(candidate: &mut Candidate, notes: &str, actor: &str, now: DateTime<Utc>) {
    candidate.notes = notes.to_string();
    candidate.timeline.push(TimelineEntry {
        id: Uuid::new_v4(),
        stage: candidate.stage,
        timestamp: now,
        note: "Notes updated".to_string(),
        actor: actor.to_string(),
    });
    candidate.updated_at = now;
}

/// Newest entry first.
pub fn timeline_newest_first(candidate: &Candidate) -> Vec<TimelineEntry> {
    let mut entries = candidate.timeline.clone();
    entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    entries
}

/// Kanban columns: every stage present, candidates in collection order.
pub fn group_by_stage(candidates: &[Candidate]) -> BTreeMap<Stage, Vec<Candidate>> {
    let mut board: BTreeMap<Stage, Vec<Candidate>> =
        Stage::ALL.into_iter().map(|s| (s, Vec::new())).collect();
    for candidate in candidates {
        board
            .entry(candidate.stage)
            .or_default()
            .push(candidate.clone());
    }
    board
}
