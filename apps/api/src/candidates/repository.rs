use chrono::Utc;
use uuid::Uuid;

use crate::candidates::models::{
    Candidate, CandidateListParams, CandidatePatch, NewCandidate, Stage, TimelineEntry,
};
use crate::candidates::pipeline::{record_notes, timeline_newest_first, transition, DEFAULT_ACTOR};
use crate::errors::AppError;
use crate::store::pagination::{paginate, Page};
use crate::store::Store;

/// Filters by search text (name or email), stage and job, oldest application first.
pub fn list_candidates(store: &Store, params: &CandidateListParams) -> Page<Candidate> {
    let search = params
        .search
        .as_deref()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());
    let stage = params.stage_filter();

    let mut candidates: Vec<Candidate> = store
        .candidates
        .iter()
        .filter(|c| stage.map_or(true, |s| c.stage == s))
        .filter(|c| params.job_id.map_or(true, |job| c.job_id == Some(job)))
        .filter(|c| {
            search.as_deref().map_or(true, |needle| {
                c.name.to_lowercase().contains(needle) || c.email.to_lowercase().contains(needle)
            })
        })
        .cloned()
        .collect();
    candidates.sort_by_key(|c| c.applied_date);

    paginate(candidates, params.page, params.page_size)
}

pub fn get_candidate(store: &Store, id: Uuid) -> Result<Candidate, AppError> {
    store
        .candidates
        .iter()
        .find(|c| c.id == id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("Candidate {id} not found")))
}

pub fn create_candidate(store: &mut Store, new: NewCandidate) -> Result<Candidate, AppError> {
    if new.name.trim().is_empty() {
        return Err(AppError::Validation("name is required".to_string()));
    }
    if !new.email.contains('@') {
        return Err(AppError::Validation(format!(
            "'{}' is not a valid email address",
            new.email
        )));
    }
    if let Some(job_id) = new.job_id {
        if !store.jobs.iter().any(|j| j.id == job_id) {
            return Err(AppError::NotFound(format!("Job {job_id} not found")));
        }
    }

    let now = Utc::now();
    let candidate = Candidate {
        id: Uuid::new_v4(),
        name: new.name,
        email: new.email,
        phone: new.phone,
        stage: new.stage,
        job_id: new.job_id,
        experience: new.experience,
        skills: new.skills,
        notes: new.notes,
        applied_date: now.date_naive(),
        timeline: vec![],
        created_at: now,
        updated_at: now,
    };
    store.candidates.push(candidate.clone());
    Ok(candidate)
}

/// Applies a profile patch. A notes change also lands on the timeline.
pub fn update_candidate(
    store: &mut Store,
    id: Uuid,
    patch: &CandidatePatch,
) -> Result<Candidate, AppError> {
    let candidate = find_mut(store, id)?;
    let now = Utc::now();

    if let Some(name) = &patch.name {
        candidate.name = name.clone();
    }
    if let Some(email) = &patch.email {
        candidate.email = email.clone();
    }
    if let Some(phone) = &patch.phone {
        candidate.phone = phone.clone();
    }
    if let Some(job_id) = patch.job_id {
        candidate.job_id = Some(job_id);
    }
    if let Some(experience) = patch.experience {
        candidate.experience = experience;
    }
    if let Some(skills) = &patch.skills {
        candidate.skills = skills.clone();
    }
    if let Some(notes) = &patch.notes {
        let actor = patch.actor.as_deref().unwrap_or(DEFAULT_ACTOR);
        record_notes(candidate, notes, actor, now);
    }
    candidate.updated_at = now;
    Ok(candidate.clone())
}

pub fn move_candidate(
    store: &mut Store,
    id: Uuid,
    stage: Stage,
    actor: Option<&str>,
) -> Result<Candidate, AppError> {
    let candidate = find_mut(store, id)?;
    transition(candidate, stage, actor.unwrap_or(DEFAULT_ACTOR), Utc::now());
    Ok(candidate.clone())
}

pub fn candidate_timeline(store: &Store, id: Uuid) -> Result<Vec<TimelineEntry>, AppError> {
    let candidate = get_candidate(store, id)?;
    Ok(timeline_newest_first(&candidate))
}

fn find_mut(store: &mut Store, id: Uuid) -> Result<&mut Candidate, AppError> {
    store
        .candidates
        .iter_mut()
        .find(|c| c.id == id)
        .ok_or_else(|| AppError::NotFound(format!("Candidate {id} not found")))
}
