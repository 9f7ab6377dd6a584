use chrono::Utc;
use uuid::Uuid;

use crate::errors::AppError;
use crate::jobs::models::{slugify, Job, JobListParams, JobPatch, NewJob, ReorderRequest};
use crate::jobs::ordering::{close_gap, shift_orders};
use crate::store::pagination::{paginate, Page};
use crate::store::Store;

/// Filters by search text, status and tags, sorted by board order.
pub fn list_jobs(store: &Store, params: &JobListParams) -> Page<Job> {
    let search = params
        .search
        .as_deref()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());
    let status = params.status_filter();
    let tags = params.tag_filter();

    let mut jobs: Vec<Job> = store
        .jobs
        .iter()
        .filter(|job| status.map_or(true, |s| job.status == s))
        .filter(|job| {
            search.as_deref().map_or(true, |needle| {
                job.title.to_lowercase().contains(needle)
                    || job.company.to_lowercase().contains(needle)
            })
        })
        .filter(|job| tags.is_empty() || tags.iter().any(|t| job.tags.contains(t)))
        .cloned()
        .collect();
    jobs.sort_by_key(|j| j.order);

    paginate(jobs, params.page, params.page_size)
}

pub fn get_job(store: &Store, id: Uuid) -> Result<Job, AppError> {
    store
        .jobs
        .iter()
        .find(|j| j.id == id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))
}

/// Appends the job at the end of the board with a fresh id and timestamps.
pub fn create_job(store: &mut Store, new_job: NewJob) -> Result<Job, AppError> {
    let title = new_job.title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("title is required".to_string()));
    }
    let slug = new_job
        .slug
        .as_deref()
        .map(slugify)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| slugify(title));
    ensure_unique_slug(store, &slug, None)?;

    let now = Utc::now();
    let order = store.jobs.iter().map(|j| j.order).max().unwrap_or(0) + 1;
    let job = Job {
        slug,
        order,
        ..new_job.placeholder(Uuid::new_v4(), now)
    };
    store.jobs.push(job.clone());
    Ok(job)
}

pub fn update_job(store: &mut Store, id: Uuid, patch: &JobPatch) -> Result<Job, AppError> {
    if let Some(title) = &patch.title {
        if title.trim().is_empty() {
            return Err(AppError::Validation("title cannot be empty".to_string()));
        }
    }
    if let Some(slug) = &patch.slug {
        ensure_unique_slug(store, slug, Some(id))?;
    }

    let job = store
        .jobs
        .iter_mut()
        .find(|j| j.id == id)
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))?;
    patch.apply_to(job);
    job.updated_at = Utc::now();
    Ok(job.clone())
}

/// Deletes the job together with its candidates and assessments.
pub fn delete_job(store: &mut Store, id: Uuid) -> Result<(), AppError> {
    let index = store
        .jobs
        .iter()
        .position(|j| j.id == id)
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))?;
    let removed = store.jobs.remove(index);
    close_gap(&mut store.jobs, removed.order);

    store.candidates.retain(|c| c.job_id != Some(id));
    let orphaned: Vec<Uuid> = store
        .assessments
        .iter()
        .filter(|a| a.job_id == id)
        .map(|a| a.id)
        .collect();
    store.assessments.retain(|a| a.job_id != id);
    store
        .submissions
        .retain(|s| !orphaned.contains(&s.assessment_id));
    Ok(())
}

/// Moves job `id` from position `from_order` to `to_order`. The job must
/// currently sit at `from_order`; otherwise the caller's view is stale.
pub fn reorder_job(store: &mut Store, id: Uuid, request: ReorderRequest) -> Result<(), AppError> {
    let len = store.jobs.len() as u32;
    let ReorderRequest {
        from_order,
        to_order,
    } = request;
    if !(1..=len).contains(&from_order) || !(1..=len).contains(&to_order) {
        return Err(AppError::Validation(format!(
            "positions must be between 1 and {len}, got {from_order} -> {to_order}"
        )));
    }

    let job = get_job(store, id)?;
    if job.order != from_order {
        return Err(AppError::Validation(format!(
            "job {id} is at position {}, not {from_order}",
            job.order
        )));
    }

    shift_orders(&mut store.jobs, from_order, to_order);
    let now = Utc::now();
    if let Some(job) = store.jobs.iter_mut().find(|j| j.id == id) {
        job.updated_at = now;
    }
    Ok(())
}

fn ensure_unique_slug(store: &Store, slug: &str, except: Option<Uuid>) -> Result<(), AppError> {
    let taken = store
        .jobs
        .iter()
        .any(|j| j.slug == slug && Some(j.id) != except);
    if taken {
        return Err(AppError::Conflict(format!("slug '{slug}' is already in use")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::models::JobStatus;

    fn new_job(title: &str, company: &str, tags: &[&str]) -> NewJob {
        NewJob {
            title: title.to_string(),
            company: company.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            ..NewJob::default()
        }
    }

    fn seeded() -> Store {
        let mut store = Store::new();
        create_job(&mut store, new_job("Frontend Engineer", "StartupXYZ", &["React"])).unwrap();
        create_job(&mut store, new_job("Backend Developer", "DataFlow", &["Python"])).unwrap();
        create_job(&mut store, new_job("DevOps Engineer", "CloudTech", &["AWS", "Remote"])).unwrap();
        store
    }

    #[test]
    fn test_create_assigns_next_order_and_slug() {
        let store = seeded();
        let orders: Vec<u32> = store.jobs.iter().map(|j| j.order).collect();
        assert_eq!(orders, vec![1, 2, 3]);
        assert_eq!(store.jobs[2].slug, "devops-engineer");
    }

    #[test]
    fn test_create_rejects_blank_title() {
        let mut store = Store::new();
        let err = create_job(&mut store, new_job("   ", "X", &[])).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_create_rejects_duplicate_slug() {
        let mut store = seeded();
        let err = create_job(&mut store, new_job("Frontend  Engineer", "Other", &[])).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn test_list_filters() {
        let mut store = seeded();
        let id = store.jobs[1].id;
        update_job(&mut store, id, &JobPatch::status(JobStatus::Archived)).unwrap();

        let search = JobListParams {
            search: Some("ENGINEER".into()),
            ..JobListParams::default()
        };
        assert_eq!(list_jobs(&store, &search).pagination.total, 2);

        let by_company = JobListParams {
            search: Some("dataflow".into()),
            ..JobListParams::default()
        };
        assert_eq!(list_jobs(&store, &by_company).data[0].id, id);

        let archived = JobListParams {
            status: Some("archived".into()),
            ..JobListParams::default()
        };
        assert_eq!(list_jobs(&store, &archived).pagination.total, 1);

        let tagged = JobListParams {
            tags: Some("Remote,React".into()),
            ..JobListParams::default()
        };
        assert_eq!(list_jobs(&store, &tagged).pagination.total, 2);
    }

    #[test]
    fn test_reorder_moves_and_shifts() {
        let mut store = seeded();
        let first = store.jobs[0].id;
        reorder_job(
            &mut store,
            first,
            ReorderRequest {
                from_order: 1,
                to_order: 3,
            },
        )
        .unwrap();
        let listed = list_jobs(&store, &JobListParams::default());
        let titles: Vec<&str> = listed.data.iter().map(|j| j.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Backend Developer", "DevOps Engineer", "Frontend Engineer"]
        );
    }

    #[test]
    fn test_reorder_rejects_stale_position() {
        let mut store = seeded();
        let second = store.jobs[1].id;
        let before = store.jobs.clone();
        let err = reorder_job(
            &mut store,
            second,
            ReorderRequest {
                from_order: 1,
                to_order: 3,
            },
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(store.jobs, before);
    }

    #[test]
    fn test_reorder_rejects_out_of_range() {
        let mut store = seeded();
        let first = store.jobs[0].id;
        let err = reorder_job(
            &mut store,
            first,
            ReorderRequest {
                from_order: 1,
                to_order: 4,
            },
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_delete_closes_order_gap() {
        let mut store = seeded();
        let first = store.jobs[0].id;
        delete_job(&mut store, first).unwrap();
        let orders: Vec<u32> = store.jobs.iter().map(|j| j.order).collect();
        assert_eq!(orders, vec![1, 2]);
        assert!(matches!(
            delete_job(&mut store, first),
            Err(AppError::NotFound(_))
        ));
    }
}
