//! Board ordering.
//!
//! Clients move items by 0-based index inside their local collection; the
//! remote surface speaks 1-based positions. Conversion happens here and
//! nowhere else.

use crate::jobs::models::Job;

/// 0-based index to 1-based board position.
pub fn to_position(index: usize) -> u32 {
    index as u32 + 1
}

/// Moves the element at `from` so it ends up at `to`, shifting the ones in
/// between. Both indices must be in bounds.
pub fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) {
    if from == to {
        return;
    }
    let item = items.remove(from);
    items.insert(to, item);
}

/// Rewrites `order` so it matches the slice position.
pub fn renumber(jobs: &mut [Job]) {
    for (index, job) in jobs.iter_mut().enumerate() {
        job.order = to_position(index);
    }
}

/// Moves the job at position `from_order` to `to_order`, shifting every job
/// in between by one. Returns `false` when no job holds `from_order`.
pub fn shift_orders(jobs: &mut [Job], from_order: u32, to_order: u32) -> bool {
    let Some(moved) = jobs.iter().position(|j| j.order == from_order) else {
        return false;
    };

    for (index, job) in jobs.iter_mut().enumerate() {
        if index == moved {
            continue;
        }
        if from_order < to_order && job.order > from_order && job.order <= to_order {
            job.order -= 1;
        } else if from_order > to_order && job.order >= to_order && job.order < from_order {
            job.order += 1;
        }
    }
    jobs[moved].order = to_order;
    true
}

/// Closes the gap left by a deleted job at `removed_order`.
pub fn close_gap(jobs: &mut [Job], removed_order: u32) {
    for job in jobs.iter_mut().filter(|j| j.order > removed_order) {
        job.order -= 1;
    }
}
