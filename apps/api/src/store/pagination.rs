use serde::{Deserialize, Deserializer, Serialize};

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
    pub total_pages: usize,
}

/// One page of a list endpoint: `{data, pagination}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

/// Slices `items` to the requested 1-based page. Missing or zero values fall
/// back to the defaults; a page past the end yields an empty `data`.
pub fn paginate<T>(items: Vec<T>, page: Option<usize>, page_size: Option<usize>) -> Page<T> {
    let page = page.filter(|p| *p > 0).unwrap_or(DEFAULT_PAGE);
    let page_size = page_size.filter(|s| *s > 0).unwrap_or(DEFAULT_PAGE_SIZE);
    let total = items.len();
    let total_pages = total.div_ceil(page_size);

    let data = items
        .into_iter()
        .skip((page - 1).saturating_mul(page_size))
        .take(page_size)
        .collect();

    Page {
        data,
        pagination: Pagination {
            page,
            page_size,
            total,
            total_pages,
        },
    }
}

/// Deserializes an optional query value, treating anything unparsable as
/// absent rather than rejecting the request.
pub fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: std::str::FromStr,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.trim().parse::<T>().ok()))
}
