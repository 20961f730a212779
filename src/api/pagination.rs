// src/api/pagination.rs
//! Cursor-driven pagination against the remote query endpoints.

use super::types::PaginatedResponse;
use crate::error::AppError;

/// Drives a paginated fetch to exhaustion, accumulating all results in
/// page order. The closure receives the cursor for the next page (`None`
/// on the first call) and returns one page of results.
pub async fn fetch_all_pages<T, F, Fut>(mut fetch_fn: F) -> Result<Vec<T>, AppError>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: std::future::Future<Output = Result<PaginatedResponse<T>, AppError>>,
{
    let mut all_items = Vec::new();
    let mut cursor = None;

    loop {
        let response = fetch_fn(cursor.take()).await?;

        let has_more = response.has_more;
        cursor = response.next_cursor;
        all_items.extend(response.results);

        if !has_more || cursor.is_none() {
            break;
        }
    }

    Ok(all_items)
}
