// src/query.rs
//! Query planning and row fetching.
//!
//! The planner expresses as much of the predicate server-side as the
//! resolved schema allows; whatever cannot be expressed (or is rejected by
//! the service) is re-applied client-side over the full unfiltered fetch.
//! Client-side filtering is superset-safe: a row the server filter would
//! have kept is never dropped.
//!
//! Rows accumulate in fetch order and are never reordered — the report
//! renders in the order the service returned.

use crate::api::{pagination, NotionRepository};
use crate::error::AppError;
use crate::extract;
use crate::model::TaskRow;
use crate::schema::{normalize_label, ColumnDescriptor, ResolvedColumns, Role};
use crate::types::NotionId;
use chrono::NaiveDate;
use serde_json::{json, Value};

/// Which predicate a query is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryIntent {
    /// Deadline before today AND status equals the configured value.
    Overdue,
    /// Status equals the configured value, regardless of deadline.
    InProgress,
}

/// The filter strategy for one (database, intent) pair.
#[derive(Debug, Clone)]
pub struct FilterPlan {
    pub deadline_column: Option<ColumnDescriptor>,
    pub status_column: Option<ColumnDescriptor>,
    pub status_predicate: Option<String>,
    pub server_filters: Vec<Value>,
    /// True when the status predicate could not be expressed server-side
    /// and must be applied to the fetched rows instead.
    pub needs_client_filter: bool,
    today: NaiveDate,
}

/// Builds the filter plan from the resolved columns.
///
/// The status clause's operator key must equal the column's declared type
/// (`select` or `status`) — the query endpoint rejects a mismatch.
pub fn build_filter_plan(
    columns: &ResolvedColumns,
    status_equals: Option<&str>,
    intent: QueryIntent,
    today: NaiveDate,
) -> FilterPlan {
    let deadline_column = match intent {
        QueryIntent::Overdue => columns.descriptor(Role::Deadline).cloned(),
        QueryIntent::InProgress => None,
    };
    let status_column = columns.descriptor(Role::Status).cloned();

    let mut server_filters = Vec::new();

    if let Some(column) = &deadline_column {
        server_filters.push(json!({
            "property": column.id,
            "date": { "before": today.to_string() }
        }));
    }

    let mut needs_client_filter = false;
    if let Some(wanted) = status_equals {
        match &status_column {
            Some(column) => {
                // The operator key is the column's declared type name.
                let mut clause = json!({ "property": column.id });
                clause[column.kind.api_name()] = json!({ "equals": wanted });
                server_filters.push(clause);
            }
            None => {
                log::warn!(
                    "No status column resolved; '{}' will be filtered client-side",
                    wanted
                );
                needs_client_filter = true;
            }
        }
    }

    FilterPlan {
        deadline_column,
        status_column,
        status_predicate: status_equals.map(str::to_string),
        server_filters,
        needs_client_filter,
        today,
    }
}

impl FilterPlan {
    /// The AND-combined server filter tree, or `None` for an unfiltered
    /// fetch.
    pub fn server_filter(&self) -> Option<Value> {
        if self.server_filters.is_empty() {
            None
        } else {
            Some(json!({ "and": self.server_filters }))
        }
    }
}

/// Executes the plan: queries in pages until the cursor is exhausted, then
/// applies whatever predicates ended up client-side.
///
/// A rejection of the filter itself ("unknown property") means the column
/// guess was wrong — the fetch is retried unfiltered and every predicate
/// moves client-side. Any other error is fatal for this database.
pub async fn plan_and_fetch(
    repo: &dyn NotionRepository,
    database: &NotionId,
    plan: &FilterPlan,
) -> Result<Vec<TaskRow>, AppError> {
    let filter = plan.server_filter();

    let (rows, degraded) = match fetch_pages(repo, database, filter.as_ref()).await {
        Ok(rows) => (rows, false),
        Err(err) if filter.is_some() && err.is_unknown_property() => {
            log::warn!(
                "Server rejected the filter for {} ({}); refetching unfiltered",
                database,
                err
            );
            (fetch_pages(repo, database, None).await?, true)
        }
        Err(err) => return Err(err),
    };

    Ok(apply_client_filters(rows, plan, degraded))
}

/// Drives the pager over the query endpoint.
async fn fetch_pages(
    repo: &dyn NotionRepository,
    database: &NotionId,
    filter: Option<&Value>,
) -> Result<Vec<TaskRow>, AppError> {
    pagination::fetch_all_pages(|cursor| repo.query_page(database, filter, cursor)).await
}

/// Re-applies predicates that were not (or no longer) expressed
/// server-side. Rows are compared on their extracted, normalized text, so
/// the predicate holds even on schemas where no column resolved.
fn apply_client_filters(rows: Vec<TaskRow>, plan: &FilterPlan, degraded: bool) -> Vec<TaskRow> {
    let status_wanted = plan
        .status_predicate
        .as_deref()
        .filter(|_| plan.needs_client_filter || (degraded && plan.status_column.is_some()))
        .map(normalize_label);
    let check_deadline = degraded && plan.deadline_column.is_some();

    if status_wanted.is_none() && !check_deadline {
        return rows;
    }

    let today_iso = plan.today.to_string();
    rows.into_iter()
        .filter(|row| {
            if let Some(wanted) = &status_wanted {
                let status = extract::extract_with_fallback(
                    &row.properties,
                    plan.status_column.as_ref(),
                    Role::Status,
                );
                if normalize_label(&status) != *wanted {
                    return false;
                }
            }
            if check_deadline {
                let deadline = extract::extract_with_fallback(
                    &row.properties,
                    plan.deadline_column.as_ref(),
                    Role::Deadline,
                );
                // ISO calendar dates compare correctly as strings
                if deadline.is_empty() || deadline.as_str() >= today_iso.as_str() {
                    return false;
                }
            }
            true
        })
        .collect()
}
