// src/batch.rs
//! The outer batch: every credential, every target, every resolved
//! database, one at a time.
//!
//! Failure isolation is per database: a target that cannot be resolved,
//! fetched, or delivered is logged and skipped; the loop continues. There
//! is no partial result — a database's report is either fully fetched and
//! sent, or not sent at all.

use crate::api::{NotionHttpClient, NotionRepository};
use crate::config::{DatabaseTarget, NotifyConfig};
use crate::constants::REPORT_SUBJECT;
use crate::error::AppError;
use crate::extract::normalize_row;
use crate::mailer::Mailer;
use crate::query::{build_filter_plan, plan_and_fetch, QueryIntent};
use crate::report::{render_report, NormalizedRow};
use crate::resolve::resolve_database_ids;
use crate::schema::ResolvedColumns;
use crate::types::{ApiKey, NotionId};

/// Final tally of the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub sent: usize,
    pub skipped: usize,
}

/// A database's rendered report, ready for delivery.
#[derive(Debug, Clone)]
pub struct DatabaseReport {
    pub title: String,
    pub html: String,
    pub overdue: Vec<NormalizedRow>,
    pub in_progress: Vec<NormalizedRow>,
}

/// Runs the whole batch. Never fails as a whole — per-target failures are
/// logged and counted.
pub async fn run(config: &NotifyConfig, mailer: &dyn Mailer, max_depth: u8) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();

    for entry in &config.notion_tokens {
        let api_key = match ApiKey::new(entry.token.clone()) {
            Ok(key) => key,
            Err(e) => {
                log::warn!("Skipping credential entry: {}", e);
                outcome.skipped += entry.databases.len();
                continue;
            }
        };
        let client = match NotionHttpClient::new(&api_key) {
            Ok(client) => client,
            Err(e) => {
                log::warn!("Skipping credential entry: {}", e);
                outcome.skipped += entry.databases.len();
                continue;
            }
        };

        for target in &entry.databases {
            process_target(&client, target, mailer, max_depth, &mut outcome).await;
        }
    }

    log::info!(
        "Batch complete: {} sent, {} skipped",
        outcome.sent,
        outcome.skipped
    );
    outcome
}

/// One configured target: resolve it, then report on every database found.
async fn process_target(
    repo: &dyn NotionRepository,
    target: &DatabaseTarget,
    mailer: &dyn Mailer,
    max_depth: u8,
    outcome: &mut BatchOutcome,
) {
    let raw = target.id.trim();
    if raw.is_empty() || target.recipients.is_empty() {
        log::debug!("Skipping target with empty reference or recipient list");
        outcome.skipped += 1;
        return;
    }

    let database_ids = match resolve_database_ids(repo, raw, max_depth).await {
        Ok(ids) => ids,
        Err(e) => {
            log::warn!("Skipping '{}': {}", raw, e);
            outcome.skipped += 1;
            return;
        }
    };

    for database_id in database_ids {
        let report = match process_database(repo, &database_id, target).await {
            Ok(report) => report,
            Err(e) => {
                log::error!("Skipping database {}: {}", database_id, e);
                outcome.skipped += 1;
                continue;
            }
        };

        match mailer
            .send(&target.recipients, REPORT_SUBJECT, &report.html)
            .await
        {
            Ok(()) => {
                log::info!(
                    "Sent. Database: {} → {}",
                    report.title,
                    target.recipients.join(", ")
                );
                outcome.sent += 1;
            }
            Err(e) => {
                log::error!("Delivery failed for database {}: {}", report.title, e);
                outcome.skipped += 1;
            }
        }
    }
}

/// Fetches and renders one database's report.
///
/// The overdue query is required; the in-progress query degrades to an
/// empty table on error so a transient failure doesn't cost the whole
/// report.
pub async fn process_database(
    repo: &dyn NotionRepository,
    database_id: &NotionId,
    target: &DatabaseTarget,
) -> Result<DatabaseReport, AppError> {
    let database = repo.retrieve_database(database_id).await?;
    let title = database.display_title();

    let columns = ResolvedColumns::probe_all(&database.properties, target.schema.as_ref());
    let status_equals = target.status_equals.as_deref();
    let today = chrono::Utc::now().date_naive();

    let overdue_plan = build_filter_plan(&columns, status_equals, QueryIntent::Overdue, today);
    let overdue_rows = plan_and_fetch(repo, database_id, &overdue_plan).await?;

    let progress_plan = build_filter_plan(&columns, status_equals, QueryIntent::InProgress, today);
    let progress_rows = match plan_and_fetch(repo, database_id, &progress_plan).await {
        Ok(rows) => rows,
        Err(e) => {
            log::warn!(
                "In-progress query failed for {}; reporting an empty table: {}",
                title,
                e
            );
            Vec::new()
        }
    };

    let overdue: Vec<NormalizedRow> = overdue_rows
        .iter()
        .map(|row| normalize_row(&row.properties, &columns))
        .collect();
    let in_progress: Vec<NormalizedRow> = progress_rows
        .iter()
        .map(|row| normalize_row(&row.properties, &columns))
        .collect();

    log::info!(
        "Database '{}': {} overdue, {} in progress",
        title,
        overdue.len(),
        in_progress.len()
    );

    let html = render_report(&title, &overdue, &in_progress)?;

    Ok(DatabaseReport {
        title,
        html,
        overdue,
        in_progress,
    })
}
