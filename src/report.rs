// src/report.rs
//! HTML report rendering — a pure function from normalized rows to markup.
//!
//! Rows render in fetch order; "true" deadline ordering is approximated by
//! whatever order the service returned.

use crate::error::AppError;
use handlebars::Handlebars;
use serde::Serialize;
use serde_json::json;

/// Templates ship inside the binary — there is no template directory to
/// deploy next to a cron job.
const REPORT_TEMPLATE: &str = include_str!("../templates/report.hbs");
const TASK_TABLE_PARTIAL: &str = include_str!("../templates/task_table.hbs");

/// One task reduced to its report cells. Derived, disposable per report.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizedRow {
    pub assignee: String,
    pub start_date: String,
    pub deadline: String,
    pub status: String,
    pub title: String,
}

/// Renders the two-table report for one database.
pub fn render_report(
    database_title: &str,
    overdue: &[NormalizedRow],
    in_progress: &[NormalizedRow],
) -> Result<String, AppError> {
    let mut handlebars = Handlebars::new();
    handlebars
        .register_template_string("report", REPORT_TEMPLATE)
        .map_err(|e| AppError::TemplateRenderError(e.to_string()))?;
    handlebars
        .register_partial("task_table", TASK_TABLE_PARTIAL)
        .map_err(|e| AppError::TemplateRenderError(e.to_string()))?;

    handlebars
        .render(
            "report",
            &json!({
                "database_title": database_title,
                "overdue": overdue,
                "in_progress": in_progress,
            }),
        )
        .map_err(|e| AppError::TemplateRenderError(e.to_string()))
}
