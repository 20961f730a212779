// src/lib.rs
//! notion2mail library — emails overdue-task reports from Notion databases.
//!
//! # Public API
//!
//! The library exposes types organized by concern:
//! - **Error handling** — `AppError`, `NotionErrorCode`
//! - **Configuration** — `NotifyConfig`, `DatabaseTarget`, `SchemaOverrides`
//! - **Domain model** — `Database`, `TaskRow`, `PropertyTypeValue`, etc.
//! - **Schema probing** — `Role`, `ColumnDescriptor`, `ResolvedColumns`
//! - **Query planning** — `FilterPlan`, `plan_and_fetch`
//! - **Resolution** — `resolve_database_ids`
//! - **Reporting & delivery** — `NormalizedRow`, `render_report`, `Mailer`

mod api;
mod batch;
mod config;
mod constants;
mod error;
mod extract;
mod mailer;
mod model;
mod query;
mod report;
mod resolve;
mod schema;
mod types;

// --- Error Handling ---
pub use crate::error::{AppError, NotionErrorCode};
pub use crate::types::ValidationError;

// --- Configuration ---
pub use crate::config::{
    parse_recipients, CommandLineInput, CredentialEntry, DatabaseTarget, NotifyConfig,
    SchemaOverrides, SmtpSettings,
};

// --- Domain Model ---
pub use crate::model::{
    BlockKind, ChildBlock, ChildDatabaseInfo, Database, DatabaseLink, DatabaseProperty,
    DatabaseTitle, DateSpan, FormulaResult, PageObject, PersonDetail, PropertyKind,
    PropertyTypeValue, PropertyValue, RichTextItem, RollupResult, SelectOption, TaskRow, User,
};

// --- Domain Types ---
pub use crate::types::{ApiKey, NotionId, PropertyName};

// --- API Client ---
pub use crate::api::{NotionHttpClient, NotionRepository, PaginatedResponse};

// --- Schema Probing ---
pub use crate::schema::{
    normalize_label, probe, ColumnDescriptor, MatchStrategy, ResolvedColumn, ResolvedColumns, Role,
};

// --- Value Extraction ---
pub use crate::extract::{
    extract, extract_with_fallback, normalize_row, property_text, PropertyBag,
};

// --- Query Planning & Paging ---
pub use crate::query::{build_filter_plan, plan_and_fetch, FilterPlan, QueryIntent};

// --- Identifier Resolution ---
pub use crate::resolve::resolve_database_ids;

// --- Reporting & Delivery ---
pub use crate::batch::{process_database, run as run_batch, BatchOutcome, DatabaseReport};
pub use crate::mailer::{LogMailer, Mailer, SmtpMailer};
pub use crate::report::{render_report, NormalizedRow};

// --- Constants ---
pub use crate::constants::{DEFAULT_RESOLVE_DEPTH, DEFAULT_STATUS_EQUALS, REPORT_SUBJECT};
