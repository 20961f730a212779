// src/api/mod.rs
//! Notion API interaction — the ability to read schemas, rows, and blocks.
//!
//! Business logic depends on the [`NotionRepository`] trait, never on HTTP
//! details; tests substitute a canned implementation.

pub mod client;
pub mod pagination;
pub mod parser;
mod types;

pub use client::NotionHttpClient;
pub use types::PaginatedResponse;

use crate::error::AppError;
use crate::model::{ChildBlock, Database, PageObject, TaskRow};
use crate::types::NotionId;
use serde_json::Value;

/// The ability to read from a Notion workspace.
///
/// Query and child-block enumeration return one page at a time with the
/// cursor contract of the remote service (`next_cursor` + `has_more`); the
/// pager drives the loop.
#[async_trait::async_trait]
pub trait NotionRepository: Send + Sync {
    /// Fetch a database's schema and title.
    async fn retrieve_database(&self, id: &NotionId) -> Result<Database, AppError>;

    /// Probe whether a page answers at this ID.
    async fn retrieve_page(&self, id: &NotionId) -> Result<PageObject, AppError>;

    /// Fetch one page of query results, optionally filtered server-side.
    async fn query_page(
        &self,
        database: &NotionId,
        filter: Option<&Value>,
        cursor: Option<String>,
    ) -> Result<PaginatedResponse<TaskRow>, AppError>;

    /// Fetch one page of a block's children.
    async fn children_page(
        &self,
        block: &NotionId,
        cursor: Option<String>,
    ) -> Result<PaginatedResponse<ChildBlock>, AppError>;
}
