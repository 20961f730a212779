// src/resolve.rs
//! Identifier resolution — from a loosely-specified reference to concrete
//! database IDs.
//!
//! A configured reference may be a bare ID, a share URL, or a page that
//! *contains* databases. The reference is probed as a database first; a
//! page is walked recursively (children are paginated) collecting child
//! databases and links to databases, bounded by `max_depth`. Children
//! deeper than the bound are silently pruned — a cost guard against
//! runaway recursion in deeply nested workspaces, not an error.

use crate::api::{pagination, NotionRepository};
use crate::error::AppError;
use crate::model::BlockKind;
use crate::types::NotionId;
use futures::future::{BoxFuture, FutureExt};
use std::collections::HashSet;

/// Resolves a raw reference to the database IDs it denotes.
///
/// Fails with `InvalidReference` when no ID-shaped token can be extracted,
/// `AccessDenied` when neither a database nor a page answers at the ID,
/// and `NoDatabaseFound` when the walk bottoms out empty.
pub async fn resolve_database_ids(
    repo: &dyn NotionRepository,
    raw_reference: &str,
    max_depth: u8,
) -> Result<Vec<NotionId>, AppError> {
    let id = NotionId::parse(raw_reference)
        .map_err(|_| AppError::InvalidReference(raw_reference.to_string()))?;

    // A database ID is its own sole result.
    if repo.retrieve_database(&id).await.is_ok() {
        return Ok(vec![id]);
    }

    if repo.retrieve_page(&id).await.is_err() {
        return Err(AppError::AccessDenied(id.to_string()));
    }

    log::debug!("{} is a page; walking children (max depth {})", id, max_depth);

    let mut discovered = Vec::new();
    collect_child_databases(repo, id.clone(), max_depth, &mut discovered).await?;

    // Deduplicate by first occurrence, preserving discovery order.
    let mut seen = HashSet::new();
    let ids: Vec<NotionId> = discovered
        .into_iter()
        .filter(|id| seen.insert(id.clone()))
        .collect();

    if ids.is_empty() {
        return Err(AppError::NoDatabaseFound(id.to_string()));
    }
    Ok(ids)
}

/// Walks one block's children, collecting databases. Direct children are
/// always enumerated; recursion into containers consumes one unit of
/// depth.
fn collect_child_databases<'a>(
    repo: &'a dyn NotionRepository,
    block: NotionId,
    depth: u8,
    out: &'a mut Vec<NotionId>,
) -> BoxFuture<'a, Result<(), AppError>> {
    async move {
        let children =
            pagination::fetch_all_pages(|cursor| repo.children_page(&block, cursor)).await?;

        for child in children {
            match &child.kind {
                BlockKind::ChildDatabase { .. } => out.push(child.id.clone()),
                BlockKind::LinkToDatabase { link_to_database } => {
                    if let Some(database_id) = &link_to_database.database_id {
                        out.push(database_id.clone());
                    }
                }
                BlockKind::Other => {}
            }

            if child.has_children && depth > 0 {
                collect_child_databases(repo, child.id.clone(), depth - 1, &mut *out).await?;
            }
        }

        Ok(())
    }
    .boxed()
}
