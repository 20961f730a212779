//! Canned Notion repository for integration tests.
//!
//! Pages of query results chain cursors `c1`, `c2`, ... so pagination is
//! exercised for real; every query's cursor and filter is recorded for
//! assertions.

// Each test binary uses a different subset of these helpers.
#![allow(dead_code)]

use notion2mail::{
    AppError, ChildBlock, Database, DatabaseProperty, DatabaseTitle, NotionErrorCode, NotionId,
    NotionRepository, PageObject, PaginatedResponse, PropertyKind, PropertyName,
    PropertyTypeValue, PropertyValue, RichTextItem, TaskRow,
};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

#[derive(Default)]
pub struct MockNotion {
    pub databases: HashMap<NotionId, Database>,
    pub pages: HashSet<NotionId>,
    pub children: HashMap<NotionId, Vec<ChildBlock>>,
    /// Query result pages, chained via cursors "c1", "c2", ...
    pub row_pages: Vec<Vec<TaskRow>>,
    /// When set, any query carrying a server filter is rejected the way the
    /// API rejects a filter naming an unknown property.
    pub reject_filtered_queries: bool,
    pub seen_cursors: Mutex<Vec<Option<String>>>,
    pub seen_filters: Mutex<Vec<Option<Value>>>,
}

impl MockNotion {
    pub fn new() -> Self {
        Self::default()
    }

    fn not_found(id: &NotionId) -> AppError {
        AppError::NotionService {
            code: NotionErrorCode::ObjectNotFound,
            message: format!("Could not find object with ID: {}", id),
            status: reqwest::StatusCode::NOT_FOUND,
        }
    }

    fn unknown_property() -> AppError {
        AppError::NotionService {
            code: NotionErrorCode::ValidationFailed,
            message: "Could not find property with name or id: Deadline dự kiến".to_string(),
            status: reqwest::StatusCode::BAD_REQUEST,
        }
    }
}

#[async_trait::async_trait]
impl NotionRepository for MockNotion {
    async fn retrieve_database(&self, id: &NotionId) -> Result<Database, AppError> {
        self.databases
            .get(id)
            .cloned()
            .ok_or_else(|| Self::not_found(id))
    }

    async fn retrieve_page(&self, id: &NotionId) -> Result<PageObject, AppError> {
        if self.pages.contains(id) {
            Ok(PageObject { id: id.clone() })
        } else {
            Err(Self::not_found(id))
        }
    }

    async fn query_page(
        &self,
        _database: &NotionId,
        filter: Option<&Value>,
        cursor: Option<String>,
    ) -> Result<PaginatedResponse<TaskRow>, AppError> {
        self.seen_filters.lock().unwrap().push(filter.cloned());
        self.seen_cursors.lock().unwrap().push(cursor.clone());

        if self.reject_filtered_queries && filter.is_some() {
            return Err(Self::unknown_property());
        }

        let index = match cursor.as_deref() {
            None => 0,
            Some(c) => c
                .strip_prefix('c')
                .and_then(|n| n.parse::<usize>().ok())
                .expect("test cursors are c1, c2, ..."),
        };
        let results = self.row_pages.get(index).cloned().unwrap_or_default();
        let has_more = index + 1 < self.row_pages.len();

        Ok(PaginatedResponse {
            results,
            next_cursor: has_more.then(|| format!("c{}", index + 1)),
            has_more,
        })
    }

    async fn children_page(
        &self,
        block: &NotionId,
        _cursor: Option<String>,
    ) -> Result<PaginatedResponse<ChildBlock>, AppError> {
        Ok(PaginatedResponse::single(
            self.children.get(block).cloned().unwrap_or_default(),
        ))
    }
}

/// A deterministic 32-hex ID from a small number.
pub fn id(n: u32) -> NotionId {
    NotionId::parse(&format!("{:032x}", n)).expect("generated hex is a valid ID")
}

/// Builds a database schema from (name, kind) pairs, in order.
pub fn database(db_id: &NotionId, title: &str, columns: &[(&str, PropertyKind)]) -> Database {
    Database {
        id: db_id.clone(),
        title: DatabaseTitle::new(vec![RichTextItem::plain(title)]),
        properties: columns
            .iter()
            .enumerate()
            .map(|(i, (name, kind))| {
                (
                    PropertyName::from(*name),
                    DatabaseProperty {
                        id: format!("col{}", i),
                        name: PropertyName::from(*name),
                        kind: *kind,
                    },
                )
            })
            .collect(),
    }
}

/// Builds a row from (name, value) pairs.
pub fn row(row_id: u32, values: Vec<(&str, PropertyTypeValue)>) -> TaskRow {
    TaskRow {
        id: id(row_base() + row_id),
        properties: values
            .into_iter()
            .map(|(name, value)| {
                (
                    PropertyName::from(name),
                    PropertyValue {
                        id: name.to_string(),
                        value,
                    },
                )
            })
            .collect(),
    }
}

fn row_base() -> u32 {
    0x1000_0000
}

pub fn title_value(text: &str) -> PropertyTypeValue {
    PropertyTypeValue::Title {
        title: vec![RichTextItem::plain(text)],
    }
}

pub fn select_value(name: &str) -> PropertyTypeValue {
    PropertyTypeValue::Select {
        select: Some(notion2mail::SelectOption {
            id: None,
            name: name.to_string(),
        }),
    }
}

pub fn date_value(start: &str) -> PropertyTypeValue {
    PropertyTypeValue::Date {
        date: Some(notion2mail::DateSpan {
            start: Some(start.to_string()),
            end: None,
        }),
    }
}
