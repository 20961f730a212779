//! Domain model for the remote objects this tool reads.
//!
//! Schemas differ per workspace, so nothing here assumes fixed column names:
//! a database is a bag of named, typed columns and a row is a bag of named,
//! typed values. Column order as returned by the API is preserved — the
//! type-fallback resolution path depends on a deterministic scan order.

mod property_value;

pub use property_value::{
    DateSpan, FormulaResult, PersonDetail, PropertyTypeValue, PropertyValue, RichTextItem,
    RollupResult, SelectOption, User,
};

use crate::types::{NotionId, PropertyName};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A database's schema and display title.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Database {
    pub id: NotionId,
    #[serde(default)]
    pub title: DatabaseTitle,
    pub properties: IndexMap<PropertyName, DatabaseProperty>,
}

impl Database {
    /// Plain-text title, or the raw ID when the title is empty.
    pub fn display_title(&self) -> String {
        let text = self.title.as_plain_text();
        if text.is_empty() {
            self.id.to_string()
        } else {
            text
        }
    }
}

/// Database title as a rich text run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DatabaseTitle(Vec<RichTextItem>);

impl DatabaseTitle {
    pub fn new(items: Vec<RichTextItem>) -> Self {
        Self(items)
    }

    pub fn as_plain_text(&self) -> String {
        self.0
            .iter()
            .map(|item| item.plain_text.as_str())
            .collect::<Vec<_>>()
            .join("")
    }
}

impl std::fmt::Display for DatabaseTitle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_plain_text())
    }
}

/// One column definition in a database schema.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DatabaseProperty {
    pub id: String,
    pub name: PropertyName,
    #[serde(rename = "type")]
    pub kind: PropertyKind,
}

/// Declared column types, with a catch-all for types this tool never reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Title,
    RichText,
    Select,
    Status,
    Date,
    People,
    Formula,
    Rollup,
    CreatedTime,
    LastEditedTime,
    Unsupported,
}

impl PropertyKind {
    /// Parse the API's declared type string into the typed vocabulary.
    pub fn from_api_name(name: &str) -> Self {
        match name {
            "title" => PropertyKind::Title,
            "rich_text" => PropertyKind::RichText,
            "select" => PropertyKind::Select,
            "status" => PropertyKind::Status,
            "date" => PropertyKind::Date,
            "people" => PropertyKind::People,
            "formula" => PropertyKind::Formula,
            "rollup" => PropertyKind::Rollup,
            "created_time" => PropertyKind::CreatedTime,
            "last_edited_time" => PropertyKind::LastEditedTime,
            _ => PropertyKind::Unsupported,
        }
    }

    /// The API name of this type. Filter clauses use it as the operator key,
    /// which the query endpoint requires to match the column's declared type.
    pub fn api_name(&self) -> &'static str {
        match self {
            PropertyKind::Title => "title",
            PropertyKind::RichText => "rich_text",
            PropertyKind::Select => "select",
            PropertyKind::Status => "status",
            PropertyKind::Date => "date",
            PropertyKind::People => "people",
            PropertyKind::Formula => "formula",
            PropertyKind::Rollup => "rollup",
            PropertyKind::CreatedTime => "created_time",
            PropertyKind::LastEditedTime => "last_edited_time",
            PropertyKind::Unsupported => "unsupported",
        }
    }
}

impl std::fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.api_name())
    }
}

impl Serialize for PropertyKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.api_name().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PropertyKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Ok(PropertyKind::from_api_name(&name))
    }
}

/// One row of a queried database: its property bag.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TaskRow {
    pub id: NotionId,
    pub properties: IndexMap<PropertyName, PropertyValue>,
}

/// Minimal page object — the resolver only needs to know a page answered.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PageObject {
    pub id: NotionId,
}

/// A child block as enumerated under a page, reduced to what the resolver
/// cares about: is it a database, a link to one, or a container to recurse
/// into.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChildBlock {
    pub id: NotionId,
    #[serde(default)]
    pub has_children: bool,
    #[serde(flatten)]
    pub kind: BlockKind,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockKind {
    ChildDatabase {
        child_database: ChildDatabaseInfo,
    },
    LinkToDatabase {
        link_to_database: DatabaseLink,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ChildDatabaseInfo {
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DatabaseLink {
    #[serde(default)]
    pub database_id: Option<NotionId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_database_schema_preserving_column_order() {
        let json = r#"{
            "object": "database",
            "id": "a02dd81a-36b6-4c1b-9c74-bb5c7c2e8ea2",
            "title": [{"type": "text", "plain_text": "Kế hoạch tuần"}],
            "properties": {
                "Nội dung công việc": {"id": "title", "name": "Nội dung công việc", "type": "title"},
                "Deadline dự kiến": {"id": "D%3Aab", "name": "Deadline dự kiến", "type": "date"},
                "Trạng thái": {"id": "S%40cd", "name": "Trạng thái", "type": "status"},
                "Ghi chú": {"id": "N%24ef", "name": "Ghi chú", "type": "url"}
            }
        }"#;

        let db: Database = serde_json::from_str(json).unwrap();
        assert_eq!(db.display_title(), "Kế hoạch tuần");

        let kinds: Vec<PropertyKind> = db.properties.values().map(|p| p.kind).collect();
        assert_eq!(
            kinds,
            vec![
                PropertyKind::Title,
                PropertyKind::Date,
                PropertyKind::Status,
                PropertyKind::Unsupported,
            ]
        );
    }

    #[test]
    fn empty_title_falls_back_to_id() {
        let json = r#"{
            "id": "a02dd81a36b64c1b9c74bb5c7c2e8ea2",
            "title": [],
            "properties": {}
        }"#;
        let db: Database = serde_json::from_str(json).unwrap();
        assert_eq!(db.display_title(), "a02dd81a36b64c1b9c74bb5c7c2e8ea2");
    }

    #[test]
    fn parses_child_blocks() {
        let json = r#"{
            "object": "block",
            "id": "216cd412-8533-8087-a989-cf3788913700",
            "has_children": false,
            "type": "child_database",
            "child_database": {"title": "Backlog"}
        }"#;
        let block: ChildBlock = serde_json::from_str(json).unwrap();
        assert!(matches!(block.kind, BlockKind::ChildDatabase { .. }));

        let json = r#"{
            "id": "216cd412-8533-8087-a989-cf3788913701",
            "has_children": true,
            "type": "paragraph",
            "paragraph": {"rich_text": []}
        }"#;
        let block: ChildBlock = serde_json::from_str(json).unwrap();
        assert_eq!(block.kind, BlockKind::Other);
        assert!(block.has_children);
    }

    #[test]
    fn parses_link_to_database_block() {
        let json = r#"{
            "id": "216cd412-8533-8087-a989-cf3788913702",
            "type": "link_to_database",
            "link_to_database": {"database_id": "550e8400-e29b-41d4-a716-446655440000"}
        }"#;
        let block: ChildBlock = serde_json::from_str(json).unwrap();
        match block.kind {
            BlockKind::LinkToDatabase { link_to_database } => {
                assert_eq!(
                    link_to_database.database_id.unwrap().as_str(),
                    "550e8400e29b41d4a716446655440000"
                );
            }
            other => panic!("expected link_to_database, got {:?}", other),
        }
    }

    #[test]
    fn parses_task_row_bag() {
        let json = r#"{
            "object": "page",
            "id": "216cd412-8533-8087-a989-cf37889137c3",
            "properties": {
                "Nội dung công việc": {"id": "title", "type": "title", "title": [{"plain_text": "Viết báo cáo"}]},
                "PIC": {"id": "p", "type": "people", "people": []}
            }
        }"#;
        let row: TaskRow = serde_json::from_str(json).unwrap();
        assert_eq!(row.properties.len(), 2);
        assert!(row.properties.get("PIC").is_some());
    }
}
