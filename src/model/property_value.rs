//! Property values as they appear on a queried row.
//!
//! A row's property bag maps column names to one of a closed set of value
//! shapes, discriminated by the wire `type` tag. Column types this tool has
//! no use for (checkbox, url, files, ...) collapse into `Unsupported`, which
//! extracts to an empty string rather than failing the row.

use serde::{Deserialize, Serialize};

/// Property value — wraps a typed value with its property ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyValue {
    pub id: String,
    #[serde(flatten)]
    pub value: PropertyTypeValue,
}

/// The value shapes a column can carry, tagged by the API's `type` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropertyTypeValue {
    Title {
        title: Vec<RichTextItem>,
    },
    RichText {
        rich_text: Vec<RichTextItem>,
    },
    Select {
        select: Option<SelectOption>,
    },
    Status {
        status: Option<SelectOption>,
    },
    People {
        people: Vec<User>,
    },
    Date {
        date: Option<DateSpan>,
    },
    Formula {
        formula: FormulaResult,
    },
    Rollup {
        rollup: RollupResult,
    },
    CreatedTime {
        created_time: String,
    },
    LastEditedTime {
        last_edited_time: String,
    },
    #[serde(other)]
    Unsupported,
}

/// One fragment of a rich text run. Only the pre-rendered plain text is
/// retained; annotations and mentions are irrelevant to a task report.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RichTextItem {
    #[serde(default)]
    pub plain_text: String,
}

impl RichTextItem {
    pub fn plain(text: &str) -> Self {
        Self {
            plain_text: text.to_string(),
        }
    }
}

/// A select or status choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
}

/// A person referenced by a people column.
///
/// The contact address lives under the nested `person` object on the wire,
/// and is only present when the integration has user-information capability.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub person: Option<PersonDetail>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PersonDetail {
    #[serde(default)]
    pub email: Option<String>,
}

impl User {
    /// Display name, falling back to the contact address.
    pub fn display_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or_else(|| self.person.as_ref().and_then(|p| p.email.as_deref()))
    }
}

/// A date or date range. Kept as the wire's ISO-8601 strings; extraction
/// truncates to the 10-character calendar date, discarding time-of-day and
/// timezone offset.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DateSpan {
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
}

impl DateSpan {
    /// The calendar-date component: `start` if present, else `end`, else empty.
    pub fn calendar_date(&self) -> String {
        let raw = self
            .start
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.end.as_deref().filter(|s| !s.is_empty()));
        match raw {
            Some(s) => s.chars().take(10).collect(),
            None => String::new(),
        }
    }
}

/// The computed result of a formula column, tagged by declared result type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FormulaResult {
    String { string: Option<String> },
    Number { number: Option<f64> },
    Boolean { boolean: Option<bool> },
    Date { date: Option<DateSpan> },
}

/// The aggregated result of a rollup column.
///
/// Array results wrap property-value shapes of the related rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RollupResult {
    Array { array: Vec<PropertyTypeValue> },
    Date { date: Option<DateSpan> },
    Number { number: Option<f64> },
    String { string: Option<String> },
    #[serde(other)]
    Unsupported,
}
