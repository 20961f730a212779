// src/extract.rs
//! Value extraction — turning a row's property bag into report cells.
//!
//! Extraction is total: an unrecognized or empty value yields an empty
//! string, never an error. Multi-value people columns and rollup arrays
//! contribute only their first element; expanding them to multiple output
//! rows is deliberately out of scope.

use crate::model::{
    DateSpan, FormulaResult, PropertyTypeValue, PropertyValue, RichTextItem, RollupResult, User,
};
use crate::report::NormalizedRow;
use crate::schema::{ColumnDescriptor, ResolvedColumns, Role};
use crate::types::PropertyName;
use indexmap::IndexMap;

/// A row's property bag, as returned by the query endpoint.
pub type PropertyBag = IndexMap<PropertyName, PropertyValue>;

/// Extracts the value of the resolved column from a bag.
pub fn extract(bag: &PropertyBag, descriptor: &ColumnDescriptor) -> String {
    bag.get(descriptor.name.as_str())
        .map(|value| property_text(&value.value))
        .unwrap_or_default()
}

/// Extracts via the resolved descriptor, or — when no column resolved for
/// the role — makes a last-resort pass over every value in the bag,
/// matching by shape alone. The pass keeps a report from coming out fully
/// empty on otherwise-unresolvable schemas.
pub fn extract_with_fallback(
    bag: &PropertyBag,
    descriptor: Option<&ColumnDescriptor>,
    role: Role,
) -> String {
    match descriptor {
        Some(descriptor) => extract(bag, descriptor),
        None => extract_by_shape(bag, role),
    }
}

/// Builds the report row for one task.
pub fn normalize_row(bag: &PropertyBag, columns: &ResolvedColumns) -> NormalizedRow {
    NormalizedRow {
        assignee: extract_with_fallback(bag, columns.descriptor(Role::Assignee), Role::Assignee),
        start_date: extract_with_fallback(
            bag,
            columns.descriptor(Role::StartDate),
            Role::StartDate,
        ),
        deadline: extract_with_fallback(bag, columns.descriptor(Role::Deadline), Role::Deadline),
        status: extract_with_fallback(bag, columns.descriptor(Role::Status), Role::Status),
        title: extract_with_fallback(bag, columns.descriptor(Role::Title), Role::Title),
    }
}

/// Normalized scalar for any property value shape.
pub fn property_text(value: &PropertyTypeValue) -> String {
    match value {
        PropertyTypeValue::Title { title } => rich_text_plain(title),
        PropertyTypeValue::RichText { rich_text } => rich_text_plain(rich_text),
        PropertyTypeValue::Select { select } | PropertyTypeValue::Status { status: select } => {
            select.as_ref().map(|opt| opt.name.clone()).unwrap_or_default()
        }
        PropertyTypeValue::People { people } => first_person(people),
        PropertyTypeValue::Date { date } => date_text(date),
        PropertyTypeValue::Formula { formula } => formula_text(formula),
        PropertyTypeValue::Rollup { rollup } => rollup_text(rollup),
        PropertyTypeValue::CreatedTime { created_time } => truncate_to_date(created_time),
        PropertyTypeValue::LastEditedTime { last_edited_time } => {
            truncate_to_date(last_edited_time)
        }
        PropertyTypeValue::Unsupported => String::new(),
    }
}

fn rich_text_plain(items: &[RichTextItem]) -> String {
    items
        .iter()
        .map(|item| item.plain_text.as_str())
        .collect::<Vec<_>>()
        .join("")
}

/// First referenced person's display name, falling back to their contact
/// address. Only the first person is considered even when several are
/// assigned.
fn first_person(people: &[User]) -> String {
    people
        .first()
        .and_then(|user| user.display_name())
        .unwrap_or_default()
        .to_string()
}

fn date_text(date: &Option<DateSpan>) -> String {
    date.as_ref().map(DateSpan::calendar_date).unwrap_or_default()
}

fn truncate_to_date(timestamp: &str) -> String {
    timestamp.chars().take(10).collect()
}

/// Unwraps one level by the formula's declared result type.
fn formula_text(formula: &FormulaResult) -> String {
    match formula {
        FormulaResult::String { string } => string.clone().unwrap_or_default(),
        FormulaResult::Date { date } => date_text(date),
        FormulaResult::Number { .. } | FormulaResult::Boolean { .. } => String::new(),
    }
}

/// Array results contribute their first element only; a scalar string
/// result is returned directly.
fn rollup_text(rollup: &RollupResult) -> String {
    match rollup {
        RollupResult::Array { array } => array.first().map(property_text).unwrap_or_default(),
        RollupResult::Date { date } => date_text(date),
        RollupResult::String { string } => string.clone().unwrap_or_default(),
        RollupResult::Number { .. } | RollupResult::Unsupported => String::new(),
    }
}

/// Whether a value's shape can stand in for a role when no column resolved.
fn shape_matches_role(role: Role, value: &PropertyTypeValue) -> bool {
    match role {
        Role::Title => matches!(value, PropertyTypeValue::Title { .. }),
        Role::Status => matches!(
            value,
            PropertyTypeValue::Status { .. } | PropertyTypeValue::Select { .. }
        ),
        Role::Assignee => matches!(value, PropertyTypeValue::People { .. }),
        Role::StartDate | Role::Deadline => matches!(value, PropertyTypeValue::Date { .. }),
    }
}

fn extract_by_shape(bag: &PropertyBag, role: Role) -> String {
    for value in bag.values() {
        if shape_matches_role(role, &value.value) {
            let text = property_text(&value.value);
            if !text.is_empty() {
                return text;
            }
        }
    }
    String::new()
}
