// src/schema.rs
//! Schema probing — locating the right columns in a database whose schema
//! is not fixed in advance.
//!
//! Column names vary by workspace, by language, and by user convention, so
//! each semantic role is resolved at query time, first match wins:
//!
//! 1. an explicit per-target override,
//! 2. the role's candidate name list, in priority order,
//! 3. any column of an acceptable type, in schema order.
//!
//! The fallback chain can mask genuine misconfiguration, so every
//! resolution records which strategy matched and type-fallback hits are
//! logged as warnings.

use crate::config::SchemaOverrides;
use crate::constants::{
    ASSIGNEE_CANDIDATES, DEADLINE_CANDIDATES, START_DATE_CANDIDATES, STATUS_CANDIDATES,
    TITLE_CANDIDATES,
};
use crate::model::{DatabaseProperty, PropertyKind};
use crate::types::PropertyName;
use indexmap::IndexMap;

/// The semantic purpose a physical column may fulfill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Title,
    Assignee,
    StartDate,
    Deadline,
    Status,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Title,
        Role::Assignee,
        Role::StartDate,
        Role::Deadline,
        Role::Status,
    ];

    /// Candidate column names for this role, in priority order.
    pub fn candidate_names(self) -> &'static [&'static str] {
        match self {
            Role::Title => TITLE_CANDIDATES,
            Role::Assignee => ASSIGNEE_CANDIDATES,
            Role::StartDate => START_DATE_CANDIDATES,
            Role::Deadline => DEADLINE_CANDIDATES,
            Role::Status => STATUS_CANDIDATES,
        }
    }

    /// Column types that can fulfill this role.
    ///
    /// Every database has exactly one title column by construction of the
    /// remote service, so the title lookup cannot fail on a well-formed
    /// schema.
    pub fn acceptable_kinds(self) -> &'static [PropertyKind] {
        match self {
            Role::Title => &[PropertyKind::Title],
            Role::Assignee => &[PropertyKind::People, PropertyKind::Select],
            Role::StartDate | Role::Deadline => &[PropertyKind::Date],
            Role::Status => &[PropertyKind::Status, PropertyKind::Select],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Role::Title => "title",
            Role::Assignee => "assignee",
            Role::StartDate => "start date",
            Role::Deadline => "deadline",
            Role::Status => "status",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A physical column resolved for a role. Rebuilt per database on every
/// invocation — schemas change between runs and staleness would silently
/// drop or duplicate rows.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDescriptor {
    pub role: Role,
    pub name: PropertyName,
    pub id: String,
    pub kind: PropertyKind,
}

/// How a resolution succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    /// An explicit override from the target's configuration.
    Override,
    /// A name from the role's candidate list.
    CandidateName,
    /// First column of an acceptable type, in schema order.
    TypeFallback,
}

impl std::fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchStrategy::Override => write!(f, "override"),
            MatchStrategy::CandidateName => write!(f, "candidate name"),
            MatchStrategy::TypeFallback => write!(f, "type fallback"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedColumn {
    pub descriptor: ColumnDescriptor,
    pub strategy: MatchStrategy,
}

/// Collapses whitespace runs and lowercases — the comparison rule for both
/// column names and status values.
pub fn normalize_label(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Resolves the column fulfilling `role`, if any.
///
/// Returns `None` when nothing matches; callers treat that as "role
/// unavailable" and degrade filtering/extraction, never as a fatal error.
pub fn probe(
    properties: &IndexMap<PropertyName, DatabaseProperty>,
    role: Role,
    override_name: Option<&str>,
) -> Option<ResolvedColumn> {
    let acceptable = role.acceptable_kinds();

    let find_by_name = |wanted: &str| {
        let wanted = normalize_label(wanted);
        properties.values().find(|prop| {
            acceptable.contains(&prop.kind) && normalize_label(prop.name.as_str()) == wanted
        })
    };

    if let Some(name) = override_name {
        if let Some(prop) = find_by_name(name) {
            return Some(resolved(role, prop, MatchStrategy::Override));
        }
        log::warn!(
            "Schema override '{}' for role '{}' not found with an acceptable type; falling back",
            name,
            role
        );
    }

    for candidate in role.candidate_names() {
        if let Some(prop) = find_by_name(candidate) {
            return Some(resolved(role, prop, MatchStrategy::CandidateName));
        }
    }

    properties
        .values()
        .find(|prop| acceptable.contains(&prop.kind))
        .map(|prop| resolved(role, prop, MatchStrategy::TypeFallback))
}

fn resolved(role: Role, prop: &DatabaseProperty, strategy: MatchStrategy) -> ResolvedColumn {
    ResolvedColumn {
        descriptor: ColumnDescriptor {
            role,
            name: prop.name.clone(),
            id: prop.id.clone(),
            kind: prop.kind,
        },
        strategy,
    }
}

/// All five roles resolved against one database schema.
#[derive(Debug, Clone, Default)]
pub struct ResolvedColumns {
    pub title: Option<ResolvedColumn>,
    pub assignee: Option<ResolvedColumn>,
    pub start_date: Option<ResolvedColumn>,
    pub deadline: Option<ResolvedColumn>,
    pub status: Option<ResolvedColumn>,
}

impl ResolvedColumns {
    /// Probes every role, logging which strategy matched. Type-fallback
    /// hits are warnings so operators can distinguish "matched by name"
    /// from "matched by type guess".
    pub fn probe_all(
        properties: &IndexMap<PropertyName, DatabaseProperty>,
        overrides: Option<&SchemaOverrides>,
    ) -> Self {
        let mut columns = Self::default();

        for role in Role::ALL {
            let override_name = overrides.and_then(|o| o.for_role(role));
            let resolution = probe(properties, role, override_name);

            match &resolution {
                Some(col) if col.strategy == MatchStrategy::TypeFallback => {
                    log::warn!(
                        "Role '{}' matched column '{}' by {} (type {})",
                        role,
                        col.descriptor.name,
                        col.strategy,
                        col.descriptor.kind
                    );
                }
                Some(col) => {
                    log::debug!(
                        "Role '{}' matched column '{}' by {}",
                        role,
                        col.descriptor.name,
                        col.strategy
                    );
                }
                None => log::debug!("Role '{}' unavailable in this schema", role),
            }

            *columns.slot_mut(role) = resolution;
        }

        columns
    }

    fn slot_mut(&mut self, role: Role) -> &mut Option<ResolvedColumn> {
        match role {
            Role::Title => &mut self.title,
            Role::Assignee => &mut self.assignee,
            Role::StartDate => &mut self.start_date,
            Role::Deadline => &mut self.deadline,
            Role::Status => &mut self.status,
        }
    }

    /// The descriptor resolved for a role, if any.
    pub fn descriptor(&self, role: Role) -> Option<&ColumnDescriptor> {
        let slot = match role {
            Role::Title => &self.title,
            Role::Assignee => &self.assignee,
            Role::StartDate => &self.start_date,
            Role::Deadline => &self.deadline,
            Role::Status => &self.status,
        };
        slot.as_ref().map(|col| &col.descriptor)
    }
}
