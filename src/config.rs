// src/config.rs
//! Configuration — CLI flags plus the credential/database/recipient list.
//!
//! Environment variables are tried first (the deployment path for
//! scheduled jobs); a JSON config file is the fallback. The JSON shape is
//! one credential entry per integration token, each carrying the databases
//! it can reach and who gets their reports.

use crate::constants::{DEFAULT_RESOLVE_DEPTH, DEFAULT_STATUS_EQUALS};
use crate::error::AppError;
use crate::schema::Role;
use clap::Parser;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Parsed command-line input.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CommandLineInput {
    /// Path to the JSON configuration file (used when env vars are not set)
    #[arg(short, long, default_value = "notion_token.json")]
    pub config: PathBuf,

    /// Maximum recursion depth when resolving databases under a page
    #[arg(long, default_value_t = DEFAULT_RESOLVE_DEPTH)]
    pub depth: u8,

    /// Render reports and log them without sending any email
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Enable verbose logging (debug level)
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

/// The full batch configuration: who to ask, what to ask for, who to tell.
#[derive(Debug, Clone, Deserialize)]
pub struct NotifyConfig {
    pub notion_tokens: Vec<CredentialEntry>,
    pub smtp: SmtpSettings,
}

/// One integration token and the database targets reachable with it.
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialEntry {
    pub token: String,
    #[serde(default)]
    pub databases: Vec<DatabaseTarget>,
}

/// One database (or page of databases) to report on.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseTarget {
    /// Raw reference: bare ID, share URL, or a page containing databases.
    pub id: String,
    #[serde(default)]
    pub recipients: Vec<String>,
    /// Explicit column names, when the workspace's naming defeats the
    /// candidate lists.
    #[serde(default)]
    pub schema: Option<SchemaOverrides>,
    /// Status value marking a task as in progress. Missing means the
    /// default; an explicit null disables the status predicate entirely.
    #[serde(default = "default_status_equals")]
    pub status_equals: Option<String>,
}

fn default_status_equals() -> Option<String> {
    Some(DEFAULT_STATUS_EQUALS.to_string())
}

/// Per-role column name overrides.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchemaOverrides {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, alias = "pic")]
    pub assignee: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub deadline: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl SchemaOverrides {
    pub fn for_role(&self, role: Role) -> Option<&str> {
        match role {
            Role::Title => self.title.as_deref(),
            Role::Assignee => self.assignee.as_deref(),
            Role::StartDate => self.start_date.as_deref(),
            Role::Deadline => self.deadline.as_deref(),
            Role::Status => self.status.as_deref(),
        }
    }
}

/// SMTP transport settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SmtpSettings {
    #[serde(default = "default_smtp_host")]
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    pub user: String,
    pub pass: String,
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

impl NotifyConfig {
    /// Environment variables first, then the JSON file.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        match Self::from_env() {
            Ok(config) => {
                log::info!("Loaded configuration from environment variables");
                Ok(config)
            }
            Err(env_err) => {
                if path.exists() {
                    log::info!("Falling back to JSON config: {}", path.display());
                    Self::from_file(path)
                } else {
                    Err(env_err)
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|source| AppError::JsonParseError {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Builds a single-target configuration from environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        let non_empty = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());

        let token = non_empty("NOTION_TOKEN");
        let database_id = non_empty("NOTION_DATABASE_ID");
        let smtp_user = non_empty("SMTP_USER");
        let smtp_pass = non_empty("SMTP_PASS");

        let missing: Vec<&str> = [
            ("NOTION_TOKEN", token.is_none()),
            ("NOTION_DATABASE_ID", database_id.is_none()),
            ("SMTP_USER", smtp_user.is_none()),
            ("SMTP_PASS", smtp_pass.is_none()),
        ]
        .iter()
        .filter(|(_, absent)| *absent)
        .map(|(name, _)| *name)
        .collect();

        match (token, database_id, smtp_user, smtp_pass) {
            (Some(token), Some(database_id), Some(user), Some(pass)) => Ok(NotifyConfig {
                notion_tokens: vec![CredentialEntry {
                    token,
                    databases: vec![DatabaseTarget {
                        id: database_id,
                        recipients: load_env_recipients(),
                        schema: None,
                        status_equals: default_status_equals(),
                    }],
                }],
                smtp: SmtpSettings {
                    host: non_empty("SMTP_HOST").unwrap_or_else(default_smtp_host),
                    port: non_empty("SMTP_PORT")
                        .and_then(|p| p.parse().ok())
                        .unwrap_or_else(default_smtp_port),
                    user,
                    pass,
                },
            }),
            _ => Err(AppError::MissingConfiguration(format!(
                "Missing required environment variables: {}",
                missing.join(", ")
            ))),
        }
    }
}

/// Recipients for the env-configured target: a JSON file named by
/// `EMAIL_RECIPIENTS_FILE` (shape `{"recipients": [...]}`), else the
/// `EMAIL_RECIPIENTS` variable as a JSON array or comma-separated list.
fn load_env_recipients() -> Vec<String> {
    let recipients_file =
        std::env::var("EMAIL_RECIPIENTS_FILE").unwrap_or_else(|_| "email_recipients.json".into());

    if let Ok(text) = std::fs::read_to_string(&recipients_file) {
        #[derive(Deserialize)]
        struct RecipientsFile {
            #[serde(default)]
            recipients: Vec<String>,
        }
        match serde_json::from_str::<RecipientsFile>(&text) {
            Ok(parsed) => return parsed.recipients,
            Err(e) => log::warn!("Could not parse recipients from {}: {}", recipients_file, e),
        }
    }

    std::env::var("EMAIL_RECIPIENTS")
        .map(|raw| parse_recipients(&raw))
        .unwrap_or_default()
}

/// Accepts either a JSON array or a comma-separated list.
pub fn parse_recipients(raw: &str) -> Vec<String> {
    if let Ok(list) = serde_json::from_str::<Vec<String>>(raw) {
        return list;
    }
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
