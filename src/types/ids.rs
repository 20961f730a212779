use super::ValidationError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;
use uuid::Uuid;

/// A Notion object ID — stored as the canonical 32-hex, non-hyphenated form.
///
/// The same ID can name a database, a page, or a block; which one it is can
/// only be learned by asking the API. Accepts bare hex, dashed UUIDs, and
/// full workspace URLs on input.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NotionId(String);

impl NotionId {
    /// Returns the canonical non-hyphenated ID.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the hyphenated UUID format for API paths.
    pub fn to_hyphenated(&self) -> String {
        if self.0.len() == 32 && !self.0.contains('-') {
            format!(
                "{}-{}-{}-{}-{}",
                &self.0[0..8],
                &self.0[8..12],
                &self.0[12..16],
                &self.0[16..20],
                &self.0[20..32]
            )
        } else {
            self.0.clone()
        }
    }

    /// Creates a NotionId from a validated hex string.
    fn from_hex(hex: &str) -> Result<Self, ValidationError> {
        let cleaned = hex.replace('-', "");
        if cleaned.len() == 32 && cleaned.chars().all(|c| c.is_ascii_hexdigit()) {
            Ok(NotionId(cleaned.to_lowercase()))
        } else {
            Err(ValidationError::InvalidId(format!(
                "Invalid Notion ID format: {}",
                hex
            )))
        }
    }

    /// Parses the various shapes a database reference arrives in.
    ///
    /// Share links carry the ID as the trailing token of the last path
    /// segment (`.../Some-Title-<32hex>?v=...`); config files carry bare
    /// hex or dashed UUIDs.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let cleaned = input.trim().trim_end_matches('/');

        // 1. UUID format with dashes
        if let Ok(uuid) = Uuid::parse_str(cleaned) {
            return Ok(NotionId(uuid.as_simple().to_string()));
        }

        // 2. Direct 32-char hex ID
        if cleaned.len() == 32 && cleaned.chars().all(|c| c.is_ascii_hexdigit()) {
            return Self::from_hex(cleaned);
        }

        // 3. Extract the trailing token from URLs
        if cleaned.starts_with("http://") || cleaned.starts_with("https://") {
            return Self::extract_from_url(cleaned);
        }

        // 4. Anything else with an ID-shaped tail (e.g. "Title-<hex>")
        Self::extract_trailing_id(cleaned)
    }

    /// Extracts an ID from a Notion URL, ignoring query scaffolding.
    fn extract_from_url(url: &str) -> Result<Self, ValidationError> {
        let parsed = Url::parse(url)
            .map_err(|e| ValidationError::InvalidId(format!("Unparseable URL {}: {}", url, e)))?;

        let last_segment = parsed
            .path()
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or("");

        Self::extract_trailing_id(last_segment)
            .map_err(|_| ValidationError::InvalidId(format!("No valid ID found in URL: {}", url)))
    }

    /// Matches a trailing 32-hex or dashed-36 token.
    fn extract_trailing_id(input: &str) -> Result<Self, ValidationError> {
        lazy_static::lazy_static! {
            static ref TRAILING_ID: Regex =
                Regex::new(r"([0-9a-fA-F]{32}|[0-9a-fA-F-]{36})$")
                    .expect("Failed to compile Notion ID regex - this is a bug in the code");
        }

        if let Some(captures) = TRAILING_ID.captures(input) {
            if let Some(id_match) = captures.get(1) {
                return Self::from_hex(id_match.as_str());
            }
        }

        Err(ValidationError::InvalidId(format!(
            "Could not parse Notion ID from: {}",
            input
        )))
    }
}

impl fmt::Display for NotionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for NotionId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for NotionId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NotionId::parse(&s).map_err(serde::de::Error::custom)
    }
}
