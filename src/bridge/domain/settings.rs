//! Persisted bridge settings and the sync cursor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Label attached to exported tasks unless configured otherwise.
pub const DEFAULT_LABEL: &str = "siyuan";

/// Slash-command keywords offered unless configured otherwise.
pub const DEFAULT_SLASH_KEYWORDS: &str = "sendtotodoist, todoist, todo, task";

/// Poll interval in minutes unless configured otherwise.
pub const DEFAULT_SYNC_INTERVAL_MINUTES: u32 = 5;

const SECONDS_PER_MINUTE: u64 = 60;

/// Flat settings record shared by export and completion sync.
///
/// The JSON form uses the plugin's camelCase keys. Missing keys take their
/// defaults and an empty `lastSyncTime` means the cursor was never set.
/// Services read a copy at the start of each operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    api_token: String,
    project_name: String,
    section_name: String,
    default_label: String,
    slash_keywords: String,
    sync_interval: u32,
    #[serde(rename = "lastSyncTime", with = "cursor_format")]
    sync_cursor: Option<DateTime<Utc>>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_token: String::new(),
            project_name: String::new(),
            section_name: String::new(),
            default_label: DEFAULT_LABEL.to_owned(),
            slash_keywords: DEFAULT_SLASH_KEYWORDS.to_owned(),
            sync_interval: DEFAULT_SYNC_INTERVAL_MINUTES,
            sync_cursor: None,
        }
    }
}

impl Settings {
    /// Sets the task-service API token.
    #[must_use]
    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = token.into();
        self
    }

    /// Sets the target project name.
    #[must_use]
    pub fn with_project_name(mut self, name: impl Into<String>) -> Self {
        self.project_name = name.into();
        self
    }

    /// Sets the target section name.
    #[must_use]
    pub fn with_section_name(mut self, name: impl Into<String>) -> Self {
        self.section_name = name.into();
        self
    }

    /// Sets the label used for export and completion filtering.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.default_label = label.into();
        self
    }

    /// Sets the comma-separated slash-command keywords.
    #[must_use]
    pub fn with_slash_keywords(mut self, keywords: impl Into<String>) -> Self {
        self.slash_keywords = keywords.into();
        self
    }

    /// Sets the poll interval in minutes.
    #[must_use]
    pub const fn with_sync_interval_minutes(mut self, minutes: u32) -> Self {
        self.sync_interval = minutes;
        self
    }

    /// Sets or clears the sync cursor.
    #[must_use]
    pub const fn with_sync_cursor(mut self, cursor: Option<DateTime<Utc>>) -> Self {
        self.sync_cursor = cursor;
        self
    }

    /// Returns the API token, or `None` when it is blank.
    #[must_use]
    pub fn api_token(&self) -> Option<&str> {
        non_blank(&self.api_token)
    }

    /// Returns the configured project name, or `None` when it is blank.
    #[must_use]
    pub fn project_name(&self) -> Option<&str> {
        non_blank(&self.project_name)
    }

    /// Returns the configured section name, or `None` when it is blank.
    #[must_use]
    pub fn section_name(&self) -> Option<&str> {
        non_blank(&self.section_name)
    }

    /// Returns the label, or `None` when label filtering is disabled.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        non_blank(&self.default_label)
    }

    /// Returns the slash-command keywords, trimmed and lowercased.
    #[must_use]
    pub fn slash_keywords(&self) -> Vec<String> {
        self.slash_keywords
            .split(',')
            .map(|keyword| keyword.trim().to_lowercase())
            .filter(|keyword| !keyword.is_empty())
            .collect()
    }

    /// Returns the poll interval, never shorter than one minute.
    #[must_use]
    pub fn sync_interval(&self) -> Duration {
        let minutes = u64::from(self.sync_interval.max(1));
        Duration::from_secs(minutes * SECONDS_PER_MINUTE)
    }

    /// Returns the sync cursor, or `None` before the first completed cycle.
    #[must_use]
    pub const fn sync_cursor(&self) -> Option<DateTime<Utc>> {
        self.sync_cursor
    }
}

fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Serialises the cursor as RFC 3339 with millisecond precision, or `""`.
mod cursor_format {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    #[expect(
        clippy::ref_option,
        reason = "serde `with` modules receive the field by reference"
    )]
    pub(super) fn serialize<S>(
        cursor: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = cursor
            .map(|instant| instant.to_rfc3339_opts(SecondsFormat::Millis, true))
            .unwrap_or_default();
        serializer.serialize_str(&formatted)
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        DateTime::parse_from_rfc3339(trimmed)
            .map(|instant| Some(instant.with_timezone(&Utc)))
            .map_err(serde::de::Error::custom)
    }
}
