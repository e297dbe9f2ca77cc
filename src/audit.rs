//! Audit trail for sync runs.
//!
//! The worker reports lifecycle events through an [`AuditNotifier`]. The
//! default implementation, [`FileAuditLog`], appends one pipe-separated line
//! per entry:
//!
//! ```text
//! 2024-03-09 14:05:00.120 | Information  | WorkerStartup        | N/A                  | N/A        | System | WorkerStartup performed on system
//! 2024-03-09 14:06:00.004 | Error        | SyncFailed           | ORDERS               | N/A        | System | SyncFailed performed on ORDERS | read=3, written=0, failed=0, duration=1.2ms, error=destination mysql is unavailable
//! ```
//!
//! Details, when present, follow the message as an eighth field.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::info;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";
const NOT_AVAILABLE: &str = "N/A";
const SYSTEM_ACTOR: &str = "System";

/// Severity of an audit entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AuditLevel {
    #[default]
    Information,
    Warning,
    Error,
}

impl std::fmt::Display for AuditLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Information => write!(f, "Information"),
            Self::Warning => write!(f, "Warning"),
            Self::Error => write!(f, "Error"),
        }
    }
}

impl std::str::FromStr for AuditLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Information" => Ok(Self::Information),
            "Warning" => Ok(Self::Warning),
            "Error" => Ok(Self::Error),
            _ => Err(anyhow::anyhow!("Invalid audit level: '{s}'")),
        }
    }
}

/// One audited action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub level: AuditLevel,
    pub action: String,
    pub entity: Option<String>,
    pub entity_id: Option<i64>,
    pub user_id: Option<String>,
    /// Free-form details, written after the message on a single line
    pub details: Option<String>,
    pub message: String,
}

impl AuditEntry {
    /// Entry for `action`, stamped now, with the standard message.
    pub fn action(action: impl Into<String>) -> Self {
        let action = action.into();
        let mut entry = Self {
            timestamp: Utc::now(),
            level: AuditLevel::Information,
            action,
            entity: None,
            entity_id: None,
            user_id: None,
            details: None,
            message: String::new(),
        };
        entry.message = entry.standard_message();
        entry
    }

    pub fn on(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self.message = self.standard_message();
        self
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.entity_id = Some(id);
        self.message = self.standard_message();
        self
    }

    pub fn by(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn level(mut self, level: AuditLevel) -> Self {
        self.level = level;
        self
    }

    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// `"<action> performed on <entity|system>[ with ID <id>]"`
    pub fn standard_message(&self) -> String {
        let mut message = format!(
            "{} performed on {}",
            self.action,
            self.entity.as_deref().unwrap_or("system")
        );
        if let Some(id) = self.entity_id {
            message.push_str(&format!(" with ID {id}"));
        }
        message
    }

    pub fn actor(&self) -> &str {
        self.user_id.as_deref().unwrap_or(SYSTEM_ACTOR)
    }

    /// Render the file line for this entry.
    pub fn to_line(&self) -> String {
        let entity_id = self
            .entity_id
            .map_or_else(|| NOT_AVAILABLE.to_string(), |id| id.to_string());
        let mut line = format!(
            "{} | {:<12} | {:<20} | {:<20} | {:<10} | {} | {}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.level.to_string(),
            self.action,
            self.entity.as_deref().unwrap_or(NOT_AVAILABLE),
            entity_id,
            self.actor(),
            self.message
        );
        if let Some(details) = self.details.as_deref().filter(|d| !d.is_empty()) {
            line.push_str(" | ");
            line.push_str(&details.replace(['\r', '\n'], " "));
        }
        line
    }

    /// Parse a line written by [`AuditEntry::to_line`].
    ///
    /// Returns `None` for lines that do not have at least seven fields or
    /// whose timestamp or level cannot be parsed. Everything after the
    /// seventh separator is the details text.
    pub fn parse_line(line: &str) -> Option<Self> {
        let parts: Vec<&str> = line.splitn(8, '|').map(str::trim).collect();
        if parts.len() < 7 {
            return None;
        }

        let timestamp = NaiveDateTime::parse_from_str(parts[0], TIMESTAMP_FORMAT)
            .ok()?
            .and_utc();
        let optional = |s: &str| (s != NOT_AVAILABLE && !s.is_empty()).then(|| s.to_string());

        Some(Self {
            timestamp,
            level: parts[1].parse().ok()?,
            action: parts[2].to_string(),
            entity: optional(parts[3]),
            entity_id: parts[4].parse().ok(),
            user_id: Some(parts[5].to_string()),
            details: parts.get(7).and_then(|d| optional(*d)),
            message: parts[6].to_string(),
        })
    }
}

/// Receives audit entries.
#[async_trait]
pub trait AuditNotifier: Send + Sync {
    async fn notify(&self, entry: AuditEntry) -> anyhow::Result<()>;
}

/// Audit log appended to a text file.
pub struct FileAuditLog {
    path: PathBuf,
    enabled: bool,
    lock: Mutex<()>,
}

impl FileAuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            enabled: true,
            lock: Mutex::new(()),
        }
    }

    /// An audit log that accepts and drops every entry.
    pub fn disabled() -> Self {
        Self {
            path: PathBuf::new(),
            enabled: false,
            lock: Mutex::new(()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Entries in the file, newest first, optionally limited to a time range.
    ///
    /// Malformed lines are skipped.
    pub async fn entries(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> anyhow::Result<Vec<AuditEntry>> {
        if !self.enabled {
            return Ok(Vec::new());
        }

        let _guard = self.lock.lock().await;
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut entries: Vec<AuditEntry> = content
            .lines()
            .filter_map(AuditEntry::parse_line)
            .filter(|e| start.map_or(true, |s| e.timestamp >= s))
            .filter(|e| end.map_or(true, |t| e.timestamp <= t))
            .collect();
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(entries)
    }
}

#[async_trait]
impl AuditNotifier for FileAuditLog {
    async fn notify(&self, entry: AuditEntry) -> anyhow::Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let _guard = self.lock.lock().await;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        let mut line = entry.to_line();
        line.push('\n');
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        info!(
            "Audit: {} on {} (ID: {}) by {}{}",
            entry.action,
            entry.entity.as_deref().unwrap_or("system"),
            entry
                .entity_id
                .map_or_else(|| NOT_AVAILABLE.to_string(), |id| id.to_string()),
            entry.actor(),
            entry
                .details
                .as_deref()
                .map_or_else(String::new, |d| format!(": {d}"))
        );
        Ok(())
    }
}
