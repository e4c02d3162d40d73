use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "bilreg=info";

/// Install the stderr `tracing` subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub target: Option<String>,
    pub event: String,
    pub details: Option<String>,
}

impl LogEntry {
    fn line(&self) -> String {
        let level = match self.level {
            LogLevel::Info => "🟢",
            LogLevel::Error => "🔴",
        };
        format!(
            "{} {} {} {} {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            level,
            self.event,
            self.target.as_deref().unwrap_or("*"),
            self.details.as_deref().unwrap_or("")
        )
    }
}

/// Append-only record of lookups and refreshes, one line per operation.
#[derive(Debug, Clone)]
pub struct ActivityLogger {
    log_path: PathBuf,
}

impl ActivityLogger {
    /// Logger writing to `~/.bilreg/activity.log`.
    pub fn new() -> crate::Result<Self> {
        let user_dirs = directories::UserDirs::new().ok_or_else(|| {
            crate::BilregError::Other("could not determine home directory".into())
        })?;
        Self::in_dir(user_dirs.home_dir().join(".bilreg"))
    }

    pub fn in_dir(dir: impl AsRef<Path>) -> crate::Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        Ok(Self {
            log_path: dir.join("activity.log"),
        })
    }

    pub fn path(&self) -> &Path {
        &self.log_path
    }

    pub fn log(
        &self,
        level: LogLevel,
        target: Option<&str>,
        event: &str,
        details: Option<&str>,
    ) -> crate::Result<()> {
        let entry = LogEntry {
            timestamp: Utc::now(),
            level,
            target: target.map(str::to_string),
            event: event.to_string(),
            details: details.map(str::to_string),
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)?;
        writeln!(file, "{}", entry.line())?;

        Ok(())
    }

    pub fn info(&self, target: Option<&str>, event: &str, details: Option<&str>) -> crate::Result<()> {
        self.log(LogLevel::Info, target, event, details)
    }

    pub fn error(&self, target: Option<&str>, event: &str, details: Option<&str>) -> crate::Result<()> {
        self.log(LogLevel::Error, target, event, details)
    }
}
