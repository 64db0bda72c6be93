use std::path::{Path, PathBuf};

use anyhow::Context;
use tokio::{
    fs::{self, OpenOptions},
    io::AsyncWriteExt,
    sync::Mutex,
};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const SEPARATOR: &str = " - ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: String,
    pub message: String,
}

impl LogEntry {
    /// Splits a stored line once on the first ` - `. A line without the
    /// separator keeps everything in the message.
    pub fn parse_line(line: &str) -> Self {
        match line.split_once(SEPARATOR) {
            Some((timestamp, message)) => LogEntry {
                timestamp: timestamp.to_string(),
                message: message.to_string(),
            },
            None => LogEntry {
                timestamp: String::new(),
                message: line.to_string(),
            },
        }
    }

    fn format_line(message: &str) -> String {
        let timestamp = chrono::Local::now().format(TIMESTAMP_FORMAT);
        // one entry per line, embedded newlines would split it
        let message = message.replace(['\r', '\n'], " ");
        format!("{timestamp}{SEPARATOR}{message}\n")
    }
}

/// Append-only activity log stored as a flat text file.
///
/// Appends go through a mutex so concurrent requests never interleave partial
/// lines. With `max_bytes` set the file is moved to `<path>.1` before an append
/// would push it over the limit, otherwise it grows without bound.
#[derive(Debug)]
pub struct ActivityLog {
    path: PathBuf,
    max_bytes: Option<u64>,
    write_lock: Mutex<()>,
}

impl ActivityLog {
    pub async fn open(path: impl Into<PathBuf>, max_bytes: Option<u64>) -> anyhow::Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
        }

        let log = ActivityLog {
            path,
            max_bytes,
            write_lock: Mutex::new(()),
        };

        if !fs::try_exists(&log.path).await.unwrap_or(false) {
            log.write_line(&LogEntry::format_line("Log file created"))
                .await?;
            tracing::debug!("Created activity log at {}", log.path.display());
        }

        Ok(log)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn append(&self, message: &str) -> anyhow::Result<()> {
        let line = LogEntry::format_line(message);
        let _guard = self.write_lock.lock().await;

        if let Some(max_bytes) = self.max_bytes {
            self.rotate_if_needed(max_bytes, line.len() as u64).await?;
        }

        self.write_line(&line).await
    }

    pub async fn read_entries(&self) -> anyhow::Result<Vec<LogEntry>> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to read activity log {}", self.path.display())
                })
            }
        };

        Ok(contents
            .lines()
            .filter(|line| !line.is_empty())
            .map(LogEntry::parse_line)
            .collect())
    }

    async fn rotate_if_needed(&self, max_bytes: u64, incoming: u64) -> anyhow::Result<()> {
        let current = match fs::metadata(&self.path).await {
            Ok(metadata) => metadata.len(),
            Err(_) => 0,
        };

        if current == 0 || current + incoming <= max_bytes {
            return Ok(());
        }

        let mut rotated = self.path.clone().into_os_string();
        rotated.push(".1");
        fs::rename(&self.path, &rotated)
            .await
            .context("Failed to rotate activity log")?;

        tracing::info!(
            "Rotated activity log {} after reaching {} bytes",
            self.path.display(),
            current
        );

        self.write_line(&LogEntry::format_line("Log file rotated"))
            .await
    }

    async fn write_line(&self, line: &str) -> anyhow::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("Failed to open activity log {}", self.path.display()))?;

        file.write_all(line.as_bytes())
            .await
            .context("Failed to write to activity log")?;
        file.flush().await.context("Failed to flush activity log")?;

        Ok(())
    }
}
