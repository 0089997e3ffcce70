//! JSONL status logger with file rotation

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, warn};

use crate::error::Result;
use crate::telemetry::types::StatusRecord;

/// Telemetry filename prefix
const FILE_PREFIX: &str = "status-";

/// Telemetry filename suffix
const FILE_SUFFIX: &str = ".jsonl";

/// Writes status records to rotating JSONL files.
///
/// Files are named `status-<timestamp>-<seq>.jsonl`; the sequence number
/// keeps names unique when rotations land in the same second. Once a file
/// reaches the record limit a new one is started, and the oldest files are
/// removed until at most `max_files_to_keep` remain.
#[derive(Debug)]
pub struct StatusLogger {
    log_dir: PathBuf,
    max_records_per_file: usize,
    max_files_to_keep: usize,
    writer: Option<fs::File>,
    current_path: Option<PathBuf>,
    records_in_current: usize,
    seq: u32,
}

impl StatusLogger {
    /// Creates a logger. Nothing is written until the first record arrives.
    #[must_use]
    pub fn new(
        log_dir: impl Into<PathBuf>,
        max_records_per_file: usize,
        max_files_to_keep: usize,
    ) -> Self {
        Self {
            log_dir: log_dir.into(),
            max_records_per_file,
            max_files_to_keep,
            writer: None,
            current_path: None,
            records_in_current: 0,
            seq: 0,
        }
    }

    /// Appends one record, rotating files when the record limit is reached.
    ///
    /// # Errors
    ///
    /// Returns an error if the log directory cannot be created, the file
    /// cannot be written, or the record fails to serialize.
    pub fn log(&mut self, record: &StatusRecord) -> Result<()> {
        if self.writer.is_none() || self.records_in_current >= self.max_records_per_file {
            self.rotate()?;
        }

        let line = serde_json::to_string(record)?;
        if let Some(writer) = self.writer.as_mut() {
            writer.write_all(line.as_bytes())?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }
        self.records_in_current += 1;
        Ok(())
    }

    /// Returns the path of the file currently being written, if any.
    #[must_use]
    pub fn current_file(&self) -> Option<&Path> {
        self.current_path.as_deref()
    }

    fn rotate(&mut self) -> Result<()> {
        fs::create_dir_all(&self.log_dir)?;

        self.seq += 1;
        let name = format!(
            "{}{}-{:04}{}",
            FILE_PREFIX,
            Utc::now().format("%Y%m%d-%H%M%S"),
            self.seq,
            FILE_SUFFIX
        );
        let path = self.log_dir.join(name);
        let file = fs::File::create(&path)?;
        debug!("Rotated telemetry log to {}", path.display());

        self.writer = Some(file);
        self.current_path = Some(path);
        self.records_in_current = 0;

        self.prune_old_files()?;
        Ok(())
    }

    fn prune_old_files(&self) -> Result<()> {
        let mut files: Vec<PathBuf> = fs::read_dir(&self.log_dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .map(|name| name.starts_with(FILE_PREFIX) && name.ends_with(FILE_SUFFIX))
                    .unwrap_or(false)
            })
            .collect();

        if files.len() <= self.max_files_to_keep {
            return Ok(());
        }

        // Timestamp plus sequence sorts oldest first
        files.sort();
        let excess = files.len() - self.max_files_to_keep;
        for path in files.into_iter().take(excess) {
            if let Err(error) = fs::remove_file(&path) {
                warn!(
                    "Failed to remove old telemetry file {}: {}",
                    path.display(),
                    error
                );
            }
        }
        Ok(())
    }
}
