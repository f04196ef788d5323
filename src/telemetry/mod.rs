//! # Telemetry Module
//!
//! Light trace recorder writing JSONL files with rotation.
//!
//! This module handles:
//! - Sampling the car state at a fixed interval
//! - Formatting records as JSONL (one JSON object per line)
//! - Rotating to a new file after N records
//! - Retaining only the newest M files
//!
//! Files are named `lights_<local time>_<index>.jsonl` so that name order is
//! creation order.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::TelemetryConfig;
use crate::error::Result;
use crate::lights::LightStatus;
use crate::remote::ChannelSnapshot;

const FILE_PREFIX: &str = "lights_";
const FILE_EXTENSION: &str = "jsonl";

/// One line of the trace.
#[derive(Debug, Serialize)]
pub struct TelemetryRecord<'a> {
    /// Wall-clock time, RFC 3339
    pub timestamp: String,
    /// Car clock reading
    pub uptime_ms: u32,
    pub inputs: &'a ChannelSnapshot,
    pub lights: &'a LightStatus,
    pub headlight_percent: u8,
}

/// Rotating JSONL writer.
#[derive(Debug)]
pub struct TelemetryRecorder {
    config: TelemetryConfig,
    dir: PathBuf,
    writer: Option<BufWriter<File>>,
    current_path: Option<PathBuf>,
    records_in_file: usize,
    file_index: u32,
    last_record_ms: Option<u32>,
}

impl TelemetryRecorder {
    /// Creates the log directory if needed. No file is opened until the
    /// first record.
    ///
    /// # Errors
    ///
    /// Returns `LightsError::Io` if the directory cannot be created.
    pub fn new(config: &TelemetryConfig) -> Result<Self> {
        let dir = PathBuf::from(&config.log_dir);
        fs::create_dir_all(&dir)?;
        info!("Telemetry enabled, writing to {}", dir.display());

        Ok(Self {
            config: config.clone(),
            dir,
            writer: None,
            current_path: None,
            records_in_file: 0,
            file_index: 0,
            last_record_ms: None,
        })
    }

    /// Writes a record if `log_interval_ms` has passed since the previous one.
    ///
    /// # Returns
    ///
    /// `true` if a record was written.
    ///
    /// # Errors
    ///
    /// Returns `LightsError::Io` on file errors and `LightsError::Telemetry`
    /// if the record cannot be serialized.
    pub fn record(
        &mut self,
        uptime_ms: u32,
        inputs: &ChannelSnapshot,
        lights: &LightStatus,
        headlight_percent: u8,
    ) -> Result<bool> {
        if let Some(last) = self.last_record_ms {
            if uptime_ms.wrapping_sub(last) < self.config.log_interval_ms {
                return Ok(false);
            }
        }

        let record = TelemetryRecord {
            timestamp: Local::now().to_rfc3339(),
            uptime_ms,
            inputs,
            lights,
            headlight_percent,
        };
        let line = serde_json::to_string(&record)?;

        if self.writer.is_none() || self.records_in_file >= self.config.max_records_per_file {
            self.rotate()?;
        }
        if let Some(writer) = self.writer.as_mut() {
            writeln!(writer, "{}", line)?;
            writer.flush()?;
        }

        self.records_in_file += 1;
        self.last_record_ms = Some(uptime_ms);
        Ok(true)
    }

    /// File currently written to.
    pub fn current_path(&self) -> Option<&Path> {
        self.current_path.as_deref()
    }

    fn rotate(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }

        let name = format!(
            "{}{}_{:04}.{}",
            FILE_PREFIX,
            Local::now().format("%Y%m%d_%H%M%S"),
            self.file_index,
            FILE_EXTENSION
        );
        let path = self.dir.join(name);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        debug!("Telemetry file {}", path.display());

        self.writer = Some(BufWriter::new(file));
        self.current_path = Some(path);
        self.records_in_file = 0;
        self.file_index += 1;

        self.prune()
    }

    /// Deletes the oldest trace files beyond `max_files_to_keep`.
    fn prune(&self) -> Result<()> {
        let mut files = trace_files(&self.dir)?;
        let excess = files.len().saturating_sub(self.config.max_files_to_keep);
        for path in files.drain(..excess) {
            debug!("Removing old telemetry file {}", path.display());
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

/// Trace files in `dir`, oldest first.
pub fn trace_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            name.starts_with(FILE_PREFIX)
                && path.extension().is_some_and(|ext| ext == FILE_EXTENSION)
        })
        .collect();
    files.sort();
    Ok(files)
}
