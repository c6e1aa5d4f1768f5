use anyhow::Result;
use chrono::Utc;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::data::types::EnrichedMessage;

pub struct CsvSignalLogger {
    log_path: PathBuf,
}

impl CsvSignalLogger {
    pub fn new(log_path: impl AsRef<Path>) -> Result<Self> {
        let log_path = log_path.as_ref().to_path_buf();

        // Create CSV file with headers if it doesn't exist
        if !log_path.exists() {
            let mut file = OpenOptions::new()
                .create(true)
                .write(true)
                .open(&log_path)?;

            writeln!(file, "timestamp,symbol,sentiment_score,sentiment_signal")?;
        }

        Ok(Self { log_path })
    }

    /// Append one row for an enriched message
    pub fn log_signal(&self, message: &EnrichedMessage) -> Result<()> {
        let mut file = OpenOptions::new().append(true).open(&self.log_path)?;

        writeln!(
            file,
            "{},{},{:.4},{}",
            Utc::now().to_rfc3339(),
            csv_field(&message.symbol()),
            message.score(),
            message.signal()
        )?;

        Ok(())
    }

    /// Log a rejected message
    pub fn log_event(&self, event: &str) -> Result<()> {
        let mut file = OpenOptions::new().append(true).open(&self.log_path)?;

        writeln!(file, "{},EVENT,,{}", Utc::now().to_rfc3339(), csv_field(event))?;

        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.log_path
    }
}

fn csv_field(text: &str) -> String {
    if text.contains(&[',', '"', '\n', '\r'][..]) {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text.to_string()
    }
}
