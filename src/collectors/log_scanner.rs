//! Bounded-window scanning of the OS system log
//!
//! The scanner reads the journal backward in time in page-sized batches,
//! formats each Error/Warning record, classifies it against the keyword
//! filter, and stops the whole scan at the first record older than the
//! window boundary. The provider guarantees records are time-ordered
//! within and across batches, so once one record falls outside the window
//! every later record does too.
//!
//! The production provider is a `journalctl --reverse` subprocess whose
//! JSON output is consumed in page-sized line batches. A provider that
//! cannot be opened yields an empty scan and a diagnostic; the monitoring
//! loop continues regardless.

use crate::error::ScanError;
use crate::events::{LogRecord, LogSeverity, Timestamp};
use crate::rules::KeywordFilter;
use chrono::{Duration, TimeZone, Utc};
use log::{debug, warn};
use serde_json::Value;
use std::io::{BufRead, BufReader};
use std::process::{Child, ChildStdout, Command, Stdio};

/// Placeholder used when a record's message cannot be formatted
const UNFORMATTABLE_MESSAGE: &str = "(message unavailable)";

/// A handle to one open, reverse-chronological read of the system log
pub trait LogStream {
    /// Read the next batch of records, newest first
    ///
    /// An empty batch means the log is exhausted.
    fn read_batch(&mut self) -> Result<Vec<LogRecord>, ScanError>;
}

/// Factory for log read sessions; one session is opened per scan
pub trait LogSource: Send {
    /// Open a new reverse-chronological read over the system log
    fn open(&self) -> Result<Box<dyn LogStream>, ScanError>;
}

/// System log source backed by a `journalctl` subprocess
///
/// `journalctl --reverse` emits records newest first, matching the
/// scanner's backward read; batches are cut from the subprocess output
/// `page_size` lines at a time.
pub struct JournalSource {
    page_size: usize,
}

impl JournalSource {
    pub fn new(page_size: usize) -> Self {
        Self { page_size }
    }
}

impl LogSource for JournalSource {
    fn open(&self) -> Result<Box<dyn LogStream>, ScanError> {
        let mut child = Command::new("journalctl")
            .args([
                "--system",
                "--reverse",
                "--output=json",
                "--quiet",
                "--no-pager",
            ])
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| ScanError::ProviderOpen(format!("journalctl: {}", e)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ScanError::ProviderOpen("journalctl produced no stdout".to_string()))?;

        Ok(Box::new(JournalStream {
            child,
            reader: BufReader::new(stdout),
            page_size: self.page_size,
        }))
    }
}

struct JournalStream {
    child: Child,
    reader: BufReader<ChildStdout>,
    page_size: usize,
}

impl LogStream for JournalStream {
    fn read_batch(&mut self) -> Result<Vec<LogRecord>, ScanError> {
        let mut batch = Vec::with_capacity(self.page_size);
        let mut line = String::new();

        while batch.len() < self.page_size {
            line.clear();
            let read = self.reader.read_line(&mut line)?;
            if read == 0 {
                // journal exhausted
                break;
            }
            if line.trim().is_empty() {
                continue;
            }
            match parse_journal_record(&line) {
                Some(record) => batch.push(record),
                None => debug!("skipping unparseable journal line"),
            }
        }

        Ok(batch)
    }
}

impl Drop for JournalStream {
    fn drop(&mut self) {
        // The subprocess usually outlives the scan because the window
        // boundary stops reading early.
        if let Err(e) = self.child.kill() {
            debug!("failed to kill journalctl subprocess: {}", e);
        }
        let _ = self.child.wait();
    }
}

/// Parse one journald JSON record
///
/// Returns `None` for lines that are not records at all. A record whose
/// MESSAGE field is missing or non-textual (journald stores binary
/// payloads as byte arrays) still parses, with a placeholder message.
fn parse_journal_record(line: &str) -> Option<LogRecord> {
    let value: Value = serde_json::from_str(line).ok()?;

    let timestamp = parse_realtime_timestamp(&value)?;

    let source = value
        .get("SYSLOG_IDENTIFIER")
        .or_else(|| value.get("_COMM"))
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string();

    // journald priorities: 0-3 are emerg through err, 4 is warning.
    let severity = match value.get("PRIORITY").and_then(Value::as_str) {
        Some("0") | Some("1") | Some("2") | Some("3") => LogSeverity::Error,
        Some("4") => LogSeverity::Warning,
        _ => LogSeverity::Other,
    };

    let message = match value.get("MESSAGE") {
        Some(Value::String(text)) => text.clone(),
        _ => UNFORMATTABLE_MESSAGE.to_string(),
    };

    Some(LogRecord {
        timestamp,
        source,
        severity,
        message,
    })
}

fn parse_realtime_timestamp(value: &Value) -> Option<Timestamp> {
    let micros: i64 = value
        .get("__REALTIME_TIMESTAMP")?
        .as_str()?
        .parse()
        .ok()?;
    Utc.timestamp_micros(micros).single()
}

/// Scans the trailing window of the system log for alert-worthy records
pub struct LogWindowScanner {
    source: Box<dyn LogSource>,
    filter: KeywordFilter,
    window: Duration,
}

impl LogWindowScanner {
    /// Create a scanner over the given source
    ///
    /// # Arguments
    ///
    /// * `source` - Log provider opened fresh for every scan
    /// * `filter` - Keyword filter applied to formatted lines
    /// * `window` - Trailing time span within which records are considered
    pub fn new(source: Box<dyn LogSource>, filter: KeywordFilter, window: Duration) -> Self {
        Self {
            source,
            filter,
            window,
        }
    }

    /// Scan the trailing window, returning formatted alert lines newest first
    pub fn scan(&self) -> Vec<String> {
        self.scan_at(Utc::now())
    }

    /// Scan with an explicit "now", captured once for the whole scan
    ///
    /// Only Error and Warning records are considered. A provider open
    /// failure yields an empty result; a mid-scan read failure yields the
    /// alerts collected so far. Neither is fatal to the caller.
    pub fn scan_at(&self, now: Timestamp) -> Vec<String> {
        let boundary = now - self.window;

        let mut stream = match self.source.open() {
            Ok(stream) => stream,
            Err(e) => {
                warn!("System log unavailable, skipping scan: {}", e);
                return Vec::new();
            }
        };

        let mut alerts = Vec::new();
        loop {
            let batch = match stream.read_batch() {
                Ok(batch) => batch,
                Err(e) => {
                    warn!("Log read failed, returning partial scan: {}", e);
                    return alerts;
                }
            };
            if batch.is_empty() {
                return alerts;
            }

            for record in batch {
                if record.timestamp < boundary {
                    // Records arrive newest first, so everything beyond this
                    // one is outside the window as well.
                    return alerts;
                }
                if !matches!(record.severity, LogSeverity::Error | LogSeverity::Warning) {
                    continue;
                }
                let line = record.display_line();
                if self.filter.classify(&line) {
                    alerts.push(line);
                }
            }
        }
    }
}
