//! Append-only audit trail for tool invocations.
//!
//! One TAB-separated line per tool call: `<unix_ts>\t<tool>\t<detail>\n`,
//! written before the tool's side effect. Best-effort: an audit write
//! failure never aborts the tool call.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::debug;

/// Append-only per-event log at `<workspace>/audit.log`.
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn new(workspace: &Path) -> Self {
        Self {
            path: workspace.join("audit.log"),
        }
    }

    /// Append one entry. Invoked before tool execution.
    pub fn append(&self, tool_name: &str, detail: &str) {
        let ts = unix_now();
        // Keep the record single-line and TAB-clean.
        let detail: String = detail
            .chars()
            .map(|c| if c == '\n' || c == '\t' { ' ' } else { c })
            .collect();
        let line = format!("{}\t{}\t{}\n", ts, tool_name, detail);

        if let Some(parent) = self.path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut f| f.write_all(line.as_bytes()));
        if let Err(e) = result {
            debug!("audit log write failed: {}", e);
        }
    }

    /// The last `n` lines of the log, or a placeholder when empty.
    pub fn read_last(&self, n: usize) -> String {
        let contents = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(_) => return "(audit log is empty)".to_string(),
        };
        let lines: Vec<&str> = contents.lines().collect();
        if lines.is_empty() {
            return "(audit log is empty)".to_string();
        }
        let start = lines.len().saturating_sub(n);
        lines[start..].join("\n")
    }

    /// Number of entries currently in the log.
    pub fn entry_count(&self) -> usize {
        fs::read_to_string(&self.path)
            .map(|c| c.lines().count())
            .unwrap_or(0)
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_log() -> (TempDir, AuditLog) {
        let tmp = TempDir::new().unwrap();
        let log = AuditLog::new(tmp.path());
        (tmp, log)
    }

    #[test]
    fn test_append_creates_file() {
        let (tmp, log) = make_log();
        log.append("shell", "ls -la");
        assert!(tmp.path().join("audit.log").exists());
    }

    #[test]
    fn test_entry_format() {
        let (tmp, log) = make_log();
        log.append("file_read", "notes.md");

        let contents = fs::read_to_string(tmp.path().join("audit.log")).unwrap();
        let fields: Vec<&str> = contents.trim_end().split('\t').collect();
        assert_eq!(fields.len(), 3);
        let ts: u64 = fields[0].parse().expect("timestamp field");
        assert!(ts <= unix_now());
        assert_eq!(fields[1], "file_read");
        assert_eq!(fields[2], "notes.md");
    }

    #[test]
    fn test_append_order_preserved() {
        let (tmp, log) = make_log();
        log.append("shell", "first");
        log.append("shell", "second");
        log.append("http_request", "third");

        let contents = fs::read_to_string(tmp.path().join("audit.log")).unwrap();
        let details: Vec<&str> = contents
            .lines()
            .map(|l| l.split('\t').nth(2).unwrap())
            .collect();
        assert_eq!(details, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_detail_newlines_flattened() {
        let (tmp, log) = make_log();
        log.append("shell", "line1\nline2\tcol");
        let contents = fs::read_to_string(tmp.path().join("audit.log")).unwrap();
        assert_eq!(contents.lines().count(), 1);
        assert!(contents.contains("line1 line2 col"));
    }

    #[test]
    fn test_read_last_limits_lines() {
        let (_tmp, log) = make_log();
        for i in 0..10 {
            log.append("shell", &format!("cmd{}", i));
        }
        let tail = log.read_last(3);
        assert_eq!(tail.lines().count(), 3);
        assert!(tail.contains("cmd9"));
        assert!(!tail.contains("cmd6"));
    }

    #[test]
    fn test_read_last_empty() {
        let (_tmp, log) = make_log();
        assert_eq!(log.read_last(50), "(audit log is empty)");
    }

    #[test]
    fn test_entry_count() {
        let (_tmp, log) = make_log();
        assert_eq!(log.entry_count(), 0);
        log.append("shell", "x");
        log.append("shell", "y");
        assert_eq!(log.entry_count(), 2);
    }
}
