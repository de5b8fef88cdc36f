//! Cron task records and their TSV persistence format.
//!
//! One task per line at `~/.bareclaw/cron.tsv`, seven TAB-separated
//! fields: id, schedule, command, enabled, last_run, next_run, prompt.
//! Lines whose first non-whitespace character is `#` are comments.

/// A persisted scheduled task.
///
/// A task is a *prompt task* iff `prompt` is non-empty (then `command`
/// holds the placeholder `-`); otherwise it is a *shell task*.
/// `next_run_unix == 0` means "due immediately".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronTask {
    pub id: String,
    pub schedule: String,
    pub command: String,
    pub enabled: bool,
    pub last_run_unix: i64,
    pub next_run_unix: i64,
    pub prompt: String,
}

impl CronTask {
    pub fn is_prompt_task(&self) -> bool {
        !self.prompt.is_empty()
    }

    /// Whether the task should run at `now`.
    pub fn is_due(&self, now: i64) -> bool {
        self.enabled && (self.next_run_unix == 0 || now >= self.next_run_unix)
    }

    /// Parse one TSV record. Comments, blank lines, and records with fewer
    /// than three fields yield `None`. Missing trailing fields default to
    /// enabled=1, last_run=0, next_run=0, prompt="".
    pub fn parse_line(line: &str) -> Option<CronTask> {
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return None;
        }
        // The prompt is the final field; splitn keeps any tabs inside it.
        let fields: Vec<&str> = line.splitn(7, '\t').collect();
        if fields.len() < 3 {
            return None;
        }
        Some(CronTask {
            id: fields[0].to_string(),
            schedule: fields[1].to_string(),
            command: fields[2].to_string(),
            enabled: fields.get(3).map(|f| *f != "0").unwrap_or(true),
            last_run_unix: fields
                .get(4)
                .and_then(|f| f.parse().ok())
                .unwrap_or(0),
            next_run_unix: fields
                .get(5)
                .and_then(|f| f.parse().ok())
                .unwrap_or(0),
            prompt: fields.get(6).map(|f| f.to_string()).unwrap_or_default(),
        })
    }

    /// Render the full seven-field TSV record.
    pub fn to_line(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.id,
            self.schedule,
            self.command,
            if self.enabled { 1 } else { 0 },
            self.last_run_unix,
            self.next_run_unix,
            self.prompt
        )
    }
}

/// Parse a whole TSV document.
pub fn parse_tsv(content: &str) -> Vec<CronTask> {
    content.lines().filter_map(CronTask::parse_line).collect()
}

/// Serialize all tasks, with a header comment describing the columns.
pub fn serialize_tsv(tasks: &[CronTask]) -> String {
    let mut out =
        String::from("# id\tschedule\tcommand\tenabled\tlast_run\tnext_run\tprompt\n");
    for task in tasks {
        out.push_str(&task.to_line());
        out.push('\n');
    }
    out
}

/// Allocate the next task id: `t<N>` with N = max existing + 1.
pub fn next_task_id(tasks: &[CronTask]) -> String {
    let max = tasks
        .iter()
        .filter_map(|t| t.id.strip_prefix('t'))
        .filter_map(|n| n.parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    format!("t{}", max + 1)
}
