//! Cron task management and execution.
//!
//! Shell tasks run through `/bin/sh -c`; prompt tasks run a captured
//! agent turn and archive the response in memory under
//! `cron/<task_id>/<now_ts>`. The whole TSV store is rewritten after
//! every mutation.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::process::Command;
use tracing::{info, warn};

use crate::agent::agent_loop::Agent;
use crate::agent::memory::MemoryStore;
use crate::cron::expr::{next_run_after, parse_cron_expr};
use crate::cron::types::{next_task_id, parse_tsv, serialize_tsv, CronTask};
use crate::errors::CronError;

/// Outcome of one executed task.
#[derive(Debug, Clone)]
pub struct TaskOutcome {
    pub task_id: String,
    pub success: bool,
    pub output: String,
}

/// Manages the persistent task list at one store path.
pub struct CronService {
    store_path: PathBuf,
    tasks: Vec<CronTask>,
}

impl CronService {
    /// Load the store, tolerating a missing file.
    pub fn load(store_path: PathBuf) -> Self {
        let tasks = std::fs::read_to_string(&store_path)
            .map(|content| parse_tsv(&content))
            .unwrap_or_default();
        Self { store_path, tasks }
    }

    pub fn tasks(&self) -> &[CronTask] {
        &self.tasks
    }

    /// Add a shell task. Validates the schedule and computes its first
    /// fire time from now.
    pub fn add(&mut self, schedule: &str, command: &str) -> Result<CronTask, CronError> {
        self.add_task(schedule, command.to_string(), String::new())
    }

    /// Add a prompt task (command is the `-` placeholder).
    pub fn add_prompt(&mut self, schedule: &str, prompt: &str) -> Result<CronTask, CronError> {
        self.add_task(schedule, "-".to_string(), prompt.to_string())
    }

    fn add_task(
        &mut self,
        schedule: &str,
        command: String,
        prompt: String,
    ) -> Result<CronTask, CronError> {
        let expr = parse_cron_expr(schedule)?;
        let task = CronTask {
            id: next_task_id(&self.tasks),
            schedule: schedule.trim().to_string(),
            command,
            enabled: true,
            last_run_unix: 0,
            next_run_unix: next_run_after(&expr, unix_now()),
            prompt,
        };
        self.tasks.push(task.clone());
        self.persist();
        info!("cron: added task {} ({})", task.id, task.schedule);
        Ok(task)
    }

    /// Remove a task by id.
    pub fn remove(&mut self, id: &str) -> Result<(), CronError> {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        if self.tasks.len() == before {
            return Err(CronError::UnknownTask(id.to_string()));
        }
        self.persist();
        Ok(())
    }

    /// Disable a task without removing it.
    pub fn pause(&mut self, id: &str) -> Result<(), CronError> {
        let task = self.find_mut(id)?;
        task.enabled = false;
        self.persist();
        Ok(())
    }

    /// Re-enable a task, recomputing its fire time when it had none.
    pub fn resume(&mut self, id: &str) -> Result<(), CronError> {
        let now = unix_now();
        let task = self.find_mut(id)?;
        task.enabled = true;
        if task.next_run_unix == 0 {
            if let Ok(expr) = parse_cron_expr(&task.schedule) {
                task.next_run_unix = next_run_after(&expr, now);
            }
        }
        self.persist();
        Ok(())
    }

    fn find_mut(&mut self, id: &str) -> Result<&mut CronTask, CronError> {
        self.tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| CronError::UnknownTask(id.to_string()))
    }

    /// Human-readable task table.
    pub fn list(&self) -> String {
        if self.tasks.is_empty() {
            return "(no scheduled tasks)".to_string();
        }
        self.tasks
            .iter()
            .map(|t| {
                let what = if t.is_prompt_task() {
                    format!("prompt: {}", t.prompt)
                } else {
                    format!("shell: {}", t.command)
                };
                format!(
                    "{}  [{}]  {}  next_run={}  {}",
                    t.id,
                    if t.enabled { "on" } else { "off" },
                    t.schedule,
                    t.next_run_unix,
                    what
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Execute every enabled task that is due at `now`, then reschedule
    /// and persist. Failures are recorded per task and never stop the run.
    pub async fn run_due(
        &mut self,
        agent: &Agent,
        memory: &MemoryStore,
        now: i64,
    ) -> Vec<TaskOutcome> {
        let due_ids: Vec<String> = self
            .tasks
            .iter()
            .filter(|t| t.is_due(now))
            .map(|t| t.id.clone())
            .collect();

        let mut outcomes = Vec::new();
        for id in due_ids {
            let task = match self.tasks.iter().find(|t| t.id == id) {
                Some(t) => t.clone(),
                None => continue,
            };
            info!("cron: running task {}", task.id);
            let outcome = if task.is_prompt_task() {
                run_prompt_task(agent, memory, &task, now).await
            } else {
                run_shell_task(&task).await
            };

            // Success or failure, the task moves to its next fire time.
            if let Ok(slot) = self.find_mut(&id) {
                slot.last_run_unix = now;
                slot.next_run_unix = match parse_cron_expr(&slot.schedule) {
                    Ok(expr) => next_run_after(&expr, now),
                    Err(e) => {
                        warn!("cron: task {} has unparseable schedule: {}", id, e);
                        now + 7 * 86_400
                    }
                };
            }
            outcomes.push(outcome);
        }
        self.persist();
        outcomes
    }

    /// Full-file rewrite of the TSV store.
    fn persist(&self) {
        if let Some(parent) = self.store_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        if let Err(e) = std::fs::write(&self.store_path, serialize_tsv(&self.tasks)) {
            warn!("cron: failed to persist store: {}", e);
        }
    }
}

async fn run_shell_task(task: &CronTask) -> TaskOutcome {
    let output = Command::new("/bin/sh")
        .arg("-c")
        .arg(&task.command)
        .output()
        .await;

    match output {
        Ok(output) => {
            let stdout = String::from_utf8_lossy(&output.stdout).to_string();
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            TaskOutcome {
                task_id: task.id.clone(),
                success: output.status.success(),
                output: if !stdout.is_empty() { stdout } else { stderr },
            }
        }
        Err(e) => TaskOutcome {
            task_id: task.id.clone(),
            success: false,
            output: format!("failed to spawn shell: {}", e),
        },
    }
}

async fn run_prompt_task(
    agent: &Agent,
    memory: &MemoryStore,
    task: &CronTask,
    now: i64,
) -> TaskOutcome {
    let (success, response) = match agent.run_once(&task.prompt).await {
        Ok(text) => (true, text),
        Err(e) => (false, format!("agent error: {}", e)),
    };

    let report = format!(
        "# Cron task {}\n\n- schedule: `{}`\n- prompt: {}\n\n## Response\n\n{}",
        task.id, task.schedule, task.prompt, response
    );
    let key = format!("cron/{}/{}", task.id, now);
    if let Err(e) = memory.store(&key, &report) {
        warn!("cron: failed to archive task output under {}: {}", key, e);
    }

    TaskOutcome {
        task_id: task.id.clone(),
        success,
        output: response,
    }
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
