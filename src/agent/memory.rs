//! Persistent key/value memory backed by one markdown file per key.
//!
//! Keys may contain `/` separators (`cron/t1/1700000000`), which map to
//! nested directories under `<workspace>/memory/`.

use std::fs;
use std::path::{Path, PathBuf};

/// File-per-key store rooted at `<workspace>/memory/`.
pub struct MemoryStore {
    memory_dir: PathBuf,
}

impl MemoryStore {
    /// Create a store for the given workspace. The memory directory is
    /// created lazily on first write.
    pub fn new(workspace: &Path) -> Self {
        Self {
            memory_dir: workspace.join("memory"),
        }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.memory_dir.join(format!("{}.md", key))
    }

    /// Write `content` (plus a trailing newline) under `key`, truncating
    /// any existing entry and creating nested parent directories.
    pub fn store(&self, key: &str, content: &str) -> std::io::Result<()> {
        let path = self.key_path(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, format!("{}\n", content))
    }

    /// Recall by exact key, falling back to a substring scan over all
    /// entry names. Matched entries are concatenated with `---`
    /// separators, each prefixed by its key.
    pub fn recall(&self, key: &str) -> String {
        let exact = self.key_path(key);
        if exact.is_file() {
            return fs::read_to_string(&exact).unwrap_or_default();
        }
        if !self.memory_dir.exists() {
            return "(no memory yet)".to_string();
        }

        let mut matches: Vec<String> = Vec::new();
        for (stem, path) in self.collect_entries() {
            if stem.contains(key) {
                let body = fs::read_to_string(&path).unwrap_or_default();
                matches.push(format!("{}:\n{}", stem, body));
            }
        }
        if matches.is_empty() {
            return "(no matching memory found)".to_string();
        }
        matches.join("\n---\n")
    }

    /// Delete the entry for `key`. Deleting a missing key is a no-op.
    pub fn forget(&self, key: &str) -> std::io::Result<()> {
        match fs::remove_file(self.key_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// All entry keys, newline-separated.
    pub fn list_keys(&self) -> String {
        let entries = self.collect_entries();
        if entries.is_empty() {
            return "(no memory entries)".to_string();
        }
        entries
            .into_iter()
            .map(|(stem, _)| stem)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Delete every entry whose key starts with `prefix`; returns the count.
    pub fn delete_prefix(&self, prefix: &str) -> usize {
        let mut removed = 0;
        for (stem, path) in self.collect_entries() {
            if stem.starts_with(prefix) && fs::remove_file(&path).is_ok() {
                removed += 1;
            }
        }
        removed
    }

    /// Number of stored entries.
    pub fn entry_count(&self) -> usize {
        self.collect_entries().len()
    }

    /// All `.md` entries as `(key, path)`, sorted by key for deterministic
    /// output. Keys are paths relative to the memory dir with `.md` stripped.
    fn collect_entries(&self) -> Vec<(String, PathBuf)> {
        let mut out = Vec::new();
        collect_into(&self.memory_dir, &self.memory_dir, &mut out);
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }
}

fn collect_into(root: &Path, dir: &Path, out: &mut Vec<(String, PathBuf)>) {
    let entries = match fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return,
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_into(root, &path, out);
        } else if path.extension().and_then(|e| e.to_str()) == Some("md") {
            if let Ok(rel) = path.strip_prefix(root) {
                let stem = rel.to_string_lossy();
                let stem = stem.strip_suffix(".md").unwrap_or(&stem).to_string();
                out.push((stem, path));
            }
        }
    }
}
