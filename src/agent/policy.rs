//! Security policy: path allowlisting and shell command blocklisting.
//!
//! Every tool call traverses this policy before execution. It is
//! defense-in-depth against an over-eager model, not an OS sandbox.

use std::path::{Path, PathBuf};

/// Path prefixes that are never readable or writable.
const FORBIDDEN_PREFIXES: &[&str] = &["/etc/", "/root/", "/usr/", "/proc/", "/sys/", "/dev/"];

/// Substrings that mark a path as sensitive wherever it appears.
const SENSITIVE_SEGMENTS: &[&str] = &["/.ssh", "/.gnupg", "/.aws", "/.bareclaw/secrets"];

/// Shell command prefixes that are always blocked.
const BLOCKED_COMMAND_PREFIXES: &[&str] = &["rm ", "rm\t", "unlink ", "rmdir ", "shred ", "dd "];

/// Shell command substrings that are blocked unless `echo` also appears
/// (the safety valve for printing these strings literally).
const BLOCKED_COMMAND_SUBSTRINGS: &[&str] = &[
    "/bin/rm",
    "/usr/bin/rm",
    "> /",
    "mkfs",
    "fdisk",
    "parted",
    ":(){",
];

/// Immutable per-process security policy scoped to one workspace directory.
#[derive(Debug, Clone)]
pub struct SecurityPolicy {
    workspace_dir: PathBuf,
}

impl SecurityPolicy {
    /// Create a policy for the given workspace root.
    ///
    /// The workspace dir must be absolute and exist for the lifetime of the
    /// process; [`crate::config::loader::ensure_workspace`] guarantees both.
    pub fn new(workspace_dir: PathBuf) -> Self {
        Self { workspace_dir }
    }

    pub fn workspace_dir(&self) -> &Path {
        &self.workspace_dir
    }

    /// Whether a path may be read or written by a tool.
    ///
    /// Rejects traversal (`..` segments), system prefixes, and sensitive
    /// locations. Absolute paths must live under the workspace; relative
    /// paths are accepted and resolved against the workspace by the caller.
    pub fn allow_path(&self, path: &str) -> bool {
        if path.split('/').any(|segment| segment == "..") {
            return false;
        }
        for prefix in FORBIDDEN_PREFIXES {
            if path.starts_with(prefix) {
                return false;
            }
        }
        for segment in SENSITIVE_SEGMENTS {
            if path.contains(segment) {
                return false;
            }
        }
        if path.starts_with('/') {
            let workspace = self.workspace_dir.to_string_lossy();
            if !path.starts_with(workspace.as_ref()) {
                return false;
            }
        }
        true
    }

    /// Whether a shell command passes the destructive-command blocklist.
    pub fn allow_shell_command(&self, command: &str) -> bool {
        let cmd = command.trim_start();
        for prefix in BLOCKED_COMMAND_PREFIXES {
            if cmd.starts_with(prefix) {
                return false;
            }
        }
        let has_echo = cmd.contains("echo");
        for pattern in BLOCKED_COMMAND_SUBSTRINGS {
            if cmd.contains(pattern) && !has_echo {
                return false;
            }
        }
        true
    }

    /// Resolve a tool-supplied path against the workspace.
    ///
    /// Absolute paths pass through; relative paths are joined onto the
    /// workspace root. Callers must have checked [`allow_path`] first.
    pub fn resolve(&self, path: &str) -> PathBuf {
        let p = Path::new(path);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.workspace_dir.join(p)
        }
    }

    /// One-line summary for status output.
    pub fn summary(&self) -> String {
        format!(
            "paths confined to {}, destructive shell commands blocked",
            self.workspace_dir.display()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> SecurityPolicy {
        SecurityPolicy::new(PathBuf::from("/home/user/.bareclaw/workspace"))
    }

    // ----- allow_path -----

    #[test]
    fn test_rejects_parent_traversal() {
        let p = policy();
        assert!(!p.allow_path("../etc/passwd"));
        assert!(!p.allow_path("notes/../../secret"));
        assert!(!p.allow_path(".."));
    }

    #[test]
    fn test_dotdot_as_filename_prefix_is_not_traversal() {
        let p = policy();
        // "..foo" is a legitimate filename, not a traversal segment.
        assert!(p.allow_path("..foo/notes.md"));
    }

    #[test]
    fn test_rejects_forbidden_prefixes() {
        let p = policy();
        for path in [
            "/etc/passwd",
            "/root/.bashrc",
            "/usr/bin/env",
            "/proc/self/environ",
            "/sys/kernel",
            "/dev/sda",
        ] {
            assert!(!p.allow_path(path), "{} should be rejected", path);
        }
    }

    #[test]
    fn test_rejects_sensitive_segments() {
        let p = policy();
        assert!(!p.allow_path("/home/user/.ssh/id_rsa"));
        assert!(!p.allow_path("backup/.gnupg/keys"));
        assert!(!p.allow_path("copies/.aws/credentials"));
        assert!(!p.allow_path("/home/user/.bareclaw/secrets/api_key"));
    }

    #[test]
    fn test_absolute_path_must_be_in_workspace() {
        let p = policy();
        assert!(p.allow_path("/home/user/.bareclaw/workspace/notes.md"));
        assert!(!p.allow_path("/home/user/documents/notes.md"));
        assert!(!p.allow_path("/tmp/file"));
    }

    #[test]
    fn test_relative_paths_accepted() {
        let p = policy();
        assert!(p.allow_path("notes.md"));
        assert!(p.allow_path("deep/nested/file.txt"));
    }

    // ----- allow_shell_command -----

    #[test]
    fn test_blocks_rm_prefix() {
        let p = policy();
        assert!(!p.allow_shell_command("rm -rf /"));
        assert!(!p.allow_shell_command("  rm file.txt"));
        assert!(!p.allow_shell_command("rm\t-r dir"));
    }

    #[test]
    fn test_blocks_other_destructive_prefixes() {
        let p = policy();
        assert!(!p.allow_shell_command("unlink file"));
        assert!(!p.allow_shell_command("rmdir dir"));
        assert!(!p.allow_shell_command("shred -u secrets.txt"));
        assert!(!p.allow_shell_command("dd if=/dev/zero of=/dev/sda"));
    }

    #[test]
    fn test_blocks_substring_patterns() {
        let p = policy();
        assert!(!p.allow_shell_command("find . -exec /bin/rm {} \\;"));
        assert!(!p.allow_shell_command("cat x > /etc/hosts"));
        assert!(!p.allow_shell_command("mkfs.ext4 /dev/sdb1"));
        assert!(!p.allow_shell_command(":(){ :|:& };:"));
    }

    #[test]
    fn test_echo_suppresses_substring_match() {
        let p = policy();
        assert!(p.allow_shell_command("echo 'never run mkfs on a live disk'"));
        assert!(p.allow_shell_command("echo /bin/rm is dangerous"));
    }

    #[test]
    fn test_echo_does_not_suppress_prefix_match() {
        let p = policy();
        assert!(!p.allow_shell_command("rm file && echo done"));
    }

    #[test]
    fn test_allows_ordinary_commands() {
        let p = policy();
        assert!(p.allow_shell_command("ls -la"));
        assert!(p.allow_shell_command("grep -r TODO src/"));
        assert!(p.allow_shell_command("cargo build"));
        // "format" alone is fine; only the named tools are blocked.
        assert!(p.allow_shell_command("cargo fmt"));
    }

    // ----- resolve -----

    #[test]
    fn test_resolve_relative_joins_workspace() {
        let p = policy();
        assert_eq!(
            p.resolve("notes.md"),
            PathBuf::from("/home/user/.bareclaw/workspace/notes.md")
        );
    }

    #[test]
    fn test_resolve_absolute_passes_through() {
        let p = policy();
        let abs = "/home/user/.bareclaw/workspace/a.txt";
        assert_eq!(p.resolve(abs), PathBuf::from(abs));
    }
}
