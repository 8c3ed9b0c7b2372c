//! Toolchain failure reporting.

use std::fmt::{self, Write as _};
use std::path::PathBuf;

/// Errors raised while running an external toolchain process.
///
/// Neither variant is recoverable: a failed device or host compile cannot be
/// partially salvaged, so callers propagate these to the top level.
#[derive(Debug, thiserror::Error)]
pub enum ToolchainError {
    /// The process could not be started, or its pipes failed.
    #[error("failed to run {}: {source}", program.display())]
    Spawn {
        /// The program that was being run.
        program: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The process ran and exited unsuccessfully.
    #[error("{0}")]
    Failed(Box<FailedInvocation>),
}

impl ToolchainError {
    /// The exit code the process returned, if it ran and exited normally.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ToolchainError::Spawn { .. } => None,
            ToolchainError::Failed(failed) => failed.exit_code,
        }
    }
}

/// Everything captured from an unsuccessful toolchain run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedInvocation {
    /// Program followed by its arguments.
    pub command: Vec<String>,
    /// Text supplied on standard input, if any.
    pub stdin: Option<String>,
    /// Exit code, or `None` when the process was killed by a signal.
    pub exit_code: Option<i32>,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

impl FailedInvocation {
    /// The program name, without its directory.
    pub fn program_name(&self) -> &str {
        self.command
            .first()
            .map(|p| p.rsplit('/').next().unwrap_or(p))
            .unwrap_or("toolchain")
    }

    /// Renders the full diagnostic dump: command line, supplied input,
    /// captured stdout and captured stderr.
    pub fn report(&self) -> String {
        let name = self.program_name();
        let rule = "=".repeat(name.len() + 6);
        let mut out = String::new();
        let _ = writeln!(out, "{rule}\n{name} error\n{rule}\n");
        let _ = writeln!(out, "=== command:\n\n{}\n", self.command.join(" "));
        let sections = [
            ("input", self.stdin.as_deref()),
            ("output", Some(self.stdout.as_str())),
            ("error output", Some(self.stderr.as_str())),
        ];
        for (label, text) in sections {
            if let Some(text) = text {
                let _ = writeln!(out, "=== {name} {label}:\n\n{text}");
            }
        }
        let _ = writeln!(out, "=========================\nFATAL ERROR. TERMINATING.");
        out
    }
}

impl fmt::Display for FailedInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.exit_code {
            Some(code) => write!(f, "{} exited with status {code}", self.program_name()),
            None => write!(f, "{} was terminated by a signal", self.program_name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed() -> FailedInvocation {
        FailedInvocation {
            command: vec![
                "/opt/cc/bin/compute++".to_string(),
                "-c".to_string(),
                "-".to_string(),
            ],
            stdin: Some("int x = ;".to_string()),
            exit_code: Some(2),
            stdout: "partial".to_string(),
            stderr: "error: expected expression".to_string(),
        }
    }

    #[test]
    fn display_names_program_and_status() {
        let err = ToolchainError::Failed(Box::new(failed()));
        assert_eq!(err.to_string(), "compute++ exited with status 2");
        assert_eq!(err.exit_code(), Some(2));
    }

    #[test]
    fn signal_has_no_exit_code() {
        let mut f = failed();
        f.exit_code = None;
        assert_eq!(f.to_string(), "compute++ was terminated by a signal");
        assert_eq!(ToolchainError::Failed(Box::new(f)).exit_code(), None);
    }

    #[test]
    fn report_contains_everything() {
        let report = failed().report();
        assert!(report.contains("compute++ error"));
        assert!(report.contains("/opt/cc/bin/compute++ -c -"));
        assert!(report.contains("=== compute++ input:\n\nint x = ;"));
        assert!(report.contains("=== compute++ output:\n\npartial"));
        assert!(report.contains("=== compute++ error output:\n\nerror: expected expression"));
        assert!(report.ends_with("FATAL ERROR. TERMINATING.\n"));
    }

    #[test]
    fn report_omits_absent_input() {
        let mut f = failed();
        f.stdin = None;
        assert!(!f.report().contains("input:"));
    }

    #[test]
    fn spawn_error_display() {
        let err = ToolchainError::Spawn {
            program: PathBuf::from("/opt/cc/bin/compute++"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().starts_with("failed to run /opt/cc/bin/compute++"));
        assert_eq!(err.exit_code(), None);
    }
}
