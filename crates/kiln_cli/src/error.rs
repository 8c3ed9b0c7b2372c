//! Top-level error type and its exit codes.

use kiln_build::BuildError;
use kiln_cache::CacheError;
use kiln_config::ConfigError;
use kiln_runtime::RuntimeError;
use kiln_toolchain::{FailedInvocation, ToolchainError};

/// Exit code for configuration errors, including a missing toolchain.
pub const EXIT_CONFIG: i32 = 2;
/// Exit code for a library that cannot be loaded or lacks an entry point.
pub const EXIT_LOAD: i32 = 3;
/// Exit code for malformed command input (`EX_USAGE`).
pub const EXIT_USAGE: i32 = 64;

/// Every error a command can end with.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Invalid settings or missing toolchain files.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A build failed.
    #[error(transparent)]
    Build(#[from] BuildError),

    /// A toolchain query outside a build failed.
    #[error(transparent)]
    Toolchain(#[from] ToolchainError),

    /// Loading or calling a library failed.
    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    /// Cache maintenance failed.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// The input source could not be read.
    #[error("cannot read {input}: {source}")]
    Input {
        /// The file name, or `-` for stdin.
        input: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

impl CliError {
    /// The process exit code for this error.
    ///
    /// Toolchain failures forward the compiler's own exit code, or 1 when it
    /// was killed by a signal.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) | CliError::Build(BuildError::Config(_)) => EXIT_CONFIG,
            CliError::Build(err) => match err.toolchain_error() {
                Some(source) => toolchain_exit_code(source),
                None => 1,
            },
            CliError::Toolchain(source) => toolchain_exit_code(source),
            CliError::Runtime(err) if err.is_argument() => EXIT_USAGE,
            CliError::Runtime(_) => EXIT_LOAD,
            CliError::Input { .. } => EXIT_USAGE,
            CliError::Cache(_) => 1,
        }
    }

    /// The captured compiler run behind this error, if a compiler failed.
    pub fn failed_invocation(&self) -> Option<&FailedInvocation> {
        let source = match self {
            CliError::Build(err) => err.toolchain_error()?,
            CliError::Toolchain(source) => source,
            _ => return None,
        };
        match source {
            ToolchainError::Failed(failed) => Some(failed.as_ref()),
            ToolchainError::Spawn { .. } => None,
        }
    }
}

fn toolchain_exit_code(err: &ToolchainError) -> i32 {
    match err.exit_code() {
        Some(code) if code != 0 => code,
        _ => 1,
    }
}
