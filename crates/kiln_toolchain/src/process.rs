//! Spawning the offload compiler and device-info tool.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use kiln_config::ToolchainLayout;

use crate::error::{FailedInvocation, ToolchainError};

/// Argument asking the device-info tool for device compile flags.
pub const DEVICE_FLAGS_ARG: &str = "--dump-device-compiler-flags";

/// The operations the build pipeline needs from the offload toolchain.
///
/// Calls are blocking. There is no timeout: a hung compiler blocks the caller.
pub trait Toolchain {
    /// Returns the flags the device-info tool reports for device compilation.
    fn device_flags(&self) -> Result<Vec<String>, ToolchainError>;

    /// Runs the compiler with `args`, writing `stdin` to its input when given.
    ///
    /// Succeeds only if the compiler exits with status zero.
    fn invoke(&self, args: &[String], stdin: Option<&str>) -> Result<(), ToolchainError>;
}

impl<T: Toolchain + ?Sized> Toolchain for &T {
    fn device_flags(&self) -> Result<Vec<String>, ToolchainError> {
        (**self).device_flags()
    }

    fn invoke(&self, args: &[String], stdin: Option<&str>) -> Result<(), ToolchainError> {
        (**self).invoke(args, stdin)
    }
}

/// A [`Toolchain`] backed by the installed binaries.
#[derive(Debug, Clone)]
pub struct ProcessToolchain {
    compiler: PathBuf,
    device_info: PathBuf,
}

impl ProcessToolchain {
    /// Uses the compiler and device-info tool from `layout`.
    pub fn new(layout: &ToolchainLayout) -> Self {
        Self {
            compiler: layout.compiler(),
            device_info: layout.device_info_tool(),
        }
    }
}

impl Toolchain for ProcessToolchain {
    fn device_flags(&self) -> Result<Vec<String>, ToolchainError> {
        let stdout = run_captured(&self.device_info, &[DEVICE_FLAGS_ARG.to_string()], None)?;
        let flags: Vec<String> = stdout.split_whitespace().map(str::to_string).collect();
        tracing::debug!(?flags, "device compiler flags");
        Ok(flags)
    }

    fn invoke(&self, args: &[String], stdin: Option<&str>) -> Result<(), ToolchainError> {
        run_captured(&self.compiler, args, stdin).map(|_| ())
    }
}

/// Runs `program` to completion and returns its stdout.
///
/// The command line is logged at info level before the process starts.
/// Stdout and stderr are fully captured before the exit status is checked;
/// a non-zero status becomes [`ToolchainError::Failed`] carrying both
/// streams and the supplied input.
pub(crate) fn run_captured(
    program: &Path,
    args: &[String],
    stdin: Option<&str>,
) -> Result<String, ToolchainError> {
    let mut command_line = Vec::with_capacity(args.len() + 1);
    command_line.push(program.display().to_string());
    command_line.extend(args.iter().cloned());
    tracing::info!("{}", command_line.join(" "));

    let spawn_err = |source| ToolchainError::Spawn {
        program: program.to_path_buf(),
        source,
    };

    let mut child = Command::new(program)
        .args(args)
        .stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(spawn_err)?;

    // Feed input from a separate thread so a compiler that fills its output
    // pipes before draining stdin cannot deadlock us.
    let writer = match (stdin, child.stdin.take()) {
        (Some(input), Some(mut pipe)) => {
            let input = input.to_owned();
            Some(std::thread::spawn(move || pipe.write_all(input.as_bytes())))
        }
        _ => None,
    };

    let output = child.wait_with_output().map_err(spawn_err)?;

    if let Some(writer) = writer {
        match writer.join() {
            Ok(Ok(())) => {}
            // The compiler may exit without reading all of its input; its
            // exit status decides the outcome.
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
            Ok(Err(e)) => return Err(spawn_err(e)),
            Err(_) => {
                return Err(spawn_err(std::io::Error::other(
                    "stdin writer thread panicked",
                )))
            }
        }
    }

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    if !output.status.success() {
        return Err(ToolchainError::Failed(Box::new(FailedInvocation {
            command: command_line,
            stdin: stdin.map(str::to_string),
            exit_code: output.status.code(),
            stdout,
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })));
    }
    Ok(stdout)
}
