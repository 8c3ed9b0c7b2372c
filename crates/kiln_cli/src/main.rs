//! Kiln CLI: build offload kernels into cached shared libraries and run them.
//!
//! `kiln build` compiles a source file (or stdin) and prints the cached
//! library path, `kiln run` builds and then exercises the library, `kiln exec`
//! exercises an existing library, `kiln check` verifies the toolchain install,
//! and `kiln cache` inspects or clears the artifact cache.

#![warn(missing_docs)]

mod build;
mod cache;
mod check;
mod error;
mod pipeline;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::error::CliError;

/// Kiln: build and run offload kernels.
#[derive(Parser, Debug)]
#[command(name = "kiln", version, about = "Kiln offload build tool")]
pub struct Cli {
    /// Suppress progress and informational logging.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a custom `kiln.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile a source into a cached shared library and print its path.
    Build(BuildArgs),
    /// Compile a source, load the library and run its entry points.
    Run(BuildArgs),
    /// Load an already built library and run its entry points.
    Exec {
        /// Path to the shared library.
        library: PathBuf,
    },
    /// Verify the toolchain install and print the resolved flags.
    Check,
    /// Inspect or clear the artifact cache.
    #[command(subcommand)]
    Cache(CacheCommand),
}

/// Arguments shared by `kiln build` and `kiln run`.
#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// Source file to compile, or `-` for standard input.
    pub input: String,

    /// Directory for scratch workspaces (default: system temp directory).
    #[arg(long)]
    pub scratch_dir: Option<PathBuf>,
}

/// `kiln cache` subcommands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum CacheCommand {
    /// Print the cache directory.
    Path,
    /// List cached entries.
    List,
    /// Remove the entry built from a source file, or `-` for stdin.
    Remove {
        /// Source file whose entry is removed.
        input: String,
    },
    /// Remove every cached entry.
    Clear,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress progress and informational output.
    pub quiet: bool,
    /// Whether to print debug information.
    pub verbose: bool,
    /// Optional path to a custom config file.
    pub config: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
    };
    init_logging(&global);

    let result = match cli.command {
        Command::Build(ref args) => build::build(args, &global),
        Command::Run(ref args) => build::run(args, &global),
        Command::Exec { ref library } => build::exec(library),
        Command::Check => check::run(&global),
        Command::Cache(ref command) => cache::run(command, &global),
    };

    match result {
        Ok(()) => process::exit(0),
        Err(e) => {
            report(&e);
            process::exit(e.exit_code());
        }
    }
}

/// Installs the log subscriber. `RUST_LOG` overrides the flag-derived level.
fn init_logging(global: &GlobalArgs) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(global)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn default_level(global: &GlobalArgs) -> &'static str {
    if global.quiet {
        "warn"
    } else if global.verbose {
        "debug"
    } else {
        "info"
    }
}

/// Prints a fatal error. Toolchain failures get the full invocation dump.
fn report(err: &CliError) {
    match err.failed_invocation() {
        Some(failed) => eprint!("{}", failed.report()),
        None => eprintln!("error: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_build_file() {
        let cli = Cli::parse_from(["kiln", "build", "kernel.cpp"]);
        match cli.command {
            Command::Build(ref args) => {
                assert_eq!(args.input, "kernel.cpp");
                assert!(args.scratch_dir.is_none());
            }
            _ => panic!("expected Build command"),
        }
    }

    #[test]
    fn parse_build_stdin_with_scratch() {
        let cli = Cli::parse_from(["kiln", "build", "-", "--scratch-dir", "/tmp/kiln"]);
        match cli.command {
            Command::Build(ref args) => {
                assert_eq!(args.input, "-");
                assert_eq!(
                    args.scratch_dir.as_deref(),
                    Some(std::path::Path::new("/tmp/kiln"))
                );
            }
            _ => panic!("expected Build command"),
        }
    }

    #[test]
    fn parse_run() {
        let cli = Cli::parse_from(["kiln", "run", "kernel.cpp"]);
        assert!(matches!(cli.command, Command::Run(ref args) if args.input == "kernel.cpp"));
    }

    #[test]
    fn parse_exec() {
        let cli = Cli::parse_from(["kiln", "exec", "/cache/abc/libkiln_native.so"]);
        match cli.command {
            Command::Exec { library } => {
                assert_eq!(library, PathBuf::from("/cache/abc/libkiln_native.so"));
            }
            _ => panic!("expected Exec command"),
        }
    }

    #[test]
    fn exec_requires_library() {
        assert!(Cli::try_parse_from(["kiln", "exec"]).is_err());
    }

    #[test]
    fn parse_cache_subcommands() {
        let cli = Cli::parse_from(["kiln", "cache", "list"]);
        assert!(matches!(cli.command, Command::Cache(CacheCommand::List)));

        let cli = Cli::parse_from(["kiln", "cache", "clear"]);
        assert!(matches!(cli.command, Command::Cache(CacheCommand::Clear)));

        let cli = Cli::parse_from(["kiln", "cache", "remove", "k.cpp"]);
        match cli.command {
            Command::Cache(command) => assert_eq!(
                command,
                CacheCommand::Remove {
                    input: "k.cpp".to_string()
                }
            ),
            _ => panic!("expected Cache command"),
        }
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::parse_from(["kiln", "--quiet", "--config", "/etc/kiln.toml", "check"]);
        assert!(cli.quiet);
        assert!(!cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("/etc/kiln.toml")));
        assert!(matches!(cli.command, Command::Check));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["kiln", "check", "--verbose"]);
        assert!(cli.verbose);
    }

    #[test]
    fn quiet_and_verbose_conflict() {
        assert!(Cli::try_parse_from(["kiln", "-q", "-v", "check"]).is_err());
    }

    #[test]
    fn log_levels() {
        let mut global = GlobalArgs {
            quiet: false,
            verbose: false,
            config: None,
        };
        assert_eq!(default_level(&global), "info");
        global.verbose = true;
        assert_eq!(default_level(&global), "debug");
        global.quiet = true;
        assert_eq!(default_level(&global), "warn");
    }
}
