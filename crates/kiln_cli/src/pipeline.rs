//! Shared setup for the CLI commands.
//!
//! Settings and the toolchain config are resolved fresh on every invocation
//! and passed down explicitly; nothing is cached between runs.

use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};

use kiln_build::{BuildPipeline, NoProgress, Progress, TerminalProgress};
use kiln_cache::{ArtifactStore, FsArtifactStore};
use kiln_common::SourceUnit;
use kiln_config::Settings;
use kiln_toolchain::ProcessToolchain;

use crate::error::CliError;
use crate::{BuildArgs, GlobalArgs};

/// Loads settings from `--config`, `./kiln.toml` or the defaults.
pub fn load_settings(global: &GlobalArgs) -> Result<Settings, CliError> {
    Ok(kiln_config::load_settings(global.config.as_deref())?)
}

/// Opens the artifact cache configured in `settings`.
pub fn open_store(settings: &Settings) -> Result<FsArtifactStore, CliError> {
    Ok(FsArtifactStore::new(settings.cache_dir()?))
}

/// Reads the source body from `input`, or from stdin when `input` is `-`.
pub fn read_source(input: &str) -> Result<SourceUnit, CliError> {
    let body = if input == "-" {
        let mut body = String::new();
        std::io::stdin()
            .read_to_string(&mut body)
            .map_err(|source| CliError::Input {
                input: input.to_string(),
                source,
            })?;
        body
    } else {
        std::fs::read_to_string(input).map_err(|source| CliError::Input {
            input: input.to_string(),
            source,
        })?
    };
    Ok(SourceUnit::new(body))
}

/// Builds the source named by `args` and returns the cached library path.
pub fn build_source(args: &BuildArgs, global: &GlobalArgs) -> Result<PathBuf, CliError> {
    let settings = load_settings(global)?;
    let source = read_source(&args.input)?;
    let store = open_store(&settings)?;

    // Package discovery spawns pkg-config, so it waits for a cache miss.
    if let Some(path) = store.lookup(&source) {
        return Ok(path);
    }
    let config = kiln_toolchain::discover(&settings)?;
    let toolchain = ProcessToolchain::new(config.layout());

    let scratch_dir = args
        .scratch_dir
        .clone()
        .or_else(|| settings.build.scratch_dir.clone());
    let pipeline = BuildPipeline::new(&config, toolchain, &store).with_scratch_dir(scratch_dir);

    let mut progress = progress_for(global);
    Ok(pipeline.build(&source, progress.as_mut())?)
}

/// Progress goes to stdout unless `--quiet`. Lines are kept when stdout is
/// not a terminal or debug logging would interleave with them.
fn progress_for(global: &GlobalArgs) -> Box<dyn Progress> {
    if global.quiet {
        return Box::new(NoProgress);
    }
    let keep_lines = global.verbose || !std::io::stdout().is_terminal();
    Box::new(TerminalProgress::stdout(keep_lines))
}

/// Prints `path` on its own line for scripting.
pub fn print_path(path: &Path) {
    println!("{}", path.display());
}
