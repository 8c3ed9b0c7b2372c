//! `kiln cache`: artifact cache maintenance.

use crate::error::CliError;
use crate::pipeline::{load_settings, open_store, print_path, read_source};
use crate::{CacheCommand, GlobalArgs};

/// Runs a `kiln cache` subcommand.
pub fn run(command: &CacheCommand, global: &GlobalArgs) -> Result<(), CliError> {
    let settings = load_settings(global)?;
    let store = open_store(&settings)?;

    match command {
        CacheCommand::Path => print_path(store.root()),
        CacheCommand::List => {
            for entry in store.entries()? {
                let body = entry
                    .source
                    .strip_prefix(kiln_common::PREAMBLE)
                    .unwrap_or(&entry.source);
                let first_line = body.lines().map(str::trim).find(|l| !l.is_empty());
                println!(
                    "{}  {}  {}",
                    entry.fingerprint,
                    store.entry_dir(&entry.fingerprint).join(&entry.artifact).display(),
                    first_line.unwrap_or("")
                );
            }
        }
        CacheCommand::Remove { input } => {
            let source = read_source(input)?;
            if store.remove(&source)? {
                tracing::info!("removed {}", source.fingerprint());
            } else {
                tracing::warn!("{input} is not cached");
            }
        }
        CacheCommand::Clear => {
            let removed = store.clear()?;
            tracing::info!("removed {removed} cache entries");
        }
    }
    Ok(())
}
