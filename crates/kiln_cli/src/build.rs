//! `kiln build`, `kiln run` and `kiln exec`.

use std::path::Path;

use kiln_runtime::NativeLibrary;

use crate::error::CliError;
use crate::pipeline::{build_source, print_path};
use crate::{BuildArgs, GlobalArgs};

/// Runs `kiln build`: prints the cached library path.
pub fn build(args: &BuildArgs, global: &GlobalArgs) -> Result<(), CliError> {
    let library = build_source(args, global)?;
    print_path(&library);
    Ok(())
}

/// Runs `kiln run`: builds, then exercises the library.
pub fn run(args: &BuildArgs, global: &GlobalArgs) -> Result<(), CliError> {
    let library = build_source(args, global)?;
    exec(&library)
}

/// Runs `kiln exec`: loads `library` and exercises its entry points.
pub fn exec(library: &Path) -> Result<(), CliError> {
    let library = NativeLibrary::load(library)?;
    let output = kiln_runtime::run_demo(&library)?;
    println!("{output:?}");
    Ok(())
}
