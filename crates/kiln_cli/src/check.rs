//! `kiln check`: toolchain install and flag resolution.

use kiln_toolchain::{ProcessToolchain, Toolchain};

use crate::error::CliError;
use crate::pipeline::{load_settings, open_store};
use crate::GlobalArgs;

/// Verifies the toolchain files exist, resolves package flags, queries the
/// device flags and prints the result.
pub fn run(global: &GlobalArgs) -> Result<(), CliError> {
    let settings = load_settings(global)?;
    let config = kiln_toolchain::discover(&settings)?;
    let layout = config.layout();
    layout.check_installed()?;

    let device_flags = ProcessToolchain::new(layout).device_flags()?;
    let store = open_store(&settings)?;

    println!("toolchain:    {}", layout.prefix().display());
    println!("compiler:     {}", layout.compiler().display());
    println!("host flags:   {}", config.host_flags().join(" "));
    println!("device flags: {}", device_flags.join(" "));
    println!("link flags:   {}", config.link_flags().join(" "));
    println!("library:      {}", config.library_file_name());
    println!("cache:        {}", store.root().display());
    Ok(())
}
