//! Argument lists for each toolchain stage.

use std::path::Path;

use kiln_config::ToolchainConfig;

/// Device compile: host flags, device flags, then compile stdin to `dest`.
pub fn device_compile_args(
    config: &ToolchainConfig,
    device_flags: &[String],
    dest: &Path,
) -> Vec<String> {
    let mut args = config.host_flags().to_vec();
    args.extend_from_slice(device_flags);
    args.extend(["-c".to_string(), "-".to_string()]);
    args.extend(["-o".to_string(), dest.display().to_string()]);
    args
}

/// Host compile: host flags, then compile stdin as position-independent code
/// to `dest` with `stub` force-included.
pub fn host_compile_args(config: &ToolchainConfig, stub: &Path, dest: &Path) -> Vec<String> {
    let mut args = config.host_flags().to_vec();
    args.extend([
        "-c".to_string(),
        "-".to_string(),
        "-fPIC".to_string(),
        "-include".to_string(),
        stub.display().to_string(),
        "-o".to_string(),
        dest.display().to_string(),
    ]);
    args
}

/// Link: shared library named after `dest`, with an rpath to the toolchain
/// runtime, followed by the link flags.
pub fn link_args(config: &ToolchainConfig, object: &Path, dest: &Path) -> Vec<String> {
    let soname = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| config.library_file_name());
    let mut args = vec![
        format!("-std={}", config.std()),
        "-shared".to_string(),
        format!("-Wl,-soname,{soname}"),
        format!("-Wl,-rpath={}", config.layout().lib_dir().display()),
        object.display().to_string(),
        "-o".to_string(),
        dest.display().to_string(),
    ];
    args.extend_from_slice(config.link_flags());
    args
}

/// Returns the path following the last `-o` in `args`.
pub fn output_path(args: &[String]) -> Option<&Path> {
    args.windows(2)
        .rev()
        .find(|w| w[0] == "-o")
        .map(|w| Path::new(w[1].as_str()))
}
