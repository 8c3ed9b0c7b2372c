//! Settings loading, environment overrides and validation.

use crate::error::ConfigError;
use crate::types::Settings;
use std::path::{Path, PathBuf};

/// Name of the settings file looked up in the working directory.
pub const CONFIG_FILE: &str = "kiln.toml";

/// Environment variable overriding `[toolchain] prefix`.
pub const PREFIX_ENV: &str = "KILN_TOOLCHAIN_PREFIX";

/// Environment variable overriding `[cache] dir`.
pub const CACHE_DIR_ENV: &str = "KILN_CACHE_DIR";

/// Loads settings for this process.
///
/// An explicit `path` must exist. Without one, `kiln.toml` in the current
/// directory is used if present, otherwise the defaults. Environment
/// overrides are applied last, then the result is validated.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let mut settings = match path {
        Some(path) => parse(&std::fs::read_to_string(path)?)?,
        None => {
            let local = Path::new(CONFIG_FILE);
            if local.is_file() {
                parse(&std::fs::read_to_string(local)?)?
            } else {
                tracing::debug!("no {CONFIG_FILE} found, using defaults");
                Settings::default()
            }
        }
    };
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    validate(&settings)?;
    Ok(settings)
}

/// Parses and validates settings from a string without consulting the
/// environment.
pub fn load_settings_from_str(content: &str) -> Result<Settings, ConfigError> {
    let settings = parse(content)?;
    validate(&settings)?;
    Ok(settings)
}

/// Applies `KILN_TOOLCHAIN_PREFIX` and `KILN_CACHE_DIR` from `lookup`.
///
/// Empty values are ignored.
pub fn apply_env_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(prefix) = lookup(PREFIX_ENV).filter(|v| !v.is_empty()) {
        settings.toolchain.prefix = PathBuf::from(prefix);
    }
    if let Some(dir) = lookup(CACHE_DIR_ENV).filter(|v| !v.is_empty()) {
        settings.cache.dir = Some(PathBuf::from(dir));
    }
}

impl Settings {
    /// Returns the artifact cache root: the configured directory, or
    /// `kiln` under the user cache directory (`~/.cache/kiln` on Linux).
    pub fn cache_dir(&self) -> Result<PathBuf, ConfigError> {
        if let Some(dir) = &self.cache.dir {
            return Ok(dir.clone());
        }
        directories::ProjectDirs::from("", "", "kiln")
            .map(|dirs| dirs.cache_dir().to_path_buf())
            .ok_or(ConfigError::NoCacheDir)
    }
}

fn parse(content: &str) -> Result<Settings, ConfigError> {
    toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
}

fn validate(settings: &Settings) -> Result<(), ConfigError> {
    let tc = &settings.toolchain;
    if tc.prefix.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "toolchain.prefix must not be empty".to_string(),
        ));
    }
    for (field, value) in [
        ("toolchain.device_info", &tc.device_info),
        ("toolchain.compiler", &tc.compiler),
        ("toolchain.runtime_library", &tc.runtime_library),
    ] {
        if value.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "{field} must not be empty"
            )));
        }
    }
    let name = &settings.build.library_name;
    if name.is_empty() || name.contains(['/', '\\']) {
        return Err(ConfigError::ValidationError(format!(
            "build.library_name '{name}' must be a bare file name"
        )));
    }
    if settings.build.std.is_empty() {
        return Err(ConfigError::ValidationError(
            "build.std must not be empty".to_string(),
        ));
    }
    Ok(())
}
