//! Build orchestration: cache check, three toolchain stages, cache store.

use std::path::{Path, PathBuf};

use kiln_cache::ArtifactStore;
use kiln_common::SourceUnit;
use kiln_config::ToolchainConfig;
use kiln_toolchain::Toolchain;

use crate::error::{BuildError, Stage};
use crate::flags::{device_compile_args, host_compile_args, link_args};
use crate::progress::Progress;
use crate::workspace::Workspace;

/// Builds source units into cached shared libraries.
///
/// The pipeline is linear: cache lookup, then (on a miss) device compile,
/// host compile, link and cache store. There are no retries; the first
/// failure aborts the build, removes the workspace and is returned as is.
/// Nothing is written to the cache unless all three stages succeed.
pub struct BuildPipeline<'a, T, S> {
    config: &'a ToolchainConfig,
    toolchain: T,
    store: S,
    scratch_dir: Option<PathBuf>,
}

impl<'a, T: Toolchain, S: ArtifactStore> BuildPipeline<'a, T, S> {
    /// Creates a pipeline using `toolchain` to compile and `store` to cache.
    pub fn new(config: &'a ToolchainConfig, toolchain: T, store: S) -> Self {
        Self {
            config,
            toolchain,
            store,
            scratch_dir: None,
        }
    }

    /// Creates scratch workspaces under `dir` instead of the system
    /// temporary directory.
    pub fn with_scratch_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.scratch_dir = dir;
        self
    }

    /// Returns the path of a shared library built from `source`.
    ///
    /// A cache hit returns immediately without touching the toolchain. On a
    /// miss the install is verified before any process is spawned, and the
    /// returned path is the cached copy of the linked library.
    pub fn build(
        &self,
        source: &SourceUnit,
        progress: &mut dyn Progress,
    ) -> Result<PathBuf, BuildError> {
        if let Some(path) = self.store.lookup(source) {
            return Ok(path);
        }

        let workspace =
            Workspace::create(self.scratch_dir.as_deref()).map_err(BuildError::Workspace)?;
        self.config.layout().check_installed()?;

        tracing::info!("building {:?}", source);

        progress.step("compiling device code ...");
        let device_flags = self
            .toolchain
            .device_flags()
            .map_err(|source| BuildError::Toolchain {
                stage: Stage::DeviceCompile,
                source,
            })?;
        let stub = workspace.stub_path();
        self.run_stage(
            Stage::DeviceCompile,
            &device_compile_args(self.config, &device_flags, &stub),
            Some(source.as_str()),
            &stub,
        )?;

        progress.step("compiling host code ...");
        let object = workspace.object_path();
        self.run_stage(
            Stage::HostCompile,
            &host_compile_args(self.config, &stub, &object),
            Some(source.as_str()),
            &object,
        )?;

        progress.step("linking library ...");
        let library = workspace.library_path(&self.config.library_file_name());
        self.run_stage(
            Stage::Link,
            &link_args(self.config, &object, &library),
            None,
            &library,
        )?;
        progress.finish();

        // The workspace is dropped only after the store has copied the library.
        let cached = self.store.store(source, &library)?;
        Ok(cached)
    }

    fn run_stage(
        &self,
        stage: Stage,
        args: &[String],
        stdin: Option<&str>,
        output: &Path,
    ) -> Result<(), BuildError> {
        self.toolchain
            .invoke(args, stdin)
            .map_err(|source| BuildError::Toolchain { stage, source })?;
        if !output.exists() {
            return Err(BuildError::MissingOutput {
                stage,
                path: output.to_path_buf(),
            });
        }
        Ok(())
    }
}
