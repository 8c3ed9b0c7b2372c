//! The resolved flag set handed to every build.

use crate::layout::ToolchainLayout;
use crate::types::BuildSettings;

/// Compiler and linker flags resolved for one kiln invocation.
///
/// Built from settings plus whatever package discovery reported. It is not
/// cached between invocations and is read-only once constructed; builds take
/// it by reference. Device flags are not part of it: those are reported by the
/// device-info tool at build time, after the install has been verified.
#[derive(Debug, Clone)]
pub struct ToolchainConfig {
    layout: ToolchainLayout,
    std: String,
    host_flags: Vec<String>,
    link_flags: Vec<String>,
    library_name: String,
}

impl ToolchainConfig {
    /// Assembles the flag set.
    ///
    /// Host flags are, in order: `-x c++`, `-std=<std>`, one `-D` per define,
    /// `-I<prefix>/include`, one `-I` per extra include dir, then
    /// `package_cflags`. Link flags are `package_libs`, `-L<prefix>/lib`, then
    /// one `-l` per library.
    pub fn new(
        layout: ToolchainLayout,
        build: &BuildSettings,
        package_cflags: Vec<String>,
        package_libs: Vec<String>,
    ) -> Self {
        let mut host_flags = vec![
            "-x".to_string(),
            "c++".to_string(),
            format!("-std={}", build.std),
        ];
        host_flags.extend(build.defines.iter().map(|d| format!("-D{d}")));
        host_flags.push(format!("-I{}", layout.include_dir().display()));
        host_flags.extend(
            build
                .include_dirs
                .iter()
                .map(|dir| format!("-I{}", dir.display())),
        );
        host_flags.extend(package_cflags);

        let mut link_flags = package_libs;
        link_flags.push(format!("-L{}", layout.lib_dir().display()));
        link_flags.extend(build.libraries.iter().map(|lib| format!("-l{lib}")));

        Self {
            layout,
            std: build.std.clone(),
            host_flags,
            link_flags,
            library_name: build.library_name.clone(),
        }
    }

    /// The toolchain install layout.
    pub fn layout(&self) -> &ToolchainLayout {
        &self.layout
    }

    /// Language standard, without the `-std=` prefix.
    pub fn std(&self) -> &str {
        &self.std
    }

    /// Flags shared by the device-stub and host-object compiles.
    pub fn host_flags(&self) -> &[String] {
        &self.host_flags
    }

    /// Library search paths and libraries for the link stage.
    pub fn link_flags(&self) -> &[String] {
        &self.link_flags
    }

    /// File name of the linked shared library, e.g. `libkiln_native.so`.
    pub fn library_file_name(&self) -> String {
        format!("lib{}.so", self.library_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn config(cflags: &[&str], libs: &[&str]) -> ToolchainConfig {
        let build = BuildSettings {
            include_dirs: vec![PathBuf::from("/usr/share/kiln/include")],
            ..BuildSettings::default()
        };
        ToolchainConfig::new(
            ToolchainLayout::new("/opt/cc"),
            &build,
            cflags.iter().map(|s| s.to_string()).collect(),
            libs.iter().map(|s| s.to_string()).collect(),
        )
    }

    #[test]
    fn host_flags_order() {
        let cfg = config(&["-I/usr/include/opencv4"], &[]);
        assert_eq!(
            cfg.host_flags(),
            [
                "-x",
                "c++",
                "-std=c++11",
                "-D_GLIBCXX_USE_CXX11_ABI=0",
                "-I/opt/cc/include",
                "-I/usr/share/kiln/include",
                "-I/usr/include/opencv4",
            ]
        );
    }

    #[test]
    fn link_flags_order() {
        let cfg = config(&[], &["-lopencv_core"]);
        assert_eq!(
            cfg.link_flags(),
            ["-lopencv_core", "-L/opt/cc/lib", "-lComputeCpp", "-lpthread"]
        );
    }

    #[test]
    fn library_file_name() {
        assert_eq!(config(&[], &[]).library_file_name(), "libkiln_native.so");
    }
}
