//! Configuration of a pack.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::PackError;

fn default_debug() -> bool {
    true
}

fn default_out_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_description() -> String {
    String::from("A Minecraft datapack created with dpcompile")
}

/// Settings a [`crate::datapack::Datapack`] is created from.
///
/// Can be loaded from JSON:
/// ```json
/// { "name": "Temp Pack", "namespace": "tmp", "version": "1.21.4", "out_dir": "build" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackConfig {
    /// Name of the pack, also the name of its output directory.
    pub name: String,
    /// Namespace of the pack's functions.
    pub namespace: String,
    /// Description written to `pack.mcmeta`.
    #[serde(default = "default_description")]
    pub description: String,
    /// Target game version, e.g. `1.21.4`.
    pub version: String,
    /// Directory the pack directory is created in. Must exist.
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,
    /// Whether to build a development build, which keeps dev-only content.
    #[serde(default = "default_debug")]
    pub debug: bool,
    /// Whether to log the content of every written file.
    #[serde(default)]
    pub log_files: bool,
}

impl PackConfig {
    /// Create a development build configuration writing into the current directory.
    #[must_use]
    pub fn new(name: &str, namespace: &str, version: &str) -> Self {
        Self {
            name: name.to_string(),
            namespace: namespace.to_string(),
            description: default_description(),
            version: version.to_string(),
            out_dir: default_out_dir(),
            debug: true,
            log_files: false,
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(self, description: &str) -> Self {
        Self {
            description: description.to_string(),
            ..self
        }
    }

    /// Set the output directory.
    #[must_use]
    pub fn with_out_dir(self, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            ..self
        }
    }

    /// Set whether to build a development build.
    #[must_use]
    pub fn with_debug(self, debug: bool) -> Self {
        Self { debug, ..self }
    }

    /// Set whether to log written files.
    #[must_use]
    pub fn with_log_files(self, log_files: bool) -> Self {
        Self { log_files, ..self }
    }

    /// Parse a configuration from JSON.
    ///
    /// # Errors
    /// - If the JSON is malformed or misses required fields
    pub fn from_json_str(json: &str) -> Result<Self, PackError> {
        serde_json::from_str(json).map_err(|err| PackError::Config(err.to_string()))
    }

    /// Read a JSON configuration file.
    ///
    /// # Errors
    /// - If the file cannot be read
    /// - Same as [`Self::from_json_str`]
    pub fn from_path(path: &Path) -> Result<Self, PackError> {
        let json = std::fs::read_to_string(path).map_err(|err| PackError::io(path, err))?;
        Self::from_json_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json() {
        let config = PackConfig::from_json_str(
            r#"{"name": "Temp Pack", "namespace": "tmp", "version": "1.21.4", "out_dir": "build"}"#,
        )
        .expect("parsing failed");

        assert_eq!(
            config,
            PackConfig::new("Temp Pack", "tmp", "1.21.4").with_out_dir("build")
        );
        assert!(config.debug);
        assert!(!config.log_files);

        assert!(matches!(
            PackConfig::from_json_str(r#"{"name": "x"}"#),
            Err(PackError::Config(_))
        ));
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().expect("error creating tempdir");
        let path = dir.path().join("pack.json");
        std::fs::write(
            &path,
            r#"{"name": "p", "namespace": "p", "version": "1.20.4", "debug": false}"#,
        )
        .expect("error writing config");

        let config = PackConfig::from_path(&path).expect("loading failed");
        assert!(!config.debug);
        assert_eq!(config.out_dir, PathBuf::from("."));
    }
}
