//! Error types of the crate.

use std::{io, path::PathBuf};

use crate::version::Version;

/// Boxed error returned by user script bodies and plugin hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors from parsing versions or looking up pack formats.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionError {
    /// The version string is not of the form `major.minor[.patch]`.
    #[error("invalid version string '{0}'")]
    Parse(String),
    /// The version is not present in the pack format table.
    #[error("version {0} has no known pack format")]
    UnknownPackFormat(Version),
}

/// Errors from opening or writing to a script context.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    /// A context was opened while another one was still open.
    #[error("cannot open a context for '{requested}' while '{active}' is rendering")]
    AlreadyOpen {
        /// Call name of the script currently rendering.
        active: String,
        /// Call name of the script that tried to open a context.
        requested: String,
    },
    /// A command was added after the context was closed.
    #[error("context of '{script}' is closed, commands can no longer be added")]
    Closed {
        /// Name of the script owning the closed context.
        script: String,
    },
    /// A script was rendered from within its own render.
    #[error("script '{script}' is already rendering")]
    Reentrant {
        /// Name of the script.
        script: String,
    },
    /// The script body failed on an earlier render and will not run again.
    #[error("script '{script}' failed to render earlier")]
    PreviouslyFailed {
        /// Name of the script.
        script: String,
    },
    /// A command was inserted past the end of the buffer.
    #[error("cannot insert at index {index}, context of '{script}' holds {len} commands")]
    IndexOutOfBounds {
        /// Name of the script.
        script: String,
        /// Requested index.
        index: usize,
        /// Current number of buffered commands.
        len: usize,
    },
}

/// Errors raised by commands, either when added to a context or when compiled to text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// The rendered command failed its structural check.
    #[error("invalid command '{command}': {reason}")]
    Validation {
        /// The offending command text.
        command: String,
        /// What is wrong with it.
        reason: String,
    },
    /// The command requires a newer pack format than the pack targets.
    #[error("command '{command}' requires pack format {required}, pack targets {actual}")]
    Unsupported {
        /// Short name of the command.
        command: String,
        /// Minimum pack format.
        required: u8,
        /// Pack format of the pack.
        actual: u8,
    },
    /// A function call could not be resolved to a namespaced path.
    #[error("cannot resolve function target: {0}")]
    Unresolved(#[from] DefinitionError),
    /// Context error.
    #[error(transparent)]
    Context(#[from] ContextError),
    /// Scoreboard error.
    #[error(transparent)]
    Scoreboard(#[from] ScoreboardError),
}

/// Errors from the scoreboard registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScoreboardError {
    /// The same scoreboard name was declared with different criteria.
    #[error("scoreboard '{name}' is already declared with criteria '{existing}', cannot redeclare as '{requested}'")]
    CriteriaConflict {
        /// Scoreboard name.
        name: String,
        /// Criteria of the first declaration.
        existing: String,
        /// Conflicting criteria.
        requested: String,
    },
    /// The scoreboard name cannot be used as an objective.
    #[error("invalid scoreboard name '{0}'")]
    InvalidName(String),
}

/// Errors raised while defining the pack, before anything is built.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DefinitionError {
    /// A name or path is not a valid resource location part.
    #[error("invalid name '{name}': {reason}")]
    InvalidName {
        /// The offending name.
        name: String,
        /// What is wrong with it.
        reason: &'static str,
    },
    /// Two scripts resolve to the same file.
    #[error("script '{name}' is already defined at '{path}'")]
    DuplicateScript {
        /// Script name.
        name: String,
        /// Directory the script was registered in.
        path: String,
    },
    /// The script is not attached to any pack.
    #[error("script '{0}' is not attached to a pack")]
    NotAttached(String),
    /// The script was referenced with `find` but has no body yet.
    #[error("script '{0}' has no body, it was referenced but never defined")]
    Placeholder(String),
    /// The script already has a body or is already attached.
    #[error("script '{0}' is already defined")]
    AlreadyDefined(String),
}

/// A script body failed while rendering.
///
/// Always carries the identity of the generated function so a failure can be traced
/// back to its `.mcfunction` file.
#[derive(Debug, thiserror::Error)]
#[error("error while rendering script '{name}' ({call_name}, {file})")]
pub struct ScriptError {
    name: String,
    call_name: String,
    file: String,
    #[source]
    source: BoxError,
}

impl ScriptError {
    pub(crate) fn new(name: &str, call_name: String, file: String, source: BoxError) -> Self {
        Self {
            name: name.to_string(),
            call_name,
            file,
            source,
        }
    }

    /// Name of the failing script.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Namespaced call name of the failing script, e.g. `tmp:outer/init`.
    #[must_use]
    pub fn call_name(&self) -> &str {
        &self.call_name
    }

    /// File of the failing script inside the pack.
    #[must_use]
    pub fn file(&self) -> &str {
        &self.file
    }

    /// The underlying error.
    #[must_use]
    pub fn inner(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self.source.as_ref()
    }
}

/// Top level error of defining or building a pack.
#[derive(Debug, thiserror::Error)]
pub enum PackError {
    /// Version error.
    #[error(transparent)]
    Version(#[from] VersionError),
    /// Definition error.
    #[error(transparent)]
    Definition(#[from] DefinitionError),
    /// Scoreboard error.
    #[error(transparent)]
    Scoreboard(#[from] ScoreboardError),
    /// Command error outside of a script body.
    #[error(transparent)]
    Command(#[from] CommandError),
    /// A script failed to render.
    #[error("exception found within {pack} building for version {version} [{pack_format}]")]
    Render {
        /// Pack name.
        pack: String,
        /// Target version.
        version: Version,
        /// Target pack format.
        pack_format: u8,
        /// The failing script.
        #[source]
        source: ScriptError,
    },
    /// A script was referenced with `find` but never defined.
    #[error("script '{0}' was referenced but never defined")]
    IncompletePlaceholder(String),
    /// The output directory does not exist.
    #[error("build path '{}' does not exist", .0.display())]
    MissingOutputDirectory(PathBuf),
    /// Filesystem error.
    #[error("io error at '{}'", .path.display())]
    Io {
        /// Path of the failed operation.
        path: PathBuf,
        /// The io error.
        #[source]
        source: io::Error,
    },
    /// JSON serialization error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// A plugin hook failed.
    #[error("error running plugin hook '{hook}' with plugin {plugin}")]
    Plugin {
        /// Plugin name.
        plugin: String,
        /// Hook name.
        hook: &'static str,
        /// The hook's error.
        #[source]
        source: BoxError,
    },
    /// The pack configuration could not be loaded.
    #[error("invalid pack configuration: {0}")]
    Config(String),
}

impl PackError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn test_script_error_chain() {
        let err = ScriptError::new(
            "init",
            "tmp:init".to_string(),
            "init.mcfunction".to_string(),
            Box::new(CommandError::Validation {
                command: "1 2".to_string(),
                reason: "numeric".to_string(),
            }),
        );
        assert_eq!(err.call_name(), "tmp:init");
        assert!(err.to_string().contains("'init'"));
        assert!(err
            .source()
            .expect("no source")
            .to_string()
            .contains("invalid command"));

        let pack_err = PackError::Render {
            pack: "Temp Pack".to_string(),
            version: Version::new(1, 21, 4),
            pack_format: 61,
            source: err,
        };
        assert!(pack_err.to_string().contains("1.21.4 [61]"));
    }
}
