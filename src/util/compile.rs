//! Compile options and per-function state threaded into command compilation.

use getset::Getters;
use serde::{Deserialize, Serialize};

/// Compile options for the pack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileOptions {
    /// Whether to compile a development build. Dev-only content is dropped otherwise.
    pub debug: bool,
    /// Pack format the pack targets.
    pub pack_format: u8,
}

impl CompileOptions {
    /// Latest pack format known to the crate.
    pub const LATEST_FORMAT: u8 = 71;
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            debug: true,
            pack_format: Self::LATEST_FORMAT,
        }
    }
}

/// State of the function whose commands are being compiled.
#[derive(Debug, Clone, Default, Getters)]
pub struct FunctionCompilerState {
    /// Namespaced call name of the current function.
    #[get = "pub"]
    path: String,
    /// Namespace of the current function.
    #[get = "pub"]
    namespace: String,
}

impl FunctionCompilerState {
    /// Create a new function compiler state.
    #[must_use]
    pub fn new(path: &str, namespace: &str) -> Self {
        Self {
            path: path.to_string(),
            namespace: namespace.to_string(),
        }
    }
}
