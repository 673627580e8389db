//! Reusable groups of scripts.

use std::fmt::Debug;

use crate::error::PackError;

use super::module::Module;

/// A reusable group of scripts, added to a pack with [`super::Datapack::add_template`].
///
/// The template gets its own module named after it and defines its scripts there.
pub trait Template: Debug {
    /// Name of the module the template is placed in.
    fn name(&self) -> &str;

    /// Define the scripts of the template.
    ///
    /// # Errors
    /// - If defining a script fails
    fn define(&self, module: &Module) -> Result<(), PackError>;
}
