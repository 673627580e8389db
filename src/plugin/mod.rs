//! Hooks into the build of a pack.

mod development_kit;
mod verbose_logging;

pub use development_kit::DevelopmentKit;
pub use verbose_logging::VerboseLogging;

use std::fmt::Debug;

use crate::{
    datapack::{Datapack, PackInfo},
    error::{BoxError, PackError},
    virtual_fs::VFolder,
};

/// Extension of the build process.
///
/// All hooks default to doing nothing. Hooks run in the order the plugins were added
/// with [`Datapack::with_plugin`]. An error from a hook fails the build.
pub trait Plugin: Debug {
    /// Name of the plugin, used in errors.
    fn name(&self) -> &str;

    /// Runs before anything is written. Scripts defined here are part of the build.
    ///
    /// # Errors
    /// - If the plugin fails
    fn pre_build(&self, pack: &Datapack) -> Result<(), BoxError> {
        let _ = pack;
        Ok(())
    }

    /// Runs for every rendered file before it is added to the output.
    ///
    /// # Errors
    /// - If the plugin fails
    fn render_file(
        &self,
        info: &PackInfo,
        path: &str,
        file_name: &str,
        content: &str,
    ) -> Result<(), BoxError> {
        let _ = (info, path, file_name, content);
        Ok(())
    }

    /// Runs after every file was rendered.
    ///
    /// # Errors
    /// - If the plugin fails
    fn post_build(&self, info: &PackInfo, output: &VFolder) -> Result<(), BoxError> {
        let _ = (info, output);
        Ok(())
    }

    /// Runs when the build fails.
    fn on_build_error(&self, info: &PackInfo, error: &PackError) {
        let _ = (info, error);
    }
}
