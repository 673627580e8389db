//! dpcompile is a library for authoring Minecraft data packs in Rust.
//!
//! Scripts are Rust closures that add commands to a [`datapack::ScriptContext`]. Each
//! script becomes one `.mcfunction` file, rendered as soon as it is defined.
//!
//! ```no_run
//! use dpcompile::prelude::*;
//!
//! # fn main() -> Result<(), PackError> {
//! let pack = Datapack::new(PackConfig::new("Example Pack", "example", "1.21.4"))?;
//! let greet = pack.mcfn("greet", |ctx| {
//!     ctx.raw("say Hello!")?;
//!     Ok(())
//! })?;
//! pack.mcfn_with("init", ScriptOptions::default().with_sort(Sort::Load), move |ctx| {
//!     ctx.call(&greet)?;
//!     Ok(())
//! })?;
//! pack.build()?;
//! # Ok(())
//! # }
//! ```

#![warn(
    missing_docs,
    missing_debug_implementations,
    nonstandard_style,
    clippy::complexity,
    clippy::style,
    clippy::suspicious
)]
#![deny(unsafe_code)]

pub mod config;
pub mod datapack;
pub mod error;
pub mod plugin;
pub mod util;
pub mod version;
pub mod virtual_fs;

/// The commonly used types.
pub mod prelude {
    pub use crate::{
        config::PackConfig,
        datapack::{
            command::{Command, Condition, Execute, LogLevel},
            scoreboard::{Criteria, Scoreboard},
            tag::{TagTable, TagType},
            Datapack, Module, Script, ScriptContext, ScriptDecoratable, ScriptOptions, Sort,
            Template,
        },
        error::{BoxError, PackError},
        plugin::{DevelopmentKit, Plugin, VerboseLogging},
    };
}
