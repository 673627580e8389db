use crate::{
    datapack::{command::LogLevel, Datapack, ScriptDecoratable, ScriptOptions, Sort},
    error::BoxError,
};

use super::Plugin;

/// Adds development helper scripts to debug builds.
///
/// The scripts are placed below `<function dir>/dev_tools` and are dev-only, so
/// production builds never contain them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevelopmentKit {
    tools_path: String,
}

impl Default for DevelopmentKit {
    fn default() -> Self {
        Self {
            tools_path: "dev_tools".to_string(),
        }
    }
}

impl DevelopmentKit {
    /// Create the plugin with the default path.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Place the scripts below another path of the function directory.
    #[must_use]
    pub fn with_tools_path(self, tools_path: &str) -> Self {
        Self {
            tools_path: tools_path.trim_matches('/').to_string(),
        }
    }

    fn options(&self, sub_path: &str) -> ScriptOptions {
        let path = if sub_path.is_empty() {
            self.tools_path.clone()
        } else {
            format!("{}/{sub_path}", self.tools_path)
        };
        ScriptOptions::default().with_dev(true).with_path(&path)
    }
}

impl Plugin for DevelopmentKit {
    fn name(&self) -> &str {
        "development_kit"
    }

    fn pre_build(&self, pack: &Datapack) -> Result<(), BoxError> {
        if !pack.is_debug() {
            tracing::debug!("Production build, skipping development tools");
            return Ok(());
        }

        let give_tools = pack.mcfn_with("give_tools", self.options(""), |ctx| {
            ctx.log(LogLevel::Info, "Granting player development tools")?;
            ctx.comment("Grant development stick")?;
            Ok(())
        })?;

        pack.mcfn_with(
            "update_tool_scoreboards",
            self.options("internal")
                .with_sort(Sort::Tick)
                .with_description("Keeps the scoreboards of the development tools up to date"),
            |_| Ok(()),
        )?;

        pack.mcfn_with(
            "dev_setup",
            self.options("internal").with_sort(Sort::Load),
            move |ctx| {
                ctx.call(&give_tools)?;
                Ok(())
            },
        )?;

        let pack_name = pack.info().name().clone();
        pack.mcfn_with(
            "attempt_reload_changes",
            self.options("pack_issues"),
            move |ctx| {
                ctx.log(LogLevel::Info, &format!("Reload initiated from {pack_name}."))?;
                ctx.raw("reload")?;
                Ok(())
            },
        )?;

        pack.mcfn_with("store_local_world", self.options("world"), |ctx| {
            ctx.log(LogLevel::Info, "Storing local world state")?;
            ctx.comment("Copy world state into storage")?;
            Ok(())
        })?;

        tracing::debug!("Added development tools below {}", self.tools_path);
        Ok(())
    }
}
