//! The command buffer of the script that is currently rendering.

use std::{cell::RefCell, rc::Rc};

use crate::error::{CommandError, ContextError, ScoreboardError};

use super::{
    command::{Command, LogLevel},
    scoreboard::{Criteria, Scoreboard},
    script::Script,
    PackShared,
};

/// The single "current context" slot of a pack.
///
/// At most one script of a pack renders at any time. Opening the slot while it is
/// taken fails instead of nesting.
#[derive(Debug, Default)]
pub struct ContextSlot {
    active: RefCell<Option<String>>,
}

impl ContextSlot {
    /// Claim the slot for the given script.
    ///
    /// # Errors
    /// - If another context is open
    pub fn open(&self, script: &str) -> Result<ContextGuard<'_>, ContextError> {
        let mut active = self.active.borrow_mut();
        if let Some(active) = active.as_ref() {
            return Err(ContextError::AlreadyOpen {
                active: active.clone(),
                requested: script.to_string(),
            });
        }
        *active = Some(script.to_string());
        tracing::trace!("Opened context for {script}");
        Ok(ContextGuard { slot: self })
    }

    /// Get the script owning the open context, if any.
    #[must_use]
    pub fn current(&self) -> Option<String> {
        self.active.borrow().clone()
    }

    /// Check whether a context is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.active.borrow().is_some()
    }
}

/// Keeps the [`ContextSlot`] claimed. Dropping it frees the slot, also when the
/// script body failed.
#[derive(Debug)]
pub struct ContextGuard<'a> {
    slot: &'a ContextSlot,
}

impl Drop for ContextGuard<'_> {
    fn drop(&mut self) {
        if let Some(script) = self.slot.active.borrow_mut().take() {
            tracing::trace!("Closed context for {script}");
        }
    }
}

/// Ordered command buffer handed to a script body.
///
/// The order of [`ScriptContext::add`] calls is the line order of the generated function.
#[derive(Debug)]
pub struct ScriptContext<'a> {
    script: &'a Script,
    pack: &'a PackShared,
    commands: Vec<Command>,
    writable: bool,
}

impl<'a> ScriptContext<'a> {
    pub(crate) fn new(script: &'a Script, pack: &'a PackShared) -> Self {
        Self {
            script,
            pack,
            commands: Vec::new(),
            writable: true,
        }
    }

    /// Add a command to the end of the script.
    ///
    /// Returns the stored command so its flags can still be changed, or `None` if the
    /// command was dropped because it is dev-only and the pack is a production build.
    ///
    /// # Errors
    /// - If the context is closed
    /// - If the command needs a newer pack format than the pack targets
    /// - If the command uses a scoreboard that conflicts with an earlier declaration
    pub fn add(
        &mut self,
        command: impl Into<Command>,
    ) -> Result<Option<&mut Command>, CommandError> {
        match self.prepare(command.into())? {
            Some(command) => {
                self.commands.push(command);
                Ok(self.commands.last_mut())
            }
            None => Ok(None),
        }
    }

    /// Insert a command at a fixed position of the script.
    ///
    /// # Errors
    /// - If `index` is past the end of the buffer
    /// - Same as [`Self::add`]
    pub fn insert(
        &mut self,
        index: usize,
        command: impl Into<Command>,
    ) -> Result<Option<&mut Command>, CommandError> {
        if index > self.commands.len() {
            return Err(ContextError::IndexOutOfBounds {
                script: self.script.name().to_string(),
                index,
                len: self.commands.len(),
            }
            .into());
        }
        match self.prepare(command.into())? {
            Some(command) => {
                self.commands.insert(index, command);
                Ok(self.commands.get_mut(index))
            }
            None => Ok(None),
        }
    }

    fn prepare(&self, mut command: Command) -> Result<Option<Command>, CommandError> {
        if !self.writable {
            return Err(ContextError::Closed {
                script: self.script.name().to_string(),
            }
            .into());
        }
        command.validate(self.pack_format())?;

        if let Some(scoreboard) = command.scoreboard() {
            self.pack.scoreboards.borrow_mut().declare(scoreboard)?;
        }
        if command.is_dev() && !self.is_debug() {
            tracing::trace!(
                "Dropping dev command {} from {}",
                command.name(),
                self.script.name()
            );
            return Ok(None);
        }
        if let Some(scoreboard) = command.scoreboard() {
            if self.pack.scoreboards.borrow_mut().touch(scoreboard)? {
                tracing::debug!(
                    "Scoreboard {} first used in {}",
                    scoreboard.name(),
                    self.script.name()
                );
            }
        }

        command.set_origin(self.script.name());
        Ok(Some(command))
    }

    /// Add a call to another script as `function <namespace>:<path>`.
    ///
    /// The target's path is resolved when the script is written, so the target may be
    /// moved until then. Dev-only targets are dropped in production builds.
    ///
    /// # Errors
    /// - Same as [`Self::add`]
    pub fn call(&mut self, script: &Rc<Script>) -> Result<Option<&mut Command>, CommandError> {
        self.add(Command::call(script))
    }

    /// Add a raw command.
    ///
    /// # Errors
    /// - Same as [`Self::add`]
    pub fn raw(&mut self, command: &str) -> Result<Option<&mut Command>, CommandError> {
        self.add(Command::raw(command))
    }

    /// Add a comment.
    ///
    /// # Errors
    /// - Same as [`Self::add`]
    pub fn comment(&mut self, comment: &str) -> Result<Option<&mut Command>, CommandError> {
        self.add(Command::comment(comment))
    }

    /// Add a dev-only log message.
    ///
    /// # Errors
    /// - Same as [`Self::add`]
    pub fn log(
        &mut self,
        level: LogLevel,
        message: &str,
    ) -> Result<Option<&mut Command>, CommandError> {
        self.add(Command::log(level, message))
    }

    /// Declare a scoreboard of the pack and return it.
    ///
    /// Only declared, it is created in-game once a command using it is added.
    ///
    /// # Errors
    /// - If the name is invalid or already declared with other criteria
    pub fn scoreboard(&self, name: &str, criteria: Criteria) -> Result<Scoreboard, ScoreboardError> {
        let scoreboard = Scoreboard::new(name, criteria);
        self.pack.scoreboards.borrow_mut().declare(&scoreboard)?;
        Ok(scoreboard)
    }

    /// Get the script the context belongs to.
    #[must_use]
    pub fn script(&self) -> &Script {
        self.script
    }

    /// Get the namespace of the pack.
    #[must_use]
    pub fn namespace(&self) -> &str {
        self.pack.info.namespace()
    }

    /// Check whether the pack is a development build.
    #[must_use]
    pub fn is_debug(&self) -> bool {
        self.pack.info.options().debug
    }

    /// Get the pack format the pack targets.
    #[must_use]
    pub fn pack_format(&self) -> u8 {
        self.pack.info.pack_format()
    }

    /// Get the buffered commands.
    #[must_use]
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Check whether commands can still be added.
    #[must_use]
    pub fn is_writable(&self) -> bool {
        self.writable
    }

    pub(crate) fn close(&mut self) -> Vec<Command> {
        self.writable = false;
        std::mem::take(&mut self.commands)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_single_owner() {
        let slot = ContextSlot::default();
        {
            let _guard = slot.open("tmp:a").expect("slot should be free");
            assert_eq!(slot.current().as_deref(), Some("tmp:a"));
            assert_eq!(
                slot.open("tmp:b").map(|_| ()),
                Err(ContextError::AlreadyOpen {
                    active: "tmp:a".to_string(),
                    requested: "tmp:b".to_string(),
                })
            );
        }
        assert!(!slot.is_open());
        assert!(slot.open("tmp:b").is_ok());
    }
}
