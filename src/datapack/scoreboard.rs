//! Scoreboards and the per-pack registry that decides which ones get initialized.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::error::{CommandError, ScoreboardError};

use super::command::Command;

/// Criteria of a scoreboard objective.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Criteria {
    /// Only changed by commands.
    #[default]
    Dummy,
    /// Changeable by players through `/trigger`.
    Trigger,
    DeathCount,
    PlayerKillCount,
    TotalKillCount,
    Health,
    Level,
    Food,
    Air,
    Armor,
    Xp,
    /// Any other criteria, written verbatim.
    Custom(String),
}

impl Display for Criteria {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let str = match self {
            Self::Dummy => "dummy",
            Self::Trigger => "trigger",
            Self::DeathCount => "deathCount",
            Self::PlayerKillCount => "playerKillCount",
            Self::TotalKillCount => "totalKillCount",
            Self::Health => "health",
            Self::Level => "level",
            Self::Food => "food",
            Self::Air => "air",
            Self::Armor => "armor",
            Self::Xp => "xp",
            Self::Custom(criteria) => criteria,
        };
        f.write_str(str)
    }
}

/// A scoreboard objective.
///
/// The in-game objective name is prefixed with the pack namespace, so `score` in
/// the pack `tmp` becomes `tmp_score`. Commands created by a scoreboard mark it as
/// used once they are added to a script, which makes the pack create it in its
/// generated `initialize_scoreboards` load function.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Scoreboard {
    name: String,
    criteria: Criteria,
}

impl Scoreboard {
    /// Create a new scoreboard value. It is checked against the pack registry once used.
    #[must_use]
    pub fn new(name: &str, criteria: Criteria) -> Self {
        Self {
            name: name.to_string(),
            criteria,
        }
    }

    /// Create a scoreboard with the `dummy` criteria.
    #[must_use]
    pub fn dummy(name: &str) -> Self {
        Self::new(name, Criteria::Dummy)
    }

    /// Get the unprefixed name of the scoreboard.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the criteria of the scoreboard.
    #[must_use]
    pub fn criteria(&self) -> &Criteria {
        &self.criteria
    }

    /// Get the objective name inside the given namespace.
    #[must_use]
    pub fn objective(&self, namespace: &str) -> String {
        format!("{namespace}_{}", self.name)
    }

    /// Command creating the objective.
    #[must_use]
    pub fn create(&self) -> Command {
        ScoreboardCommand::Create(self.clone()).into()
    }

    /// Command setting the score of `target`.
    #[must_use]
    pub fn set(&self, target: &str, value: i32) -> Command {
        ScoreboardCommand::Set {
            scoreboard: self.clone(),
            target: target.to_string(),
            value,
        }
        .into()
    }

    /// Command adding to the score of `target`.
    #[must_use]
    pub fn add(&self, target: &str, value: i32) -> Command {
        ScoreboardCommand::Add {
            scoreboard: self.clone(),
            target: target.to_string(),
            value,
        }
        .into()
    }

    /// Command subtracting from the score of `target`.
    #[must_use]
    pub fn remove(&self, target: &str, value: i32) -> Command {
        ScoreboardCommand::Remove {
            scoreboard: self.clone(),
            target: target.to_string(),
            value,
        }
        .into()
    }

    /// Command setting the score of `target` back to zero.
    #[must_use]
    pub fn reset(&self, target: &str) -> Command {
        ScoreboardCommand::Reset {
            scoreboard: self.clone(),
            target: target.to_string(),
        }
        .into()
    }
}

/// A command operating on a scoreboard.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoreboardCommand {
    Create(Scoreboard),
    Set {
        scoreboard: Scoreboard,
        target: String,
        value: i32,
    },
    Add {
        scoreboard: Scoreboard,
        target: String,
        value: i32,
    },
    Remove {
        scoreboard: Scoreboard,
        target: String,
        value: i32,
    },
    Reset {
        scoreboard: Scoreboard,
        target: String,
    },
}

impl ScoreboardCommand {
    /// Get the scoreboard the command operates on.
    #[must_use]
    pub fn scoreboard(&self) -> &Scoreboard {
        match self {
            Self::Create(scoreboard)
            | Self::Set { scoreboard, .. }
            | Self::Add { scoreboard, .. }
            | Self::Remove { scoreboard, .. }
            | Self::Reset { scoreboard, .. } => scoreboard,
        }
    }

    /// Compile the command for the given namespace.
    ///
    /// # Errors
    /// - If a target selector is empty or contains whitespace
    pub fn compile(&self, namespace: &str) -> Result<String, CommandError> {
        let objective = self.scoreboard().objective(namespace);
        let players = |op: &str, target: &str, value: i32| {
            if target.is_empty() || target.chars().any(char::is_whitespace) {
                Err(CommandError::Validation {
                    command: format!("scoreboard players {op} {target} {objective} {value}"),
                    reason: "target must be a single non-empty token".to_string(),
                })
            } else {
                Ok(format!("scoreboard players {op} {target} {objective} {value}"))
            }
        };
        match self {
            Self::Create(scoreboard) => Ok(format!(
                "scoreboard objectives add {objective} {criteria}",
                criteria = scoreboard.criteria()
            )),
            Self::Set { target, value, .. } => players("set", target, *value),
            Self::Add { target, value, .. } => players("add", target, *value),
            Self::Remove { target, value, .. } => players("remove", target, *value),
            Self::Reset { target, .. } => players("set", target, 0),
        }
    }
}

/// Registry of the scoreboards a pack knows about, keyed by name.
///
/// Used scoreboards are listed in the order of their first use, so the generated
/// initializer is stable across builds.
#[derive(Debug, Clone, Default)]
pub struct ScoreboardRegistry {
    entries: Vec<Scoreboard>,
    /// Indices into `entries` in first-use order.
    touched: Vec<usize>,
}

impl ScoreboardRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a scoreboard. Declaring the same name again with the same criteria is a no-op.
    ///
    /// # Errors
    /// - If the name is not a valid objective name
    /// - If the name is already declared with different criteria
    pub fn declare(&mut self, scoreboard: &Scoreboard) -> Result<(), ScoreboardError> {
        self.entry_index(scoreboard).map(|_| ())
    }

    /// Mark a scoreboard as used, declaring it first if needed.
    ///
    /// Returns whether this was the first use.
    ///
    /// # Errors
    /// - Same as [`Self::declare`]
    pub fn touch(&mut self, scoreboard: &Scoreboard) -> Result<bool, ScoreboardError> {
        let index = self.entry_index(scoreboard)?;
        if self.touched.contains(&index) {
            return Ok(false);
        }
        self.touched.push(index);
        Ok(true)
    }

    /// Get a declared scoreboard by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Scoreboard> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    /// Get all used scoreboards in the order they were first used.
    #[must_use]
    pub fn touched(&self) -> Vec<Scoreboard> {
        self.touched
            .iter()
            .map(|&index| self.entries[index].clone())
            .collect()
    }

    /// Get the number of declared scoreboards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether no scoreboard was declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry_index(&mut self, scoreboard: &Scoreboard) -> Result<usize, ScoreboardError> {
        let name = scoreboard.name();
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '+'))
        {
            return Err(ScoreboardError::InvalidName(name.to_string()));
        }

        if let Some(index) = self
            .entries
            .iter()
            .position(|entry| entry.name == name)
        {
            let existing = &self.entries[index];
            if existing.criteria != scoreboard.criteria {
                return Err(ScoreboardError::CriteriaConflict {
                    name: name.to_string(),
                    existing: existing.criteria.to_string(),
                    requested: scoreboard.criteria.to_string(),
                });
            }
            return Ok(index);
        }

        tracing::trace!("Declaring scoreboard {name} ({})", scoreboard.criteria);
        self.entries.push(scoreboard.clone());
        Ok(self.entries.len() - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declare_dedup() {
        let mut registry = ScoreboardRegistry::new();
        registry
            .declare(&Scoreboard::dummy("score"))
            .expect("first declaration failed");
        registry
            .declare(&Scoreboard::dummy("score"))
            .expect("identical declaration failed");

        assert_eq!(registry.len(), 1);
        assert!(registry.touched().is_empty());
    }

    #[test]
    fn test_criteria_conflict() {
        let mut registry = ScoreboardRegistry::new();
        registry
            .declare(&Scoreboard::dummy("score"))
            .expect("first declaration failed");

        let err = registry
            .declare(&Scoreboard::new("score", Criteria::DeathCount))
            .expect_err("conflict not detected");
        assert_eq!(
            err,
            ScoreboardError::CriteriaConflict {
                name: "score".to_string(),
                existing: "dummy".to_string(),
                requested: "deathCount".to_string(),
            }
        );
    }

    #[test]
    fn test_touch_once() {
        let mut registry = ScoreboardRegistry::new();
        let board = Scoreboard::dummy("kills");

        assert_eq!(registry.touch(&board), Ok(true));
        assert_eq!(registry.touch(&board), Ok(false));
        assert_eq!(registry.touched(), vec![board]);
    }

    #[test]
    fn test_first_use_order() {
        let mut registry = ScoreboardRegistry::new();
        let first = Scoreboard::dummy("a");
        let second = Scoreboard::dummy("b");
        registry.declare(&first).expect("declaration failed");
        registry.declare(&second).expect("declaration failed");

        registry.touch(&second).expect("touch failed");
        registry.touch(&first).expect("touch failed");
        registry.touch(&second).expect("touch failed");

        assert_eq!(registry.touched(), vec![second, first]);
    }

    #[test]
    fn test_invalid_name() {
        let mut registry = ScoreboardRegistry::new();
        assert_eq!(
            registry.declare(&Scoreboard::dummy("has space")),
            Err(ScoreboardError::InvalidName("has space".to_string()))
        );
    }

    #[test]
    fn test_compile() {
        let board = Scoreboard::dummy("score");
        let compile = |cmd: ScoreboardCommand| cmd.compile("tmp").expect("compile failed");

        assert_eq!(
            compile(ScoreboardCommand::Create(board.clone())),
            "scoreboard objectives add tmp_score dummy"
        );
        assert_eq!(
            compile(ScoreboardCommand::Set {
                scoreboard: board.clone(),
                target: "@a".to_string(),
                value: 5,
            }),
            "scoreboard players set @a tmp_score 5"
        );
        assert_eq!(
            compile(ScoreboardCommand::Reset {
                scoreboard: board.clone(),
                target: "@s".to_string(),
            }),
            "scoreboard players set @s tmp_score 0"
        );
        assert!(ScoreboardCommand::Add {
            scoreboard: board,
            target: String::new(),
            value: 1,
        }
        .compile("tmp")
        .is_err());
    }
}
