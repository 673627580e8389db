use std::ops::{BitAnd, Not};

use super::{Command, CommandKind};
use crate::{
    error::CommandError,
    util::compile::{CompileOptions, FunctionCompilerState},
};

/// Execute command with all its variants.
#[allow(missing_docs)]
#[derive(Debug, Clone)]
pub enum Execute {
    Align(String, Box<Execute>),
    Anchored(String, Box<Execute>),
    As(String, Box<Execute>),
    At(String, Box<Execute>),
    AsAt(String, Box<Execute>),
    Facing(String, Box<Execute>),
    In(String, Box<Execute>),
    On(String, Box<Execute>),
    Positioned(String, Box<Execute>),
    Rotated(String, Box<Execute>),
    Store(String, Box<Execute>),
    Summon(String, Box<Execute>),
    If(Condition, Box<Execute>),
    Run(Box<Command>),
}

impl Execute {
    /// Wrap a command into the end of an execute chain.
    #[must_use]
    pub fn run(command: impl Into<Command>) -> Self {
        Self::Run(Box::new(command.into()))
    }

    /// Compile the execute command into a single line.
    ///
    /// Returns `None` if the command at the end of the chain is filtered out.
    ///
    /// # Errors
    /// - If a condition cannot be expressed in one line
    /// - If the inner command fails to compile
    pub fn compile(
        &self,
        options: &CompileOptions,
        function_state: &FunctionCompilerState,
    ) -> Result<Option<String>, CommandError> {
        // a bare run skips the execute part
        if let Self::Run(cmd) = self {
            cmd.compile(options, function_state)
        } else {
            self.compile_internal(String::from("execute "), options, function_state)
        }
    }

    fn compile_internal(
        &self,
        prefix: String,
        options: &CompileOptions,
        function_state: &FunctionCompilerState,
    ) -> Result<Option<String>, CommandError> {
        match self {
            Self::Align(arg, next)
            | Self::Anchored(arg, next)
            | Self::As(arg, next)
            | Self::At(arg, next)
            | Self::Facing(arg, next)
            | Self::In(arg, next)
            | Self::On(arg, next)
            | Self::Positioned(arg, next)
            | Self::Rotated(arg, next)
            | Self::Store(arg, next)
            | Self::Summon(arg, next) => next.compile_internal(
                format!("{prefix}{op} {arg} ", op = self.variant_name()),
                options,
                function_state,
            ),
            Self::AsAt(selector, next) => next.compile_internal(
                format!("{prefix}as {selector} at @s "),
                options,
                function_state,
            ),
            Self::If(cond, next) => next.compile_internal(
                format!("{prefix}{} ", cond.compile()?),
                options,
                function_state,
            ),
            Self::Run(command) => {
                let Some(line) = command.compile(options, function_state)? else {
                    return Ok(None);
                };
                let nested = matches!(command.kind(), CommandKind::Execute(_))
                    .then(|| line.strip_prefix("execute "))
                    .flatten();
                Ok(Some(match nested {
                    Some(rest) => prefix + rest,
                    None => map_run_cmd(line, &prefix),
                }))
            }
        }
    }

    /// Get the variant name of the execute command.
    #[must_use]
    pub fn variant_name(&self) -> &str {
        match self {
            Self::Align(..) => "align",
            Self::Anchored(..) => "anchored",
            Self::As(..) => "as",
            Self::At(..) => "at",
            Self::AsAt(..) => "as_at",
            Self::Facing(..) => "facing",
            Self::In(..) => "in",
            Self::On(..) => "on",
            Self::Positioned(..) => "positioned",
            Self::Rotated(..) => "rotated",
            Self::Store(..) => "store",
            Self::Summon(..) => "summon",
            Self::If(..) => "if",
            Self::Run(..) => "run",
        }
    }

    fn next(&self) -> Option<&Execute> {
        match self {
            Self::Align(_, next)
            | Self::Anchored(_, next)
            | Self::As(_, next)
            | Self::At(_, next)
            | Self::AsAt(_, next)
            | Self::Facing(_, next)
            | Self::In(_, next)
            | Self::On(_, next)
            | Self::Positioned(_, next)
            | Self::Rotated(_, next)
            | Self::Store(_, next)
            | Self::Summon(_, next)
            | Self::If(_, next) => Some(next),
            Self::Run(_) => None,
        }
    }

    /// Get the command at the end of the chain.
    #[must_use]
    pub fn command(&self) -> Option<&Command> {
        match self {
            Self::Run(cmd) => Some(cmd),
            ex => ex.next().and_then(Execute::command),
        }
    }

    /// Check whether every part of the chain is available in the given pack format.
    ///
    /// # Errors
    /// - Names the first part that requires a newer pack format
    pub fn validate(&self, pack_format: u8) -> Result<(), CommandError> {
        match self {
            Self::Run(cmd) => cmd.validate(pack_format),
            Self::Summon(..) | Self::On(..) if pack_format < 12 => {
                Err(CommandError::Unsupported {
                    command: format!("execute {}", self.variant_name()),
                    required: 12,
                    actual: pack_format,
                })
            }
            ex => ex
                .next()
                .map_or(Ok(()), |next| next.validate(pack_format)),
        }
    }
}

/// Combine command parts, respecting if the second part is a comment
fn map_run_cmd(cmd: String, prefix: &str) -> String {
    if cmd.starts_with('#') {
        cmd
    } else {
        prefix.to_string() + "run " + &cmd
    }
}

/// Condition of an `execute if` part.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Atom(String),
    Not(Box<Condition>),
    And(Box<Condition>, Box<Condition>),
}

impl Condition {
    /// Normalize the condition, removing double negation.
    #[must_use]
    pub fn normalize(&self) -> Self {
        match self {
            Self::Atom(_) => self.clone(),
            Self::Not(c) => match c.as_ref() {
                Self::Not(inner) => inner.normalize(),
                other => Self::Not(Box::new(other.normalize())),
            },
            Self::And(c1, c2) => c1.normalize() & c2.normalize(),
        }
    }

    /// Compile the condition into its `if`/`unless` parts.
    ///
    /// # Errors
    /// - If a conjunction is negated, which has no single-line form
    pub fn compile(&self) -> Result<String, CommandError> {
        match self.normalize() {
            Self::Atom(a) => Ok("if ".to_string() + &a),
            Self::Not(n) => match *n {
                Self::Atom(a) => Ok("unless ".to_string() + &a),
                _ => Err(CommandError::Validation {
                    command: format!("{self:?}"),
                    reason: "a negated conjunction cannot be written in one execute command"
                        .to_string(),
                }),
            },
            Self::And(c1, c2) => Ok(c1.compile()? + " " + &c2.compile()?),
        }
    }
}

impl From<&str> for Condition {
    fn from(s: &str) -> Self {
        Self::Atom(s.to_string())
    }
}

impl Not for Condition {
    type Output = Self;

    fn not(self) -> Self {
        Self::Not(Box::new(self))
    }
}
impl BitAnd for Condition {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self::And(Box::new(self), Box::new(rhs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(ex: &Execute) -> Result<Option<String>, CommandError> {
        ex.compile(
            &CompileOptions::default(),
            &FunctionCompilerState::new("tmp:test", "tmp"),
        )
    }

    #[test]
    fn test_compile() {
        let compiled = compile(&Execute::As(
            "@a".to_string(),
            Box::new(Execute::If(
                "block ~ ~-1 ~ minecraft:stone".into(),
                Box::new(Execute::run("say hi")),
            )),
        ));

        assert_eq!(
            compiled,
            Ok(Some(
                "execute as @a if block ~ ~-1 ~ minecraft:stone run say hi".to_string()
            ))
        );

        let direct = compile(&Execute::run("say direct"));

        assert_eq!(direct, Ok(Some("say direct".to_string())));
    }

    #[test]
    fn test_nested_and_comment() {
        let nested = Execute::AsAt(
            "@p".to_string(),
            Box::new(Execute::run(Execute::At(
                "@s".to_string(),
                Box::new(Execute::run("say nested")),
            ))),
        );
        assert_eq!(
            compile(&nested),
            Ok(Some("execute as @p at @s at @s run say nested".to_string()))
        );

        let comment = Execute::As(
            "@a".to_string(),
            Box::new(Execute::run(Command::comment("note"))),
        );
        assert_eq!(compile(&comment), Ok(Some("# note".to_string())));
    }

    #[test]
    fn test_condition() {
        let c1 = Condition::Atom("foo".to_string());
        let c2 = Condition::Atom("bar".to_string());

        assert_eq!((!!c1.clone()).normalize(), c1.clone());
        assert_eq!(
            (c1.clone() & !c2.clone()).compile(),
            Ok("if foo unless bar".to_string())
        );
        assert!((!(c1 & c2)).compile().is_err());
    }

    #[test]
    fn test_validate() {
        let on = Execute::On("attacker".to_string(), Box::new(Execute::run("kill @s")));
        assert!(on.validate(12).is_ok());
        assert_eq!(
            on.validate(10),
            Err(CommandError::Unsupported {
                command: "execute on".to_string(),
                required: 12,
                actual: 10,
            })
        );
    }
}
