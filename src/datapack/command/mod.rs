//! Represents a command that can be included in a script.

mod execute;

use std::{fmt::Display, rc::Rc};

pub use execute::{Condition, Execute};

use crate::{
    error::CommandError,
    util::{
        compile::{CompileOptions, FunctionCompilerState},
        resource::validate_resource_location,
    },
};

use super::{
    scoreboard::{Scoreboard, ScoreboardCommand},
    script::Script,
};

/// A command of a script together with its filter flags.
///
/// `dev` commands only appear in development builds. `masked` commands stay in the
/// script's buffer but never produce a line.
#[derive(Debug, Clone)]
pub struct Command {
    kind: CommandKind,
    dev: bool,
    masked: bool,
}

/// Payload of a command.
#[derive(Debug, Clone)]
pub enum CommandKind {
    /// A command written verbatim.
    Raw(String),
    /// A comment, one `#` line per input line.
    Comment(String),
    /// Call to another function.
    Function(FunctionTarget),
    /// Chat message tagged with the rendering script and a level.
    Log {
        /// Severity, decides the colour.
        level: LogLevel,
        /// Message text.
        message: String,
        /// Name of the script the log was added in.
        origin: Option<String>,
    },
    /// Scoreboard command.
    Scoreboard(ScoreboardCommand),
    /// Execute chain.
    Execute(Execute),
}

/// Target of a function call.
#[derive(Debug, Clone)]
pub enum FunctionTarget {
    /// A script of a pack, resolved to its call name when compiled.
    Script(Rc<Script>),
    /// A function given by its resource location.
    Named(String),
}

/// Level of a [`CommandKind::Log`].
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LogLevel {
    #[default]
    Info,
    Warning,
    Critical,
}

impl LogLevel {
    /// Text colour of the level.
    #[must_use]
    pub fn color(self) -> &'static str {
        match self {
            Self::Info => "white",
            Self::Warning => "yellow",
            Self::Critical => "red",
        }
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Critical => "critical",
        })
    }
}

impl Command {
    fn from_kind(kind: CommandKind) -> Self {
        Self {
            kind,
            dev: false,
            masked: false,
        }
    }

    /// Command written verbatim.
    #[must_use]
    pub fn raw(command: &str) -> Self {
        Self::from_kind(CommandKind::Raw(command.to_string()))
    }

    /// Comment, may span multiple lines.
    #[must_use]
    pub fn comment(comment: &str) -> Self {
        Self::from_kind(CommandKind::Comment(comment.to_string()))
    }

    /// Call to a script. The call is dev-only while the script is, including a
    /// placeholder that is later defined as dev-only.
    #[must_use]
    pub fn call(script: &Rc<Script>) -> Self {
        Self::from_kind(CommandKind::Function(FunctionTarget::Script(Rc::clone(
            script,
        ))))
    }

    /// Call to a function by resource location, e.g. `minecraft:tick` or `tmp:utils/reset`.
    #[must_use]
    pub fn call_named(location: &str) -> Self {
        Self::from_kind(CommandKind::Function(FunctionTarget::Named(
            location.to_string(),
        )))
    }

    /// Log message. Logs are always dev-only.
    #[must_use]
    pub fn log(level: LogLevel, message: &str) -> Self {
        Self {
            kind: CommandKind::Log {
                level,
                message: message.to_string(),
                origin: None,
            },
            dev: true,
            masked: false,
        }
    }

    /// Mark the command as dev-only.
    #[must_use]
    pub fn dev(mut self) -> Self {
        self.dev = true;
        self
    }

    /// Mark the command as masked.
    #[must_use]
    pub fn mask(mut self) -> Self {
        self.masked = true;
        self
    }

    /// Set the dev flag.
    pub fn set_dev(&mut self, dev: bool) {
        self.dev = dev;
    }

    /// Set the masked flag.
    pub fn set_masked(&mut self, masked: bool) {
        self.masked = masked;
    }

    /// Check whether the command is dev-only.
    ///
    /// Calls to scripts follow the current dev flag of the called script.
    #[must_use]
    pub fn is_dev(&self) -> bool {
        self.dev
            || matches!(
                &self.kind,
                CommandKind::Function(FunctionTarget::Script(script)) if script.is_dev()
            )
    }

    /// Check whether the command is masked.
    #[must_use]
    pub fn is_masked(&self) -> bool {
        self.masked
    }

    /// Get the payload of the command.
    #[must_use]
    pub fn kind(&self) -> &CommandKind {
        &self.kind
    }

    pub(crate) fn set_origin(&mut self, script: &str) {
        if let CommandKind::Log { origin, .. } = &mut self.kind {
            origin.get_or_insert_with(|| script.to_string());
        }
    }

    /// Get the scoreboard the command uses, if any.
    #[must_use]
    pub fn scoreboard(&self) -> Option<&Scoreboard> {
        match &self.kind {
            CommandKind::Scoreboard(cmd) => Some(cmd.scoreboard()),
            CommandKind::Execute(ex) => ex.command().and_then(Command::scoreboard),
            _ => None,
        }
    }

    /// Check whether the command is available in the given pack format.
    ///
    /// # Errors
    /// - If the command requires a newer pack format
    pub fn validate(&self, pack_format: u8) -> Result<(), CommandError> {
        match &self.kind {
            CommandKind::Execute(ex) => ex.validate(pack_format),
            _ => Ok(()),
        }
    }

    /// Short name of the command, used in error messages.
    #[must_use]
    pub fn name(&self) -> &str {
        match &self.kind {
            CommandKind::Raw(cmd) => cmd.split_whitespace().next().unwrap_or("raw"),
            CommandKind::Comment(_) => "comment",
            CommandKind::Function(_) => "function",
            CommandKind::Log { .. } => "tellraw",
            CommandKind::Scoreboard(_) => "scoreboard",
            CommandKind::Execute(ex) => ex.variant_name(),
        }
    }

    /// Compile the command into a line of the function file.
    ///
    /// Returns `None` if the command is masked or dev-only in a production build.
    ///
    /// # Errors
    /// - If the compiled text fails validation
    /// - If a called script cannot be resolved
    pub fn compile(
        &self,
        options: &CompileOptions,
        function_state: &FunctionCompilerState,
    ) -> Result<Option<String>, CommandError> {
        if self.masked || (self.is_dev() && !options.debug) {
            return Ok(None);
        }
        let line = match &self.kind {
            CommandKind::Raw(command) => validate_raw(command)?,
            CommandKind::Comment(comment) => compile_comment(comment),
            CommandKind::Function(target) => format!("function {}", target.resolve()?),
            CommandKind::Log {
                level,
                message,
                origin,
            } => compile_log(*level, message, origin.as_deref())?,
            CommandKind::Scoreboard(cmd) => cmd.compile(function_state.namespace())?,
            CommandKind::Execute(ex) => match ex.compile(options, function_state)? {
                Some(line) => line,
                None => return Ok(None),
            },
        };
        Ok(Some(line))
    }

    /// Check whether the command compiles to a comment line.
    #[must_use]
    pub fn is_comment(&self) -> bool {
        matches!(self.kind, CommandKind::Comment(_))
    }
}

impl FunctionTarget {
    /// Resolve the target to a namespaced call name.
    ///
    /// # Errors
    /// - If the script is not attached to a pack
    /// - If the named location is malformed
    pub fn resolve(&self) -> Result<String, CommandError> {
        match self {
            Self::Script(script) => Ok(script.call_name()?),
            Self::Named(location) => {
                validate_resource_location(location)?;
                Ok(location.clone())
            }
        }
    }
}

fn validate_raw(command: &str) -> Result<String, CommandError> {
    let invalid = |reason: &str| CommandError::Validation {
        command: command.to_string(),
        reason: reason.to_string(),
    };
    let trimmed = command.trim();
    if trimmed.is_empty() {
        return Err(invalid("command is empty"));
    }
    if trimmed.contains('\n') {
        return Err(invalid("command spans multiple lines"));
    }
    if trimmed.starts_with('/') {
        return Err(invalid("function commands must not start with '/'"));
    }
    if trimmed
        .split_whitespace()
        .next()
        .is_some_and(|token| token.parse::<f64>().is_ok())
    {
        return Err(invalid("command must not start with a number"));
    }
    Ok(trimmed.to_string())
}

fn compile_comment(comment: &str) -> String {
    comment
        .split('\n')
        .map(|line| format!("# {line}").trim_end().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

fn compile_log(level: LogLevel, message: &str, origin: Option<&str>) -> Result<String, CommandError> {
    let text = serde_json::json!({
        "text": format!("[{} | {level}] - {message}", origin.unwrap_or("N/A")),
        "color": level.color(),
    });
    let text = serde_json::to_string(&text).map_err(|err| CommandError::Validation {
        command: "tellraw".to_string(),
        reason: err.to_string(),
    })?;
    Ok(format!("tellraw @a {text}"))
}

impl From<&str> for Command {
    fn from(value: &str) -> Self {
        Self::raw(value)
    }
}
impl From<String> for Command {
    fn from(value: String) -> Self {
        Self::from_kind(CommandKind::Raw(value))
    }
}
impl From<Execute> for Command {
    fn from(ex: Execute) -> Self {
        Self::from_kind(CommandKind::Execute(ex))
    }
}
impl From<ScoreboardCommand> for Command {
    fn from(cmd: ScoreboardCommand) -> Self {
        Self::from_kind(CommandKind::Scoreboard(cmd))
    }
}
