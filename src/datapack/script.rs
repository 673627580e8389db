//! Scripts, the deferred bodies that render to `.mcfunction` files.

use std::{
    cell::{Cell, RefCell},
    fmt::Debug,
    rc::Rc,
};

use crate::{
    error::{BoxError, ContextError, DefinitionError, ScriptError},
    util::{compile::FunctionCompilerState, resource::join_path},
};

use super::{command::Command, context::ScriptContext, module::ModuleNode, PackShared};

type PlainBody = Box<dyn FnOnce(&mut ScriptContext<'_>) -> Result<(), BoxError>>;
type ScriptBody = Box<dyn FnOnce(&mut ScriptContext<'_>, &Script) -> Result<(), BoxError>>;

enum Body {
    Plain(PlainBody),
    WithScript(ScriptBody),
}

enum RenderState {
    /// Referenced by name, no body yet.
    Placeholder,
    Pending(Body),
    Rendering,
    Rendered(Rc<Vec<Command>>),
    Failed,
}

impl RenderState {
    fn name(&self) -> &'static str {
        match self {
            Self::Placeholder => "placeholder",
            Self::Pending(_) => "pending",
            Self::Rendering => "rendering",
            Self::Rendered(_) => "rendered",
            Self::Failed => "failed",
        }
    }
}

/// A named function of the pack.
///
/// The body runs at most once, the first time the script is rendered. Every later
/// render reuses the commands of that run.
pub struct Script {
    name: String,
    description: RefCell<Option<String>>,
    dev: Cell<bool>,
    pass_script: Cell<bool>,
    state: RefCell<RenderState>,
    owner: RefCell<Option<Rc<ModuleNode>>>,
    alternate_path: RefCell<String>,
}

impl Script {
    fn from_state(name: &str, state: RenderState, pass_script: bool) -> Self {
        Self {
            name: name.to_string(),
            description: RefCell::new(None),
            dev: Cell::new(false),
            pass_script: Cell::new(pass_script),
            state: RefCell::new(state),
            owner: RefCell::new(None),
            alternate_path: RefCell::new(String::new()),
        }
    }

    /// Create a script whose body only receives the context.
    pub fn new<F>(name: &str, body: F) -> Self
    where
        F: FnOnce(&mut ScriptContext<'_>) -> Result<(), BoxError> + 'static,
    {
        Self::from_state(name, RenderState::Pending(Body::Plain(Box::new(body))), false)
    }

    /// Create a script whose body also receives the script itself.
    pub fn with_script<F>(name: &str, body: F) -> Self
    where
        F: FnOnce(&mut ScriptContext<'_>, &Script) -> Result<(), BoxError> + 'static,
    {
        Self::from_state(
            name,
            RenderState::Pending(Body::WithScript(Box::new(body))),
            true,
        )
    }

    pub(crate) fn placeholder(name: &str) -> Self {
        Self::from_state(name, RenderState::Placeholder, false)
    }

    /// Set the description written below the header of the function file.
    #[must_use]
    pub fn with_description(self, description: &str) -> Self {
        *self.description.borrow_mut() = Some(description.to_string());
        self
    }

    /// Set whether the script only exists in development builds.
    #[must_use]
    pub fn with_dev(self, dev: bool) -> Self {
        self.dev.set(dev);
        self
    }

    /// Get the name of the script.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the description of the script.
    #[must_use]
    pub fn description(&self) -> Option<String> {
        self.description.borrow().clone()
    }

    /// Check whether the script only exists in development builds.
    #[must_use]
    pub fn is_dev(&self) -> bool {
        self.dev.get()
    }

    /// Check whether the body receives the script itself.
    #[must_use]
    pub fn pass_script(&self) -> bool {
        self.pass_script.get()
    }

    /// Check whether the body has run successfully.
    #[must_use]
    pub fn is_rendered(&self) -> bool {
        matches!(*self.state.borrow(), RenderState::Rendered(_))
    }

    /// Check whether the script was referenced but not defined yet.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        matches!(*self.state.borrow(), RenderState::Placeholder)
    }

    /// Check whether the script belongs to a pack.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.owner.borrow().is_some()
    }

    /// Get the path of the function below the function directory of the namespace,
    /// e.g. `outer/inner/init`.
    ///
    /// Resolved on every call, so renaming a module moves its scripts.
    #[must_use]
    pub fn function_path(&self) -> String {
        let owner_root = self.owner_root();
        let alternate_path = self.alternate_path.borrow();
        join_path([alternate_path.as_str(), owner_root.as_str(), self.name.as_str()])
    }

    /// Get the namespaced call name of the function, e.g. `tmp:outer/inner/init`.
    ///
    /// # Errors
    /// - If the script is not attached to a pack
    pub fn call_name(&self) -> Result<String, DefinitionError> {
        let pack = self.pack()?;
        Ok(format!("{}:{}", pack.info.namespace(), self.function_path()))
    }

    /// Get the file name of the function relative to the directory it is registered in.
    #[must_use]
    pub fn file_name(&self) -> String {
        let owner_root = self.owner_root();
        format!(
            "{}.mcfunction",
            join_path([owner_root.as_str(), self.name.as_str()])
        )
    }

    /// Get the path of the function file inside the pack.
    ///
    /// # Errors
    /// - If the script is not attached to a pack
    pub fn file_path(&self) -> Result<String, DefinitionError> {
        let pack = self.pack()?;
        let directory = pack
            .info
            .function_directory(self.alternate_path.borrow().as_str());
        Ok(format!("{directory}/{}", self.file_name()))
    }

    /// Render the function file.
    ///
    /// Runs the body on the first call. Files without commands consist of a single
    /// comment so no function file is ever blank.
    ///
    /// # Errors
    /// - If the body fails, now or on an earlier render
    /// - If the script is a placeholder or not attached to a pack
    /// - If another script of the pack is rendering
    /// - If a command fails validation
    pub fn render(&self) -> Result<String, ScriptError> {
        let commands = self.ensure_rendered()?;
        let pack = self.pack().map_err(|err| self.error(Box::new(err)))?;
        let info = &pack.info;

        if commands.is_empty() {
            return Ok(format!("# No content generated for {}.mcfunction", self.name));
        }

        let call_name = format!("{}:{}", info.namespace(), self.function_path());
        let function_state = FunctionCompilerState::new(&call_name, info.namespace());

        let mut content = vec![
            format!(
                "# This script was automatically generated for [{}]",
                info.name()
            ),
            format!(
                "# MC Version: {} [{}]",
                info.version(),
                info.pack_format()
            ),
        ];
        if let Some(description) = self.description() {
            content.push("# ---".to_string());
            content.extend(
                description
                    .lines()
                    .map(|line| format!("# {line}").trim_end().to_string()),
            );
        }
        content.push(String::new());

        for command in commands.iter() {
            if let Some(line) = command
                .compile(info.options(), &function_state)
                .map_err(|err| self.error(Box::new(err)))?
            {
                content.push(line);
            }
        }

        Ok(content.join("\n"))
    }

    /// Get the commands built by the body, running it first if needed.
    ///
    /// # Errors
    /// - Same as [`Self::render`]
    pub fn commands(&self) -> Result<Vec<Command>, ScriptError> {
        self.ensure_rendered()
            .map(|commands| commands.as_ref().clone())
    }

    pub(crate) fn prerender(&self) -> Result<(), ScriptError> {
        self.ensure_rendered().map(|_| ())
    }

    #[tracing::instrument(level = "trace", skip(self), fields(script = %self.name))]
    fn ensure_rendered(&self) -> Result<Rc<Vec<Command>>, ScriptError> {
        let body = match self.state.replace(RenderState::Rendering) {
            RenderState::Pending(body) => body,
            RenderState::Rendered(commands) => {
                let cached = Rc::clone(&commands);
                self.state.replace(RenderState::Rendered(commands));
                return Ok(cached);
            }
            RenderState::Rendering => {
                return Err(self.error(Box::new(ContextError::Reentrant {
                    script: self.name.clone(),
                })));
            }
            RenderState::Failed => {
                self.state.replace(RenderState::Failed);
                return Err(self.error(Box::new(ContextError::PreviouslyFailed {
                    script: self.name.clone(),
                })));
            }
            RenderState::Placeholder => {
                self.state.replace(RenderState::Placeholder);
                return Err(self.error(Box::new(DefinitionError::Placeholder(
                    self.name.clone(),
                ))));
            }
        };

        let pack = match self.pack() {
            Ok(pack) => pack,
            Err(err) => {
                self.state.replace(RenderState::Pending(body));
                return Err(self.error(Box::new(err)));
            }
        };
        let call_name = format!("{}:{}", pack.info.namespace(), self.function_path());
        let guard = match pack.context.open(&call_name) {
            Ok(guard) => guard,
            Err(err) => {
                self.state.replace(RenderState::Pending(body));
                return Err(self.error(Box::new(err)));
            }
        };

        let mut ctx = ScriptContext::new(self, &pack);
        let result = match body {
            Body::Plain(body) => body(&mut ctx),
            Body::WithScript(body) => body(&mut ctx, self),
        };
        let commands = ctx.close();
        drop(guard);

        match result {
            Ok(()) => {
                tracing::debug!("Rendered {call_name} with {} commands", commands.len());
                let commands = Rc::new(commands);
                self.state
                    .replace(RenderState::Rendered(Rc::clone(&commands)));
                Ok(commands)
            }
            Err(err) => {
                self.state.replace(RenderState::Failed);
                Err(self.error(err))
            }
        }
    }

    fn error(&self, source: BoxError) -> ScriptError {
        let call_name = self
            .call_name()
            .unwrap_or_else(|_| self.function_path());
        let file = self.file_path().unwrap_or_else(|_| self.file_name());
        ScriptError::new(&self.name, call_name, file, source)
    }

    fn owner_root(&self) -> String {
        self.owner
            .borrow()
            .as_ref()
            .map(|owner| owner.file_root())
            .unwrap_or_default()
    }

    pub(crate) fn pack(&self) -> Result<Rc<PackShared>, DefinitionError> {
        self.owner
            .borrow()
            .as_ref()
            .ok_or_else(|| DefinitionError::NotAttached(self.name.clone()))?
            .pack()
            .ok_or_else(|| DefinitionError::NotAttached(self.name.clone()))
    }

    pub(crate) fn set_owner(&self, owner: Rc<ModuleNode>) {
        *self.owner.borrow_mut() = Some(owner);
    }

    pub(crate) fn set_alternate_path(&self, path: &str) {
        *self.alternate_path.borrow_mut() = path.trim_matches('/').to_string();
    }

    /// Give a placeholder the body and flags of `definition`.
    pub(crate) fn fill(&self, definition: Script) -> Result<(), DefinitionError> {
        if !self.is_placeholder() {
            return Err(DefinitionError::AlreadyDefined(self.name.clone()));
        }
        self.state.replace(definition.state.into_inner());
        self.description
            .replace(definition.description.into_inner());
        self.dev.set(definition.dev.get());
        self.pass_script.set(definition.pass_script.get());
        Ok(())
    }
}

impl Debug for Script {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Script")
            .field("name", &self.name)
            .field("path", &self.function_path())
            .field("dev", &self.dev.get())
            .field("pass_script", &self.pass_script.get())
            .field("state", &self.state.borrow().name())
            .finish_non_exhaustive()
    }
}
