//! Containers that own scripts: the pack root, modules and templates.

use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

use crate::{
    error::{BoxError, DefinitionError, PackError},
    util::resource::{join_path, validate_path, validate_segment},
};

use super::{context::ScriptContext, file::PackFile, script::Script, PackShared};

/// Function tag a script can be sorted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sort {
    /// Run every tick, `minecraft:tick`.
    Tick,
    /// Run on (re)load, `minecraft:load`.
    Load,
}

impl Sort {
    /// Name of the function tag.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Tick => "tick",
            Self::Load => "load",
        }
    }
}

/// Options for defining a script.
#[derive(Debug, Clone, Default)]
pub struct ScriptOptions {
    dev: bool,
    sort: Option<Sort>,
    description: Option<String>,
    path: String,
}

impl ScriptOptions {
    /// Only include the script in development builds.
    #[must_use]
    pub fn with_dev(self, dev: bool) -> Self {
        Self { dev, ..self }
    }

    /// Add the script to the `tick` or `load` function tag.
    #[must_use]
    pub fn with_sort(self, sort: Sort) -> Self {
        Self {
            sort: Some(sort),
            ..self
        }
    }

    /// Set the description written below the header of the function file.
    #[must_use]
    pub fn with_description(self, description: &str) -> Self {
        Self {
            description: Some(description.to_string()),
            ..self
        }
    }

    /// Place the script below an additional path of the function directory.
    #[must_use]
    pub fn with_path(self, path: &str) -> Self {
        Self {
            path: path.to_string(),
            ..self
        }
    }
}

/// Node of the module tree.
///
/// Holds only weak references to the pack and its scripts, the registry owns them.
#[doc(hidden)]
#[derive(Debug)]
pub struct ModuleNode {
    name: RefCell<String>,
    parent: Option<Rc<ModuleNode>>,
    pack: Weak<PackShared>,
    scripts: RefCell<Vec<Weak<Script>>>,
}

impl ModuleNode {
    pub(crate) fn root(pack: Weak<PackShared>) -> Rc<Self> {
        Rc::new(Self {
            name: RefCell::new(String::new()),
            parent: None,
            pack,
            scripts: RefCell::new(Vec::new()),
        })
    }

    fn child(parent: &Rc<Self>, name: &str) -> Rc<Self> {
        Rc::new(Self {
            name: RefCell::new(name.to_string()),
            parent: Some(Rc::clone(parent)),
            pack: parent.pack.clone(),
            scripts: RefCell::new(Vec::new()),
        })
    }

    /// Path of the node below the function directory, built from its ancestors.
    pub fn file_root(&self) -> String {
        let parent_root = self
            .parent
            .as_ref()
            .map(|parent| parent.file_root())
            .unwrap_or_default();
        join_path([parent_root.as_str(), self.name.borrow().as_str()])
    }

    pub(crate) fn pack(&self) -> Option<Rc<PackShared>> {
        self.pack.upgrade()
    }

    fn script(&self, name: &str) -> Option<Rc<Script>> {
        self.scripts
            .borrow()
            .iter()
            .filter_map(Weak::upgrade)
            .find(|script| script.name() == name)
    }

    fn scripts(&self) -> Vec<Rc<Script>> {
        self.scripts
            .borrow()
            .iter()
            .filter_map(Weak::upgrade)
            .collect()
    }
}

/// Capability of owning scripts.
///
/// Implemented by [`super::Datapack`] for the pack root and by [`Module`].
pub trait ScriptDecoratable {
    #[doc(hidden)]
    fn node(&self) -> &Rc<ModuleNode>;

    /// Define a script with default options.
    ///
    /// # Errors
    /// - Same as [`Self::add_script`]
    fn mcfn<F>(&self, name: &str, body: F) -> Result<Rc<Script>, PackError>
    where
        F: FnOnce(&mut ScriptContext<'_>) -> Result<(), BoxError> + 'static,
    {
        self.mcfn_with(name, ScriptOptions::default(), body)
    }

    /// Define a script.
    ///
    /// # Errors
    /// - Same as [`Self::add_script`]
    fn mcfn_with<F>(
        &self,
        name: &str,
        options: ScriptOptions,
        body: F,
    ) -> Result<Rc<Script>, PackError>
    where
        F: FnOnce(&mut ScriptContext<'_>) -> Result<(), BoxError> + 'static,
    {
        define_script(self.node(), Script::new(name, body), options)
    }

    /// Define a script whose body also receives the script itself.
    ///
    /// # Errors
    /// - Same as [`Self::add_script`]
    fn mcfn_script<F>(
        &self,
        name: &str,
        options: ScriptOptions,
        body: F,
    ) -> Result<Rc<Script>, PackError>
    where
        F: FnOnce(&mut ScriptContext<'_>, &Script) -> Result<(), BoxError> + 'static,
    {
        define_script(self.node(), Script::with_script(name, body), options)
    }

    /// Register a script under `data/<namespace>/function[/<alternate_path>]`.
    ///
    /// The script is rendered right away unless another script is rendering, in which
    /// case the build renders it.
    ///
    /// # Errors
    /// - If the name or path is invalid
    /// - If this container already has a script of that name
    /// - If the script belongs to another container
    /// - If rendering it fails
    fn add_script(
        &self,
        script: impl Into<Rc<Script>>,
        sort: Option<Sort>,
        alternate_path: &str,
    ) -> Result<Rc<Script>, PackError> {
        register_script(self.node(), script.into(), sort, alternate_path)
    }

    /// Get a script of this container by name.
    ///
    /// Unknown names return a placeholder that a later definition of the same name
    /// completes. The build fails if it never is.
    ///
    /// # Errors
    /// - If the name is invalid
    /// - If the container is not attached to a pack
    fn find(&self, name: &str) -> Result<Rc<Script>, PackError> {
        let node = self.node();
        if let Some(script) = node.script(name) {
            return Ok(script);
        }
        validate_segment(name)?;
        let pack = node
            .pack()
            .ok_or_else(|| DefinitionError::NotAttached(name.to_string()))?;

        let placeholder = Rc::new(Script::placeholder(name));
        placeholder.set_owner(Rc::clone(node));
        node.scripts.borrow_mut().push(Rc::downgrade(&placeholder));
        pack.placeholders.borrow_mut().push(Rc::clone(&placeholder));
        tracing::debug!("Created placeholder for {}", placeholder.function_path());
        Ok(placeholder)
    }

    /// Path of this container below the function directory.
    fn file_root(&self) -> String {
        self.node().file_root()
    }

    /// Get the scripts of this container, including placeholders.
    fn scripts(&self) -> Vec<Rc<Script>> {
        self.node().scripts()
    }
}

fn define_script(
    node: &Rc<ModuleNode>,
    script: Script,
    options: ScriptOptions,
) -> Result<Rc<Script>, PackError> {
    let mut script = script.with_dev(options.dev);
    if let Some(description) = options.description.as_deref() {
        script = script.with_description(description);
    }

    match node.script(script.name()) {
        Some(placeholder) if placeholder.is_placeholder() => {
            placeholder.fill(script)?;
            register_script(node, placeholder, options.sort, &options.path)
        }
        _ => register_script(node, Rc::new(script), options.sort, &options.path),
    }
}

#[tracing::instrument(level = "debug", skip_all, fields(script = %script.name()))]
fn register_script(
    node: &Rc<ModuleNode>,
    script: Rc<Script>,
    sort: Option<Sort>,
    alternate_path: &str,
) -> Result<Rc<Script>, PackError> {
    let alternate_path = alternate_path.trim_matches('/');
    validate_segment(script.name())?;
    if !alternate_path.is_empty() {
        validate_path(alternate_path)?;
    }
    let pack = node
        .pack()
        .ok_or_else(|| DefinitionError::NotAttached(script.name().to_string()))?;

    let was_placeholder = pack.take_placeholder(&script);
    if script.is_placeholder() {
        return Err(DefinitionError::Placeholder(script.name().to_string()).into());
    }
    if !was_placeholder {
        if node.script(script.name()).is_some() {
            return Err(DefinitionError::DuplicateScript {
                name: script.name().to_string(),
                path: join_path([alternate_path, node.file_root().as_str()]),
            }
            .into());
        }
        if script.is_attached() {
            return Err(DefinitionError::AlreadyDefined(script.name().to_string()).into());
        }
        script.set_owner(Rc::clone(node));
        node.scripts.borrow_mut().push(Rc::downgrade(&script));
    }
    script.set_alternate_path(alternate_path);

    pack.registry.borrow_mut().register(
        &pack.info.function_directory(alternate_path),
        PackFile::Script(Rc::clone(&script)),
    );
    if let Some(sort) = sort {
        pack.add_script_to_taglist(sort.name(), &script);
    }

    if script.is_dev() && !pack.info.options().debug {
        tracing::debug!("Skipping render of dev script {}", script.function_path());
        return Ok(script);
    }
    pack.render_queue.push(Rc::clone(&script));
    if pack.context.is_open() {
        tracing::debug!(
            "Deferring render of {} defined while rendering",
            script.function_path()
        );
    } else {
        script
            .prerender()
            .map_err(|err| pack.info.render_error(err))?;
    }

    Ok(script)
}

/// A nested container of scripts.
///
/// Scripts of a module are written below the module's path, which is the chain of
/// module names from the pack root.
#[derive(Debug, Clone)]
pub struct Module {
    node: Rc<ModuleNode>,
}

impl Module {
    pub(crate) fn new(parent: &Rc<ModuleNode>, name: &str) -> Result<Self, DefinitionError> {
        validate_segment(name)?;
        Ok(Self {
            node: ModuleNode::child(parent, name),
        })
    }

    /// Get the name of the module.
    #[must_use]
    pub fn name(&self) -> String {
        self.node.name.borrow().clone()
    }

    /// Rename the module. Scripts already defined in it move along.
    ///
    /// # Errors
    /// - If the name is invalid
    pub fn rename(&self, name: &str) -> Result<(), DefinitionError> {
        validate_segment(name)?;
        *self.node.name.borrow_mut() = name.to_string();
        Ok(())
    }

    /// Create a module nested in this one.
    ///
    /// # Errors
    /// - If the name is invalid
    pub fn module(&self, name: &str) -> Result<Module, DefinitionError> {
        Self::new(&self.node, name)
    }
}

impl ScriptDecoratable for Module {
    fn node(&self) -> &Rc<ModuleNode> {
        &self.node
    }
}
