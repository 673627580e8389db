//! Datapack module for defining and building Minecraft datapacks.

pub mod command;
mod context;
pub mod file;
pub mod mcmeta;
mod module;
mod registry;
pub mod scoreboard;
mod script;
pub mod tag;
mod template;

pub use context::{ContextGuard, ContextSlot, ScriptContext};
pub use module::{Module, ScriptDecoratable, ScriptOptions, Sort};
pub use registry::PackFileSystem;
pub use script::Script;
pub use template::Template;

use std::{cell::RefCell, path::PathBuf, rc::Rc};

use getset::Getters;

use crate::{
    config::PackConfig,
    error::{DefinitionError, PackError, ScoreboardError, ScriptError},
    plugin::Plugin,
    util::{
        compile::CompileOptions,
        pack_format::{advancement_directory_name, function_directory_name},
        resource::{join_path, validate_namespace, validate_path},
        ExtendableQueue,
    },
    version::Version,
    virtual_fs::{VFile, VFolder},
};

use self::{
    file::{Advancement, JsonFile, PackFile, TextFile},
    mcmeta::McMeta,
    module::ModuleNode,
    scoreboard::{Criteria, Scoreboard, ScoreboardRegistry},
    tag::{TagTable, TagType},
};

/// Fixed facts about a pack, available while rendering.
#[derive(Debug, Clone, Getters)]
pub struct PackInfo {
    /// Name of the pack.
    #[get = "pub"]
    name: String,
    /// Namespace of the pack's functions.
    #[get = "pub"]
    namespace: String,
    /// Target game version.
    #[get = "pub"]
    version: Version,
    /// Compile options derived from the configuration.
    #[get = "pub"]
    options: CompileOptions,
    /// Whether written files are logged.
    #[get = "pub"]
    log_files: bool,
}

impl PackInfo {
    /// Get the pack format the pack targets.
    #[must_use]
    pub fn pack_format(&self) -> u8 {
        self.options.pack_format
    }

    /// Get the function directory of the namespace, with an optional sub path,
    /// e.g. `data/tmp/function/dev_tools`.
    #[must_use]
    pub fn function_directory(&self, sub_path: &str) -> String {
        join_path([
            "data",
            self.namespace.as_str(),
            function_directory_name(self.pack_format()),
            sub_path,
        ])
    }

    /// Get the advancement directory of the namespace.
    #[must_use]
    pub fn advancement_directory(&self) -> String {
        join_path([
            "data",
            self.namespace.as_str(),
            advancement_directory_name(self.pack_format()),
        ])
    }

    pub(crate) fn render_error(&self, source: ScriptError) -> PackError {
        PackError::Render {
            pack: self.name.clone(),
            version: self.version,
            pack_format: self.pack_format(),
            source,
        }
    }
}

/// State shared between the pack, its modules and its scripts.
#[derive(Debug)]
pub(crate) struct PackShared {
    pub(crate) info: PackInfo,
    pub(crate) context: ContextSlot,
    pub(crate) scoreboards: RefCell<ScoreboardRegistry>,
    pub(crate) registry: RefCell<PackFileSystem>,
    pub(crate) render_queue: ExtendableQueue<Rc<Script>>,
    pub(crate) placeholders: RefCell<Vec<Rc<Script>>>,
}

impl PackShared {
    fn taglist_directory(&self) -> String {
        format!(
            "data/minecraft/tags/{}",
            TagType::Function.get_directory_name(self.info.pack_format())
        )
    }

    /// Append a script to `minecraft:tick` or `minecraft:load`, creating the table on first use.
    pub(crate) fn add_script_to_taglist(&self, tag: &str, script: &Rc<Script>) {
        let directory = self.taglist_directory();
        let existing = self.registry.borrow().find_tag_table(&directory, tag);
        if let Some(table) = existing {
            table.add_entry(script);
        } else {
            let table = TagTable::new(tag, TagType::Function).with_namespace("minecraft");
            table.add_entry(script);
            self.registry
                .borrow_mut()
                .register(&directory, PackFile::Tag(Rc::new(table)));
        }
        tracing::debug!("Added {} to the {tag} function tag", script.name());
    }

    /// Register a tag table, merging it into a registered table of the same name.
    pub(crate) fn add_tag_table(&self, table: TagTable) -> Rc<TagTable> {
        let directory = table.directory(&self.info);
        let existing = self
            .registry
            .borrow()
            .find_tag_table(&directory, table.name());
        if let Some(existing) = existing {
            tracing::debug!("Merging tag table {} into {directory}", table.name());
            if table.replace() {
                existing.set_replace(true);
            }
            for entry in table.entries() {
                existing.add_entry(entry);
            }
            existing
        } else {
            let table = Rc::new(table);
            self.registry
                .borrow_mut()
                .register(&directory, PackFile::Tag(Rc::clone(&table)));
            table
        }
    }

    /// Remove a script from the placeholders, returning whether it was one.
    pub(crate) fn take_placeholder(&self, script: &Rc<Script>) -> bool {
        let mut placeholders = self.placeholders.borrow_mut();
        let before = placeholders.len();
        placeholders.retain(|placeholder| !Rc::ptr_eq(placeholder, script));
        placeholders.len() != before
    }
}

/// A Minecraft datapack.
///
/// Scripts are defined through [`ScriptDecoratable`] on the pack or on its modules and
/// render as soon as they are defined. [`Datapack::build`] writes the pack to disk.
#[derive(Debug)]
pub struct Datapack {
    shared: Rc<PackShared>,
    root: Rc<ModuleNode>,
    meta: McMeta,
    out_dir: PathBuf,
    plugins: Vec<Box<dyn Plugin>>,
    custom_files: VFolder,
}

impl Datapack {
    /// Create a new datapack from its configuration.
    ///
    /// # Errors
    /// - If the name or namespace is invalid
    /// - If the version is malformed or has no known pack format
    pub fn new(config: PackConfig) -> Result<Self, PackError> {
        validate_namespace(&config.namespace)?;
        if config.name.trim().is_empty() || config.name.contains(['/', '\\']) {
            return Err(DefinitionError::InvalidName {
                name: config.name,
                reason: "pack name must be a non-empty directory name",
            }
            .into());
        }
        let version = config.version.parse::<Version>()?;
        let pack_format = version.require_pack_format()?;

        let info = PackInfo {
            name: config.name,
            namespace: config.namespace,
            version,
            options: CompileOptions {
                debug: config.debug,
                pack_format,
            },
            log_files: config.log_files,
        };
        tracing::debug!(
            "Creating pack {} for {} [{pack_format}], debug: {}",
            info.name,
            info.version,
            info.options.debug
        );

        let shared = Rc::new(PackShared {
            info,
            context: ContextSlot::default(),
            scoreboards: RefCell::new(ScoreboardRegistry::new()),
            registry: RefCell::new(PackFileSystem::new()),
            render_queue: ExtendableQueue::default(),
            placeholders: RefCell::new(Vec::new()),
        });
        let root = ModuleNode::root(Rc::downgrade(&shared));

        Ok(Self {
            shared,
            root,
            meta: McMeta::new(&config.description),
            out_dir: config.out_dir,
            plugins: Vec::new(),
            custom_files: VFolder::new(),
        })
    }

    /// Get the fixed facts about the pack.
    #[must_use]
    pub fn info(&self) -> &PackInfo {
        &self.shared.info
    }

    /// Get the namespace of the pack.
    #[must_use]
    pub fn namespace(&self) -> &str {
        self.shared.info.namespace()
    }

    /// Get the pack format the pack targets.
    #[must_use]
    pub fn pack_format(&self) -> u8 {
        self.shared.info.pack_format()
    }

    /// Check whether the pack is a development build.
    #[must_use]
    pub fn is_debug(&self) -> bool {
        self.shared.info.options().debug
    }

    /// Get the metadata of the pack.
    #[must_use]
    pub fn meta(&self) -> &McMeta {
        &self.meta
    }

    /// Mutably get the metadata of the pack.
    pub fn meta_mut(&mut self) -> &mut McMeta {
        &mut self.meta
    }

    /// Create a module at the root of the pack.
    ///
    /// # Errors
    /// - If the name is invalid
    pub fn module(&self, name: &str) -> Result<Module, DefinitionError> {
        Module::new(&self.root, name)
    }

    /// Add a template in its own module.
    ///
    /// # Errors
    /// - If the template name is invalid
    /// - If the template fails to define its scripts
    pub fn add_template(&self, template: &dyn Template) -> Result<Module, PackError> {
        let module = self.module(template.name())?;
        template.define(&module)?;
        tracing::debug!("Added template {}", template.name());
        Ok(module)
    }

    /// Register a tag table under `data/<namespace>/tags/<type>`.
    ///
    /// A table of the same name and type that is already registered receives the
    /// entries instead and is returned.
    pub fn add_tag_table(&self, table: TagTable) -> Rc<TagTable> {
        self.shared.add_tag_table(table)
    }

    /// Get a registered tag table of the pack namespace.
    #[must_use]
    pub fn tag_table(&self, name: &str, tag_type: &TagType) -> Option<Rc<TagTable>> {
        let directory = format!(
            "data/{}/tags/{}",
            self.namespace(),
            tag_type.get_directory_name(self.pack_format())
        );
        self.shared.registry.borrow().find_tag_table(&directory, name)
    }

    /// Add a script to the `tick` or `load` function tag.
    pub fn add_script_to_taglist(&self, script: &Rc<Script>, sort: Sort) {
        self.shared.add_script_to_taglist(sort.name(), script);
    }

    /// Register a file in a directory relative to the pack root.
    ///
    /// # Errors
    /// - If the path is not a valid resource path
    pub fn register_file(&self, path: &str, file: PackFile) -> Result<(), PackError> {
        let path = path.trim_matches('/');
        validate_path(path)?;
        self.shared.registry.borrow_mut().register(path, file);
        Ok(())
    }

    /// Register a text file in a directory relative to the pack root.
    ///
    /// # Errors
    /// - Same as [`Self::register_file`]
    pub fn add_text_file(&self, path: &str, file: TextFile) -> Result<(), PackError> {
        self.register_file(path, PackFile::Text(file))
    }

    /// Register a JSON file in a directory relative to the pack root.
    ///
    /// # Errors
    /// - Same as [`Self::register_file`]
    pub fn add_json_file(&self, path: &str, file: JsonFile) -> Result<(), PackError> {
        self.register_file(path, PackFile::Json(file))
    }

    /// Register an advancement in the advancement directory of the namespace.
    pub fn add_advancement(&self, advancement: Advancement) {
        let directory = self.shared.info.advancement_directory();
        self.shared
            .registry
            .borrow_mut()
            .register(&directory, PackFile::Custom(Rc::new(advancement)));
    }

    /// Declare a scoreboard of the pack.
    ///
    /// # Errors
    /// - If the name is invalid or already declared with other criteria
    pub fn scoreboard(&self, name: &str, criteria: Criteria) -> Result<Scoreboard, ScoreboardError> {
        let scoreboard = Scoreboard::new(name, criteria);
        self.shared.scoreboards.borrow_mut().declare(&scoreboard)?;
        Ok(scoreboard)
    }

    /// Get the scoreboards used by rendered scripts so far.
    #[must_use]
    pub fn used_scoreboards(&self) -> Vec<Scoreboard> {
        self.shared.scoreboards.borrow().touched()
    }

    /// Get the directories of the pack and the names of their registered files.
    #[must_use]
    pub fn files(&self) -> Vec<(String, Vec<String>)> {
        self.shared
            .registry
            .borrow()
            .iter()
            .map(|(path, files)| {
                (
                    path.to_string(),
                    files.iter().map(PackFile::file_name).collect(),
                )
            })
            .collect()
    }

    /// Get the call name of the script currently rendering, if any.
    #[must_use]
    pub fn current_script(&self) -> Option<String> {
        self.shared.context.current()
    }

    /// Add a plugin. Hooks run in the order plugins were added.
    #[must_use]
    pub fn with_plugin(mut self, plugin: impl Plugin + 'static) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    /// Copy the contents of a directory into the pack.
    ///
    /// # Errors
    /// - If loading the directory fails
    #[cfg(feature = "fs_access")]
    pub fn with_template_folder(self, path: &std::path::Path) -> Result<Self, PackError> {
        let mut template = VFolder::try_from(path).map_err(|err| PackError::io(path, err))?;
        template.merge(self.custom_files);

        Ok(Self {
            custom_files: template,
            ..self
        })
    }

    /// Add a custom file to the datapack.
    pub fn add_custom_file(&mut self, path: &str, file: VFile) {
        self.custom_files.add_file(path, file);
    }

    /// Compile the pack into a virtual folder.
    ///
    /// # Errors
    /// - If a plugin hook fails
    /// - If a script was referenced but never defined
    /// - If a script fails to render
    /// - If a file fails to render
    #[tracing::instrument(level = "debug", skip(self), fields(pack = %self.shared.info.name()))]
    pub fn compile(mut self) -> Result<VFolder, PackError> {
        let plugins = std::mem::take(&mut self.plugins);
        let result = self.compile_with(&plugins);
        if let Err(err) = &result {
            tracing::error!("Building {} failed: {err}", self.shared.info.name());
            for plugin in &plugins {
                plugin.on_build_error(&self.shared.info, err);
            }
        }
        result
    }

    fn compile_with(&self, plugins: &[Box<dyn Plugin>]) -> Result<VFolder, PackError> {
        let info = &self.shared.info;

        for plugin in plugins {
            plugin.pre_build(self).map_err(|source| PackError::Plugin {
                plugin: plugin.name().to_string(),
                hook: "pre_build",
                source,
            })?;
        }

        while let Some(script) = self.shared.render_queue.pop_front() {
            script.prerender().map_err(|err| info.render_error(err))?;
        }

        self.add_scoreboard_initializer()?;

        // bodies rendered above may have created placeholders of their own
        if let Some(placeholder) = self.shared.placeholders.borrow().first() {
            return Err(PackError::IncompletePlaceholder(
                placeholder
                    .call_name()
                    .unwrap_or_else(|_| placeholder.function_path()),
            ));
        }

        let mut root_folder = self.custom_files.clone();
        root_folder.add_file(
            "pack.mcmeta",
            VFile::Text(self.meta.render(info.pack_format())?),
        );

        let entries = self
            .shared
            .registry
            .borrow()
            .iter()
            .map(|(path, files)| (path.to_string(), files.to_vec()))
            .collect::<Vec<_>>();

        for (path, files) in entries {
            let eligible = files
                .iter()
                .filter(|file| info.options().debug || !file.is_dev())
                .collect::<Vec<_>>();
            if eligible.is_empty() {
                tracing::trace!("Skipping {path}, no files for this build");
                continue;
            }

            root_folder.ensure_folder(&path);
            for file in eligible {
                let file_name = file.file_name();
                let Some(content) = file.render(info)? else {
                    tracing::trace!("Skipping {path}/{file_name}, no content");
                    continue;
                };

                for plugin in plugins {
                    plugin
                        .render_file(info, &path, &file_name, &content)
                        .map_err(|source| PackError::Plugin {
                            plugin: plugin.name().to_string(),
                            hook: "render_file",
                            source,
                        })?;
                }
                if *info.log_files() {
                    tracing::info!(
                        "[{file_name}] @ <{path}>\n{}",
                        content
                            .lines()
                            .map(|line| format!("  |  {line}"))
                            .collect::<Vec<_>>()
                            .join("\n")
                    );
                }

                root_folder.add_file(&format!("{path}/{file_name}"), VFile::Text(content));
            }
        }

        for plugin in plugins {
            plugin
                .post_build(info, &root_folder)
                .map_err(|source| PackError::Plugin {
                    plugin: plugin.name().to_string(),
                    hook: "post_build",
                    source,
                })?;
        }

        Ok(root_folder)
    }

    /// Define a load script creating every scoreboard used by the pack.
    fn add_scoreboard_initializer(&self) -> Result<(), PackError> {
        let scoreboards = self.used_scoreboards();
        if scoreboards.is_empty() {
            return Ok(());
        }
        tracing::debug!("Initializing {} scoreboards", scoreboards.len());

        let script = Script::new("initialize_scoreboards", move |ctx| {
            for scoreboard in &scoreboards {
                ctx.add(scoreboard.create())?;
            }
            Ok(())
        })
        .with_description("Auto-generated function that initializes all required scoreboards");
        self.add_script(script, Some(Sort::Load), "")?;
        Ok(())
    }

    /// Build the pack into `<out_dir>/<name>`, replacing an earlier build.
    ///
    /// # Errors
    /// - If the output directory does not exist
    /// - If removing the earlier build or writing fails
    /// - Same as [`Self::compile`]
    #[cfg(feature = "fs_access")]
    #[tracing::instrument(level = "debug", skip(self), fields(pack = %self.shared.info.name()))]
    pub fn build(self) -> Result<PathBuf, PackError> {
        if !self.out_dir.is_dir() {
            return Err(PackError::MissingOutputDirectory(self.out_dir));
        }
        let path = self.out_dir.join(self.shared.info.name());
        if path.exists() {
            std::fs::remove_dir_all(&path).map_err(|err| PackError::io(&path, err))?;
        }
        std::fs::create_dir_all(&path).map_err(|err| PackError::io(&path, err))?;

        let folder = self.compile()?;
        folder
            .place(&path)
            .map_err(|err| PackError::io(&path, err))?;

        tracing::info!("Built pack at {}", path.display());
        Ok(path)
    }

    /// Compile the pack into a zip archive at `path`.
    ///
    /// # Errors
    /// - If writing the archive fails
    /// - Same as [`Self::compile`]
    #[cfg(feature = "zip")]
    pub fn zip(self, path: &std::path::Path) -> Result<(), PackError> {
        let folder = self.compile()?;
        folder.zip(path).map_err(|err| PackError::io(path, err))
    }
}

impl ScriptDecoratable for Datapack {
    fn node(&self) -> &Rc<ModuleNode> {
        &self.root
    }
}
