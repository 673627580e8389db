//! Tag tables for various types.

use std::{
    cell::{Cell, RefCell},
    fmt::Display,
    rc::Rc,
};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::PackError;

use super::{
    file::{to_json_string, PackFileContent},
    script::Script,
    PackInfo,
};

/// A named list of entries rendered as `{"values": [...]}`.
///
/// Entries are resolved when the table is written, so scripts may be added before
/// they render or move.
#[derive(Debug)]
pub struct TagTable {
    name: String,
    tag_type: TagType,
    namespace: Option<String>,
    replace: Cell<bool>,
    entries: RefCell<Vec<TagEntry>>,
}

impl TagTable {
    /// Create an empty tag table in the namespace of the pack.
    #[must_use]
    pub fn new(name: &str, tag_type: TagType) -> Self {
        Self {
            name: name.to_string(),
            tag_type,
            namespace: None,
            replace: Cell::new(false),
            entries: RefCell::new(Vec::new()),
        }
    }

    /// Place the table in another namespace, e.g. `minecraft`.
    #[must_use]
    pub fn with_namespace(self, namespace: &str) -> Self {
        Self {
            namespace: Some(namespace.to_string()),
            ..self
        }
    }

    /// Set whether the table replaces entries of lower priority packs.
    #[must_use]
    pub fn with_replace(self, replace: bool) -> Self {
        self.replace.set(replace);
        self
    }

    /// Get the name of the table.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the type of the table.
    #[must_use]
    pub fn tag_type(&self) -> &TagType {
        &self.tag_type
    }

    /// Get the namespace of the table, `None` for the pack namespace.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Get whether the table replaces existing values.
    #[must_use]
    pub fn replace(&self) -> bool {
        self.replace.get()
    }

    /// Set whether the table replaces existing values.
    pub fn set_replace(&self, replace: bool) {
        self.replace.set(replace);
    }

    /// Append an entry.
    pub fn add_entry(&self, entry: impl Into<TagEntry>) {
        self.entries.borrow_mut().push(entry.into());
    }

    /// Get the entries of the table.
    #[must_use]
    pub fn entries(&self) -> Vec<TagEntry> {
        self.entries.borrow().clone()
    }

    /// Get the reference used to include the table in another table, `#<namespace>:<name>`.
    #[must_use]
    pub fn reference(&self, default_namespace: &str) -> String {
        format!(
            "#{}:{}",
            self.namespace.as_deref().unwrap_or(default_namespace),
            self.name
        )
    }

    /// Get the directory the table is written to, e.g. `data/minecraft/tags/function`.
    #[must_use]
    pub fn directory(&self, info: &PackInfo) -> String {
        format!(
            "data/{}/tags/{}",
            self.namespace.as_deref().unwrap_or(info.namespace()),
            self.tag_type.get_directory_name(info.pack_format())
        )
    }

    /// Compile the entries into JSON values. Dev-only scripts are left out of production builds.
    ///
    /// # Errors
    /// - If a script entry is not attached to a pack
    pub fn compile(&self, info: &PackInfo) -> Result<Vec<Value>, PackError> {
        let debug = info.options().debug;
        let mut values = Vec::new();
        for entry in self.entries.borrow().iter() {
            match entry {
                TagEntry::Script(script) if script.is_dev() && !debug => {
                    tracing::trace!(
                        "Leaving dev script {} out of tag {}",
                        script.name(),
                        self.name
                    );
                }
                TagEntry::Script(script) => values.push(Value::String(script.call_name()?)),
                TagEntry::Table(table) => {
                    values.push(Value::String(table.reference(info.namespace())));
                }
                TagEntry::Value(value) => values.push(value.compile()),
            }
        }
        Ok(values)
    }
}

impl PackFileContent for TagTable {
    fn file_name(&self) -> String {
        format!("{}.json", self.name)
    }

    /// Tables without values and without `replace` are skipped.
    fn render(&self, info: &PackInfo) -> Result<Option<String>, PackError> {
        let values = self.compile(info)?;
        if values.is_empty() && !self.replace() {
            return Ok(None);
        }

        let mut json = Map::new();
        json.insert("values".to_string(), Value::Array(values));
        if self.replace() {
            json.insert("replace".to_string(), Value::Bool(true));
        }
        to_json_string(&json).map(Some)
    }
}

/// An entry of a [`TagTable`].
#[derive(Debug, Clone)]
pub enum TagEntry {
    /// A script, written as its call name.
    Script(Rc<Script>),
    /// Another table, written as `#<namespace>:<name>`.
    Table(Rc<TagTable>),
    /// A literal value.
    Value(TagValue),
}

impl From<&Rc<Script>> for TagEntry {
    fn from(script: &Rc<Script>) -> Self {
        Self::Script(Rc::clone(script))
    }
}
impl From<&Rc<TagTable>> for TagEntry {
    fn from(table: &Rc<TagTable>) -> Self {
        Self::Table(Rc::clone(table))
    }
}
impl From<TagValue> for TagEntry {
    fn from(value: TagValue) -> Self {
        Self::Value(value)
    }
}
impl From<&str> for TagEntry {
    fn from(value: &str) -> Self {
        Self::Value(value.into())
    }
}

/// The type of a tag.
#[allow(clippy::module_name_repetitions)]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TagType {
    /// A tag for blocks.
    Block,
    /// A tag for fluids.
    Fluid,
    /// A tag for items.
    Item,
    /// A tag for entities.
    Entity,
    /// A tag for game events.
    GameEvent,
    /// A tag for functions.
    Function,
    /// A custom tag type.
    /// `Other(<registry path>)` => `data/<namespace>/tags/<registry path>`
    Other(String),
}

impl TagType {
    /// Get the directory of the tag type below `tags`, which changed names over pack formats.
    #[must_use]
    pub fn get_directory_name(&self, pack_format: u8) -> &str {
        if pack_format < 43 {
            match self {
                Self::Block => "blocks",
                Self::Fluid => "fluids",
                Self::Item => "items",
                Self::Entity => "entity_types",
                Self::GameEvent => "game_events",
                Self::Function => "functions",
                Self::Other(path) => path,
            }
        } else {
            match self {
                Self::Block => "block",
                Self::Fluid => "fluid",
                Self::Item => "item",
                Self::Entity => "entity_type",
                Self::GameEvent => "game_event",
                Self::Function => {
                    if pack_format < 45 {
                        "functions"
                    } else {
                        "function"
                    }
                }
                Self::Other(path) => path,
            }
        }
    }
}

impl Display for TagType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.get_directory_name(u8::MAX))
    }
}

/// The value of a tag.
#[allow(clippy::module_name_repetitions)]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TagValue {
    /// A simple value, either a resource location or an id of another tag.
    Simple(String),
    /// An advanced value, with an id (same as above) and whether the loading of the tag should fail when entry is not found.
    Advanced {
        /// The id of the tag.
        id: String,
        /// Whether the loading of the tag should fail when the entry is not found.
        required: bool,
    },
}
impl From<&str> for TagValue {
    fn from(value: &str) -> Self {
        Self::Simple(value.to_string())
    }
}
impl TagValue {
    /// Compile the tag value into a JSON value.
    #[must_use]
    pub fn compile(&self) -> Value {
        match self {
            Self::Simple(value) => Value::String(value.clone()),
            Self::Advanced { id, required } => {
                serde_json::json!({
                    "id": id.clone(),
                    "required": *required
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_names() {
        assert_eq!(TagType::Function.get_directory_name(26), "functions");
        assert_eq!(TagType::Function.get_directory_name(44), "functions");
        assert_eq!(TagType::Entity.get_directory_name(61), "entity_type");
        assert_eq!(TagType::Other("banner_pattern".to_string()).to_string(), "banner_pattern");
        assert_eq!(TagType::Item.to_string(), "item");
    }

    #[test]
    fn test_entries() {
        let inner = Rc::new(TagTable::new("inner", TagType::Block));
        let table = TagTable::new("outer", TagType::Block).with_replace(true);
        assert!(table.replace());

        table.add_entry("minecraft:stone");
        table.add_entry(TagValue::Advanced {
            id: "other:block".to_string(),
            required: false,
        });
        table.add_entry(&inner);

        assert_eq!(table.entries().len(), 3);
        assert_eq!(inner.reference("tmp"), "#tmp:inner");
        assert_eq!(
            TagTable::new("tick", TagType::Function)
                .with_namespace("minecraft")
                .reference("tmp"),
            "#minecraft:tick"
        );
    }
}
