//! File kinds that can be registered into a pack.

use std::{collections::BTreeMap, fmt::Debug, rc::Rc};

use serde::Serialize;
use serde_json::Value;

use crate::error::PackError;

use super::{script::Script, tag::TagTable, PackInfo};

/// Content of a file written into the pack.
pub trait PackFileContent: Debug {
    /// File name including its extension, may contain `/`.
    fn file_name(&self) -> String;

    /// Render the content of the file. `None` skips the file.
    ///
    /// # Errors
    /// - If rendering fails
    fn render(&self, info: &PackInfo) -> Result<Option<String>, PackError>;

    /// Whether the file only exists in development builds.
    fn is_dev(&self) -> bool {
        false
    }
}

/// A file registered into the pack.
#[derive(Debug, Clone)]
pub enum PackFile {
    /// Function file.
    Script(Rc<Script>),
    /// Tag table.
    Tag(Rc<TagTable>),
    /// Plain text file.
    Text(TextFile),
    /// JSON file.
    Json(JsonFile),
    /// Any other kind of file.
    Custom(Rc<dyn PackFileContent>),
}

impl PackFile {
    /// Get the file name including its extension.
    #[must_use]
    pub fn file_name(&self) -> String {
        match self {
            Self::Script(script) => script.file_name(),
            Self::Tag(table) => table.file_name(),
            Self::Text(file) => file.file_name(),
            Self::Json(file) => file.file_name(),
            Self::Custom(file) => file.file_name(),
        }
    }

    /// Check whether the file only exists in development builds.
    #[must_use]
    pub fn is_dev(&self) -> bool {
        match self {
            Self::Script(script) => script.is_dev(),
            Self::Tag(table) => table.is_dev(),
            Self::Text(file) => file.is_dev(),
            Self::Json(file) => file.is_dev(),
            Self::Custom(file) => file.is_dev(),
        }
    }

    /// Render the content of the file. `None` skips the file.
    ///
    /// # Errors
    /// - If the script fails to render
    /// - If the content cannot be serialized
    pub fn render(&self, info: &PackInfo) -> Result<Option<String>, PackError> {
        match self {
            Self::Script(script) => script
                .render()
                .map(Some)
                .map_err(|err| info.render_error(err)),
            Self::Tag(table) => table.render(info),
            Self::Text(file) => file.render(info),
            Self::Json(file) => file.render(info),
            Self::Custom(file) => file.render(info),
        }
    }
}

/// Plain text file, e.g. a readme shipped with the pack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFile {
    name: String,
    content: String,
    dev: bool,
}

impl TextFile {
    /// Create a text file. The name includes the extension.
    #[must_use]
    pub fn new(name: &str, content: &str) -> Self {
        Self {
            name: name.to_string(),
            content: content.to_string(),
            dev: false,
        }
    }

    /// Only include the file in development builds.
    #[must_use]
    pub fn with_dev(self, dev: bool) -> Self {
        Self { dev, ..self }
    }
}

impl PackFileContent for TextFile {
    fn file_name(&self) -> String {
        self.name.clone()
    }

    fn render(&self, _info: &PackInfo) -> Result<Option<String>, PackError> {
        Ok(Some(self.content.clone()))
    }

    fn is_dev(&self) -> bool {
        self.dev
    }
}

/// JSON file. Renders nothing while it has no value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JsonFile {
    name: String,
    value: Option<Value>,
    dev: bool,
}

impl JsonFile {
    /// Create an empty JSON file. The `.json` extension is added.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            value: None,
            dev: false,
        }
    }

    /// Set the content of the file.
    #[must_use]
    pub fn with_value(self, value: Value) -> Self {
        Self {
            value: Some(value),
            ..self
        }
    }

    /// Only include the file in development builds.
    #[must_use]
    pub fn with_dev(self, dev: bool) -> Self {
        Self { dev, ..self }
    }

    /// Get the content of the file.
    #[must_use]
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }
}

impl PackFileContent for JsonFile {
    fn file_name(&self) -> String {
        format!("{}.json", self.name)
    }

    fn render(&self, _info: &PackInfo) -> Result<Option<String>, PackError> {
        self.value.as_ref().map(to_json_string).transpose()
    }

    fn is_dev(&self) -> bool {
        self.dev
    }
}

/// An advancement, written to the advancement directory of the namespace.
///
/// Rewards may call a script of the pack, resolved when the file is written.
#[derive(Debug, Clone, Default)]
pub struct Advancement {
    name: String,
    parent: Option<String>,
    display: Option<Value>,
    criteria: BTreeMap<String, Value>,
    reward_function: Option<Rc<Script>>,
    dev: bool,
}

impl Advancement {
    /// Create an advancement without criteria.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Set the parent advancement.
    #[must_use]
    pub fn with_parent(self, parent: &str) -> Self {
        Self {
            parent: Some(parent.to_string()),
            ..self
        }
    }

    /// Set the display object.
    #[must_use]
    pub fn with_display(self, display: Value) -> Self {
        Self {
            display: Some(display),
            ..self
        }
    }

    /// Add a criterion.
    #[must_use]
    pub fn with_criterion(mut self, name: &str, criterion: Value) -> Self {
        self.criteria.insert(name.to_string(), criterion);
        self
    }

    /// Run a script of the pack as reward.
    #[must_use]
    pub fn with_reward_function(self, script: &Rc<Script>) -> Self {
        Self {
            reward_function: Some(Rc::clone(script)),
            ..self
        }
    }

    /// Only include the advancement in development builds.
    #[must_use]
    pub fn with_dev(self, dev: bool) -> Self {
        Self { dev, ..self }
    }
}

impl PackFileContent for Advancement {
    fn file_name(&self) -> String {
        format!("{}.json", self.name)
    }

    fn render(&self, _info: &PackInfo) -> Result<Option<String>, PackError> {
        #[derive(Serialize)]
        struct Rewards {
            function: String,
        }
        #[derive(Serialize)]
        struct AdvancementJson<'a> {
            #[serde(skip_serializing_if = "Option::is_none")]
            parent: Option<&'a str>,
            #[serde(skip_serializing_if = "Option::is_none")]
            display: Option<&'a Value>,
            criteria: &'a BTreeMap<String, Value>,
            #[serde(skip_serializing_if = "Option::is_none")]
            rewards: Option<Rewards>,
        }

        let rewards = self
            .reward_function
            .as_ref()
            .map(|script| script.call_name().map(|function| Rewards { function }))
            .transpose()?;
        let json = AdvancementJson {
            parent: self.parent.as_deref(),
            display: self.display.as_ref(),
            criteria: &self.criteria,
            rewards,
        };
        to_json_string(&json).map(Some)
    }

    fn is_dev(&self) -> bool {
        self.dev
    }
}

/// Serialize pretty-printed with an indent of four spaces.
pub(crate) fn to_json_string<T: Serialize + ?Sized>(value: &T) -> Result<String, PackError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_json_indent() {
        let rendered = to_json_string(&json!({"values": ["tmp:init"]})).expect("serialize failed");
        assert_eq!(rendered, "{\n    \"values\": [\n        \"tmp:init\"\n    ]\n}");
    }

    #[test]
    fn test_json_file() {
        let file = JsonFile::new("settings");
        assert_eq!(file.file_name(), "settings.json");
        assert!(file.value().is_none());

        let file = file.with_value(json!({"enabled": true}));
        assert!(file.value().is_some());
    }
}
