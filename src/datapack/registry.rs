//! Registry mapping pack directories to the files written into them.

use std::{collections::HashMap, rc::Rc};

use super::{file::PackFile, script::Script, tag::TagTable};

/// Files of the pack keyed by their directory, relative to the pack root.
///
/// Directories and the files in each directory keep their registration order.
#[derive(Debug, Default)]
pub struct PackFileSystem {
    order: Vec<String>,
    tree: HashMap<String, Vec<PackFile>>,
}

impl PackFileSystem {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a file to the directory at `path`.
    pub fn register(&mut self, path: &str, file: PackFile) {
        let path = path.trim_matches('/');
        tracing::trace!("Registering {} under {path}", file.file_name());
        self.tree
            .entry(path.to_string())
            .or_insert_with(|| {
                self.order.push(path.to_string());
                Vec::new()
            })
            .push(file);
    }

    /// Get the files of a directory.
    #[must_use]
    pub fn get_files(&self, path: &str) -> Option<&[PackFile]> {
        self.tree
            .get(path.trim_matches('/'))
            .map(Vec::as_slice)
    }

    /// Iterate over all directories and their files in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[PackFile])> {
        self.order.iter().filter_map(|path| {
            self.tree
                .get(path)
                .map(|files| (path.as_str(), files.as_slice()))
        })
    }

    /// Find a tag table by name in a directory.
    #[must_use]
    pub fn find_tag_table(&self, path: &str, name: &str) -> Option<Rc<TagTable>> {
        self.get_files(path)?.iter().find_map(|file| match file {
            PackFile::Tag(table) if table.name() == name => Some(Rc::clone(table)),
            _ => None,
        })
    }

    /// Get all registered scripts in registration order.
    #[must_use]
    pub fn scripts(&self) -> Vec<Rc<Script>> {
        self.iter()
            .flat_map(|(_, files)| files.iter())
            .filter_map(|file| match file {
                PackFile::Script(script) => Some(Rc::clone(script)),
                _ => None,
            })
            .collect()
    }

    /// Get the number of directories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check whether no file was registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datapack::{file::TextFile, tag::TagType};

    #[test]
    fn test_registration_order() {
        let mut registry = PackFileSystem::new();
        registry.register("data/tmp/b", PackFile::Text(TextFile::new("one.txt", "1")));
        registry.register("/data/tmp/a/", PackFile::Text(TextFile::new("two.txt", "2")));
        registry.register("data/tmp/b", PackFile::Text(TextFile::new("three.txt", "3")));

        let order = registry
            .iter()
            .map(|(path, files)| (path, files.len()))
            .collect::<Vec<_>>();
        assert_eq!(order, vec![("data/tmp/b", 2), ("data/tmp/a", 1)]);
        assert_eq!(
            registry
                .get_files("data/tmp/b")
                .map(|files| files.iter().map(PackFile::file_name).collect::<Vec<_>>()),
            Some(vec!["one.txt".to_string(), "three.txt".to_string()])
        );
        assert!(registry.get_files("data/tmp/c").is_none());
    }

    #[test]
    fn test_find_tag_table() {
        let mut registry = PackFileSystem::new();
        registry.register(
            "data/minecraft/tags/function",
            PackFile::Tag(Rc::new(TagTable::new("tick", TagType::Function))),
        );

        assert!(registry
            .find_tag_table("data/minecraft/tags/function", "tick")
            .is_some());
        assert!(registry
            .find_tag_table("data/minecraft/tags/function", "load")
            .is_none());
    }
}
