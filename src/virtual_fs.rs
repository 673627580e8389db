//! Virtual file system holding the compiled pack in memory before it is placed on disk.

use std::{collections::BTreeMap, fs, io, path::Path};

use serde::{Deserialize, Serialize};
#[cfg(feature = "zip")]
use zip::ZipWriter;

/// Folder representation in virtual file system
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VFolder {
    folders: BTreeMap<String, VFolder>,
    files: BTreeMap<String, VFile>,
}

/// Split a path into its first segment and the (non-empty) rest.
fn split_head(path: &str) -> (&str, Option<&str>) {
    path.split_once('/')
        .map(|(h, t)| (h, (!t.is_empty()).then_some(t)))
        .unwrap_or((path, None))
}

impl VFolder {
    /// Create a new, empty virtual folder.
    #[must_use]
    pub fn new() -> VFolder {
        VFolder::default()
    }

    /// Get all direct subfolders in the folder.
    #[must_use]
    pub fn get_folders(&self) -> &BTreeMap<String, VFolder> {
        &self.folders
    }
    /// Get all direct files in the folder.
    #[must_use]
    pub fn get_files(&self) -> &BTreeMap<String, VFile> {
        &self.files
    }

    /// Recursively get a subfolder by path, creating missing folders on the way.
    ///
    /// An empty path returns the folder itself.
    pub fn ensure_folder(&mut self, path: &str) -> &mut VFolder {
        let path = path.trim_matches('/');
        if path.is_empty() {
            return self;
        }
        let (head, tail) = split_head(path);
        let folder = self.folders.entry(head.to_string()).or_default();
        match tail {
            Some(tail) => folder.ensure_folder(tail),
            None => folder,
        }
    }

    /// Recursively add an existing folder to the folder, merging with a folder already at that path.
    pub fn add_existing_folder(&mut self, path: &str, folder: VFolder) {
        self.ensure_folder(path).merge(folder);
    }
    /// Recursively add a new file to the folder.
    pub fn add_file(&mut self, path: &str, file: VFile) {
        let path = path.trim_start_matches('/');
        let (parent, name) = path.rsplit_once('/').unwrap_or(("", path));
        self.ensure_folder(parent).files.insert(name.to_string(), file);
    }

    /// Recursively get a subfolder by path.
    #[must_use]
    pub fn get_folder(&self, path: &str) -> Option<&VFolder> {
        let (head, tail) = split_head(path);
        if let Some(tail) = tail {
            self.folders.get(head)?.get_folder(tail)
        } else {
            self.folders.get(path)
        }
    }
    /// Recursively get a file by path.
    #[must_use]
    pub fn get_file(&self, path: &str) -> Option<&VFile> {
        let (head, tail) = split_head(path);
        if let Some(tail) = tail {
            self.folders.get(head)?.get_file(tail)
        } else {
            self.files.get(path)
        }
    }

    /// Place the folder and its contents on the file system.
    ///
    /// Every folder is created, including folders without files.
    ///
    /// # Errors
    /// - If creating a directory or writing a file fails
    #[cfg(feature = "fs_access")]
    pub fn place(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)?;
        for (name, folder) in &self.folders {
            folder.place(&path.join(name))?;
        }
        for (name, file) in &self.files {
            fs::write(path.join(name), file.as_bytes())?;
        }
        Ok(())
    }

    #[cfg(feature = "zip")]
    /// Zip the folder and its contents into a zip archive.
    ///
    /// # Errors
    /// - If creating or writing the archive fails
    pub fn zip(&self, path: &Path) -> io::Result<()> {
        use io::Write;

        let file = fs::File::create(path)?;
        let mut writer = ZipWriter::new(file);

        for (path, file) in self.flatten() {
            writer.start_file(path, zip::write::SimpleFileOptions::default())?;
            writer.write_all(file.as_bytes())?;
        }

        writer.finish()?;

        Ok(())
    }

    /// Flatten the folder and its contents into a list of files with full paths.
    #[must_use]
    pub fn flatten(&self) -> Vec<(String, &VFile)> {
        let mut files = self
            .files
            .iter()
            .map(|(k, v)| (k.to_owned(), v))
            .collect::<Vec<_>>();

        for (name, folder) in &self.folders {
            files.extend(
                folder
                    .flatten()
                    .into_iter()
                    .map(|(path, file)| (format!("{name}/{path}"), file)),
            );
        }

        files
    }

    /// Flatten the folder into the paths of all folders it contains, including empty ones.
    #[must_use]
    pub fn folder_paths(&self) -> Vec<String> {
        self.folders
            .iter()
            .flat_map(|(name, folder)| {
                std::iter::once(name.clone()).chain(
                    folder
                        .folder_paths()
                        .into_iter()
                        .map(move |path| format!("{name}/{path}")),
                )
            })
            .collect()
    }

    /// Recursively merge another folder into this folder.
    pub fn merge(&mut self, other: Self) {
        for (name, folder) in other.folders {
            if let Some(existing_folder) = self.folders.get_mut(&name) {
                existing_folder.merge(folder);
            } else {
                self.folders.insert(name, folder);
            }
        }
        for (name, file) in other.files {
            self.files.insert(name, file);
        }
    }
}

#[cfg(feature = "fs_access")]
impl TryFrom<&Path> for VFolder {
    type Error = io::Error;

    fn try_from(value: &Path) -> Result<Self, Self::Error> {
        let mut root_vfolder = VFolder::new();
        let root_folder = fs::read_dir(value)?;
        for dir_entry in root_folder {
            let dir_entry = dir_entry?;
            let path = dir_entry.path();
            let name = dir_entry.file_name().into_string().map_err(|_| {
                io::Error::new(io::ErrorKind::InvalidInput, "Invalid file name")
            })?;
            if path.is_dir() {
                root_vfolder.add_existing_folder(&name, VFolder::try_from(path.as_path())?);
            } else if path.is_file() {
                let data = fs::read(path)?;
                root_vfolder.add_file(&name, VFile::Binary(data));
            }
        }

        Ok(root_vfolder)
    }
}

/// File representation in virtual file system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VFile {
    /// Text file
    Text(String),
    /// Binary file
    Binary(Vec<u8>),
}

impl VFile {
    /// Get the raw content of the file.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            VFile::Text(text) => text.as_bytes(),
            VFile::Binary(data) => data,
        }
    }

    /// Get the content of a text file.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            VFile::Text(text) => Some(text),
            VFile::Binary(_) => None,
        }
    }
}

impl From<String> for VFile {
    fn from(value: String) -> Self {
        VFile::Text(value)
    }
}
impl From<&str> for VFile {
    fn from(value: &str) -> Self {
        VFile::Text(value.to_string())
    }
}
impl Default for VFile {
    fn default() -> Self {
        VFile::Text(String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vfolder() {
        let mut v_folder = VFolder::new();
        let v_file_1 = VFile::from("foo");
        v_folder.add_file("foo.txt", v_file_1);

        assert_eq!(v_folder.get_files().len(), 1);
        assert_eq!(v_folder.get_folders().len(), 0);

        let v_file_2 = VFile::from("baz");
        v_folder.add_file("bar/baz.txt", v_file_2);

        assert_eq!(v_folder.get_files().len(), 1);
        assert_eq!(v_folder.get_folders().len(), 1);
        assert!(v_folder.get_file("bar/baz.txt").is_some());
        assert!(v_folder
            .get_folder("bar")
            .expect("folder not found")
            .get_file("baz.txt")
            .is_some());
    }

    #[test]
    fn test_ensure_folder_keeps_contents() {
        let mut v_folder = VFolder::new();
        v_folder.add_file("data/tmp/function/a.mcfunction", VFile::from("a"));
        v_folder.ensure_folder("data/tmp/function");
        v_folder.ensure_folder("data/tmp/tags");

        assert!(v_folder.get_file("data/tmp/function/a.mcfunction").is_some());
        assert_eq!(
            v_folder.folder_paths(),
            vec!["data", "data/tmp", "data/tmp/function", "data/tmp/tags"]
        );
    }

    #[test]
    fn test_place() {
        let dir = tempfile::tempdir().expect("error creating tempdir");
        let mut v_folder = VFolder::new();
        v_folder.add_file("a/b.txt", VFile::from("hello"));
        v_folder.ensure_folder("empty");

        v_folder.place(dir.path()).expect("error placing folder");

        assert_eq!(
            fs::read_to_string(dir.path().join("a/b.txt")).expect("file missing"),
            "hello"
        );
        assert!(dir.path().join("empty").is_dir());
    }
}
