use crate::{datapack::PackInfo, error::BoxError, virtual_fs::VFolder};

use super::Plugin;

/// Logs every rendered file and the final layout of the pack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerboseLogging {
    files: bool,
    directory: bool,
}

impl Default for VerboseLogging {
    fn default() -> Self {
        Self {
            files: true,
            directory: true,
        }
    }
}

impl VerboseLogging {
    /// Create the plugin logging both files and the directory layout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether rendered files are logged.
    #[must_use]
    pub fn with_files(self, files: bool) -> Self {
        Self { files, ..self }
    }

    /// Set whether the directory layout is logged after the build.
    #[must_use]
    pub fn with_directory(self, directory: bool) -> Self {
        Self { directory, ..self }
    }
}

/// Draw the folder as a tree, folders first, with ` | ` and ` L ` markers.
fn draw_tree(folder: &VFolder, prefix: &str, lines: &mut Vec<String>) {
    let entries = folder
        .get_folders()
        .iter()
        .map(|(name, folder)| (name, Some(folder)))
        .chain(folder.get_files().keys().map(|name| (name, None)))
        .collect::<Vec<_>>();

    let count = entries.len();
    for (index, (name, sub_folder)) in entries.into_iter().enumerate() {
        let last = index + 1 == count;
        lines.push(format!("{prefix}{}{name}", if last { " L " } else { " | " }));
        if let Some(sub_folder) = sub_folder {
            let prefix = format!("{prefix}{}", if last { "   " } else { " | " });
            draw_tree(sub_folder, &prefix, lines);
        }
    }
}

impl Plugin for VerboseLogging {
    fn name(&self) -> &str {
        "verbose_logging"
    }

    fn render_file(
        &self,
        _info: &PackInfo,
        path: &str,
        file_name: &str,
        content: &str,
    ) -> Result<(), BoxError> {
        if self.files {
            let body = content
                .lines()
                .map(|line| format!("  |  {line}"))
                .collect::<Vec<_>>()
                .join("\n");
            tracing::info!("[{file_name}]\n  @ <{path}>\n{body}");
        }
        Ok(())
    }

    fn post_build(&self, info: &PackInfo, output: &VFolder) -> Result<(), BoxError> {
        if self.directory {
            let mut lines = vec![info.name().clone()];
            draw_tree(output, "", &mut lines);
            tracing::info!("Pack Contents:\n---\n{}", lines.join("\n"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::virtual_fs::VFile;

    use super::*;

    #[test]
    fn test_draw_tree() {
        let mut folder = VFolder::new();
        folder.add_file("pack.mcmeta", VFile::from("{}"));
        folder.add_file("data/tmp/function/a.mcfunction", VFile::from("say a"));
        folder.add_file("data/tmp/function/b.mcfunction", VFile::from("say b"));

        let mut lines = Vec::new();
        draw_tree(&folder, "", &mut lines);
        assert_eq!(
            lines,
            vec![
                " | data",
                " |  L tmp",
                " |     L function",
                " |        | a.mcfunction",
                " |        L b.mcfunction",
                " L pack.mcmeta",
            ]
        );
    }
}
