use std::path::{Path, PathBuf};

use snafu::{IntoError, Snafu};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::ext::PathExt;

/// Finds every regular file of length zero beneath `root`.
///
/// Symlinks are not followed. Subdirectories that cannot be read are logged
/// and skipped; only an unreadable `root` is an error. Results are sorted.
pub fn find_zero_size_files(root: &Path) -> Result<Vec<PathBuf>, ScanError> {
    debug!("Scanning {} for zero-byte files", root.best_effort_display());

    let mut found = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => {
                return Err(ReadRootSnafu {
                    root: root.to_path_buf(),
                }
                .into_error(err));
            }
            Err(err) => {
                warn!("Skipping unreadable entry: {}", err);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        match entry.metadata() {
            Ok(metadata) if metadata.len() == 0 => found.push(entry.into_path()),
            Ok(_) => {}
            Err(err) => warn!("Failed to stat {}: {}", entry.path().display(), err),
        }
    }

    found.sort();
    debug!("Found {} zero-byte files", found.len());
    Ok(found)
}

#[derive(Debug, Snafu)]
pub enum ScanError {
    #[snafu(display("Failed to read scan root: {}", root.best_effort_display()))]
    ReadRootError {
        root: PathBuf,
        source: walkdir::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::TempDir;

    fn touch(path: &Path, contents: &[u8]) {
        let mut file = File::create(path).expect("Failed to create file");
        file.write_all(contents).expect("Failed to write file");
    }

    #[test]
    fn finds_empty_files_recursively_and_sorted() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        fs::create_dir_all(root.join("b/nested")).unwrap();
        fs::create_dir_all(root.join("a")).unwrap();

        touch(&root.join("b/nested/empty.pdf"), b"");
        touch(&root.join("a/empty.txt"), b"");
        touch(&root.join("a/full.txt"), b"content");
        touch(&root.join("top.empty"), b"");

        let found = find_zero_size_files(root).unwrap();

        assert_eq!(
            found,
            vec![
                root.join("a/empty.txt"),
                root.join("b/nested/empty.pdf"),
                root.join("top.empty"),
            ]
        );
    }

    #[test]
    fn empty_directories_are_not_reported() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        fs::create_dir(temp_dir.path().join("hollow")).unwrap();

        assert!(find_zero_size_files(temp_dir.path()).unwrap().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_are_not_followed() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let outside = TempDir::new().expect("Failed to create temp directory");
        touch(&outside.path().join("elsewhere.txt"), b"");
        std::os::unix::fs::symlink(outside.path(), temp_dir.path().join("link")).unwrap();
        std::os::unix::fs::symlink(
            outside.path().join("elsewhere.txt"),
            temp_dir.path().join("file_link"),
        )
        .unwrap();

        assert!(find_zero_size_files(temp_dir.path()).unwrap().is_empty());
    }

    #[test]
    fn empty_root_file_is_reported_itself() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let file = temp_dir.path().join("lonely.txt");
        touch(&file, b"");

        assert_eq!(find_zero_size_files(&file).unwrap(), vec![file]);
    }

    #[test]
    fn missing_root_is_an_error() {
        let result = find_zero_size_files(Path::new("/this/path/does/not/exist"));
        assert!(matches!(result, Err(ScanError::ReadRootError { .. })));
    }
}
