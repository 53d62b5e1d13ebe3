use std::io;
use std::path::{Component, Path, PathBuf};

/// Absolute form of `path` with `.` and `..` resolved textually.
///
/// Symlinks are left alone: a link to a zero-byte file is reported under the
/// directory it lives in, which is where the backup tool journals it.
pub fn lexically_absolute(path: &Path) -> io::Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    Ok(normalize_path(&absolute))
}

fn normalize_path(path: &Path) -> PathBuf {
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !components.is_empty()
                    && !matches!(
                        components.last(),
                        Some(Component::RootDir | Component::Prefix(_))
                    )
                {
                    components.pop();
                }
            }
            _ => components.push(component),
        }
    }

    components.iter().collect()
}

fn best_effort_display(path: &Path) -> String {
    match path.canonicalize() {
        Ok(canonical_path) => canonical_path.display().to_string(),
        Err(_) => match lexically_absolute(path) {
            Ok(absolute) => absolute.display().to_string(),
            Err(_) => path.display().to_string(),
        },
    }
}

pub trait PathExt {
    /// Canonical path if it exists, otherwise the lexically absolute one.
    /// Used in log and error messages only.
    fn best_effort_display(&self) -> String;
}

impl PathExt for Path {
    fn best_effort_display(&self) -> String {
        best_effort_display(self)
    }
}

impl PathExt for PathBuf {
    fn best_effort_display(&self) -> String {
        best_effort_display(self)
    }
}
