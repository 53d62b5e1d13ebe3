use std::path::{Path, PathBuf};

use snafu::{OptionExt, ResultExt, Snafu};

use crate::ext::lexically_absolute;

/// A file to diagnose, split the way the backup tool journals it: the
/// folder whose changelog is listed and the bare name inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosisTarget {
    pub directory: PathBuf,
    pub name: String,
}

impl DiagnosisTarget {
    pub fn from_path(path: &Path) -> Result<Self, TargetError> {
        let absolute = lexically_absolute(path).context(CurrentDirSnafu)?;

        let name = absolute
            .file_name()
            .context(NoFileNameSnafu {
                path: path.to_path_buf(),
            })?
            .to_str()
            .context(NonUtf8NameSnafu {
                path: path.to_path_buf(),
            })?
            .to_string();

        let directory = absolute
            .parent()
            .map(Path::to_path_buf)
            .context(NoFileNameSnafu {
                path: path.to_path_buf(),
            })?;

        Ok(Self { directory, name })
    }
}

#[derive(Debug, Snafu)]
pub enum TargetError {
    #[snafu(display("Failed to obtain current dir"))]
    CurrentDirError { source: std::io::Error },
    #[snafu(display("{} does not name a file", path.display()))]
    NoFileNameError { path: PathBuf },
    #[snafu(display("{} has a name that is not valid UTF-8", path.display()))]
    NonUtf8NameError { path: PathBuf },
}
