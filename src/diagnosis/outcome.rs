use std::path::PathBuf;

use derive_more::IsVariant;

use crate::changelog::{ChangeRecord, filter_by_name, last_nonzero};

/// What the changelog says about one file.
#[derive(Debug, Clone, PartialEq, Eq, IsVariant)]
pub enum Outcome {
    /// The most recent record with a non-zero size.
    LastNonzero(ChangeRecord),
    /// The file has history, but every record has size 0.
    AlwaysEmpty { records: usize },
    /// The file never appears in its folder's changelog.
    NoHistory,
    /// The changelog could not be obtained or parsed.
    Failed { reason: String },
}

impl Outcome {
    pub fn from_history(records: &[ChangeRecord], name: &str) -> Self {
        let history = filter_by_name(records, name);
        match last_nonzero(history.clone()) {
            Some(record) => Outcome::LastNonzero(record.clone()),
            None => match history.count() {
                0 => Outcome::NoHistory,
                records => Outcome::AlwaysEmpty { records },
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnosis {
    /// Path as the user or the scanner supplied it.
    pub path: PathBuf,
    pub outcome: Outcome,
}
