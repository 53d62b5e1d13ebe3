use std::fmt;

use chrono::NaiveDateTime;
use derive_more::Display;

use crate::changelog::TIME_FORMAT;

/// Kind of filesystem entry a changelog event refers to.
///
/// The tool's vocabulary is not documented, so unknown tokens are kept
/// verbatim instead of being rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display)]
pub enum EntryType {
    #[display("file")]
    File,
    #[display("dir")]
    Directory,
    #[display("{_0}")]
    Other(String),
}

impl From<&str> for EntryType {
    fn from(token: &str) -> Self {
        match token {
            "file" => EntryType::File,
            "dir" | "directory" => EntryType::Directory,
            other => EntryType::Other(other.to_string()),
        }
    }
}

/// One event from the changelog, as printed by the backup tool.
///
/// Records are only built by [`ChangelogParser`](crate::changelog::ChangelogParser)
/// and expose their fields read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRecord {
    pub(super) timestamp: NaiveDateTime,
    pub(super) action: String,
    pub(super) target_name: String,
    pub(super) entry_type: EntryType,
    pub(super) mode: u32,
    pub(super) owner_id: u32,
    pub(super) group_id: u32,
    pub(super) size_bytes: u64,
    pub(super) modified_time: NaiveDateTime,
    pub(super) created_time: NaiveDateTime,
}

impl ChangeRecord {
    /// When the tool recorded the event.
    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    /// Verb such as `add`, `update` or `delete`.
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Bare file or directory name, without any path component.
    pub fn target_name(&self) -> &str {
        &self.target_name
    }

    pub fn entry_type(&self) -> &EntryType {
        &self.entry_type
    }

    pub fn mode(&self) -> u32 {
        self.mode
    }

    pub fn owner_id(&self) -> u32 {
        self.owner_id
    }

    pub fn group_id(&self) -> u32 {
        self.group_id
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub fn modified_time(&self) -> NaiveDateTime {
        self.modified_time
    }

    pub fn created_time(&self) -> NaiveDateTime {
        self.created_time
    }
}

impl fmt::Display for ChangeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} '{}' at {}",
            self.action,
            self.target_name,
            self.timestamp.format(TIME_FORMAT)
        )
    }
}
