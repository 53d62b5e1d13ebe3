//! Parsing and querying of the backup tool's journal changelog.
//!
//! The changelog is plain text where every event spans exactly three lines.
//! [`ChangelogParser`] turns that text into [`ChangeRecord`]s and the
//! functions in [`query`] answer questions about a single file's history.

mod change_record;
mod parser;
mod query;
mod timestamp;

pub use change_record::{ChangeRecord, EntryType};
pub use parser::{ChangelogParser, ParseError, ParseStreamError};
pub use query::{filter_by_name, last_nonzero};
pub use timestamp::{TIME_FORMAT, TimestampFormatError, parse_timestamp};
