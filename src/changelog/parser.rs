use std::num::ParseIntError;
use std::str::FromStr;

use regex::{Captures, Regex};
use snafu::{ResultExt, Snafu};
use tracing::debug;

use crate::changelog::{ChangeRecord, EntryType, TimestampFormatError, parse_timestamp};

/// Timestamp as it appears inside the changelog, e.g. `Mon Jun 1 12:34:56 2015`.
macro_rules! timestamp_pattern {
    () => {
        r"[a-zA-Z]{3}\s+[a-zA-Z]{3}\s+[0-9]+\s+[0-9]{2}:[0-9]{2}:[0-9]{2} [0-9]{4}"
    };
}

/// Grammar of a full three-line changelog entry.
///
/// Line 1: `Mon Jun 1 12:34:56 2015: add u'name.pdf'`
/// Line 2: `  type:file mode:33188 uid:1000 gid:1000 size:4096`
/// Line 3: `  mtime:Mon Jun 1 12:34:56 2015 ctime:Mon Jun 1 12:34:56 2015`
///
/// The quoted target keeps both quote characters; matching them is done in
/// [`split_quoted`] because the regex engine has no backreferences.
const TRIPLET_PATTERN: &str = concat!(
    r"\A(?P<time>",
    timestamp_pattern!(),
    r"):\s+(?P<action>\w+)\s+u(?P<quoted>['\x22].*)",
    r"\n\s*type:(?P<type>\w+)\s+mode:(?P<mode>[0-9]+)\s+uid:(?P<uid>[0-9]+)",
    r"\s+gid:(?P<gid>[0-9]+)\s+size:(?P<size>[0-9]+)",
    r"\n\s*mtime:(?P<mtime>",
    timestamp_pattern!(),
    r")\s+ctime:(?P<ctime>",
    timestamp_pattern!(),
    r")\z",
);

/// Parser for the backup tool's changelog output.
///
/// Holds the compiled grammar and no other state, so one value can parse any
/// number of changelogs.
#[derive(Debug, Clone)]
pub struct ChangelogParser {
    grammar: Regex,
}

impl Default for ChangelogParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangelogParser {
    pub fn new() -> Self {
        Self {
            grammar: Regex::new(TRIPLET_PATTERN).expect("Invalid changelog grammar regex"),
        }
    }

    /// Parses one entry from its three lines.
    ///
    /// The whole triplet has to match; any field that fails to convert turns
    /// into a [`ParseError`] carrying the raw text.
    pub fn parse(&self, triplet: [&str; 3]) -> Result<ChangeRecord, ParseError> {
        let text = triplet.join("\n");
        let Some(captures) = self.grammar.captures(&text) else {
            return GrammarSnafu { triplet: text }.fail();
        };

        let Some(target_name) = split_quoted(capture(&captures, "quoted")) else {
            return QuoteMismatchSnafu { triplet: text }.fail();
        };

        Ok(ChangeRecord {
            timestamp: timestamp_field(&captures, "time", &text)?,
            action: capture(&captures, "action").to_string(),
            target_name: target_name.to_string(),
            entry_type: EntryType::from(capture(&captures, "type")),
            mode: integer_field(&captures, "mode", &text)?,
            owner_id: integer_field(&captures, "uid", &text)?,
            group_id: integer_field(&captures, "gid", &text)?,
            size_bytes: integer_field(&captures, "size", &text)?,
            modified_time: timestamp_field(&captures, "mtime", &text)?,
            created_time: timestamp_field(&captures, "ctime", &text)?,
        })
    }

    /// Parses a whole changelog given as individual lines.
    ///
    /// Lines are consumed three at a time. Up to two trailing lines that do
    /// not form a full entry are dropped, which covers the empty line left by
    /// the tool's final newline. The first malformed entry fails the batch.
    pub fn parse_stream<S: AsRef<str>>(
        &self,
        lines: &[S],
    ) -> Result<Vec<ChangeRecord>, ParseStreamError> {
        let chunks = lines.chunks_exact(3);
        if !chunks.remainder().is_empty() {
            debug!(
                "Discarding {} trailing changelog line(s)",
                chunks.remainder().len()
            );
        }

        chunks
            .enumerate()
            .map(|(i, chunk)| {
                self.parse([chunk[0].as_ref(), chunk[1].as_ref(), chunk[2].as_ref()])
                    .context(ParseStreamSnafu { index: i + 1 })
            })
            .collect()
    }

    /// Splits raw tool output on newlines and parses it.
    ///
    /// `\r\n` line endings are accepted as well as `\n`.
    pub fn parse_text(&self, text: &str) -> Result<Vec<ChangeRecord>, ParseStreamError> {
        let lines = text
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .collect::<Vec<_>>();
        self.parse_stream(&lines)
    }
}

/// Strips the surrounding quotes off `'name'` or `"name"`.
///
/// The closing quote must be the same character as the opening one and end
/// the line; the other quote character may appear freely inside the name.
fn split_quoted(quoted: &str) -> Option<&str> {
    let mut chars = quoted.chars();
    let open = chars.next()?;
    chars.as_str().strip_suffix(open)
}

fn capture<'t>(captures: &Captures<'t>, name: &str) -> &'t str {
    captures.name(name).map_or("", |m| m.as_str())
}

fn integer_field<T>(
    captures: &Captures<'_>,
    field: &'static str,
    triplet: &str,
) -> Result<T, ParseError>
where
    T: FromStr<Err = ParseIntError>,
{
    let value = capture(captures, field);
    value.parse::<T>().context(IntegerSnafu {
        field,
        value,
        triplet,
    })
}

fn timestamp_field(
    captures: &Captures<'_>,
    field: &'static str,
    triplet: &str,
) -> Result<chrono::NaiveDateTime, ParseError> {
    let value = capture(captures, field);
    parse_timestamp(value).context(TimestampSnafu {
        field,
        value,
        triplet,
    })
}

#[derive(Debug, Snafu)]
pub enum ParseError {
    #[snafu(display("Changelog entry does not match the expected layout:\n{}", triplet))]
    GrammarError { triplet: String },
    #[snafu(display("Target name is not enclosed in matching quotes:\n{}", triplet))]
    QuoteMismatchError { triplet: String },
    #[snafu(display("Field '{}' has invalid integer '{}':\n{}", field, value, triplet))]
    IntegerError {
        field: &'static str,
        value: String,
        triplet: String,
        source: ParseIntError,
    },
    #[snafu(display("Field '{}' has invalid timestamp '{}':\n{}", field, value, triplet))]
    TimestampError {
        field: &'static str,
        value: String,
        triplet: String,
        source: TimestampFormatError,
    },
}

#[derive(Debug, Snafu)]
#[snafu(display("Changelog record #{} is malformed", index))]
pub struct ParseStreamError {
    /// 1-based position of the offending entry.
    pub index: usize,
    pub source: ParseError,
}
