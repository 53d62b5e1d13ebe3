use chrono::{NaiveDateTime, ParseWeekdayError, Timelike, Weekday};
use snafu::{ResultExt, Snafu};

/// Calendar layout the backup tool uses for every timestamp it prints,
/// e.g. `Mon Jun  1 12:34:56 2015`.
pub const TIME_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

// Weekday is validated separately and not cross-checked against the date.
const DATE_FORMAT: &str = "%b %e %H:%M:%S %Y";

/// Parses a changelog timestamp.
///
/// Runs of whitespace between the parts are accepted, and the day of month
/// may be one or two digits. The weekday must name a day but is not compared
/// against the date, since the tool's values are captured as printed.
pub fn parse_timestamp(text: &str) -> Result<NaiveDateTime, TimestampFormatError> {
    let mut parts = text.split_whitespace();
    let weekday = parts.next().unwrap_or_default();
    weekday.parse::<Weekday>().context(WeekdaySnafu {
        weekday: weekday.to_string(),
    })?;

    let rest = parts.collect::<Vec<_>>().join(" ");
    let parsed = NaiveDateTime::parse_from_str(&rest, DATE_FORMAT).context(CalendarSnafu {
        text: text.to_string(),
    })?;

    // chrono accepts :60 as a leap second
    if parsed.nanosecond() >= 1_000_000_000 {
        return LeapSecondSnafu {
            text: text.to_string(),
        }
        .fail();
    }
    Ok(parsed)
}

#[derive(Debug, Snafu)]
pub enum TimestampFormatError {
    #[snafu(display("'{}' is not a weekday name", weekday))]
    WeekdayError {
        weekday: String,
        source: ParseWeekdayError,
    },
    #[snafu(display("'{}' does not follow the '{}' layout", text, TIME_FORMAT))]
    CalendarError {
        text: String,
        source: chrono::ParseError,
    },
    #[snafu(display("'{}' has second 60, which is out of range", text))]
    LeapSecondError { text: String },
}
