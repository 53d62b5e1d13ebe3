use std::io::{self, Write};

use colored::{Color, Colorize};

use crate::changelog::{ChangeRecord, TIME_FORMAT};
use crate::diagnosis::{Diagnosis, Outcome};

/// Writes diagnoses for a human operator, one line per file.
pub struct ReportPrinter<W: Write> {
    out: W,
    color: bool,
    details: bool,
}

impl<W: Write> ReportPrinter<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self {
            out,
            color,
            details: false,
        }
    }

    /// Also print the full metadata of each record that was found.
    pub fn with_details(mut self, details: bool) -> Self {
        self.details = details;
        self
    }

    pub fn print(&mut self, diagnoses: &[Diagnosis]) -> io::Result<()> {
        writeln!(self.out, "# empties: {}", diagnoses.len())?;
        for diagnosis in diagnoses {
            let (line, color) = Self::describe(diagnosis);
            let line = if self.color {
                line.color(color).to_string()
            } else {
                line
            };
            writeln!(self.out, "{line}")?;

            if let (true, Outcome::LastNonzero(record)) = (self.details, &diagnosis.outcome) {
                writeln!(self.out, "    {}", Self::record_details(record))?;
            }
        }
        self.out.flush()
    }

    fn record_details(record: &ChangeRecord) -> String {
        format!(
            "{} type:{} mode:{} uid:{} gid:{} mtime:{} ctime:{}",
            record.action(),
            record.entry_type(),
            record.mode(),
            record.owner_id(),
            record.group_id(),
            record.modified_time().format(TIME_FORMAT),
            record.created_time().format(TIME_FORMAT),
        )
    }

    fn describe(diagnosis: &Diagnosis) -> (String, Color) {
        let path = diagnosis.path.display();
        match &diagnosis.outcome {
            Outcome::LastNonzero(record) => (
                format!(
                    "file {} was {} bytes at {}",
                    path,
                    record.size_bytes(),
                    record.timestamp().format(TIME_FORMAT)
                ),
                Color::Green,
            ),
            Outcome::AlwaysEmpty { records } => (
                format!(
                    "*file {} was NEVER nonzero ({} record{})",
                    path,
                    records,
                    if *records == 1 { "" } else { "s" }
                ),
                Color::Yellow,
            ),
            Outcome::NoHistory => (
                format!("?file {} has no recorded history", path),
                Color::Yellow,
            ),
            Outcome::Failed { reason } => (
                format!("!file {} could not be diagnosed: {}", path, reason),
                Color::Red,
            ),
        }
    }
}
