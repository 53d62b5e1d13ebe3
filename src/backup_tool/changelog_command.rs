use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};

use compio::process::Command;
use snafu::{ResultExt, Snafu};
use tracing::{debug, info};

use crate::changelog::{ChangeRecord, ChangelogParser, ParseStreamError};
use crate::config::ToolConfig;
use crate::ext::PathExt;

/// Invocation of the backup tool's changelog listing for one folder.
///
/// The folder is appended as the last argument, so with the default config
/// this runs `SpiderOak --journal-changelog <folder>`.
#[derive(Debug, Clone)]
pub struct ChangelogCommand {
    program: String,
    args: Vec<String>,
    parser: ChangelogParser,
}

impl ChangelogCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            parser: ChangelogParser::new(),
        }
    }

    pub fn from_config(config: &ToolConfig) -> Self {
        Self::new(config.command.clone(), config.args.clone())
    }

    /// Human readable command line, for logs and errors.
    pub fn command_line(&self, directory: &Path) -> String {
        let mut parts = vec![self.program.clone()];
        parts.extend(self.args.iter().cloned());
        parts.push(directory.display().to_string());
        parts.join(" ")
    }

    /// Runs the tool for `directory` and returns its standard output.
    pub async fn fetch(&self, directory: &Path) -> Result<String, ChangelogCommandError> {
        let command_line = self.command_line(directory);
        info!("Running '{}'", command_line);

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd.arg(directory);
        let _ = cmd.stdout(Stdio::piped());
        let _ = cmd.stderr(Stdio::piped());

        let Output {
            status,
            stdout,
            stderr,
        } = cmd.output().await.context(SpawnSnafu {
            command: command_line.clone(),
        })?;

        if !status.success() {
            return UnsuccessfulExecutionSnafu {
                command: command_line,
                status: status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
            }
            .fail();
        }

        debug!("'{}' printed {} bytes", command_line, stdout.len());
        String::from_utf8(stdout).context(Utf8Snafu {
            command: command_line,
        })
    }

    /// Runs the tool for `directory` and parses the whole changelog.
    pub async fn fetch_records(
        &self,
        directory: &Path,
    ) -> Result<Vec<ChangeRecord>, ChangelogCommandError> {
        let output = self.fetch(directory).await?;
        let records = self.parser.parse_text(&output).context(ParseSnafu {
            directory: directory.to_path_buf(),
        })?;
        debug!(
            "Parsed {} changelog records for {}",
            records.len(),
            directory.best_effort_display()
        );
        Ok(records)
    }
}

#[derive(Debug, Snafu)]
pub enum ChangelogCommandError {
    #[snafu(display("Failed to run '{}'", command))]
    SpawnError {
        command: String,
        source: std::io::Error,
    },
    #[snafu(display("'{}' failed with exit code {}: {}", command, status, stderr))]
    UnsuccessfulExecution {
        command: String,
        status: i32,
        stderr: String,
    },
    #[snafu(display("'{}' printed output that is not UTF-8", command))]
    Utf8Error {
        command: String,
        source: std::string::FromUtf8Error,
    },
    #[snafu(display("Changelog for {} could not be parsed", directory.best_effort_display()))]
    ParseError {
        directory: PathBuf,
        source: ParseStreamError,
    },
}
