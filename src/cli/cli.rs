use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::Parser;

use crate::application::data::{ColorChoice, LogLevel};

/// Finds zero-byte files and reports the last size the backup tool recorded
/// for each of them.
#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Cli {
    /// Files to diagnose. When omitted, every zero-byte file under --root is used
    pub paths: Vec<PathBuf>,
    #[clap(long, short, default_value = "warn", value_enum)]
    pub log_level: LogLevel,

    /// The directory scanned for zero-byte files
    #[clap(long, short, default_value = ".")]
    pub root: PathBuf,

    /// Config file to use instead of zerosize.yaml in the root directory
    #[clap(long, short)]
    pub config: Option<PathBuf>,

    #[clap(long, default_value = "auto", value_enum)]
    pub color: ColorChoice,

    /// Print action, type, ownership and times of each record found
    #[clap(long, short)]
    pub details: bool,

    /// Number of folders queried concurrently
    #[clap(long, short)]
    pub workers: Option<NonZeroUsize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_scan_current_directory() {
        let cli = Cli::try_parse_from(["zerosize"]).unwrap();
        assert!(cli.paths.is_empty());
        assert_eq!(cli.root, PathBuf::from("."));
        assert!(cli.config.is_none());
        assert!(cli.workers.is_none());
        assert!(!cli.details);
    }

    #[test]
    fn explicit_paths_and_options() {
        let cli = Cli::try_parse_from([
            "zerosize",
            "a.txt",
            "docs/b.pdf",
            "--log-level",
            "debug",
            "--color",
            "never",
            "--workers",
            "4",
            "--config",
            "/etc/zerosize.yaml",
        ])
        .unwrap();

        assert_eq!(cli.paths, [PathBuf::from("a.txt"), PathBuf::from("docs/b.pdf")]);
        assert!(matches!(cli.log_level, LogLevel::Debug));
        assert!(matches!(cli.color, ColorChoice::Never));
        assert_eq!(cli.workers, NonZeroUsize::new(4));
        assert_eq!(cli.config, Some(PathBuf::from("/etc/zerosize.yaml")));
    }

    #[test]
    fn zero_workers_is_rejected() {
        assert!(Cli::try_parse_from(["zerosize", "--workers", "0"]).is_err());
    }
}
