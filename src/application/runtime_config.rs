use std::num::NonZeroUsize;
use std::path::PathBuf;

use crate::application::data::ColorChoice;
use crate::cli::Cli;

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub paths: Vec<PathBuf>,
    pub root: PathBuf,
    pub config: Option<PathBuf>,
    pub color: ColorChoice,
    pub workers: Option<NonZeroUsize>,
    pub details: bool,
}

impl From<Cli> for RuntimeConfig {
    fn from(cli: Cli) -> Self {
        Self {
            paths: cli.paths,
            root: cli.root,
            config: cli.config,
            color: cli.color,
            workers: cli.workers,
            details: cli.details,
        }
    }
}
