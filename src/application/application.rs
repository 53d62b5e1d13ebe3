use std::io;

use snafu::Snafu;
use snafu::prelude::*;
use tracing::{debug, info, warn};

use crate::application::RuntimeConfig;
use crate::backup_tool::ChangelogCommand;
use crate::config::{ToolConfig, ToolConfigError};
use crate::diagnosis::{Diagnoser, DiagnoserCreationError, DiagnosisError};
use crate::ext::PathExt;
use crate::report::ReportPrinter;
use crate::scanner::{ScanError, find_zero_size_files};

pub struct Application;

impl Application {
    pub async fn run(runtime_config: impl Into<RuntimeConfig>) -> Result<(), ApplicationError> {
        let runtime_config: RuntimeConfig = runtime_config.into();
        let tool_config =
            ToolConfig::read(&runtime_config.root, runtime_config.config.as_deref())
                .await
                .context(ToolConfigSnafu)?;
        debug!("Loaded config: {:?}", tool_config);

        let paths = if runtime_config.paths.is_empty() {
            find_zero_size_files(&runtime_config.root).context(ScanSnafu)?
        } else {
            runtime_config.paths.clone()
        };
        info!(
            "Diagnosing {} file(s) from {}",
            paths.len(),
            runtime_config.root.best_effort_display()
        );

        let workers = runtime_config.workers.or(tool_config.workers);
        let diagnoses = Diagnoser::new(ChangelogCommand::from_config(&tool_config), workers)
            .context(DiagnoserCreationSnafu)?
            .diagnose(paths)
            .await
            .context(DiagnosisSnafu)?;

        let color = runtime_config.color.apply_to_stdout();
        ReportPrinter::new(io::stdout().lock(), color)
            .with_details(runtime_config.details)
            .print(&diagnoses)
            .context(ReportSnafu)?;

        let failed = diagnoses
            .iter()
            .filter(|diagnosis| diagnosis.outcome.is_failed())
            .count();
        if failed > 0 {
            warn!("{} of {} file(s) could not be diagnosed", failed, diagnoses.len());
        }
        ensure!(failed == 0, IncompleteDiagnosisSnafu { failed });

        Ok(())
    }
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Critical failure encountered while loading the configuration"))]
    ToolConfigError { source: ToolConfigError },
    #[snafu(display("Critical failure encountered while scanning for zero-byte files"))]
    ScanError { source: ScanError },
    #[snafu(display("Critical failure encountered during diagnoser creation"))]
    DiagnoserCreationError { source: DiagnoserCreationError },
    #[snafu(display("Critical failure encountered while diagnosing files"))]
    DiagnosisError { source: DiagnosisError },
    #[snafu(display("Failed to write the report"))]
    ReportError { source: io::Error },
    #[snafu(display("{} file(s) could not be diagnosed", failed))]
    IncompleteDiagnosis { failed: usize },
}
