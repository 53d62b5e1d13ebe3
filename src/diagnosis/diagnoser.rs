use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::available_parallelism;

use compio::dispatcher::{Dispatcher, DispatcherBuilder};
use compio::runtime::spawn;
use futures::StreamExt;
use futures_channel::mpsc::{self, UnboundedSender};
use snafu::{ErrorCompat, ResultExt, Snafu};
use tracing::{debug, error, info};

use crate::backup_tool::ChangelogCommand;
use crate::diagnosis::{Diagnosis, DiagnosisTarget, Outcome};
use crate::ext::PathExt;

/// Default number of worker threads when unable to determine system parallelism
const DEFAULT_WORKER_THREADS: usize = 1;

/// Outcomes of one folder's job, keyed by position in the target list.
type FolderResult = Vec<(usize, Outcome)>;

/// Looks up the last non-zero size of many files.
///
/// Targets are grouped by folder so the backup tool runs once per folder.
/// Folder jobs run on a worker pool and their results are reported back over
/// a channel.
pub struct Diagnoser {
    dispatcher: Dispatcher,
    command: Arc<ChangelogCommand>,
}

impl Diagnoser {
    pub fn new(
        command: ChangelogCommand,
        workers: Option<NonZeroUsize>,
    ) -> Result<Self, DiagnoserCreationError> {
        let workers_num = workers.unwrap_or_else(Self::determine_worker_count);
        debug!("Using {} worker threads for changelog queries", workers_num);

        let dispatcher = DispatcherBuilder::new()
            .worker_threads(workers_num)
            .build()
            .context(DispatcherSnafu)?;

        Ok(Self {
            dispatcher,
            command: Arc::new(command),
        })
    }

    fn determine_worker_count() -> NonZeroUsize {
        available_parallelism()
            .ok()
            .or(NonZeroUsize::new(DEFAULT_WORKER_THREADS))
            .unwrap_or(NonZeroUsize::MIN)
    }

    /// Diagnoses every path, returning results in the order given.
    ///
    /// A folder whose changelog cannot be read marks its own files as
    /// [`Outcome::Failed`] and does not affect other folders.
    pub async fn diagnose(&self, paths: Vec<PathBuf>) -> Result<Vec<Diagnosis>, DiagnosisError> {
        let mut outcomes: Vec<Option<Outcome>> = vec![None; paths.len()];
        let mut folders: BTreeMap<PathBuf, Vec<(usize, String)>> = BTreeMap::new();

        for (index, path) in paths.iter().enumerate() {
            match DiagnosisTarget::from_path(path) {
                Ok(DiagnosisTarget { directory, name }) => {
                    folders.entry(directory).or_default().push((index, name));
                }
                Err(e) => {
                    error!("Cannot diagnose {}: {}", path.display(), e);
                    outcomes[index] = Some(Outcome::Failed {
                        reason: error_chain(&e),
                    });
                }
            }
        }

        info!(
            "Querying {} folder changelog(s) for {} file(s)",
            folders.len(),
            paths.len()
        );

        let (result_sender, mut result_receiver) = mpsc::unbounded::<FolderResult>();
        let pending = folders.len();
        for (directory, names) in folders {
            self.dispatch_folder(result_sender.clone(), directory, names)?;
        }

        for _ in 0..pending {
            let Some(results) = result_receiver.next().await else {
                return Err(DiagnosisError::ResultChannelClosed);
            };
            for (index, outcome) in results {
                outcomes[index] = Some(outcome);
            }
        }

        Ok(paths
            .into_iter()
            .zip(outcomes)
            .map(|(path, outcome)| Diagnosis {
                path,
                outcome: outcome.unwrap_or_else(|| Outcome::Failed {
                    reason: "no result was produced".to_string(),
                }),
            })
            .collect())
    }

    /// Dispatch one folder's changelog query and forward its outcomes.
    fn dispatch_folder(
        &self,
        result_sender: UnboundedSender<FolderResult>,
        directory: PathBuf,
        names: Vec<(usize, String)>,
    ) -> Result<(), DiagnosisError> {
        let indices = names.iter().map(|(index, _)| *index).collect::<Vec<_>>();
        let command = Arc::clone(&self.command);
        let job_directory = directory.clone();

        let receiver = self
            .dispatcher
            .dispatch(move || async move { query_folder(&command, job_directory, names).await })
            .map_err(|e| DiagnosisError::DispatchError {
                directory: directory.best_effort_display(),
                error: e.to_string(),
            })?;

        debug!("Dispatched changelog query for {}", directory.display());

        spawn(async move {
            let results = match receiver.await {
                Ok(results) => results,
                Err(e) => {
                    error!("Changelog query for {} was canceled: {}", directory.display(), e);
                    let reason = format!("changelog query was canceled: {e}");
                    indices
                        .into_iter()
                        .map(|index| {
                            (
                                index,
                                Outcome::Failed {
                                    reason: reason.clone(),
                                },
                            )
                        })
                        .collect()
                }
            };

            if let Err(send_err) = result_sender.unbounded_send(results) {
                debug!(
                    "Failed to send results for {}: {}",
                    directory.display(),
                    send_err
                );
            }
        })
        .detach();

        Ok(())
    }
}

async fn query_folder(
    command: &ChangelogCommand,
    directory: PathBuf,
    names: Vec<(usize, String)>,
) -> FolderResult {
    match command.fetch_records(&directory).await {
        Ok(records) => names
            .into_iter()
            .map(|(index, name)| {
                let outcome = Outcome::from_history(&records, &name);
                debug!("{} in {}: {:?}", name, directory.display(), outcome);
                (index, outcome)
            })
            .collect(),
        Err(e) => {
            error!("{}", error_chain(&e));
            let reason = error_chain(&e);
            names
                .into_iter()
                .map(|(index, _)| {
                    (
                        index,
                        Outcome::Failed {
                            reason: reason.clone(),
                        },
                    )
                })
                .collect()
        }
    }
}

/// Error message followed by all of its causes.
fn error_chain<E: ErrorCompat + std::error::Error + 'static>(error: &E) -> String {
    error
        .iter_chain()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(": ")
}

#[derive(Debug, Snafu)]
pub enum DiagnoserCreationError {
    #[snafu(display("Failed to create changelog query dispatcher"))]
    DispatcherError { source: std::io::Error },
}

#[derive(Debug, Snafu)]
pub enum DiagnosisError {
    #[snafu(display("Failed to dispatch changelog query for {}: {}", directory, error))]
    DispatchError { directory: String, error: String },
    #[snafu(display("Result channel closed before every folder reported back"))]
    ResultChannelClosed,
}
