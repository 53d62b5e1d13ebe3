mod diagnoser;
mod outcome;
mod target;

pub use diagnoser::{Diagnoser, DiagnoserCreationError, DiagnosisError};
pub use outcome::{Diagnosis, Outcome};
pub use target::DiagnosisTarget;
