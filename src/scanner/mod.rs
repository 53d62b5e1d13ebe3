mod zero_size_scan;

pub use zero_size_scan::{ScanError, find_zero_size_files};
