//! Result stability.
//!
//! Single-frame decodes can be misreads. Values are only handed to the
//! caller after they have been read on two consecutive present readings.

mod filter;
mod reporter;

pub use filter::StabilityFilter;
pub use reporter::{ResultReporter, ScanCallback};
