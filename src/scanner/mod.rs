//! Lifecycle controller.
//!
//! [`Scanner`] ties the other components together: it acquires the camera
//! stream, derives the crop once playback has started, allocates the
//! raster and drives the sampling timer.
//!
//! ```text
//!            start                pause
//!   Idle ───────────▶ Scanning ───────────▶ Paused
//!    ▲                 │    ▲     resume      │
//!    │       stop      │    └─────────────────┤
//!    └─────────────────┴──────────────────────┘
//!                                 stop
//! ```
//!
//! Any other call is rejected with [`ScannerError::IllegalTransition`] and
//! leaves the scanner untouched.

mod controller;
mod error;
mod session;
mod state;
mod stats;

pub use controller::{Scanner, DEFAULT_INTERVAL};
pub use error::ScannerError;
pub use state::{ScannerState, Transition};
pub use stats::{ScanStats, ScanStatsSnapshot};
