//! Passive invariant checks over the snapshot stream.
//!
//! The detector never influences decisions; findings accumulate for the run
//! report.
mod detector;
mod types;

pub use detector::AnomalyDetector;
pub use types::{Anomaly, AnomalyKind, Severity};
