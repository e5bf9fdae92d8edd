//! Domain models for phasewatch.
//!
//! # Core Concepts
//!
//! - [`PassingFeature`]: A feature row currently marked as passing, as read from the store.
//! - [`ProgressSnapshot`]: Passing/total counts, scoped to one phase or to all phases.
//! - [`PhaseStatus`]: Completion state of a single phase.
//! - [`ProgressEvent`]: The webhook payload sent when progress increases.

mod feature;
mod progress;

pub use feature::*;
pub use progress::*;
