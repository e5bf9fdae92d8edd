//! Phase progress tracking for feature-driven builds.
//!
//! Reads the feature store of a project workspace, works out which phase is
//! active, and notifies an external webhook whenever the passing count grows.

pub mod api;
pub mod config;
pub mod models;
pub mod notify;
pub mod phase;
pub mod store;
pub mod workspace;

pub use config::NotifyConfig;
pub use notify::{CheckOutcome, Notifier};
pub use store::{FeatureSource, FeatureStore};
pub use workspace::Workspace;
