//! Read-only access to a workspace's feature store.
//!
//! The store is owned by an external writer, so every query opens its own
//! read-only connection and tolerates the database being absent, half-written
//! or from an older schema. The [`FeatureSource`] methods never fail: they log
//! and fall back to zero/empty. Callers that need to tell "no data" from "read
//! failed" use the `try_*` methods on [`FeatureStore`].

mod schema;

use rusqlite::{Connection, OpenFlags};
use thiserror::Error;

use crate::models::*;
use crate::workspace::Workspace;

use schema::count_features;

pub use schema::{PhaseFilter, StoreSchema};

/// Why a feature store query could not be answered.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("feature database not found")]
    Missing,

    #[error("feature database has no features table")]
    MissingTable,

    #[error("feature database query failed: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Queries the phase evaluator and notification pipeline need from a store
/// of features.
pub trait FeatureSource {
    /// Total rows, optionally restricted to one phase.
    fn feature_count(&self, phase: Option<u32>) -> u32;

    /// Passing rows, optionally restricted to one phase.
    fn passing_feature_count(&self, phase: Option<u32>) -> u32;

    /// Every passing feature, ordered by ascending priority.
    fn passing_features(&self) -> Vec<PassingFeature>;

    /// Whether any work has been planned for `phase`.
    fn has_any_features(&self, phase: u32) -> bool;

    fn snapshot(&self, phase: Option<u32>) -> ProgressSnapshot {
        ProgressSnapshot::new(
            self.passing_feature_count(phase),
            self.feature_count(phase),
        )
    }
}

/// SQLite-backed feature store inside a [`Workspace`].
#[derive(Debug, Clone)]
pub struct FeatureStore {
    workspace: Workspace,
}

impl FeatureStore {
    pub fn new(workspace: Workspace) -> Self {
        Self { workspace }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    fn connect(&self) -> Result<(Connection, StoreSchema), StoreError> {
        let path = self.workspace.features_db();
        if !path.exists() {
            return Err(StoreError::Missing);
        }

        let conn = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        let schema = StoreSchema::detect(&conn)?;
        Ok((conn, schema))
    }

    pub fn try_feature_count(&self, phase: Option<u32>) -> Result<u32, StoreError> {
        let (conn, schema) = self.connect()?;
        count_features(&conn, schema.phase_filter(phase), false)
    }

    pub fn try_passing_feature_count(&self, phase: Option<u32>) -> Result<u32, StoreError> {
        let (conn, schema) = self.connect()?;
        count_features(&conn, schema.phase_filter(phase), true)
    }

    /// Passing and total counts read over a single connection.
    pub fn try_snapshot(&self, phase: Option<u32>) -> Result<ProgressSnapshot, StoreError> {
        let (conn, schema) = self.connect()?;
        let filter = schema.phase_filter(phase);
        let total = count_features(&conn, filter, false)?;
        let passing = count_features(&conn, filter, true)?;
        Ok(ProgressSnapshot::new(passing, total))
    }

    pub fn try_passing_features(&self) -> Result<Vec<PassingFeature>, StoreError> {
        let (conn, _) = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT id, COALESCE(category, ''), name FROM features
             WHERE passes = 1 ORDER BY priority ASC, id ASC",
        )?;

        let features = stmt
            .query_map([], |row| {
                let id: i64 = row.get(0)?;
                Ok(PassingFeature {
                    id,
                    category: row.get(1)?,
                    name: row
                        .get::<_, Option<String>>(2)?
                        .unwrap_or_else(|| format!("Feature #{}", id)),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(features)
    }

    pub fn try_has_any_features(&self, phase: u32) -> Result<bool, StoreError> {
        if phase == 1 && self.workspace.legacy_feature_list().exists() {
            return Ok(true);
        }
        Ok(self.try_feature_count(Some(phase))? > 0)
    }
}

/// Fall back to the empty value, logging anything other than a missing database.
fn degrade<T: Default>(query: &str, result: Result<T, StoreError>) -> T {
    match result {
        Ok(value) => value,
        Err(StoreError::Missing) => {
            tracing::debug!("No feature database yet, {} is empty", query);
            T::default()
        }
        Err(e) => {
            tracing::warn!("Feature store error in {}: {}", query, e);
            T::default()
        }
    }
}

impl FeatureSource for FeatureStore {
    fn feature_count(&self, phase: Option<u32>) -> u32 {
        degrade("feature_count", self.try_feature_count(phase))
    }

    fn passing_feature_count(&self, phase: Option<u32>) -> u32 {
        degrade("passing_feature_count", self.try_passing_feature_count(phase))
    }

    fn passing_features(&self) -> Vec<PassingFeature> {
        degrade("passing_features", self.try_passing_features())
    }

    fn has_any_features(&self, phase: u32) -> bool {
        degrade("has_any_features", self.try_has_any_features(phase))
    }

    fn snapshot(&self, phase: Option<u32>) -> ProgressSnapshot {
        degrade("snapshot", self.try_snapshot(phase))
    }
}
