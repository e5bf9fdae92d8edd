use std::path::{Path, PathBuf};

/// SQLite feature store written by the build agents.
pub const FEATURES_DB: &str = "features.db";
/// Legacy single-file feature manifest, phase 1 only.
pub const LEGACY_FEATURE_LIST: &str = "feature_list.json";
/// Last observed passing count and ids, used for change detection.
pub const PROGRESS_CACHE: &str = ".progress_cache";

/// A project directory and the well-known files inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn features_db(&self) -> PathBuf {
        self.root.join(FEATURES_DB)
    }

    pub fn legacy_feature_list(&self) -> PathBuf {
        self.root.join(LEGACY_FEATURE_LIST)
    }

    pub fn progress_cache(&self) -> PathBuf {
        self.root.join(PROGRESS_CACHE)
    }

    /// Project name reported in notifications: the directory's last component.
    pub fn project_name(&self) -> String {
        match self.root.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => self.root.display().to_string(),
        }
    }
}
