use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("progress cache I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("progress cache is malformed: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Last passing count a check recorded, and which feature ids were passing.
///
/// Caches written before id tracking only carry `count`; those load with an
/// empty `passing_ids`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressCache {
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub passing_ids: Vec<i64>,
}

impl ProgressCache {
    pub fn new(count: u32, passing_ids: Vec<i64>) -> Self {
        Self { count, passing_ids }
    }

    /// A count without ids, written before individual features were tracked.
    pub fn is_legacy_format(&self) -> bool {
        self.passing_ids.is_empty() && self.count > 0
    }

    pub fn id_set(&self) -> HashSet<i64> {
        self.passing_ids.iter().copied().collect()
    }

    /// Read the cache at `path`. `Ok(None)` when no cache has been written yet.
    pub fn load(path: &Path) -> Result<Option<Self>, CacheError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Replace the cache at `path` via a temp file and rename.
    pub fn save(&self, path: &Path) -> Result<(), CacheError> {
        let content = serde_json::to_string(self)?;
        let tmp_path = tmp_path_for(path);

        fs::write(&tmp_path, content)?;
        if let Err(err) = fs::rename(&tmp_path, path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(err.into());
        }
        Ok(())
    }
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
