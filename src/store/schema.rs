use rusqlite::Connection;

use super::StoreError;

/// Columns of the `features` table that vary between store versions.
///
/// Detected once per connection so query construction branches in one place
/// instead of at every call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreSchema {
    pub has_phase: bool,
}

/// How a phase argument translates into a `WHERE` clause for a given schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseFilter {
    /// Every row matches.
    All,
    /// Rows whose phase equals the value; a NULL phase counts as phase 1.
    Phase(u32),
    /// No row can match (phase > 1 on a store without a phase column).
    Nothing,
}

impl StoreSchema {
    pub fn detect(conn: &Connection) -> Result<Self, StoreError> {
        let mut stmt = conn.prepare("PRAGMA table_info(features)")?;
        let mut rows = stmt.query([])?;

        let mut seen_any = false;
        let mut has_phase = false;
        while let Some(row) = rows.next()? {
            seen_any = true;
            let name: String = row.get(1)?;
            if name == "phase" {
                has_phase = true;
            }
        }

        if !seen_any {
            return Err(StoreError::MissingTable);
        }

        Ok(Self { has_phase })
    }

    pub fn phase_filter(&self, phase: Option<u32>) -> PhaseFilter {
        match (phase, self.has_phase) {
            (None, _) => PhaseFilter::All,
            (Some(p), true) => PhaseFilter::Phase(p),
            (Some(1), false) => PhaseFilter::All,
            (Some(_), false) => PhaseFilter::Nothing,
        }
    }
}

/// Count rows matching `filter`, optionally restricted to passing rows.
pub fn count_features(
    conn: &Connection,
    filter: PhaseFilter,
    passing_only: bool,
) -> Result<u32, StoreError> {
    let passes = if passing_only { " AND passes = 1" } else { "" };

    let count: u32 = match filter {
        PhaseFilter::Nothing => return Ok(0),
        PhaseFilter::All => conn.query_row(
            &format!("SELECT COUNT(*) FROM features WHERE 1 = 1{}", passes),
            [],
            |row| row.get(0),
        )?,
        PhaseFilter::Phase(phase) => conn.query_row(
            &format!(
                "SELECT COUNT(*) FROM features WHERE COALESCE(phase, 1) = ?{}",
                passes
            ),
            [phase],
            |row| row.get(0),
        )?,
    };

    Ok(count)
}
