//! Shot table diffing keyed by VFX code.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::correlate::ShotRecord;
use crate::error::{Error, Result};
use crate::table::{ShotTable, COL_VFX_CODE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiffStatus {
    New,
    Deleted,
    Changed,
    Unmodified,
}

impl fmt::Display for DiffStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::New => "NEW",
            Self::Deleted => "DELETED",
            Self::Changed => "CHANGED",
            Self::Unmodified => "UNMODIFIED",
        };
        f.write_str(label)
    }
}

/// One column whose value differs between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange {
    pub field: String,
    pub old: String,
    pub new: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffEntry {
    pub vfx_code: String,
    pub status: DiffStatus,
    /// Differing columns; empty unless `status` is `Changed`.
    pub changes: Vec<FieldChange>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSummary {
    pub new: usize,
    pub deleted: usize,
    pub changed: usize,
    pub unmodified: usize,
}

impl DiffSummary {
    fn record(&mut self, status: DiffStatus) {
        match status {
            DiffStatus::New => self.new += 1,
            DiffStatus::Deleted => self.deleted += 1,
            DiffStatus::Changed => self.changed += 1,
            DiffStatus::Unmodified => self.unmodified += 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffReport {
    /// Current rows in order, then deleted rows in previous-table order.
    pub entries: Vec<DiffEntry>,
    pub summary: DiffSummary,
}

impl DiffReport {
    pub fn entry(&self, vfx_code: &str) -> Option<&DiffEntry> {
        self.entries.iter().find(|e| e.vfx_code == vfx_code)
    }

    pub fn has_changes(&self) -> bool {
        self.summary.new + self.summary.deleted + self.summary.changed > 0
    }
}

/// Diff two sets of shots on `vfx_code`.
pub fn diff_shots(current: &[ShotRecord], previous: &[ShotRecord]) -> DiffReport {
    let current = ShotTable::from_shots(current, true);
    let previous = ShotTable::from_shots(previous, true);
    // from_shots always puts the code first.
    diff_keyed(&current, 0, &previous, 0)
}

/// Diff current shots against a previously exported table.
///
/// Fails if a non-empty `previous` table has no `VFX CODE` column.
pub fn diff_table(current: &[ShotRecord], previous: &ShotTable) -> Result<DiffReport> {
    diff_tables(&ShotTable::from_shots(current, true), previous)
}

/// Diff two tables on their `VFX CODE` column.
///
/// Only columns present in both tables are compared. Values are compared
/// as trimmed text, and numerically when both sides parse as numbers.
pub fn diff_tables(current: &ShotTable, previous: &ShotTable) -> Result<DiffReport> {
    let missing = || Error::MissingColumn {
        column: COL_VFX_CODE.to_string(),
    };
    let current_key = match current.column_index(COL_VFX_CODE) {
        Some(idx) => idx,
        None if current.is_empty() => return diff_empty_current(previous),
        None => return Err(missing()),
    };
    let previous_key = match previous.column_index(COL_VFX_CODE) {
        Some(idx) => idx,
        None if previous.is_empty() => {
            return Ok(diff_keyed(current, current_key, &ShotTable::default(), 0))
        }
        None => return Err(missing()),
    };
    Ok(diff_keyed(current, current_key, previous, previous_key))
}

fn diff_empty_current(previous: &ShotTable) -> Result<DiffReport> {
    match previous.column_index(COL_VFX_CODE) {
        Some(key) => Ok(diff_keyed(&ShotTable::default(), 0, previous, key)),
        None if previous.is_empty() => Ok(DiffReport::default()),
        None => Err(Error::MissingColumn {
            column: COL_VFX_CODE.to_string(),
        }),
    }
}

fn diff_keyed(
    current: &ShotTable,
    current_key: usize,
    previous: &ShotTable,
    previous_key: usize,
) -> DiffReport {
    // Columns present on both sides, excluding the key: (name, current idx, previous idx).
    let shared: Vec<(&str, usize, usize)> = current
        .headers
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx != current_key)
        .filter_map(|(idx, name)| {
            previous
                .column_index(name.trim())
                .filter(|p| *p != previous_key)
                .map(|p| (name.trim(), idx, p))
        })
        .collect();

    let mut previous_rows: HashMap<&str, usize> = HashMap::new();
    for row in 0..previous.len() {
        let code = previous.cell(row, previous_key).trim();
        if !code.is_empty() {
            previous_rows.entry(code).or_insert(row);
        }
    }

    let mut report = DiffReport::default();
    let mut seen: HashSet<&str> = HashSet::new();

    for row in 0..current.len() {
        let code = current.cell(row, current_key).trim();
        if code.is_empty() || !seen.insert(code) {
            continue;
        }

        let (status, changes) = match previous_rows.get(code) {
            None => (DiffStatus::New, Vec::new()),
            Some(&prev_row) => {
                let changes: Vec<FieldChange> = shared
                    .iter()
                    .filter_map(|&(name, cur_idx, prev_idx)| {
                        let new = current.cell(row, cur_idx);
                        let old = previous.cell(prev_row, prev_idx);
                        (!values_equal(old, new)).then(|| FieldChange {
                            field: name.to_string(),
                            old: old.trim().to_string(),
                            new: new.trim().to_string(),
                        })
                    })
                    .collect();
                if changes.is_empty() {
                    (DiffStatus::Unmodified, changes)
                } else {
                    (DiffStatus::Changed, changes)
                }
            }
        };

        report.summary.record(status);
        report.entries.push(DiffEntry {
            vfx_code: code.to_string(),
            status,
            changes,
        });
    }

    for row in 0..previous.len() {
        let code = previous.cell(row, previous_key).trim();
        if code.is_empty() || !seen.insert(code) {
            continue;
        }
        report.summary.record(DiffStatus::Deleted);
        report.entries.push(DiffEntry {
            vfx_code: code.to_string(),
            status: DiffStatus::Deleted,
            changes: Vec::new(),
        });
    }

    report
}

// `039` vs `39` and `48` vs `48.0` are the same value read back by a
// spreadsheet, not a change.
fn values_equal(old: &str, new: &str) -> bool {
    let (old, new) = (old.trim(), new.trim());
    if old == new {
        return true;
    }
    match (old.parse::<f64>(), new.parse::<f64>()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
