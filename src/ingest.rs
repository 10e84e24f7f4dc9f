use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::DutyError;
use crate::models::{RawDutyRow, SessionKey};
use crate::normalize::header_key;

/// How a session cell is read as "duty assigned".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DutyMode {
    /// Any non-blank cell (ticks, text, numbers) is a duty.
    #[default]
    MarkPresence,
    /// Only cells that parse to exactly 1 are duties.
    LiteralOne,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellReading {
    Duty,
    NoDuty,
    /// Not numeric in literal-one mode; read as no duty.
    Unparseable,
}

impl DutyMode {
    pub fn read_cell(&self, cell: &str) -> CellReading {
        let value = cell.trim();
        match self {
            DutyMode::MarkPresence => {
                if value.is_empty() {
                    CellReading::NoDuty
                } else {
                    CellReading::Duty
                }
            }
            DutyMode::LiteralOne => {
                if value.is_empty() {
                    return CellReading::NoDuty;
                }
                match value.parse::<f64>() {
                    Ok(number) if number == 1.0 => CellReading::Duty,
                    Ok(_) => CellReading::NoDuty,
                    Err(_) => CellReading::Unparseable,
                }
            }
        }
    }

    pub fn is_duty(&self, cell: &str) -> bool {
        self.read_cell(cell) == CellReading::Duty
    }

    pub fn label(&self) -> &'static str {
        match self {
            DutyMode::MarkPresence => "mark-presence",
            DutyMode::LiteralOne => "literal-one",
        }
    }
}

/// Header candidates used to pick out identifier columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnCandidates {
    #[serde(default = "default_name_columns")]
    pub name_columns: Vec<String>,
    #[serde(default = "default_department_columns")]
    pub department_columns: Vec<String>,
    #[serde(default = "default_ignored_columns")]
    pub ignored_columns: Vec<String>,
}

fn default_name_columns() -> Vec<String> {
    vec!["Name".into(), "NAME".into()]
}

fn default_department_columns() -> Vec<String> {
    vec!["DEPT".into(), "Dept".into(), "Department".into()]
}

fn default_ignored_columns() -> Vec<String> {
    vec!["Sl No".into(), "Sl_No".into(), "Sl".into(), "SlNo".into()]
}

impl Default for ColumnCandidates {
    fn default() -> Self {
        Self {
            name_columns: default_name_columns(),
            department_columns: default_department_columns(),
            ignored_columns: default_ignored_columns(),
        }
    }
}

/// One file as read from disk: header labels plus raw cell text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabularFile {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

pub fn read_table(path: &Path) -> Result<TabularFile, DutyError> {
    let file = std::fs::File::open(path).map_err(|source| DutyError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_table_from(file)
}

pub fn read_table_from<R: std::io::Read>(reader: R) -> Result<TabularFile, DutyError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);

    let header: Vec<String> = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(idx, label)| {
            if idx == 0 {
                label.trim_start_matches('\u{feff}').to_string()
            } else {
                label.to_string()
            }
        })
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(TabularFile { header, rows })
}

/// Long-form-ready view of one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DutyTable {
    pub name_column: String,
    /// True when no header matched a name candidate and column 0 was used.
    pub name_column_fallback: bool,
    pub department_column: Option<String>,
    pub sessions: Vec<SessionKey>,
    pub mode: DutyMode,
    pub rows: Vec<RawDutyRow>,
    pub unparseable_cells: usize,
}

impl DutyTable {
    /// Count of duty-positive cells across all rows.
    pub fn duty_cells(&self) -> usize {
        self.rows
            .iter()
            .flat_map(|row| row.duty_marks.iter())
            .filter(|(_, cell)| self.mode.is_duty(cell))
            .count()
    }
}

fn cell_at(row: &[String], idx: usize) -> String {
    row.get(idx).cloned().unwrap_or_default()
}

/// First candidate (in configured priority order) present in the header.
fn find_column(header: &[String], candidates: &[String], skip: &[usize]) -> Option<usize> {
    let keys: Vec<String> = header.iter().map(|label| header_key(label)).collect();
    candidates.iter().find_map(|candidate| {
        let wanted = header_key(candidate);
        keys.iter()
            .enumerate()
            .find(|(idx, key)| !skip.contains(idx) && **key == wanted)
            .map(|(idx, _)| idx)
    })
}

/// Split a raw file into name, department and session columns and emit one
/// `RawDutyRow` per input row.
pub fn build_duty_table(
    table: &TabularFile,
    candidates: &ColumnCandidates,
    mode: DutyMode,
) -> Result<DutyTable, DutyError> {
    let header: Vec<String> = table.header.iter().map(|h| h.trim().to_string()).collect();
    if header.is_empty() {
        return Err(DutyError::MissingNameColumn);
    }

    let name_match = find_column(&header, &candidates.name_columns, &[]);
    let (name_idx, name_column_fallback) = match name_match {
        Some(idx) => (idx, false),
        None => {
            warn!(
                column = %header[0],
                "no header matches a name candidate; using the first column as names"
            );
            (0, true)
        }
    };

    let dept_idx = find_column(&header, &candidates.department_columns, &[name_idx]);
    let ignored_keys: Vec<String> = candidates
        .ignored_columns
        .iter()
        .map(|c| header_key(c))
        .collect();

    let session_indices: Vec<usize> = (0..header.len())
        .filter(|&idx| idx != name_idx && Some(idx) != dept_idx)
        .filter(|&idx| !ignored_keys.contains(&header_key(&header[idx])))
        .collect();

    if session_indices.is_empty() {
        return Err(DutyError::MissingDutyColumns {
            name_column: header[name_idx].clone(),
        });
    }

    let sessions: Vec<SessionKey> = session_indices
        .iter()
        .map(|&idx| header[idx].clone())
        .collect();

    let mut unparseable_cells = 0;
    let mut rows = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        let duty_marks: Vec<(SessionKey, String)> = session_indices
            .iter()
            .zip(sessions.iter())
            .map(|(&idx, session)| (session.clone(), cell_at(row, idx)))
            .collect();

        for (session, value) in &duty_marks {
            if mode.read_cell(value) == CellReading::Unparseable {
                debug!(session = %session, value = %value, "unparseable duty cell read as no duty");
                unparseable_cells += 1;
            }
        }

        let department = dept_idx
            .map(|idx| cell_at(row, idx).trim().to_string())
            .filter(|dept| !dept.is_empty());

        rows.push(RawDutyRow {
            raw_name: cell_at(row, name_idx).trim().to_string(),
            department,
            duty_marks,
        });
    }

    Ok(DutyTable {
        name_column: header[name_idx].clone(),
        name_column_fallback,
        department_column: dept_idx.map(|idx| header[idx].clone()),
        sessions,
        mode,
        rows,
        unparseable_cells,
    })
}
