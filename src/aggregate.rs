use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::ingest::DutyTable;
use crate::matcher::MatchCache;
use crate::models::{
    AggregateTotal, DutyOwner, DutyRecord, LongDutyRow, MatchResult, MatchStrategy,
};
use crate::roster::Roster;

pub const UNASSIGNED_DEPARTMENT: &str = "Unassigned";

/// Duty records and match metadata for one file tagged with a semester.
#[derive(Debug, Clone, Serialize)]
pub struct FileAggregation {
    pub source: String,
    pub semester: String,
    pub records: Vec<DutyRecord>,
    /// One result per distinct raw name, in first-seen order.
    pub matches: Vec<MatchResult>,
}

impl FileAggregation {
    pub fn long_form(&self) -> Vec<LongDutyRow> {
        let by_raw: HashMap<&str, &MatchResult> = self
            .matches
            .iter()
            .map(|m| (m.raw_name.as_str(), m))
            .collect();

        self.records
            .iter()
            .map(|record| {
                let matched = by_raw.get(record.raw_name.as_str());
                LongDutyRow {
                    semester: record.semester.clone(),
                    raw_name: record.raw_name.clone(),
                    matched_name: matched.and_then(|m| m.canonical_name.clone()),
                    confidence: matched.map(|m| m.confidence).unwrap_or(0.0),
                    strategy: matched.map(|m| m.strategy).unwrap_or(MatchStrategy::NoMatch),
                    session: record.session.clone(),
                    department: record.department.clone(),
                    duty_count: record.count(),
                }
            })
            .collect()
    }

    pub fn unmatched_duty(&self) -> u64 {
        self.records
            .iter()
            .filter(|r| matches!(r.owner, DutyOwner::Unmatched(_)))
            .map(DutyRecord::count)
            .sum()
    }
}

/// Turn one file's rows into duty records, matching each distinct raw name
/// once.
pub fn aggregate(
    table: &DutyTable,
    roster: &Roster,
    semester: &str,
    cutoff: f64,
    source: &str,
) -> FileAggregation {
    let mut cache = MatchCache::new(roster, cutoff);
    let mut records = Vec::new();

    for row in &table.rows {
        let owner = match &cache.resolve(&row.raw_name).canonical_name {
            Some(name) => DutyOwner::Canonical(name.clone()),
            None => DutyOwner::Unmatched(row.raw_name.clone()),
        };

        let department = match &owner {
            DutyOwner::Canonical(name) => roster
                .department_of(name)
                .map(str::to_string)
                .or_else(|| row.department.clone()),
            DutyOwner::Unmatched(_) => row.department.clone(),
        };

        for (session, cell) in &row.duty_marks {
            if table.mode.is_duty(cell) {
                records.push(DutyRecord::new(
                    owner.clone(),
                    row.raw_name.clone(),
                    semester,
                    session.clone(),
                    department.clone(),
                ));
            }
        }
    }

    FileAggregation {
        source: source.to_string(),
        semester: semester.to_string(),
        records,
        matches: cache.into_results(),
    }
}

/// Faculty x semester totals; semesters in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DutyMatrix {
    pub semesters: Vec<String>,
    pub rows: Vec<MatrixRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatrixRow {
    pub name: String,
    pub per_semester: Vec<u64>,
    pub total: u64,
}

impl DutyMatrix {
    pub fn get(&self, name: &str, semester: &str) -> Option<u64> {
        let col = self.semesters.iter().position(|s| s == semester)?;
        self.rows
            .iter()
            .find(|row| row.name == name)
            .map(|row| row.per_semester[col])
    }

    /// Column of totals for one semester, roster-complete.
    pub fn semester_totals(&self, semester: &str) -> Option<Vec<(String, u64)>> {
        let col = self.semesters.iter().position(|s| s == semester)?;
        Some(
            self.rows
                .iter()
                .map(|row| (row.name.clone(), row.per_semester[col]))
                .collect(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupTotal {
    pub semester: String,
    pub key: String,
    pub total_duty: u64,
}

/// Cross-file totals. Every roster member appears, zero or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CombinedTotals {
    pub totals: Vec<AggregateTotal>,
    pub per_semester: Vec<AggregateTotal>,
    pub matrix: DutyMatrix,
    /// Raw names that never matched, with their duty counts.
    pub unmatched: Vec<AggregateTotal>,
}

impl CombinedTotals {
    pub fn total_for(&self, name: &str) -> Option<u64> {
        self.totals
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.total_duty)
    }

    pub fn name_totals(&self) -> Vec<(String, u64)> {
        self.totals
            .iter()
            .map(|t| (t.name.clone(), t.total_duty))
            .collect()
    }

    pub fn matched_duty(&self) -> u64 {
        self.totals.iter().map(|t| t.total_duty).sum()
    }

    pub fn unmatched_duty(&self) -> u64 {
        self.unmatched.iter().map(|t| t.total_duty).sum()
    }
}

/// Left-join the roster against summed records, keeping the semester
/// dimension in the matrix and the per-semester list.
pub fn combine(files: &[FileAggregation], roster: &Roster) -> CombinedTotals {
    let mut semesters: Vec<String> = Vec::new();
    for file in files {
        if !semesters.contains(&file.semester) {
            semesters.push(file.semester.clone());
        }
    }

    let mut counts: HashMap<(&str, &str), u64> = HashMap::new();
    let mut unmatched: BTreeMap<String, u64> = BTreeMap::new();
    for record in files.iter().flat_map(|f| f.records.iter()) {
        match &record.owner {
            DutyOwner::Canonical(name) => {
                *counts
                    .entry((name.as_str(), record.semester.as_str()))
                    .or_insert(0) += record.count();
            }
            DutyOwner::Unmatched(raw) => {
                *unmatched.entry(raw.clone()).or_insert(0) += record.count();
            }
        }
    }

    let mut rows = Vec::with_capacity(roster.len());
    let mut per_semester = Vec::with_capacity(roster.len() * semesters.len());
    for name in roster.names() {
        let per: Vec<u64> = semesters
            .iter()
            .map(|semester| {
                counts
                    .get(&(name, semester.as_str()))
                    .copied()
                    .unwrap_or(0)
            })
            .collect();
        for (semester, total) in semesters.iter().zip(per.iter()) {
            per_semester.push(AggregateTotal {
                name: name.to_string(),
                semester: Some(semester.clone()),
                total_duty: *total,
            });
        }
        rows.push(MatrixRow {
            name: name.to_string(),
            total: per.iter().sum(),
            per_semester: per,
        });
    }

    let totals = rows
        .iter()
        .map(|row| AggregateTotal {
            name: row.name.clone(),
            semester: None,
            total_duty: row.total,
        })
        .collect();

    CombinedTotals {
        totals,
        per_semester,
        matrix: DutyMatrix { semesters, rows },
        unmatched: unmatched
            .into_iter()
            .map(|(name, total_duty)| AggregateTotal {
                name,
                semester: None,
                total_duty,
            })
            .collect(),
    }
}

/// Duty per (semester, department).
pub fn department_totals(files: &[FileAggregation]) -> Vec<GroupTotal> {
    group_totals(files, |record| {
        record
            .department
            .clone()
            .unwrap_or_else(|| UNASSIGNED_DEPARTMENT.to_string())
    })
}

/// Duty per (semester, session).
pub fn session_totals(files: &[FileAggregation]) -> Vec<GroupTotal> {
    group_totals(files, |record| record.session.clone())
}

fn group_totals<F>(files: &[FileAggregation], key: F) -> Vec<GroupTotal>
where
    F: Fn(&DutyRecord) -> String,
{
    // first-seen order for both semester and key
    let mut order: Vec<(String, String)> = Vec::new();
    let mut sums: HashMap<(String, String), u64> = HashMap::new();
    for record in files.iter().flat_map(|f| f.records.iter()) {
        let group = (record.semester.clone(), key(record));
        let entry = sums.entry(group.clone()).or_insert_with(|| {
            order.push(group);
            0
        });
        *entry += record.count();
    }

    order
        .into_iter()
        .map(|(semester, key)| {
            let total_duty = sums.get(&(semester.clone(), key.clone())).copied().unwrap_or(0);
            GroupTotal {
                semester,
                key,
                total_duty,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::{build_duty_table, ColumnCandidates, DutyMode, TabularFile};
    use crate::matcher::DEFAULT_CUTOFF;
    use crate::models::CanonicalFaculty;

    fn file(header: &[&str], rows: &[&[&str]], mode: DutyMode) -> DutyTable {
        let raw = TabularFile {
            header: header.iter().map(|s| s.to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|s| s.to_string()).collect())
                .collect(),
        };
        build_duty_table(&raw, &ColumnCandidates::default(), mode).unwrap()
    }

    fn roster_ab() -> Roster {
        Roster::from_names(["Dr. A", "Dr. B"]).unwrap()
    }

    #[test]
    fn matched_rows_produce_one_record_per_duty_cell() {
        let roster = roster_ab();
        let table = file(
            &["name", "Day1", "Day2"],
            &[&["dr a", "✓", ""], &["Dr. B", "", "✓"]],
            DutyMode::MarkPresence,
        );
        let agg = aggregate(&table, &roster, "S1", DEFAULT_CUTOFF, "s1.csv");
        assert_eq!(agg.records.len(), 2);
        assert!(agg.records.iter().all(|r| r.count() == 1));
        assert_eq!(agg.records[0].owner, DutyOwner::Canonical("Dr. A".into()));
        assert_eq!(agg.records[0].session, "Day1");
        assert_eq!(agg.matches[0].strategy, MatchStrategy::ExactNormalized);
        assert_eq!(agg.matches[1].strategy, MatchStrategy::ExactRaw);

        let combined = combine(&[agg], &roster);
        assert_eq!(combined.total_for("Dr. A"), Some(1));
        assert_eq!(combined.total_for("Dr. B"), Some(1));
    }

    #[test]
    fn absent_roster_members_get_zero() {
        let roster = roster_ab();
        let table = file(
            &["Name", "Day1", "Day2"],
            &[&["dr a", "✓", ""]],
            DutyMode::MarkPresence,
        );
        let combined = combine(&[aggregate(&table, &roster, "S1", DEFAULT_CUTOFF, "s1")], &roster);
        assert_eq!(combined.totals.len(), 2);
        assert_eq!(combined.total_for("Dr. B"), Some(0));
        assert_eq!(combined.totals[0].name, "Dr. A");
        assert_eq!(combined.totals[1].name, "Dr. B");
    }

    #[test]
    fn repeated_names_are_matched_once() {
        let roster = roster_ab();
        let table = file(
            &["Name", "Day1"],
            &[&["dr a", "✓"], &["dr a", "✓"], &["Dr. B", ""]],
            DutyMode::MarkPresence,
        );
        let agg = aggregate(&table, &roster, "S1", DEFAULT_CUTOFF, "s1");
        assert_eq!(agg.matches.len(), 2);
        assert_eq!(agg.records.len(), 2);
    }

    #[test]
    fn unmatched_duty_is_kept_in_its_own_bucket() {
        let roster = roster_ab();
        let table = file(
            &["Name", "Day1", "Day2"],
            &[&["Zed Quux", "1", "1"], &["Dr. A", "1", ""], &["", "1", ""]],
            DutyMode::LiteralOne,
        );
        let agg = aggregate(&table, &roster, "S1", DEFAULT_CUTOFF, "s1");
        assert_eq!(agg.unmatched_duty(), 3);
        let combined = combine(&[agg.clone()], &roster);
        assert_eq!(combined.matched_duty(), 1);
        assert_eq!(combined.unmatched_duty(), 3);
        assert_eq!(combined.matched_duty() + combined.unmatched_duty(), table.duty_cells() as u64);
        assert_eq!(combined.unmatched.len(), 2);
        assert_eq!(combined.unmatched[0].name, "");
        assert_eq!(combined.unmatched[1].name, "Zed Quux");
        assert_eq!(combined.unmatched[1].total_duty, 2);

        let long = agg.long_form();
        assert_eq!(long.len(), 4);
        assert_eq!(long[0].strategy, MatchStrategy::NoMatch);
        assert_eq!(long[0].matched_name, None);
        assert_eq!(long[3].strategy, MatchStrategy::Empty);
    }

    #[test]
    fn semesters_stay_separate_in_matrix() {
        let roster = roster_ab();
        let mid = file(&["Name", "D1", "D2"], &[&["Dr. A", "1", "1"]], DutyMode::LiteralOne);
        let end = file(
            &["Name", "D1", "D2", "D3"],
            &[&["Dr. A", "1", "1", "1"]],
            DutyMode::LiteralOne,
        );
        let files = vec![
            aggregate(&mid, &roster, "Mid", DEFAULT_CUTOFF, "mid"),
            aggregate(&end, &roster, "End", DEFAULT_CUTOFF, "end"),
        ];
        let combined = combine(&files, &roster);
        assert_eq!(combined.total_for("Dr. A"), Some(5));
        assert_eq!(combined.matrix.semesters, vec!["Mid", "End"]);
        assert_eq!(combined.matrix.get("Dr. A", "Mid"), Some(2));
        assert_eq!(combined.matrix.get("Dr. A", "End"), Some(3));
        assert_eq!(combined.matrix.get("Dr. B", "End"), Some(0));
        assert_eq!(combined.per_semester.len(), 4);
        assert_eq!(
            combined.matrix.semester_totals("Mid"),
            Some(vec![("Dr. A".to_string(), 2), ("Dr. B".to_string(), 0)])
        );
    }

    #[test]
    fn department_prefers_roster_then_row() {
        let roster = Roster::new(vec![
            CanonicalFaculty::with_department("Dr. A", "Physics"),
            CanonicalFaculty::new("Dr. B"),
        ])
        .unwrap();
        let table = file(
            &["Name", "Dept", "Day1", "Day2"],
            &[
                &["Dr. A", "Chemistry", "✓", "✓"],
                &["Dr. B", "Maths", "✓", ""],
                &["Unknown Person", "", "✓", ""],
            ],
            DutyMode::MarkPresence,
        );
        let files = vec![aggregate(&table, &roster, "S1", DEFAULT_CUTOFF, "s1")];
        let depts = department_totals(&files);
        assert_eq!(
            depts,
            vec![
                GroupTotal {
                    semester: "S1".into(),
                    key: "Physics".into(),
                    total_duty: 2
                },
                GroupTotal {
                    semester: "S1".into(),
                    key: "Maths".into(),
                    total_duty: 1
                },
                GroupTotal {
                    semester: "S1".into(),
                    key: UNASSIGNED_DEPARTMENT.into(),
                    total_duty: 1
                },
            ]
        );

        let sessions = session_totals(&files);
        assert_eq!(sessions[0].key, "Day1");
        assert_eq!(sessions[0].total_duty, 3);
        assert_eq!(sessions[1].total_duty, 1);
    }
}
