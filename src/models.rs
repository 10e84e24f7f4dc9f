use serde::Serialize;

/// Opaque column label for one exam date/session, e.g. `"06/12/2025 M"`.
pub type SessionKey = String;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalFaculty {
    pub name: String,
    pub department: Option<String>,
}

impl CanonicalFaculty {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            department: None,
        }
    }

    pub fn with_department(name: impl Into<String>, department: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            department: Some(department.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawDutyRow {
    pub raw_name: String,
    pub department: Option<String>,
    /// Cells in column order; the values are kept exactly as read.
    pub duty_marks: Vec<(SessionKey, String)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MatchStrategy {
    ExactRaw,
    ExactNormalized,
    Fuzzy,
    UniqueSurname,
    NoMatch,
    Empty,
}

impl MatchStrategy {
    pub fn label(&self) -> &'static str {
        match self {
            MatchStrategy::ExactRaw => "exact",
            MatchStrategy::ExactNormalized => "exact-normalized",
            MatchStrategy::Fuzzy => "fuzzy",
            MatchStrategy::UniqueSurname => "unique-surname",
            MatchStrategy::NoMatch => "no-match",
            MatchStrategy::Empty => "empty",
        }
    }

    /// Whether a human should look at this attribution before trusting it.
    pub fn needs_review(&self) -> bool {
        !matches!(self, MatchStrategy::ExactRaw | MatchStrategy::ExactNormalized)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub raw_name: String,
    pub canonical_name: Option<String>,
    pub confidence: f64,
    pub strategy: MatchStrategy,
    /// Set when the normalized form of the winning entry is shared by more
    /// than one roster entry and the first one was taken.
    pub ambiguous: bool,
}

impl MatchResult {
    pub fn unresolved(raw_name: &str, strategy: MatchStrategy) -> Self {
        Self {
            raw_name: raw_name.to_string(),
            canonical_name: None,
            confidence: 0.0,
            strategy,
            ambiguous: false,
        }
    }

    pub fn is_matched(&self) -> bool {
        self.canonical_name.is_some()
    }
}

/// Who a duty is attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum DutyOwner {
    Canonical(String),
    Unmatched(String),
}

impl DutyOwner {
    pub fn name(&self) -> &str {
        match self {
            DutyOwner::Canonical(name) | DutyOwner::Unmatched(name) => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DutyRecord {
    pub owner: DutyOwner,
    pub raw_name: String,
    pub semester: String,
    pub session: SessionKey,
    pub department: Option<String>,
    count: u64,
}

impl DutyRecord {
    pub fn new(
        owner: DutyOwner,
        raw_name: impl Into<String>,
        semester: impl Into<String>,
        session: impl Into<SessionKey>,
        department: Option<String>,
    ) -> Self {
        Self {
            owner,
            raw_name: raw_name.into(),
            semester: semester.into(),
            session: session.into(),
            department,
            count: 1,
        }
    }

    /// Always 1: duties are binary.
    pub fn count(&self) -> u64 {
        self.count
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateTotal {
    pub name: String,
    pub semester: Option<String>,
    pub total_duty: u64,
}

/// One long-form output row: a duty record joined with its match metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LongDutyRow {
    pub semester: String,
    pub raw_name: String,
    pub matched_name: Option<String>,
    pub confidence: f64,
    pub strategy: MatchStrategy,
    pub session: SessionKey,
    pub department: Option<String>,
    pub duty_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Extreme {
    pub value: u64,
    pub names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FairnessReport {
    pub zero_duty: Vec<String>,
    /// `None` when nobody has a duty.
    pub min_non_zero: Option<Extreme>,
    /// `None` only for an empty roster.
    pub max: Option<Extreme>,
    pub mean: f64,
    pub std_dev: f64,
    pub faculty_count: usize,
    pub assigned_count: usize,
}

impl FairnessReport {
    pub fn pct_assigned(&self) -> f64 {
        if self.faculty_count == 0 {
            0.0
        } else {
            self.assigned_count as f64 / self.faculty_count as f64 * 100.0
        }
    }

    pub fn pct_no_duty(&self) -> f64 {
        if self.faculty_count == 0 {
            0.0
        } else {
            self.zero_duty.len() as f64 / self.faculty_count as f64 * 100.0
        }
    }
}
