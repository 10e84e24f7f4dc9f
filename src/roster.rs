use std::collections::HashMap;

use tracing::warn;

use crate::error::DutyError;
use crate::models::CanonicalFaculty;
use crate::normalize::normalize;

/// Canonical roster with its lookup tables, built once and shared by
/// reference with every match call.
#[derive(Debug, Clone)]
pub struct Roster {
    entries: Vec<CanonicalFaculty>,
    lowered: Vec<String>,
    normalized: Vec<String>,
    /// normalized form -> roster indices, in roster order
    by_normalized: HashMap<String, Vec<usize>>,
}

impl Roster {
    /// Rejects blank names and exact duplicates; normalized collisions are
    /// allowed but logged.
    pub fn new(mut entries: Vec<CanonicalFaculty>) -> Result<Self, DutyError> {
        for entry in entries.iter_mut() {
            entry.name = entry.name.trim().to_string();
            if entry.name.is_empty() {
                return Err(DutyError::Config("roster contains a blank name".into()));
            }
        }

        let mut seen: HashMap<&str, usize> = HashMap::new();
        for (idx, entry) in entries.iter().enumerate() {
            if seen.insert(entry.name.as_str(), idx).is_some() {
                return Err(DutyError::Config(format!(
                    "duplicate roster name '{}'",
                    entry.name
                )));
            }
        }

        let lowered = entries.iter().map(|e| e.name.to_lowercase()).collect();
        let normalized: Vec<String> = entries.iter().map(|e| normalize(&e.name)).collect();
        let mut by_normalized: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, norm) in normalized.iter().enumerate() {
            by_normalized.entry(norm.clone()).or_default().push(idx);
        }

        let roster = Self {
            entries,
            lowered,
            normalized,
            by_normalized,
        };
        for group in roster.collisions() {
            warn!(
                names = ?group,
                "roster entries share a normalized form; the first one wins"
            );
        }
        Ok(roster)
    }

    pub fn from_names<I, S>(names: I) -> Result<Self, DutyError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(names.into_iter().map(CanonicalFaculty::new).collect())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[CanonicalFaculty] {
        &self.entries
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn get(&self, idx: usize) -> &CanonicalFaculty {
        &self.entries[idx]
    }

    pub fn lowered(&self, idx: usize) -> &str {
        &self.lowered[idx]
    }

    pub fn normalized(&self, idx: usize) -> &str {
        &self.normalized[idx]
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name)
    }

    pub fn department_of(&self, name: &str) -> Option<&str> {
        self.position(name)
            .and_then(|idx| self.entries[idx].department.as_deref())
    }

    /// Roster indices whose normalized form equals `normalized`.
    pub fn lookup_normalized(&self, normalized: &str) -> &[usize] {
        self.by_normalized
            .get(normalized)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Groups of names that normalize identically, in roster order.
    pub fn collisions(&self) -> Vec<Vec<String>> {
        let mut groups: Vec<&Vec<usize>> = self
            .by_normalized
            .values()
            .filter(|indices| indices.len() > 1)
            .collect();
        groups.sort_by_key(|indices| indices[0]);
        groups
            .into_iter()
            .map(|indices| {
                indices
                    .iter()
                    .map(|&idx| self.entries[idx].name.clone())
                    .collect()
            })
            .collect()
    }
}
