use std::collections::HashMap;

use tracing::{debug, warn};

use crate::models::{MatchResult, MatchStrategy};
use crate::normalize::normalize;
use crate::roster::Roster;

pub const DEFAULT_CUTOFF: f64 = 0.70;
pub const SURNAME_CONFIDENCE: f64 = 0.7;

/// Symmetric edit similarity in [0, 1]; 1.0 for identical strings.
///
/// Levenshtein penalises initials harder than a longest-common-block ratio:
/// `"k das"` vs `"kanak das"` scores 0.56 and misses the default cutoff.
/// Such names fall through to the surname tier, which only resolves them
/// when the surname is unique; otherwise they land in review as no match.
pub fn string_similarity(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(a, b)
}

/// Resolve a raw name against the roster. First tier that hits wins:
/// empty, exact raw, exact normalized, fuzzy, unique surname, no match.
pub fn match_name(raw: &str, roster: &Roster, cutoff: f64) -> MatchResult {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return MatchResult::unresolved(raw, MatchStrategy::Empty);
    }

    // case-sensitive hit first so entries differing only in case stay distinct
    if let Some(idx) = roster.position(trimmed) {
        return resolved(raw, roster, idx, 1.0, MatchStrategy::ExactRaw);
    }
    let lowered = trimmed.to_lowercase();
    if let Some(idx) = (0..roster.len()).find(|&idx| roster.lowered(idx) == lowered) {
        return resolved(raw, roster, idx, 1.0, MatchStrategy::ExactRaw);
    }

    let norm = normalize(trimmed);
    if norm.is_empty() {
        // nothing but honorifics and dots
        return MatchResult::unresolved(raw, MatchStrategy::NoMatch);
    }

    if let Some(&idx) = roster.lookup_normalized(&norm).first() {
        return resolved(raw, roster, idx, 1.0, MatchStrategy::ExactNormalized);
    }

    if let Some((idx, score)) = best_fuzzy(&norm, roster) {
        if score >= cutoff {
            return resolved(raw, roster, idx, score, MatchStrategy::Fuzzy);
        }
    }

    if let Some(idx) = unique_surname(&norm, roster) {
        return resolved(raw, roster, idx, SURNAME_CONFIDENCE, MatchStrategy::UniqueSurname);
    }

    MatchResult::unresolved(raw, MatchStrategy::NoMatch)
}

fn resolved(
    raw: &str,
    roster: &Roster,
    idx: usize,
    confidence: f64,
    strategy: MatchStrategy,
) -> MatchResult {
    let ambiguous = strategy != MatchStrategy::ExactRaw
        && roster.lookup_normalized(roster.normalized(idx)).len() > 1;
    let canonical = roster.get(idx).name.clone();
    if ambiguous {
        warn!(
            raw_name = raw,
            chosen = %canonical,
            "ambiguous roster entry: several names share this normalized form"
        );
    }
    MatchResult {
        raw_name: raw.to_string(),
        canonical_name: Some(canonical),
        confidence,
        strategy,
        ambiguous,
    }
}

/// Best scoring roster index; ties keep the earliest entry.
fn best_fuzzy(norm: &str, roster: &Roster) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for idx in 0..roster.len() {
        let score = string_similarity(norm, roster.normalized(idx));
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((idx, score)),
        }
    }
    best
}

fn unique_surname(norm: &str, roster: &Roster) -> Option<usize> {
    let surname = norm.split_whitespace().last()?;
    let mut hits = (0..roster.len()).filter(|&idx| roster.normalized(idx).contains(surname));
    let first = hits.next()?;
    if hits.next().is_some() {
        debug!(surname, "surname shared by several roster entries");
        return None;
    }
    Some(first)
}

/// Memoizes match results per distinct raw name for one file.
#[derive(Debug)]
pub struct MatchCache<'a> {
    roster: &'a Roster,
    cutoff: f64,
    results: HashMap<String, usize>,
    ordered: Vec<MatchResult>,
}

impl<'a> MatchCache<'a> {
    pub fn new(roster: &'a Roster, cutoff: f64) -> Self {
        Self {
            roster,
            cutoff,
            results: HashMap::new(),
            ordered: Vec::new(),
        }
    }

    pub fn resolve(&mut self, raw: &str) -> &MatchResult {
        let idx = match self.results.get(raw) {
            Some(&idx) => idx,
            None => {
                let result = match_name(raw, self.roster, self.cutoff);
                if result.strategy == MatchStrategy::NoMatch {
                    warn!(raw_name = raw, "no roster entry matches; counted as unmatched");
                }
                self.ordered.push(result);
                let idx = self.ordered.len() - 1;
                self.results.insert(raw.to_string(), idx);
                idx
            }
        };
        &self.ordered[idx]
    }

    /// Distinct results in first-seen order.
    pub fn into_results(self) -> Vec<MatchResult> {
        self.ordered
    }
}
