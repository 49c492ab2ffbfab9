//! Name-based correlation between snapshot geometries and live geometries.
//!
//! Exchange-file round trips keep geometry names mostly intact but may add
//! suffixes (`Wall` becomes `Wall_1`) or drop them. The score prefers exact
//! matches, then the longest contained name.

use std::collections::HashMap;

use tracing::debug;

/// Score of an exact name match.
pub const EXACT_SCORE: usize = 100;
const SNAPSHOT_IN_LIVE_BASE: usize = 50;
const LIVE_IN_SNAPSHOT_BASE: usize = 30;

/// Outcome of choosing the best-scoring candidate name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Correlation {
    /// Position of the winning candidate in the candidate list.
    pub index: usize,
    pub score: usize,
}

/// Similarity of a snapshot name to a live name.
///
/// `100` for equal names, `50 + len(snapshot)` when the snapshot name is
/// contained in the live name, `30 + len(live)` when the live name is
/// contained in the snapshot name, `0` otherwise. Lengths are in bytes.
pub fn name_score(snapshot_name: &str, live_name: &str) -> usize {
    if snapshot_name == live_name {
        EXACT_SCORE
    } else if live_name.contains(snapshot_name) {
        SNAPSHOT_IN_LIVE_BASE + snapshot_name.len()
    } else if snapshot_name.contains(live_name) {
        LIVE_IN_SNAPSHOT_BASE + live_name.len()
    } else {
        0
    }
}

fn best_by<S, F>(candidates: &[S], score: F) -> Option<Correlation>
where
    S: AsRef<str>,
    F: Fn(&str) -> usize,
{
    let mut best: Option<Correlation> = None;
    for (index, candidate) in candidates.iter().enumerate() {
        let s = score(candidate.as_ref());
        debug!(candidate = candidate.as_ref(), score = s, "name candidate");
        if s > best.map_or(0, |b| b.score) {
            best = Some(Correlation { index, score: s });
        }
    }
    best
}

/// The live geometry that best corresponds to a snapshot geometry name.
/// Ties go to the earliest candidate; `None` when every score is zero.
pub fn best_live_for_snapshot<S: AsRef<str>>(
    snapshot_name: &str,
    live_names: &[S],
) -> Option<Correlation> {
    best_by(live_names, |live| name_score(snapshot_name, live))
}

/// The snapshot geometry that best corresponds to a live geometry name.
/// Ties go to the earliest candidate; `None` when every score is zero.
pub fn best_snapshot_for_live<S: AsRef<str>>(
    live_name: &str,
    snapshot_names: &[S],
) -> Option<Correlation> {
    best_by(snapshot_names, |snapshot| name_score(snapshot, live_name))
}

/// Names that occur more than once, each reported once in first-seen order.
pub fn duplicate_names<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for name in names {
        *counts.entry(name.as_ref()).or_default() += 1;
    }
    let mut out: Vec<String> = Vec::new();
    for name in names {
        let name = name.as_ref();
        if counts[name] > 1 && !out.iter().any(|n| n == name) {
            out.push(name.to_string());
        }
    }
    out
}

/// Pairs of distinct names where one contains the other, shorter first.
///
/// Such pairs can be confused by `name_score` after a round trip. Each
/// unordered pair is reported once.
pub fn name_conflicts<S: AsRef<str>>(names: &[S]) -> Vec<(String, String)> {
    let mut distinct: Vec<&str> = Vec::new();
    for name in names {
        if !distinct.contains(&name.as_ref()) {
            distinct.push(name.as_ref());
        }
    }

    let mut conflicts = Vec::new();
    for (i, a) in distinct.iter().enumerate() {
        for b in &distinct[i + 1..] {
            if a.contains(b) || b.contains(a) {
                let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
                conflicts.push((short.to_string(), long.to_string()));
            }
        }
    }
    conflicts
}
