#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Correlates a grading-sheet name with a roster entry.
//!
//! Three tiers are tried in order and the first tier that produces a
//! candidate wins, even if a later tier would pick a different entry:
//!
//! 1. [`exact_tier`]: normalized names are equal.
//! 2. [`partial_tier`]: one normalized name contains the other.
//! 3. [`component_tier`]: enough whole name parts are shared.
//!
//! Every tier sees names that have been trimmed, lowercased, and had runs of
//! whitespace collapsed to a single space.

use std::{collections::HashSet, fmt::Display};

use itertools::Itertools;
use serde::Serialize;

use super::record::RosterEntry;

/// Which tier produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatchTier {
    /// Full-name equality.
    Exact,
    /// Substring containment in either direction.
    Partial,
    /// Overlap of whole name components.
    ReversePartial,
    /// Nothing matched.
    None,
}

impl Display for MatchTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact => write!(f, "exact"),
            Self::Partial => write!(f, "partial"),
            Self::ReversePartial => write!(f, "reverse-partial"),
            Self::None => write!(f, "none"),
        }
    }
}

/// Outcome of matching one name against the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    /// Tier that produced the match.
    pub tier:        MatchTier,
    /// Matched address, if any.
    pub email:       Option<String>,
    /// Roster name that was matched, if any.
    pub roster_name: Option<String>,
}

impl MatchResult {
    /// A result for a name nothing matched.
    pub fn none() -> Self {
        Self {
            tier:        MatchTier::None,
            email:       None,
            roster_name: None,
        }
    }
}

/// A roster entry proposed by a tier. Higher scores are better.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    /// Position of the entry in the roster.
    pub index: usize,
    /// Tier-specific score.
    pub score: i64,
}

/// A pure tier evaluator over a normalized name and normalized roster names.
pub type TierEvaluator = fn(&str, &[String]) -> Option<Candidate>;

/// Tiers in precedence order.
pub const TIERS: [(MatchTier, TierEvaluator); 3] = [
    (MatchTier::Exact, exact_tier),
    (MatchTier::Partial, partial_tier),
    (MatchTier::ReversePartial, component_tier),
];

/// Lowercases, trims, and collapses internal whitespace.
pub fn normalize(name: &str) -> String {
    name.split_whitespace().join(" ").to_lowercase()
}

/// Keeps the highest-scoring candidate; on a tie the earlier roster entry
/// stays.
fn best(candidates: impl Iterator<Item = Candidate>) -> Option<Candidate> {
    candidates.fold(None, |best, c| match best {
        Some(b) if b.score >= c.score => Some(b),
        _ => Some(c),
    })
}

/// Full-string equality. The first equal entry in roster order wins.
pub fn exact_tier(name: &str, roster: &[String]) -> Option<Candidate> {
    roster
        .iter()
        .position(|r| r == name)
        .map(|index| Candidate { index, score: 0 })
}

/// Either name is a contiguous substring of the other. The candidate whose
/// length is closest to `name` wins.
pub fn partial_tier(name: &str, roster: &[String]) -> Option<Candidate> {
    let len = name.chars().count() as i64;
    best(
        roster
            .iter()
            .enumerate()
            .filter(|(_, r)| !r.is_empty() && (r.contains(name) || name.contains(r.as_str())))
            .map(|(index, r)| Candidate {
                index,
                score: -(r.chars().count() as i64 - len).abs(),
            }),
    )
}

/// Counts distinct components of `name` that appear as whole components of
/// each roster name. Two shared components qualify; a single-component name
/// qualifies with one. The largest overlap wins.
pub fn component_tier(name: &str, roster: &[String]) -> Option<Candidate> {
    let needed = if name.split(' ').count() < 2 { 1 } else { 2 };
    let parts: HashSet<&str> = name.split(' ').collect();

    best(roster.iter().enumerate().filter_map(|(index, r)| {
        let roster_parts: HashSet<&str> = r.split(' ').collect();
        let overlap = parts.intersection(&roster_parts).count();
        (overlap >= needed).then_some(Candidate {
            index,
            score: overlap as i64,
        })
    }))
}

/// Finds the roster address for a grading-sheet name.
///
/// Deterministic for a given roster order. A name that is blank after
/// normalization never matches, and roster entries with a blank address are
/// never candidates.
pub fn match_name(grading_name: &str, roster: &[RosterEntry]) -> MatchResult {
    let name = normalize(grading_name);
    if name.is_empty() {
        return MatchResult::none();
    }

    let reachable: Vec<&RosterEntry> = roster
        .iter()
        .filter(|r| !r.email.trim().is_empty())
        .collect();
    let normalized: Vec<String> = reachable.iter().map(|r| normalize(&r.name)).collect();

    for (tier, evaluate) in TIERS {
        if let Some(candidate) = evaluate(&name, &normalized) {
            let entry = reachable[candidate.index];
            tracing::debug!("Matched `{}` to `{}` ({tier})", grading_name, entry.name);
            return MatchResult {
                tier,
                email: Some(entry.email.trim().to_string()),
                roster_name: Some(entry.name.clone()),
            };
        }
    }

    MatchResult::none()
}
