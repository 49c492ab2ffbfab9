use std::fmt;

use host_model::{HostError, InteractionType};
use matching::{Tolerance, DEFAULT_TOLERANCE};
use propsync_types::{PropertyKind, SubshapeKind};
use serde::{Deserialize, Serialize};

/// Settings for one reconciliation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Per-axis coordinate tolerance for every geometric comparison.
    pub tolerance: f64,
    /// Replay every recorded group when a split body matches none of them.
    pub broadcast_on_unresolved: bool,
    /// Rebuild master/slave interactions after the assignments.
    pub replay_interactions: bool,
    /// Flush the host after each geometry instead of once at the end.
    pub commit_per_geometry: bool,
    /// Interaction type used when the recorded one is missing or unknown.
    pub default_interaction_type: InteractionType,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            broadcast_on_unresolved: true,
            replay_interactions: true,
            commit_per_geometry: true,
            default_interaction_type: InteractionType::NodeToNode,
        }
    }
}

impl ReconcileConfig {
    /// No broadcast: records of an unresolved split body are counted as
    /// failed instead of being applied everywhere.
    pub fn strict() -> Self {
        Self {
            broadcast_on_unresolved: false,
            ..Self::default()
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn tolerance(&self) -> Tolerance {
        Tolerance::new(self.tolerance)
    }
}

/// Stage of a run a diagnostic was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Capture,
    Import,
    Materialize,
    Correlate,
    Disambiguate,
    Assign,
    Interactions,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Phase::Capture => "capture",
            Phase::Import => "import",
            Phase::Materialize => "materialize",
            Phase::Correlate => "correlate",
            Phase::Disambiguate => "disambiguate",
            Phase::Assign => "assign",
            Phase::Interactions => "interactions",
        };
        f.write_str(label)
    }
}

/// Which side of the correlation had no counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MissSide {
    Live,
    Snapshot,
}

impl fmt::Display for MissSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissSide::Live => f.write_str("live geometry"),
            MissSide::Snapshot => f.write_str("snapshot geometry"),
        }
    }
}

/// A recoverable problem. Every issue is handled where it occurs and turned
/// into a counter plus a diagnostic; none of them stops a run.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
pub enum ReconcileIssue {
    #[error("no {kind} of {geometry} matches the corners recorded for {property}")]
    NotFound {
        geometry: String,
        property: String,
        kind: SubshapeKind,
    },

    #[error("{geometry} matches none of {groups} recorded {kind} groups")]
    Ambiguous {
        geometry: String,
        kind: SubshapeKind,
        groups: usize,
    },

    #[error("{kind} property {name} could not be created: {reason}")]
    CreationFailed {
        kind: PropertyKind,
        name: String,
        reason: String,
    },

    #[error("parameter {parameter} of {property} skipped: {reason}")]
    ParameterSkipped {
        property: String,
        parameter: String,
        reason: String,
    },

    #[error("{side} {name} has no counterpart")]
    CorrelationMiss { side: MissSide, name: String },

    #[error("{kind} property {name} referenced by {interaction} is not available")]
    MissingReference {
        interaction: String,
        kind: PropertyKind,
        name: String,
    },

    #[error("unknown interaction type {raw:?}, using {fallback}")]
    UnknownInteractionType {
        raw: Option<String>,
        fallback: InteractionType,
    },

    #[error("attachment to {geometry} ({subshape}) could not be located")]
    UnresolvedAttachment { geometry: String, subshape: String },

    #[error("host rejected change: {0}")]
    Host(#[from] HostError),
}

/// An issue tagged with the phase it was raised in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub phase: Phase,
    pub issue: ReconcileIssue,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.phase, self.issue)
    }
}

/// Diagnostics collected over a run, in the order they were raised.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn push(&mut self, phase: Phase, issue: impl Into<ReconcileIssue>) {
        self.0.push(Diagnostic {
            phase,
            issue: issue.into(),
        });
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.0.extend(other.0);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }

    /// Diagnostics raised in one phase.
    pub fn in_phase(&self, phase: Phase) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter().filter(move |d| d.phase == phase)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
