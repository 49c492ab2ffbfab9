use propsync_types::{PropertyKind, SubshapeKind};
use serde::Serialize;
use uuid::Uuid;

use crate::types::Diagnostics;

/// Success/failure counter for one kind of replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Tally {
    pub assigned: usize,
    pub failed: usize,
}

impl Tally {
    pub fn record(&mut self, ok: bool) {
        if ok {
            self.assigned += 1;
        } else {
            self.failed += 1;
        }
    }
}

/// Assignment counters of one property family, per subshape kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct KindTally {
    pub vertices: Tally,
    pub edges: Tally,
    pub faces: Tally,
    pub solids: Tally,
}

impl KindTally {
    pub fn get(&self, kind: SubshapeKind) -> Tally {
        match kind {
            SubshapeKind::Vertex => self.vertices,
            SubshapeKind::Edge => self.edges,
            SubshapeKind::Face => self.faces,
            SubshapeKind::Solid => self.solids,
        }
    }

    fn get_mut(&mut self, kind: SubshapeKind) -> &mut Tally {
        match kind {
            SubshapeKind::Vertex => &mut self.vertices,
            SubshapeKind::Edge => &mut self.edges,
            SubshapeKind::Face => &mut self.faces,
            SubshapeKind::Solid => &mut self.solids,
        }
    }

    fn total(&self) -> Tally {
        SubshapeKind::ALL.iter().fold(Tally::default(), |acc, &k| {
            let t = self.get(k);
            Tally {
                assigned: acc.assigned + t.assigned,
                failed: acc.failed + t.failed,
            }
        })
    }
}

/// Assignment counters for both property families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct AssignmentTally {
    pub physical: KindTally,
    pub element: KindTally,
}

impl AssignmentTally {
    pub fn family(&self, kind: PropertyKind) -> &KindTally {
        match kind {
            PropertyKind::Physical => &self.physical,
            PropertyKind::Element => &self.element,
        }
    }

    pub fn record(&mut self, kind: PropertyKind, subshape: SubshapeKind, ok: bool) {
        let family = match kind {
            PropertyKind::Physical => &mut self.physical,
            PropertyKind::Element => &mut self.element,
        };
        family.get_mut(subshape).record(ok);
    }

    pub fn assigned(&self) -> usize {
        self.physical.total().assigned + self.element.total().assigned
    }

    pub fn failed(&self) -> usize {
        self.physical.total().failed + self.element.total().failed
    }
}

/// Geometry correlation counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CorrelationTally {
    /// Live geometries paired with a snapshot geometry.
    pub correlated: usize,
    /// Live geometries with no snapshot counterpart.
    pub skipped: usize,
    /// Snapshot geometries no live geometry was paired with.
    pub unclaimed: usize,
}

/// Split-body disambiguation counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DisambiguationTally {
    pub resolved: usize,
    /// Unresolved split bodies; every group was broadcast (or failed in
    /// strict mode).
    pub unresolved: usize,
    pub not_applicable: usize,
    /// Records left for another split body of the same snapshot geometry.
    pub filtered: usize,
}

/// Property materialization counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MaterializeTally {
    pub created: usize,
    pub reused: usize,
    pub failed: usize,
}

/// Interaction reconstruction counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CouplingTally {
    pub created: usize,
    pub reused: usize,
    /// Attachments located and present on their interaction.
    pub attached: usize,
    pub failed: usize,
}

/// Outcome of one reconciliation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub correlation: CorrelationTally,
    pub disambiguation: DisambiguationTally,
    pub assignments: AssignmentTally,
    pub properties: MaterializeTally,
    pub couplings: CouplingTally,
    pub diagnostics: Diagnostics,
}

impl Default for RunSummary {
    fn default() -> Self {
        Self::new()
    }
}

impl RunSummary {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            correlation: CorrelationTally::default(),
            disambiguation: DisambiguationTally::default(),
            assignments: AssignmentTally::default(),
            properties: MaterializeTally::default(),
            couplings: CouplingTally::default(),
            diagnostics: Diagnostics::default(),
        }
    }

    /// Successful assignment writes across all geometries.
    pub fn assigned(&self) -> usize {
        self.assignments.assigned()
    }

    /// Assignment records that could not be replayed.
    pub fn failed(&self) -> usize {
        self.assignments.failed()
    }

    /// Render a plain-text report.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Reconciliation run {}\n", self.run_id));

        let c = &self.correlation;
        out.push_str(&format!(
            "Correlation: {} correlated, {} skipped, {} unclaimed\n",
            c.correlated, c.skipped, c.unclaimed
        ));

        let d = &self.disambiguation;
        out.push_str(&format!(
            "Disambiguation: {} resolved, {} unresolved, {} whole-shape, {} filtered\n",
            d.resolved, d.unresolved, d.not_applicable, d.filtered
        ));

        let p = &self.properties;
        out.push_str(&format!(
            "Properties: {} created, {} reused, {} failed\n",
            p.created, p.reused, p.failed
        ));

        out.push_str("Assignments:\n");
        for kind in PropertyKind::ALL {
            let family = self.assignments.family(kind);
            for subshape in SubshapeKind::ALL {
                let t = family.get(subshape);
                if t.assigned + t.failed == 0 {
                    continue;
                }
                out.push_str(&format!(
                    "  {kind} {subshape}: {} assigned, {} failed\n",
                    t.assigned, t.failed
                ));
            }
        }

        let i = &self.couplings;
        out.push_str(&format!(
            "Interactions: {} created, {} reused, {} attached, {} failed\n",
            i.created, i.reused, i.attached, i.failed
        ));

        out.push_str(&format!(
            "Total: {} assigned, {} failed\n",
            self.assigned(),
            self.failed()
        ));

        if !self.diagnostics.is_empty() {
            out.push_str(&format!("\nDiagnostics ({}):\n", self.diagnostics.len()));
            for diagnostic in self.diagnostics.iter() {
                out.push_str(&format!("  {diagnostic}\n"));
            }
        }

        out
    }
}
