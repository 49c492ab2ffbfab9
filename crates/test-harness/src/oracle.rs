//! Verification oracles: pure functions returning pass/fail verdicts.
//!
//! Each oracle returns an `OracleVerdict` with diagnostic detail, not panics,
//! so a test can collect every failure in one pass.

use std::collections::{BTreeMap, BTreeSet};

use host_model::{CouplingSide, HostDocument, MemoryDocument, ShapeIntrospect};
use matching::duplicate_names;
use propsync_types::{PropertyKind, SubshapeKind};

/// The result of a single oracle check.
#[derive(Debug, Clone)]
pub struct OracleVerdict {
    pub oracle_name: String,
    pub passed: bool,
    pub detail: String,
}

impl OracleVerdict {
    fn pass(name: &str, detail: String) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: true,
            detail,
        }
    }

    fn fail(name: &str, detail: String) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: false,
            detail,
        }
    }

    fn from_problems(name: &str, checked: usize, problems: Vec<String>) -> Self {
        if problems.is_empty() {
            Self::pass(name, format!("{checked} checked"))
        } else {
            Self::fail(name, problems.join("; "))
        }
    }
}

/// Assignment state keyed by geometry name, family, subshape kind and index,
/// with the assigned property's name as value.
pub type AssignmentState = BTreeMap<(String, PropertyKind, SubshapeKind, usize), String>;

/// Read the full assignment state of a document by property name.
pub fn assignment_state(doc: &MemoryDocument) -> AssignmentState {
    let mut state = AssignmentState::new();
    for geometry in doc.geometries() {
        for kind in PropertyKind::ALL {
            let table = geometry.assignments.table(kind);
            for subshape in SubshapeKind::ALL {
                for (&index, &pid) in table.slots(subshape) {
                    let name = doc
                        .property(kind, pid)
                        .map_or_else(|| format!("<missing {pid}>"), |p| p.name.clone());
                    state.insert((geometry.name.clone(), kind, subshape, index), name);
                }
            }
        }
    }
    state
}

// ── Document Oracles ────────────────────────────────────────────────────────

/// Every assignment references an existing property of its own family and a
/// subshape index within range.
pub fn check_assignment_targets(doc: &MemoryDocument) -> OracleVerdict {
    let mut problems = Vec::new();
    let mut checked = 0;
    for geometry in doc.geometries() {
        for kind in PropertyKind::ALL {
            for subshape in SubshapeKind::ALL {
                let count = geometry.shape.subshape_count(subshape);
                for (&index, &pid) in geometry.assignments.table(kind).slots(subshape) {
                    checked += 1;
                    if doc.property(kind, pid).is_none() {
                        problems.push(format!(
                            "{} {subshape} {index}: {kind} property {pid} missing",
                            geometry.name
                        ));
                    }
                    if index >= count {
                        problems.push(format!(
                            "{} {subshape} {index}: out of range ({count})",
                            geometry.name
                        ));
                    }
                }
            }
        }
    }
    OracleVerdict::from_problems("assignment_targets", checked, problems)
}

/// Property names are unique within each family.
pub fn check_unique_property_names(doc: &MemoryDocument) -> OracleVerdict {
    let mut problems = Vec::new();
    let mut checked = 0;
    for kind in PropertyKind::ALL {
        let names: Vec<&str> = doc.properties(kind).iter().map(|p| p.name.as_str()).collect();
        checked += names.len();
        for name in duplicate_names(&names) {
            problems.push(format!("{kind} property {name} defined more than once"));
        }
    }
    OracleVerdict::from_problems("unique_property_names", checked, problems)
}

/// Interaction items reference live subshapes and appear once per side.
pub fn check_interaction_items(doc: &MemoryDocument) -> OracleVerdict {
    let mut problems = Vec::new();
    let mut checked = 0;
    for interaction in doc.interactions() {
        for side in [CouplingSide::Master, CouplingSide::Slave] {
            let mut seen = BTreeSet::new();
            for item in interaction.items(side) {
                checked += 1;
                if !seen.insert((item.geometry, item.kind, item.subshape)) {
                    problems.push(format!(
                        "{}: duplicate {side:?} item {item:?}",
                        interaction.name
                    ));
                }
                match doc.shape(item.geometry) {
                    Some(shape) if item.subshape < shape.subshape_count(item.kind) => {}
                    Some(_) => problems.push(format!(
                        "{}: {side:?} item {item:?} out of range",
                        interaction.name
                    )),
                    None => problems.push(format!(
                        "{}: {side:?} geometry {} missing",
                        interaction.name, item.geometry
                    )),
                }
            }
        }
    }
    OracleVerdict::from_problems("interaction_items", checked, problems)
}

/// Two documents hold the same assignments by geometry and property name.
pub fn check_same_assignments(expected: &MemoryDocument, actual: &MemoryDocument) -> OracleVerdict {
    let a = assignment_state(expected);
    let b = assignment_state(actual);
    if a == b {
        return OracleVerdict::pass("same_assignments", format!("{} assignments", a.len()));
    }
    let mut problems = Vec::new();
    for (key, name) in &a {
        match b.get(key) {
            Some(other) if other == name => {}
            Some(other) => problems.push(format!("{key:?}: expected {name}, got {other}")),
            None => problems.push(format!("{key:?}: expected {name}, missing")),
        }
    }
    for key in b.keys().filter(|k| !a.contains_key(*k)) {
        problems.push(format!("{key:?}: unexpected"));
    }
    OracleVerdict::fail("same_assignments", problems.join("; "))
}

/// Run every single-document oracle.
pub fn run_document_checks(doc: &MemoryDocument) -> Vec<OracleVerdict> {
    vec![
        check_assignment_targets(doc),
        check_unique_property_names(doc),
        check_interaction_items(doc),
    ]
}
