//! Assertion helpers with diagnostic output.
//!
//! Every failure names the context, expected vs actual, and where useful the
//! run's diagnostics.

use approx::relative_eq;
use host_model::{AttributeValue, HostDocument, MemoryDocument};
use propsync_types::{PropertyKind, SubshapeKind};
use reconcile_engine::{Phase, RunSummary};

use crate::helpers::HarnessError;
use crate::oracle::run_document_checks;

fn failed(detail: String) -> Result<(), HarnessError> {
    Err(HarnessError::AssertionFailed { detail })
}

/// Name of the property assigned to a subshape of the first geometry with
/// this name.
pub fn assigned_name(
    doc: &MemoryDocument,
    geometry: &str,
    kind: PropertyKind,
    subshape: SubshapeKind,
    index: usize,
) -> Result<Option<String>, HarnessError> {
    let id = doc
        .geometry_by_name(geometry)
        .map(|g| g.id)
        .ok_or_else(|| HarnessError::GeometryNotFound {
            name: geometry.to_string(),
        })?;
    Ok(doc
        .assigned_property(id, kind, subshape, index)
        .and_then(|pid| doc.property(kind, pid))
        .map(|p| p.name.clone()))
}

/// Assert a subshape carries the named property.
pub fn assert_assigned(
    doc: &MemoryDocument,
    geometry: &str,
    kind: PropertyKind,
    subshape: SubshapeKind,
    index: usize,
    expected: &str,
    ctx: &str,
) -> Result<(), HarnessError> {
    match assigned_name(doc, geometry, kind, subshape, index)? {
        Some(name) if name == expected => Ok(()),
        other => failed(format!(
            "[{ctx}] {geometry} {kind} {subshape} {index}: expected {expected}, got {other:?}"
        )),
    }
}

/// Assert a subshape carries no property of the given family.
pub fn assert_unassigned(
    doc: &MemoryDocument,
    geometry: &str,
    kind: PropertyKind,
    subshape: SubshapeKind,
    index: usize,
    ctx: &str,
) -> Result<(), HarnessError> {
    match assigned_name(doc, geometry, kind, subshape, index)? {
        None => Ok(()),
        Some(name) => failed(format!(
            "[{ctx}] {geometry} {kind} {subshape} {index}: expected nothing, got {name}"
        )),
    }
}

/// Assert the run's assigned/failed totals.
pub fn assert_tally(
    summary: &RunSummary,
    assigned: usize,
    failed_count: usize,
    ctx: &str,
) -> Result<(), HarnessError> {
    if summary.assigned() == assigned && summary.failed() == failed_count {
        return Ok(());
    }
    let diagnostics: Vec<String> = summary.diagnostics.iter().map(|d| d.to_string()).collect();
    failed(format!(
        "[{ctx}] expected {assigned} assigned / {failed_count} failed, \
         got {} / {}; diagnostics: {}",
        summary.assigned(),
        summary.failed(),
        diagnostics.join(" | ")
    ))
}

/// Assert the number of properties in one family.
pub fn assert_property_count(
    doc: &MemoryDocument,
    kind: PropertyKind,
    expected: usize,
    ctx: &str,
) -> Result<(), HarnessError> {
    let names: Vec<&str> = doc.properties(kind).iter().map(|p| p.name.as_str()).collect();
    if names.len() == expected {
        Ok(())
    } else {
        failed(format!("[{ctx}] expected {expected} {kind} properties, got {names:?}"))
    }
}

/// Assert a numeric attribute of a named property.
pub fn assert_parameter(
    doc: &MemoryDocument,
    kind: PropertyKind,
    property: &str,
    attribute: &str,
    expected: f64,
    ctx: &str,
) -> Result<(), HarnessError> {
    let value = doc
        .find_property_by_name(kind, property)
        .and_then(|pid| doc.property(kind, pid))
        .and_then(|p| p.object.as_ref())
        .and_then(|o| o.attribute(attribute))
        .ok_or_else(|| HarnessError::PropertyNotFound {
            kind,
            name: format!("{property}.{attribute}"),
        })?;
    let actual = match value {
        AttributeValue::Real(v) | AttributeValue::QuantityScalar(v) => *v,
        AttributeValue::Integer(v) | AttributeValue::Index(v) => *v as f64,
        other => return failed(format!("[{ctx}] {property}.{attribute} is not numeric: {other:?}")),
    };
    if relative_eq!(actual, expected, max_relative = 1e-9) {
        Ok(())
    } else {
        failed(format!("[{ctx}] {property}.{attribute}: expected {expected}, got {actual}"))
    }
}

/// Assert a run raised no diagnostics in the given phase.
pub fn assert_phase_clean(
    summary: &RunSummary,
    phase: Phase,
    ctx: &str,
) -> Result<(), HarnessError> {
    let issues: Vec<String> = summary.diagnostics.in_phase(phase).map(|d| d.to_string()).collect();
    if issues.is_empty() {
        Ok(())
    } else {
        failed(format!("[{ctx}] {phase} raised: {}", issues.join(" | ")))
    }
}

/// Assert every document oracle passes.
pub fn assert_oracles_pass(doc: &MemoryDocument, ctx: &str) -> Result<(), HarnessError> {
    for verdict in run_document_checks(doc) {
        if !verdict.passed {
            return Err(HarnessError::OracleFailure {
                oracle: verdict.oracle_name,
                detail: format!("[{ctx}] {}", verdict.detail),
            });
        }
    }
    Ok(())
}
