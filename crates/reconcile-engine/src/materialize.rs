//! Property materialization: create each recorded property at most once.
//!
//! Properties are keyed by family and name. An existing live property with
//! the same name is reused as-is, even if its type differs from the record.

use std::collections::HashMap;

use host_model::{
    AttributeKind, AttributeValue, HostDocument, HostError, Property, PropertyId, PropertyObject,
};
use propsync_types::{ParamValue, PropertyKind, PropertyRecord, SnapshotDocument};
use tracing::{debug, info, instrument, warn};

use crate::summary::MaterializeTally;
use crate::types::{Diagnostics, Phase, ReconcileIssue};

/// Properties resolved during one run. A failed creation is remembered too,
/// so it is attempted and reported once.
#[derive(Debug, Default)]
pub struct Materializer {
    resolved: HashMap<(PropertyKind, String), Option<PropertyId>>,
    pub tally: MaterializeTally,
    pub diagnostics: Diagnostics,
}

impl Materializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A property already resolved in this run.
    pub fn lookup(&self, kind: PropertyKind, name: &str) -> Option<PropertyId> {
        self.resolved
            .get(&(kind, name.to_string()))
            .copied()
            .flatten()
    }

    /// Return the live property for `record`, creating it when the document
    /// has none with that name. `None` if it cannot be created.
    pub fn get_or_create(
        &mut self,
        doc: &mut dyn HostDocument,
        kind: PropertyKind,
        record: PropertyRecord<'_>,
    ) -> Option<PropertyId> {
        let key = (kind, record.name.to_string());
        if let Some(&resolved) = self.resolved.get(&key) {
            return resolved;
        }

        let resolved = match doc.find_property_by_name(kind, record.name) {
            Some(id) => {
                debug!(%kind, name = record.name, id = id.0, "reusing property");
                self.tally.reused += 1;
                Some(id)
            }
            None => match self.create(doc, kind, record) {
                Ok(id) => {
                    info!(%kind, name = record.name, id = id.0, "property created");
                    self.tally.created += 1;
                    Some(id)
                }
                Err(reason) => {
                    warn!(%kind, name = record.name, %reason, "property creation failed");
                    self.tally.failed += 1;
                    self.diagnostics.push(
                        Phase::Materialize,
                        ReconcileIssue::CreationFailed {
                            kind,
                            name: record.name.to_string(),
                            reason,
                        },
                    );
                    None
                }
            },
        };
        self.resolved.insert(key, resolved);
        resolved
    }

    fn create(
        &mut self,
        doc: &mut dyn HostDocument,
        kind: PropertyKind,
        record: PropertyRecord<'_>,
    ) -> Result<PropertyId, String> {
        let type_name = record
            .type_identifier
            .ok_or_else(|| "no type recorded".to_string())?;
        let mut object = doc
            .instantiate(kind, type_name)
            .map_err(|e| e.to_string())?;

        for (parameter, value) in record.parameters {
            if let Err(e) = apply_parameter(&mut object, parameter, value) {
                warn!(
                    property = record.name,
                    parameter = parameter.as_str(),
                    error = %e,
                    "parameter skipped"
                );
                self.diagnostics.push(
                    Phase::Materialize,
                    ReconcileIssue::ParameterSkipped {
                        property: record.name.to_string(),
                        parameter: parameter.clone(),
                        reason: e.to_string(),
                    },
                );
            }
        }

        let id = PropertyId(doc.last_property_id(kind).map_or(1, |last| last.0 + 1));
        doc.add_property(
            kind,
            Property {
                id,
                name: record.name.to_string(),
                object: Some(object),
            },
        )
        .map_err(|e| e.to_string())?;
        Ok(id)
    }

    /// Materialize every property referenced by the snapshot, physical
    /// before element and vertices through solids, so that properties exist
    /// even when none of their assignments can be replayed.
    #[instrument(skip_all)]
    pub fn materialize_all(&mut self, doc: &mut dyn HostDocument, snapshot: &SnapshotDocument) {
        for kind in PropertyKind::ALL {
            for geometry in &snapshot.geometries {
                for (pk, _, assignment) in geometry.assignments() {
                    if pk == kind {
                        self.get_or_create(doc, kind, assignment.property());
                    }
                }
            }
        }
        info!(
            created = self.tally.created,
            reused = self.tally.reused,
            failed = self.tally.failed,
            "materialization complete"
        );
    }
}

/// Write one recorded parameter into a property object, converting the
/// recorded value to the attribute's declared kind.
pub fn apply_parameter(
    object: &mut PropertyObject,
    name: &str,
    value: &ParamValue,
) -> Result<(), HostError> {
    let kind = object
        .attribute(name)
        .map(AttributeValue::kind)
        .ok_or_else(|| HostError::UnknownAttribute {
            name: name.to_string(),
        })?;

    let converted = match kind {
        AttributeKind::Real => value.as_f64().map(AttributeValue::Real),
        AttributeKind::Integer => value.as_i64().map(AttributeValue::Integer),
        AttributeKind::Boolean => value.as_bool().map(AttributeValue::Boolean),
        AttributeKind::Text => value.as_str().map(|s| AttributeValue::Text(s.to_string())),
        AttributeKind::QuantityScalar => value.as_f64().map(AttributeValue::QuantityScalar),
        AttributeKind::QuantityVector3 => value.as_vector3().map(AttributeValue::QuantityVector3),
        AttributeKind::Index => value.as_i64().map(AttributeValue::Index),
        AttributeKind::IndexVector => value
            .as_index_list()
            .map(|v| AttributeValue::IndexVector(v.to_vec())),
    }
    .ok_or_else(|| HostError::AttributeRejected {
        name: name.to_string(),
        reason: format!("cannot store {value} as {kind:?}"),
    })?;

    object.set_attribute(name, converted)
}
