//! Scenario: fluent API for scripting reconciliation round trips in tests.
//!
//! A scenario owns a source document, captures it through the persisted
//! snapshot format, re-imports transformed copies of its shapes through the
//! import driver and reconciles the snapshot onto them.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use host_model::{
    CouplingSide, GeometryId, GeometryImporter, HostDocument, HostError, Interaction,
    InteractionId, InteractionItem, InteractionType, MemoryDocument, MemoryShape, Property,
    PropertyId,
};
use propsync_types::{ParamValue, PropertyKind, SnapshotDocument, SubshapeKind};
use reconcile_engine::{
    apply_parameter, capture_snapshot, import_all, ImportReport, ReconcileConfig, RunSummary,
};
use snapshot_format::{export_stem, load_snapshot, now_timestamp, save_snapshot};

use crate::assertions;
use crate::helpers::HarnessError;

/// Re-imported parts of one exported geometry: name and shape of each
/// resulting live geometry.
pub type Parts = Vec<(String, MemoryShape)>;

/// Imports "exchange files" by looking up the parts registered for the
/// file stem.
struct ExchangeImporter<'a> {
    doc: &'a mut MemoryDocument,
    parts: HashMap<String, Parts>,
}

impl GeometryImporter for ExchangeImporter<'_> {
    fn import_geometry(&mut self, path: &Path) -> Result<Vec<GeometryId>, HostError> {
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
        let parts = self.parts.get(stem).ok_or_else(|| HostError::ImportFailed {
            path: path.display().to_string(),
            reason: "no exported geometry".to_string(),
        })?;
        Ok(parts
            .iter()
            .map(|(name, shape)| self.doc.add_geometry(name.clone(), shape.clone()))
            .collect())
    }
}

/// A fluent builder for reconciliation scenarios.
pub struct Scenario {
    pub source: MemoryDocument,
    live: Option<MemoryDocument>,
    snapshot: Option<SnapshotDocument>,
    config: ReconcileConfig,
    conflicts: Vec<(String, String)>,
    import: Option<ImportReport>,
    runs: Vec<RunSummary>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self::new()
    }
}

impl Scenario {
    pub fn new() -> Self {
        Self {
            source: MemoryDocument::new(),
            live: None,
            snapshot: None,
            config: ReconcileConfig::default(),
            conflicts: Vec::new(),
            import: None,
            runs: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: ReconcileConfig) -> Self {
        self.config = config;
        self
    }

    /// Fail records of unresolved split bodies instead of broadcasting.
    pub fn strict(self) -> Self {
        self.with_config(ReconcileConfig::strict())
    }

    // ── Source Model ────────────────────────────────────────────────────

    pub fn geometry(&mut self, name: &str, shape: MemoryShape) -> GeometryId {
        self.source.add_geometry(name, shape)
    }

    /// Create a property in the source document from a type and parameters.
    pub fn property(
        &mut self,
        kind: PropertyKind,
        name: &str,
        type_name: &str,
        params: &[(&str, ParamValue)],
    ) -> Result<PropertyId, HarnessError> {
        let mut object = self.source.instantiate(kind, type_name)?;
        for (attribute, value) in params {
            apply_parameter(&mut object, attribute, value)?;
        }
        let id = PropertyId(self.source.last_property_id(kind).map_or(1, |last| last.0 + 1));
        self.source.add_property(
            kind,
            Property {
                id,
                name: name.to_string(),
                object: Some(object),
            },
        )?;
        Ok(id)
    }

    /// Assign a source property to a subshape of a source geometry.
    pub fn assign(
        &mut self,
        geometry: &str,
        kind: PropertyKind,
        subshape: SubshapeKind,
        index: usize,
        property: &str,
    ) -> Result<&mut Self, HarnessError> {
        let id = self.source_geometry(geometry)?;
        let pid = self
            .source
            .find_property_by_name(kind, property)
            .ok_or_else(|| HarnessError::PropertyNotFound {
                kind,
                name: property.to_string(),
            })?;
        self.source.assign_property(id, kind, subshape, index, pid)?;
        Ok(self)
    }

    /// Couple one master subshape to one slave subshape.
    pub fn couple(
        &mut self,
        name: &str,
        interaction_type: InteractionType,
        physical: Option<&str>,
        master: (&str, SubshapeKind, usize),
        slave: (&str, SubshapeKind, usize),
    ) -> Result<InteractionId, HarnessError> {
        let id = InteractionId(self.source.last_interaction_id().map_or(1, |last| last.0 + 1));
        let mut interaction = Interaction::new(id, name, interaction_type);
        if let Some(property) = physical {
            let pid = self
                .source
                .find_property_by_name(PropertyKind::Physical, property)
                .ok_or_else(|| HarnessError::PropertyNotFound {
                    kind: PropertyKind::Physical,
                    name: property.to_string(),
                })?;
            interaction.set_property(PropertyKind::Physical, Some(pid));
        }
        let sides = [(CouplingSide::Master, master), (CouplingSide::Slave, slave)];
        for (side, (geometry, kind, subshape)) in sides {
            let item = InteractionItem {
                geometry: self.source_geometry(geometry)?,
                kind,
                subshape,
            };
            interaction.attach(side, item);
        }
        self.source.add_interaction(interaction)?;
        Ok(id)
    }

    fn source_geometry(&self, name: &str) -> Result<GeometryId, HarnessError> {
        self.source
            .geometry_by_name(name)
            .map(|g| g.id)
            .ok_or_else(|| HarnessError::GeometryNotFound { name: name.to_string() })
    }

    // ── Round Trip ──────────────────────────────────────────────────────

    /// Capture the source document and pass the snapshot through its JSON
    /// form, as the export step would.
    pub fn capture(&mut self) -> Result<&SnapshotDocument, HarnessError> {
        let report = capture_snapshot(&self.source, &now_timestamp())?;
        let mut snapshot = report.snapshot;
        for geometry in &mut snapshot.geometries {
            geometry.exported_file = Some(export_stem(geometry.id, &geometry.name));
        }
        let json = save_snapshot(&snapshot).map_err(|e| HarnessError::Format(e.to_string()))?;
        let reloaded = load_snapshot(&json).map_err(|e| HarnessError::Format(e.to_string()))?;
        self.conflicts = report.conflicts;
        Ok(self.snapshot.insert(reloaded))
    }

    /// Use a hand-built snapshot instead of capturing the source.
    pub fn use_snapshot(&mut self, snapshot: SnapshotDocument) -> &mut Self {
        self.snapshot = Some(snapshot);
        self
    }

    /// Rebuild the live document from the snapshot's exported geometries.
    /// `transform` maps each source geometry to the parts the host creates
    /// when importing its exchange file.
    pub fn reimport_with<F>(&mut self, transform: F) -> Result<&mut Self, HarnessError>
    where
        F: Fn(&str, &MemoryShape) -> Parts,
    {
        let snapshot = self.snapshot.as_ref().ok_or(HarnessError::NoSnapshot)?;
        let mut parts = HashMap::new();
        let mut files = Vec::new();
        for record in &snapshot.geometries {
            let stem = record
                .exported_file
                .clone()
                .unwrap_or_else(|| export_stem(record.id, &record.name));
            let geometry = self
                .source
                .geometry_by_name(&record.name)
                .ok_or_else(|| HarnessError::GeometryNotFound {
                    name: record.name.clone(),
                })?;
            parts.insert(stem.clone(), transform(&record.name, &geometry.shape));
            files.push(PathBuf::from(format!("{stem}.stp")));
        }

        let mut live = MemoryDocument::new();
        let report = import_all(&mut ExchangeImporter { doc: &mut live, parts }, &files);
        if let Some((path, error)) = report.failures.first() {
            return Err(HarnessError::AssertionFailed {
                detail: format!("import of {} failed: {error}", path.display()),
            });
        }
        self.import = Some(report);
        self.live = Some(live);
        Ok(self)
    }

    /// Re-import every geometry whole, with vertex and subshape order reversed.
    pub fn reimport_renumbered(&mut self) -> Result<&mut Self, HarnessError> {
        self.reimport_with(|name, shape| vec![(name.to_string(), shape.renumbered())])
    }

    /// Add a geometry straight to the live document.
    pub fn live_geometry(&mut self, name: &str, shape: MemoryShape) -> GeometryId {
        self.live.get_or_insert_with(MemoryDocument::new).add_geometry(name, shape)
    }

    /// Reconcile the snapshot onto the live document.
    pub fn reconcile(&mut self) -> Result<&RunSummary, HarnessError> {
        let snapshot = self.snapshot.as_ref().ok_or(HarnessError::NoSnapshot)?;
        let live = self.live.as_mut().ok_or(HarnessError::NoLiveDocument)?;
        let summary = reconcile_engine::reconcile(live, snapshot, &self.config);
        self.runs.push(summary);
        Ok(&self.runs[self.runs.len() - 1])
    }

    // ── Accessors ───────────────────────────────────────────────────────

    pub fn snapshot(&self) -> Result<&SnapshotDocument, HarnessError> {
        self.snapshot.as_ref().ok_or(HarnessError::NoSnapshot)
    }

    pub fn live(&self) -> Result<&MemoryDocument, HarnessError> {
        self.live.as_ref().ok_or(HarnessError::NoLiveDocument)
    }

    /// Name pairs the last capture flagged as substring conflicts.
    pub fn conflicts(&self) -> &[(String, String)] {
        &self.conflicts
    }

    pub fn import_report(&self) -> Option<&ImportReport> {
        self.import.as_ref()
    }

    pub fn runs(&self) -> &[RunSummary] {
        &self.runs
    }

    // ── Inline Assertions ───────────────────────────────────────────────

    pub fn assert_assigned(
        &self,
        geometry: &str,
        kind: PropertyKind,
        subshape: SubshapeKind,
        index: usize,
        property: &str,
    ) -> Result<(), HarnessError> {
        assertions::assert_assigned(self.live()?, geometry, kind, subshape, index, property, "live")
    }

    /// The last run's totals.
    pub fn assert_tally(&self, assigned: usize, failed: usize) -> Result<(), HarnessError> {
        let summary = self.runs.last().ok_or_else(|| HarnessError::AssertionFailed {
            detail: "no reconciliation run yet".to_string(),
        })?;
        assertions::assert_tally(summary, assigned, failed, "last run")
    }

    pub fn assert_live_consistent(&self) -> Result<(), HarnessError> {
        assertions::assert_oracles_pass(self.live()?, "live")
    }
}
