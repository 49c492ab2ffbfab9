use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub use propsync_types::{
    CouplingSide, ParamValue, Point3, PropertyKind, ShapeType, SubshapeKind,
};

/// Host-assigned geometry identifier. Unique within one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeometryId(pub u32);

/// Host-assigned property identifier. Physical and element properties live
/// in separate id spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyId(pub u32);

/// Host-assigned interaction identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InteractionId(pub u32);

impl fmt::Display for GeometryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for InteractionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors raised at the host-document boundary.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
pub enum HostError {
    #[error("geometry not found: {id}")]
    GeometryNotFound { id: GeometryId },

    #[error("{kind} property not found: {id}")]
    PropertyNotFound { kind: PropertyKind, id: PropertyId },

    #[error("interaction not found: {id}")]
    InteractionNotFound { id: InteractionId },

    #[error("{kind} index {index} out of range (count {count})")]
    SubshapeOutOfRange {
        kind: SubshapeKind,
        index: usize,
        count: usize,
    },

    #[error("{kind} {index} references missing vertex {vertex}")]
    BrokenTopology {
        kind: SubshapeKind,
        index: usize,
        vertex: usize,
    },

    #[error("unknown {kind} property type: {type_name}")]
    UnknownPropertyType { kind: PropertyKind, type_name: String },

    #[error("unknown attribute: {name}")]
    UnknownAttribute { name: String },

    #[error("attribute {name} rejected value: {reason}")]
    AttributeRejected { name: String, reason: String },

    #[error("duplicate {what} id {id}")]
    DuplicateId { what: &'static str, id: u32 },

    #[error("import of {path} failed: {reason}")]
    ImportFailed { path: String, reason: String },

    #[error("host error: {message}")]
    Other { message: String },
}

/// Storage class of a typed property attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
    Real,
    Integer,
    Boolean,
    Text,
    QuantityScalar,
    QuantityVector3,
    Index,
    IndexVector,
}

/// A typed attribute value held by a property object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AttributeValue {
    Real(f64),
    Integer(i64),
    Boolean(bool),
    Text(String),
    QuantityScalar(f64),
    QuantityVector3([f64; 3]),
    Index(i64),
    IndexVector(Vec<i64>),
}

impl AttributeValue {
    /// Zero value of the given kind, used when instantiating a type.
    pub fn default_for(kind: AttributeKind) -> Self {
        match kind {
            AttributeKind::Real => AttributeValue::Real(0.0),
            AttributeKind::Integer => AttributeValue::Integer(0),
            AttributeKind::Boolean => AttributeValue::Boolean(false),
            AttributeKind::Text => AttributeValue::Text(String::new()),
            AttributeKind::QuantityScalar => AttributeValue::QuantityScalar(0.0),
            AttributeKind::QuantityVector3 => AttributeValue::QuantityVector3([0.0; 3]),
            AttributeKind::Index => AttributeValue::Index(0),
            AttributeKind::IndexVector => AttributeValue::IndexVector(Vec::new()),
        }
    }

    pub fn kind(&self) -> AttributeKind {
        match self {
            AttributeValue::Real(_) => AttributeKind::Real,
            AttributeValue::Integer(_) => AttributeKind::Integer,
            AttributeValue::Boolean(_) => AttributeKind::Boolean,
            AttributeValue::Text(_) => AttributeKind::Text,
            AttributeValue::QuantityScalar(_) => AttributeKind::QuantityScalar,
            AttributeValue::QuantityVector3(_) => AttributeKind::QuantityVector3,
            AttributeValue::Index(_) => AttributeKind::Index,
            AttributeValue::IndexVector(_) => AttributeKind::IndexVector,
        }
    }

    /// The value as it is written into a snapshot.
    pub fn to_param(&self) -> ParamValue {
        match self {
            AttributeValue::Real(v) | AttributeValue::QuantityScalar(v) => ParamValue::Real(*v),
            AttributeValue::Integer(v) | AttributeValue::Index(v) => ParamValue::Integer(*v),
            AttributeValue::Boolean(v) => ParamValue::Boolean(*v),
            AttributeValue::Text(v) => ParamValue::Text(v.clone()),
            AttributeValue::QuantityVector3(v) => ParamValue::Vector(v.to_vec()),
            AttributeValue::IndexVector(v) => ParamValue::IndexList(v.clone()),
        }
    }
}

/// Attribute bag instantiated from a host property type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyObject {
    /// Fully qualified type name the object was instantiated from.
    pub type_name: String,
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl PropertyObject {
    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    /// Overwrite an existing attribute. The new value must have the same
    /// kind as the one the type declared.
    pub fn set_attribute(&mut self, name: &str, value: AttributeValue) -> Result<(), HostError> {
        let slot = self
            .attributes
            .get_mut(name)
            .ok_or_else(|| HostError::UnknownAttribute {
                name: name.to_string(),
            })?;
        if slot.kind() != value.kind() {
            return Err(HostError::AttributeRejected {
                name: name.to_string(),
                reason: format!("expected {:?}, got {:?}", slot.kind(), value.kind()),
            });
        }
        *slot = value;
        Ok(())
    }

    /// Read back every attribute as snapshot parameters.
    pub fn parameters(&self) -> BTreeMap<String, ParamValue> {
        self.attributes
            .iter()
            .map(|(name, value)| (name.clone(), value.to_param()))
            .collect()
    }
}

/// A named property registered in the host document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: PropertyId,
    pub name: String,
    /// `None` for properties whose definition the host could not load.
    #[serde(default)]
    pub object: Option<PropertyObject>,
}

impl Property {
    pub fn type_name(&self) -> Option<&str> {
        self.object.as_ref().map(|o| o.type_name.as_str())
    }
}

/// Kind of coupling between master and slave subshapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum InteractionType {
    #[default]
    NodeToNode,
    NodeToElement,
    ElementToElement,
}

impl InteractionType {
    pub const ALL: [InteractionType; 3] = [
        InteractionType::NodeToNode,
        InteractionType::NodeToElement,
        InteractionType::ElementToElement,
    ];

    pub fn name(self) -> &'static str {
        match self {
            InteractionType::NodeToNode => "NodeToNode",
            InteractionType::NodeToElement => "NodeToElement",
            InteractionType::ElementToElement => "ElementToElement",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }
}

impl fmt::Display for InteractionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One subshape taking part in an interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InteractionItem {
    pub geometry: GeometryId,
    pub kind: SubshapeKind,
    pub subshape: usize,
}

/// A master/slave coupling between subshapes of one or more geometries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub id: InteractionId,
    pub name: String,
    pub interaction_type: InteractionType,
    #[serde(default)]
    pub physical_property: Option<PropertyId>,
    #[serde(default)]
    pub element_property: Option<PropertyId>,
    #[serde(default)]
    pub masters: Vec<InteractionItem>,
    #[serde(default)]
    pub slaves: Vec<InteractionItem>,
}

impl Interaction {
    pub fn new(
        id: InteractionId,
        name: impl Into<String>,
        interaction_type: InteractionType,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            interaction_type,
            physical_property: None,
            element_property: None,
            masters: Vec::new(),
            slaves: Vec::new(),
        }
    }

    pub fn property(&self, kind: PropertyKind) -> Option<PropertyId> {
        match kind {
            PropertyKind::Physical => self.physical_property,
            PropertyKind::Element => self.element_property,
        }
    }

    pub fn set_property(&mut self, kind: PropertyKind, id: Option<PropertyId>) {
        match kind {
            PropertyKind::Physical => self.physical_property = id,
            PropertyKind::Element => self.element_property = id,
        }
    }

    pub fn items(&self, side: CouplingSide) -> &[InteractionItem] {
        match side {
            CouplingSide::Master => &self.masters,
            CouplingSide::Slave => &self.slaves,
        }
    }

    /// Append an item unless the side already holds it. Returns whether the
    /// item was added.
    pub fn attach(&mut self, side: CouplingSide, item: InteractionItem) -> bool {
        let items = match side {
            CouplingSide::Master => &mut self.masters,
            CouplingSide::Slave => &mut self.slaves,
        };
        if items.contains(&item) {
            return false;
        }
        items.push(item);
        true
    }
}
