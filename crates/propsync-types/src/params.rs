use std::fmt;

use serde::{Deserialize, Serialize};

/// A recorded property parameter value.
///
/// Snapshot documents store parameters as plain JSON values; the variant is
/// recovered from the JSON shape. Integral numbers become `Integer`, lists of
/// integers become `IndexList`, and any other numeric list is a `Vector`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Boolean(bool),
    Integer(i64),
    Real(f64),
    Text(String),
    IndexList(Vec<i64>),
    Vector(Vec<f64>),
    /// The attribute could not be read at capture time.
    Null,
}

impl ParamValue {
    /// Numeric value, accepting both integral and real forms.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Integer(i) => Some(*i as f64),
            ParamValue::Real(r) => Some(*r),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParamValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// First three components of a numeric list.
    pub fn as_vector3(&self) -> Option<[f64; 3]> {
        let values: Vec<f64> = match self {
            ParamValue::Vector(v) => v.clone(),
            ParamValue::IndexList(v) => v.iter().map(|&i| i as f64).collect(),
            _ => return None,
        };
        if values.len() < 3 {
            return None;
        }
        Some([values[0], values[1], values[2]])
    }

    pub fn as_index_list(&self) -> Option<&[i64]> {
        match self {
            ParamValue::IndexList(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ParamValue::Null)
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Boolean(b) => write!(f, "{b}"),
            ParamValue::Integer(i) => write!(f, "{i}"),
            ParamValue::Real(r) => write!(f, "{r}"),
            ParamValue::Text(s) => write!(f, "{s:?}"),
            ParamValue::IndexList(v) => write!(f, "{v:?}"),
            ParamValue::Vector(v) => write!(f, "{v:?}"),
            ParamValue::Null => f.write_str("null"),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Real(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Integer(v)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Boolean(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}
