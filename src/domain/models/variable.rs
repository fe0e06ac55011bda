//! Variable model for the display layer.
//!
//! A variable is a named measurement/control point in the upstream
//! plant-control runtime, identified by project + name. The runtime
//! reports values through `VariableUpdate` broadcasts; this module
//! defines the typed payloads those broadcasts carry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};

/// Identity of an external variable: owning project plus variable name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariableId {
    /// Project scope the variable belongs to.
    pub project: String,
    /// Variable name within the project.
    pub name: String,
}

impl VariableId {
    pub fn new(project: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for VariableId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.project, self.name)
    }
}

/// Typed value of a variable.
///
/// The runtime reports values dynamically; consumers get a tagged
/// variant instead of an untyped payload so the common cases carry
/// compile-time guarantees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum VariableValue {
    /// Floating-point measurement (levels, temperatures, rates).
    Float(f64),
    /// Integer measurement (counters, discrete positions).
    Integer(i64),
    /// Boolean state (valve open, alarm active).
    Boolean(bool),
    /// Free-form text (status strings, identifiers).
    Text(String),
}

impl VariableValue {
    /// Convert a dynamic runtime payload into a typed value.
    ///
    /// Upstream runtimes report values untyped; only scalar shapes map
    /// onto the variant. Nulls, arrays and objects are rejected.
    pub fn from_json(value: &serde_json::Value) -> DomainResult<Self> {
        match value {
            serde_json::Value::Bool(b) => Ok(Self::Boolean(*b)),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Self::Integer(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(Self::Float(f))
                } else {
                    Err(DomainError::ValidationFailed(format!(
                        "unrepresentable number: {n}"
                    )))
                }
            }
            serde_json::Value::String(s) => Ok(Self::Text(s.clone())),
            other => Err(DomainError::ValidationFailed(format!(
                "unsupported value shape: {other}"
            ))),
        }
    }

    /// Numeric view of the value, widening integers to floats.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            #[allow(clippy::cast_precision_loss)]
            Self::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl std::fmt::Display for VariableValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Float(v) => write!(f, "{v}"),
            Self::Integer(v) => write!(f, "{v}"),
            Self::Boolean(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v}"),
        }
    }
}

impl From<f64> for VariableValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<i64> for VariableValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<bool> for VariableValue {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<&str> for VariableValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

/// Unique identifier for a variable update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UpdateId(pub Uuid);

impl UpdateId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UpdateId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UpdateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Change notification payload broadcast by a variable source.
///
/// A source broadcasts updates for every variable it serves; consumers
/// filter on `variable`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableUpdate {
    pub id: UpdateId,
    /// Name of the variable this update belongs to.
    pub variable: String,
    pub value: VariableValue,
    /// Engineering unit reported with the value, if any.
    pub unit: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl VariableUpdate {
    pub fn new(variable: impl Into<String>, value: VariableValue) -> Self {
        Self {
            id: UpdateId::new(),
            variable: variable.into(),
            value,
            unit: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }
}

/// Free-form presentation hints attached to a cached variable.
///
/// The cache stores these verbatim for the display layer; no invariants
/// are enforced here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayHints {
    /// Numeric display format (e.g. `"0.00"`).
    pub display_format: Option<String>,
    /// Text rendering format.
    pub string_format: Option<String>,
}
