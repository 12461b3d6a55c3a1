//! Dynamically named agent field values.

use herd_core::AgentId;
use indexmap::IndexMap;
use serde::Serialize;

/// The value of a user-defined agent field.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// No value.
    #[default]
    Null,
    /// A boolean flag.
    Bool(bool),
    /// A number.
    Number(f64),
    /// A string.
    Text(String),
    /// A reference to another agent, by id.
    Agent(AgentId),
}

impl Value {
    /// The numeric value, if this is a number or a boolean (as 0/1).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// The boolean value, if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The string value, if this is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The referenced agent, if this is an agent reference.
    pub fn as_agent(&self) -> Option<AgentId> {
        match self {
            Self::Agent(id) => Some(*id),
            _ => None,
        }
    }

    /// Whether this is [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Number(v as f64)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<AgentId> for Value {
    fn from(v: AgentId) -> Self {
        Self::Agent(v)
    }
}

/// Field name to value table, used both for per-agent overrides and for
/// the shared default tables of sets and breeds.
pub type Vars = IndexMap<String, Value>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions() {
        assert_eq!(Value::from(2.5).as_f64(), Some(2.5));
        assert_eq!(Value::from(true).as_f64(), Some(1.0));
        assert_eq!(Value::from("red").as_str(), Some("red"));
        assert_eq!(Value::from(AgentId(4)).as_agent(), Some(AgentId(4)));
        assert_eq!(Value::from("x").as_f64(), None);
        assert!(Value::default().is_null());
    }
}
