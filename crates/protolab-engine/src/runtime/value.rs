use serde::{Deserialize, Serialize};

/// Dynamically typed value carried by a live module instance's properties.
/// Mirrors the loose value model of user-authored module code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
}

impl Value {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// The declared-type tag this value satisfies, if any.
    pub fn expose_type(&self) -> Option<ExposeType> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(ExposeType::Bool),
            Value::Number(_) => Some(ExposeType::Number),
            Value::String(_) => Some(ExposeType::String),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

/// Declared type of an exposed member, extracted from the compiled class
/// definition. Methods always carry `Function`; their parameter and return
/// types ride alongside in the metadata item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExposeType {
    Number,
    String,
    Bool,
    Function,
}
