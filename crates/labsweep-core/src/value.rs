//! Cell values carried through sweep rows.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One value stored in a row field, a setpoint, or a context entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Scalar numeric reading or setpoint.
    Numeric(f64),
    /// Array-valued reading (trace, spectrum, sweep of an instrument).
    Array(Vec<f64>),
    /// Free-form text.
    Text(String),
}

impl Value {
    /// Returns the scalar payload, if this is a numeric value.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Numeric(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the array payload, if this is an array value.
    pub fn as_array(&self) -> Option<&[f64]> {
        match self {
            Value::Array(values) => Some(values),
            _ => None,
        }
    }

    /// Returns the text payload, if this is a text value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns `true` for [`Value::Numeric`].
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Numeric(_))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Numeric(v) => write!(f, "{v}"),
            Value::Array(values) => {
                write!(f, "[")?;
                for (idx, v) in values.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            }
            Value::Text(text) => f.write_str(text),
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Numeric(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Numeric(f64::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Numeric(value as f64)
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Value::Numeric(value as f64)
    }
}

impl From<Vec<f64>> for Value {
    fn from(values: Vec<f64>) -> Self {
        Value::Array(values)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_column_text() {
        assert_eq!(Value::from(1).to_string(), "1");
        assert_eq!(Value::from(0.25).to_string(), "0.25");
        assert_eq!(Value::from(vec![1.0, 2.5]).to_string(), "[1, 2.5]");
        assert_eq!(Value::from("open").to_string(), "open");
    }

    #[test]
    fn untagged_json_shape() {
        let json = serde_json::to_string(&vec![Value::from(2), Value::from(vec![1.0])])
            .expect("json");
        assert_eq!(json, "[2.0,[1.0]]");
    }
}
