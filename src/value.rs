use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Dynamic value carried by a control. Group values are derived from children
/// and always take the `List`/`Map` shapes produced by the aggregators.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<Value>),
    Map(IndexMap<String, Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, Value::List(_) | Value::Map(_))
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(number) => Some(*number as f64),
            Value::Float(number) => Some(*number),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    /// The "empty input" test used by the `required` validator: null, NaN,
    /// empty text, or an empty list.
    pub fn is_empty_input(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Float(number) => number.is_nan(),
            Value::Text(text) => text.is_empty(),
            Value::List(items) => items.is_empty(),
            _ => false,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(fields) => fields.get(key),
            _ => None,
        }
    }

    pub fn at(&self, index: usize) -> Option<&Value> {
        match self {
            Value::List(items) => items.get(index),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(value: IndexMap<String, Value>) -> Self {
        Value::Map(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_covers_null_nan_and_empty_sequences() {
        assert!(Value::Null.is_empty_input());
        assert!(Value::Float(f64::NAN).is_empty_input());
        assert!(Value::from("").is_empty_input());
        assert!(Value::List(Vec::new()).is_empty_input());

        assert!(!Value::from(0).is_empty_input());
        assert!(!Value::from(false).is_empty_input());
        assert!(!Value::from("x").is_empty_input());
        assert!(!Value::Map(IndexMap::new()).is_empty_input());
    }

    #[test]
    fn numeric_coercion_covers_int_and_float_only() {
        assert_eq!(Value::from(3).as_f64(), Some(3.0));
        assert_eq!(Value::from(2.5).as_f64(), Some(2.5));
        assert_eq!(Value::from("3").as_f64(), None);
        assert_eq!(Value::Null.as_f64(), None);
    }

    #[test]
    fn navigation_reaches_nested_entries() {
        let value = Value::Map(IndexMap::from([(
            "items".to_string(),
            Value::List(vec![Value::from(1), Value::from(2)]),
        )]));
        assert_eq!(
            value.get("items").and_then(|items| items.at(1)),
            Some(&Value::from(2))
        );
        assert_eq!(value.get("missing"), None);
    }
}
