use std::fmt::{Display, Formatter};
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::id::ControlId;
use crate::status::{StatusCell, StatusPredicate};
use crate::validation::{Validation, ValidatorSet};
use crate::value::Value;

/// Key of a child within a group: names for object-shaped groups, sequential
/// indices for array-shaped ones.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum ControlKey {
    Index(usize),
    Name(String),
}

impl Display for ControlKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ControlKey::Index(index) => write!(f, "{index}"),
            ControlKey::Name(name) => f.write_str(name),
        }
    }
}

impl From<usize> for ControlKey {
    fn from(value: usize) -> Self {
        ControlKey::Index(value)
    }
}

impl From<&str> for ControlKey {
    fn from(value: &str) -> Self {
        ControlKey::Name(value.to_string())
    }
}

impl From<String> for ControlKey {
    fn from(value: String) -> Self {
        ControlKey::Name(value)
    }
}

/// Derives a group's value from its `(key, child value)` pairs.
pub type Aggregator = Arc<dyn Fn(&[(ControlKey, Value)]) -> Value + Send + Sync>;

/// Object-shaped aggregation: a map from child key to child value, in key
/// order.
pub fn object_value(pairs: &[(ControlKey, Value)]) -> Value {
    Value::Map(
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect(),
    )
}

/// Array-shaped aggregation: the child values in key order.
pub fn array_value(pairs: &[(ControlKey, Value)]) -> Value {
    Value::List(pairs.iter().map(|(_, value)| value.clone()).collect())
}

/// New children handed to `Form::add_control`, either shape the group
/// factories accept.
#[derive(Clone, Debug)]
pub enum ControlEntries {
    Named(Vec<(String, ControlId)>),
    Indexed(Vec<ControlId>),
}

impl From<Vec<ControlId>> for ControlEntries {
    fn from(value: Vec<ControlId>) -> Self {
        ControlEntries::Indexed(value)
    }
}

impl<const N: usize> From<[ControlId; N]> for ControlEntries {
    fn from(value: [ControlId; N]) -> Self {
        ControlEntries::Indexed(value.to_vec())
    }
}

impl From<Vec<(String, ControlId)>> for ControlEntries {
    fn from(value: Vec<(String, ControlId)>) -> Self {
        ControlEntries::Named(value)
    }
}

impl<const N: usize> From<[(&str, ControlId); N]> for ControlEntries {
    fn from(value: [(&str, ControlId); N]) -> Self {
        ControlEntries::Named(
            value
                .into_iter()
                .map(|(key, id)| (key.to_string(), id))
                .collect(),
        )
    }
}

/// Children capability of a group: the ordered child map plus the injected
/// aggregation function.
pub(crate) struct Children {
    pub(crate) entries: IndexMap<ControlKey, ControlId>,
    pub(crate) aggregate: Aggregator,
}

/// One node of the control tree. Capabilities (value, validation, status,
/// parent link, children) each keep their own state and are assembled by
/// `ControlBuilder`.
pub(crate) struct ControlNode {
    pub(crate) id: ControlId,
    pub(crate) value: Value,
    pub(crate) validation: Validation,
    pub(crate) status: StatusCell,
    pub(crate) pristine: bool,
    pub(crate) touched: bool,
    pub(crate) parent: Option<ControlId>,
    pub(crate) children: Option<Children>,
}

impl ControlNode {
    pub(crate) fn is_group(&self) -> bool {
        self.children.is_some()
    }
}

pub(crate) struct ControlBuilder {
    value: Value,
    validators: ValidatorSet,
    predicate: Arc<dyn StatusPredicate>,
    children: Option<Children>,
}

impl ControlBuilder {
    pub(crate) fn new(predicate: Arc<dyn StatusPredicate>) -> Self {
        Self {
            value: Value::Null,
            validators: ValidatorSet::default(),
            predicate,
            children: None,
        }
    }

    pub(crate) fn value(mut self, value: Value) -> Self {
        self.value = value;
        self
    }

    pub(crate) fn validators(mut self, validators: ValidatorSet) -> Self {
        self.validators = validators;
        self
    }

    pub(crate) fn children(mut self, children: Children) -> Self {
        self.children = Some(children);
        self
    }

    pub(crate) fn build(self, id: ControlId) -> ControlNode {
        ControlNode {
            id,
            value: self.value,
            validation: Validation::new(self.validators),
            status: StatusCell::new(self.predicate),
            pristine: true,
            touched: false,
            parent: None,
            children: self.children,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregators_preserve_key_order() {
        let pairs = [
            (ControlKey::from("b"), Value::from(2)),
            (ControlKey::from("a"), Value::from(1)),
        ];
        let Value::Map(fields) = object_value(&pairs) else {
            panic!("object aggregation must produce a map");
        };
        assert_eq!(
            fields.keys().cloned().collect::<Vec<_>>(),
            vec!["b".to_string(), "a".to_string()]
        );

        let pairs = [
            (ControlKey::Index(0), Value::from(1)),
            (ControlKey::Index(1), Value::from(2)),
        ];
        assert_eq!(
            array_value(&pairs),
            Value::List(vec![Value::from(1), Value::from(2)])
        );
    }
}
