use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

use crate::value::Value;

/// Key identifying a validator and the error it produces. Built-in validators
/// use their own name ("required", "min", ...); custom validators pick any
/// static string.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ErrorKey(&'static str);

impl ErrorKey {
    pub const fn new(value: &'static str) -> Self {
        Self(value)
    }

    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

impl Display for ErrorKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

pub type ValidatorFn = Arc<dyn Fn(&Value) -> Option<ErrorKey> + Send + Sync>;

/// A keyed validation function. `evaluate` returns the key itself on failure
/// and `None` on success; failures are data, never errors.
#[derive(Clone)]
pub struct Validator {
    key: ErrorKey,
    evaluate: ValidatorFn,
}

impl Validator {
    pub fn new(
        key: ErrorKey,
        evaluate: impl Fn(&Value) -> Option<ErrorKey> + Send + Sync + 'static,
    ) -> Self {
        Self {
            key,
            evaluate: Arc::new(evaluate),
        }
    }

    pub fn key(&self) -> ErrorKey {
        self.key
    }

    pub(crate) fn run(&self, value: &Value) -> Option<ErrorKey> {
        (self.evaluate)(value)
    }
}

impl Debug for Validator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator").field("key", &self.key).finish()
    }
}

/// Ordered validator collection, unique by key. Evaluation order follows
/// registration order.
#[derive(Clone, Debug, Default)]
pub struct ValidatorSet {
    validators: Vec<Validator>,
}

impl ValidatorSet {
    pub fn new(validators: impl IntoIterator<Item = Validator>) -> Self {
        let mut set = Self::default();
        for validator in validators {
            set.add(validator);
        }
        set
    }

    /// Appends the validator unless one with the same key is already
    /// registered; the first registration wins.
    pub fn add(&mut self, validator: Validator) {
        if self.contains(validator.key()) {
            return;
        }
        self.validators.push(validator);
    }

    /// Removes every validator registered under `key`, and only those.
    pub fn remove(&mut self, key: ErrorKey) {
        self.validators.retain(|validator| validator.key() != key);
    }

    pub fn contains(&self, key: ErrorKey) -> bool {
        self.validators
            .iter()
            .any(|validator| validator.key() == key)
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// Runs every validator against `value` and collects the failures in
    /// registration order.
    pub fn evaluate(&self, value: &Value) -> Vec<ErrorKey> {
        self.validators
            .iter()
            .filter_map(|validator| validator.run(value))
            .collect()
    }
}

/// Validation capability of a control: the registered set plus the error list
/// produced by the most recent evaluation.
#[derive(Clone, Debug, Default)]
pub(crate) struct Validation {
    set: ValidatorSet,
    errors: Vec<ErrorKey>,
}

impl Validation {
    pub(crate) fn new(set: ValidatorSet) -> Self {
        Self {
            set,
            errors: Vec::new(),
        }
    }

    /// Re-evaluates against `value`, replacing the previous error list.
    pub(crate) fn run(&mut self, value: &Value) {
        self.errors = self.set.evaluate(value);
    }

    pub(crate) fn errors(&self) -> &[ErrorKey] {
        &self.errors
    }

    pub(crate) fn add(&mut self, validator: Validator) {
        self.set.add(validator);
    }

    pub(crate) fn remove(&mut self, key: ErrorKey) {
        self.set.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failing(key: &'static str) -> Validator {
        let key = ErrorKey::new(key);
        Validator::new(key, move |_| Some(key))
    }

    fn passing(key: &'static str) -> Validator {
        Validator::new(ErrorKey::new(key), |_| None)
    }

    #[test]
    fn duplicate_keys_are_dropped_on_construction() {
        let set = ValidatorSet::new([failing("min"), passing("min"), failing("max")]);
        assert_eq!(set.len(), 2);
        // First registration wins: the failing "min" stays in place.
        assert_eq!(
            set.evaluate(&Value::Null),
            vec![ErrorKey::new("min"), ErrorKey::new("max")]
        );
    }

    #[test]
    fn add_with_existing_key_is_a_noop() {
        let mut set = ValidatorSet::new([failing("required")]);
        set.add(passing("required"));
        assert_eq!(set.len(), 1);
        assert_eq!(set.evaluate(&Value::Null), vec![ErrorKey::new("required")]);
    }

    #[test]
    fn remove_deletes_only_the_matching_key() {
        let mut set = ValidatorSet::new([failing("min"), failing("required")]);
        set.remove(ErrorKey::new("min"));
        assert_eq!(set.len(), 1);
        assert!(set.contains(ErrorKey::new("required")));
        assert!(!set.contains(ErrorKey::new("min")));
    }

    #[test]
    fn evaluation_preserves_registration_order() {
        let set = ValidatorSet::new([failing("b"), failing("a"), passing("c")]);
        assert_eq!(
            set.evaluate(&Value::Null),
            vec![ErrorKey::new("b"), ErrorKey::new("a")]
        );
    }

    #[test]
    fn empty_set_never_produces_errors() {
        let mut validation = Validation::new(ValidatorSet::default());
        validation.run(&Value::Null);
        assert!(validation.errors().is_empty());
    }
}
