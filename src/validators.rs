use regex::Regex;

use crate::validation::{ErrorKey, Validator};
use crate::value::Value;

/// Fails with "required" on empty input: null, NaN, empty text, or an empty
/// list.
pub fn required() -> Validator {
    let key = ErrorKey::new("required");
    Validator::new(key, move |value| value.is_empty_input().then_some(key))
}

/// Fails with "min" unless the value is numeric and at least `limit`.
pub fn min(limit: f64) -> Validator {
    let key = ErrorKey::new("min");
    Validator::new(key, move |value| match value.as_f64() {
        Some(number) if number >= limit => None,
        _ => Some(key),
    })
}

/// Fails with "max" unless the value is numeric and at most `limit`.
pub fn max(limit: f64) -> Validator {
    let key = ErrorKey::new("max");
    Validator::new(key, move |value| match value.as_f64() {
        Some(number) if number <= limit => None,
        _ => Some(key),
    })
}

/// Fails with "range" unless the value is null or numeric within the closed
/// interval.
pub fn range(lower: f64, upper: f64) -> Validator {
    let key = ErrorKey::new("range");
    Validator::new(key, move |value| {
        if value.is_null() {
            return None;
        }
        match value.as_f64() {
            Some(number) if number >= lower && number <= upper => None,
            _ => Some(key),
        }
    })
}

/// Fails with "format" unless the value is null, empty text, or text matching
/// the pattern.
pub fn format(pattern: Regex) -> Validator {
    let key = ErrorKey::new("format");
    Validator::new(key, move |value| match value {
        Value::Null => None,
        Value::Text(text) if text.is_empty() || pattern.is_match(text) => None,
        _ => Some(key),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fails(validator: &Validator, value: impl Into<Value>) -> bool {
        validator.run(&value.into()).is_some()
    }

    #[test]
    fn required_rejects_empty_input_only() {
        let validator = required();
        assert!(fails(&validator, Value::Null));
        assert!(fails(&validator, ""));
        assert!(fails(&validator, f64::NAN));
        assert!(!fails(&validator, 0));
        assert!(!fails(&validator, "x"));
        assert!(!fails(&validator, false));
    }

    #[test]
    fn min_and_max_bound_numeric_values() {
        assert!(fails(&min(10.0), 5));
        assert!(!fails(&min(10.0), 10));
        assert!(!fails(&min(10.0), 12.5));
        assert!(fails(&min(10.0), "12"));
        assert!(fails(&min(10.0), Value::Null));

        assert!(fails(&max(10.0), 11));
        assert!(!fails(&max(10.0), 10));
        assert!(fails(&max(10.0), Value::Null));
    }

    #[test]
    fn range_passes_null_and_in_interval_numbers() {
        let validator = range(1.0, 5.0);
        assert!(!fails(&validator, Value::Null));
        assert!(!fails(&validator, 1));
        assert!(!fails(&validator, 5));
        assert!(fails(&validator, 0));
        assert!(fails(&validator, 6));
        assert!(fails(&validator, "3"));
    }

    #[test]
    fn format_matches_text_against_the_pattern() {
        let validator = format(Regex::new("^[a-z]+$").expect("valid pattern"));
        assert!(!fails(&validator, Value::Null));
        assert!(!fails(&validator, ""));
        assert!(!fails(&validator, "abc"));
        assert!(fails(&validator, "ABC"));
        assert!(fails(&validator, 3));
    }

    #[test]
    fn failures_carry_the_validator_key() {
        assert_eq!(
            min(10.0).run(&Value::from(1)),
            Some(ErrorKey::new("min"))
        );
        assert_eq!(min(10.0).key(), ErrorKey::new("min"));
    }
}
