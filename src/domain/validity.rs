//! Native validity constraints for fields.
//!
//! Constraints are declared alongside the page and evaluated as a plain
//! boolean predicate, the way a browser evaluates `required`,
//! `minlength` and `maxlength` on an input.

use serde::{Deserialize, Serialize};

use super::models::FieldKind;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Constraints {
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub min_length: Option<usize>,
    #[serde(default)]
    pub max_length: Option<usize>,
}

impl Constraints {
    pub fn required() -> Self {
        Self {
            required: true,
            ..Self::default()
        }
    }

    /// Returns whether `value` satisfies these constraints for a field of `kind`.
    ///
    /// Length limits apply only to non-empty text, matching native behaviour
    /// where an empty optional field is always valid. A select value must be
    /// one of its options.
    pub fn check(&self, kind: &FieldKind, value: &str) -> bool {
        if value.is_empty() {
            return !self.required;
        }

        match kind {
            FieldKind::Select { options } => options.iter().any(|option| option == value),
            FieldKind::Text { .. } => {
                let length = value.chars().count();
                if self.min_length.is_some_and(|min| length < min) {
                    return false;
                }
                if self.max_length.is_some_and(|max| length > max) {
                    return false;
                }
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text() -> FieldKind {
        FieldKind::Text {
            placeholder: String::new(),
        }
    }

    #[test]
    fn test_required_empty_is_invalid() {
        assert!(!Constraints::required().check(&text(), ""));
        assert!(Constraints::default().check(&text(), ""));
    }

    #[test]
    fn test_length_limits() {
        let constraints = Constraints {
            required: true,
            min_length: Some(2),
            max_length: Some(4),
        };
        assert!(!constraints.check(&text(), "a"));
        assert!(constraints.check(&text(), "ab"));
        assert!(constraints.check(&text(), "abcd"));
        assert!(!constraints.check(&text(), "abcde"));
    }

    #[test]
    fn test_select_requires_known_option() {
        let kind = FieldKind::Select {
            options: vec!["Dog".to_string(), "Cat".to_string()],
        };
        let constraints = Constraints::required();
        assert!(constraints.check(&kind, "Dog"));
        assert!(!constraints.check(&kind, "Horse"));
        assert!(!constraints.check(&kind, ""));
    }
}
