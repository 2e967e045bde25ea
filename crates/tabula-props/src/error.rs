#![forbid(unsafe_code)]

//! Error types for the check and property layers.
//!
//! Messages are constructed to be end-user-readable; the UI layer surfaces
//! them verbatim, so their text is a stable contract locked by tests.

use thiserror::Error;

use crate::value::ValueKind;

/// A value failed a single validation rule.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CheckError {
    /// The runtime kind of the value does not match the rule.
    #[error("must be {expected}, got {got}")]
    WrongKind {
        /// Human-readable name of the expected representation.
        expected: &'static str,
        /// Kind of the offending value.
        got: ValueKind,
    },

    /// A coercing rule could not convert the value.
    #[error("cannot interpret {got} as {target}")]
    Unconvertible {
        /// Display form of the offending value.
        got: String,
        /// Human-readable name of the target representation.
        target: &'static str,
    },

    /// A numeric value fell outside its bounds.
    #[error("must be in the range [{min}, {max}]")]
    OutOfRange {
        /// Display form of the lower bound ("-inf" when unbounded).
        min: String,
        /// Display form of the upper bound ("inf" when unbounded).
        max: String,
    },

    /// A value was not a member of a closed enumerated set.
    #[error("must be one of [{choices}]")]
    NotAChoice {
        /// Comma-separated display of every valid value.
        choices: String,
    },

    /// A value was neither a key nor a canonical value of a mapping.
    #[error("must be one of {{{mapping}}}")]
    NotInMapping {
        /// Comma-separated `key => value` display of the mapping.
        mapping: String,
    },

    /// A text value did not match the required pattern.
    #[error("must match the pattern `{pattern}`")]
    NoMatch {
        /// The pattern source text.
        pattern: String,
    },
}

/// An attribute-level validation failure.
///
/// Always names the attribute, the offending value, and the specific rule
/// violated — never a bare failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// The value failed the attribute's check chain.
    #[error("invalid value {value} for attribute `{attribute}`: {source}")]
    Value {
        /// Name of the attribute being set.
        attribute: String,
        /// Display form of the offending value.
        value: String,
        /// The rule that rejected it.
        #[source]
        source: CheckError,
    },

    /// The attribute name is not declared anywhere in the class hierarchy.
    #[error("unknown attribute `{attribute}`")]
    UnknownAttribute {
        /// The undeclared name.
        attribute: String,
    },

    /// A required attribute was neither supplied nor defaulted.
    #[error("attribute `{attribute}` is required")]
    Missing {
        /// The required attribute's name.
        attribute: String,
    },
}

impl ValidationError {
    /// Wrap a rule failure with its attribute context.
    #[must_use]
    pub fn value(attribute: impl Into<String>, value: impl std::fmt::Display, source: CheckError) -> Self {
        Self::Value {
            attribute: attribute.into(),
            value: value.to_string(),
            source,
        }
    }

    /// The attribute the failure names.
    #[must_use]
    pub fn attribute(&self) -> &str {
        match self {
            Self::Value { attribute, .. }
            | Self::UnknownAttribute { attribute }
            | Self::Missing { attribute } => attribute,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choice_message_lists_valid_set() {
        let err = CheckError::NotAChoice {
            choices: "X, Y, XY, XERR, YERR, LABEL".into(),
        };
        assert_eq!(err.to_string(), "must be one of [X, Y, XY, XERR, YERR, LABEL]");
    }

    #[test]
    fn range_message_names_bounds() {
        let err = CheckError::OutOfRange {
            min: "0".into(),
            max: "10".into(),
        };
        assert_eq!(err.to_string(), "must be in the range [0, 10]");
    }

    #[test]
    fn validation_error_names_attribute_and_value() {
        let err = ValidationError::value(
            "designation",
            "Z",
            CheckError::NotAChoice {
                choices: "X, Y".into(),
            },
        );
        let text = err.to_string();
        assert!(text.contains("designation"));
        assert!(text.contains('Z'));
        assert!(text.contains("must be one of"));
        assert_eq!(err.attribute(), "designation");
    }
}
