#![forbid(unsafe_code)]

//! Composable, side-effect-free validation rules ("checks").
//!
//! A check is a stateless predicate/coercion unit: it either produces the
//! canonical form of a value or a [`CheckError`] describing the violated
//! rule. Checks compose into ordered [`CheckChain`]s; a chain threads the
//! value through every rule in order.
//!
//! # Invariants
//!
//! 1. Checks are pure: the same input always yields the same output, and
//!    nothing else changes.
//! 2. Canonicalization is stable: for every check `c` and accepted value
//!    `v`, `c(c(v)) == c(v)`.
//! 3. A nullable chain passes [`Value::Null`] through before any rule runs;
//!    `Null` never reaches the individual checks.

use std::rc::Rc;

use crate::error::CheckError;
use crate::value::{Value, ValueKind};

/// A single validation/coercion rule.
pub trait Check {
    /// Validate `value`, returning its canonical form.
    fn check(&self, value: Value) -> Result<Value, CheckError>;

    /// One-line human-readable description of the rule, for documentation
    /// and debug output.
    fn describe(&self) -> String;
}

fn bound_text<T: std::fmt::Display>(bound: Option<T>, unbounded: &str) -> String {
    match bound {
        Some(b) => b.to_string(),
        None => unbounded.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Numeric checks
// ---------------------------------------------------------------------------

/// Integer rule with optional bounds.
///
/// The default mode coerces: booleans, zero-fraction floats, and numeric
/// text all convert. The strict variant rejects anything that is not
/// already an integer.
#[derive(Debug, Clone, Default)]
pub struct IntCheck {
    min: Option<i64>,
    max: Option<i64>,
    strict: bool,
}

impl IntCheck {
    /// Coercing, unbounded integer rule.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Require values in `[min, max]` (inclusive).
    #[must_use]
    pub fn range(min: i64, max: i64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
            strict: false,
        }
    }

    /// Set the lower bound.
    #[must_use]
    pub fn min(mut self, min: i64) -> Self {
        self.min = Some(min);
        self
    }

    /// Set the upper bound.
    #[must_use]
    pub fn max(mut self, max: i64) -> Self {
        self.max = Some(max);
        self
    }

    /// Reject values whose runtime kind is not already integer.
    #[must_use]
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    fn bounds(&self, i: i64) -> Result<Value, CheckError> {
        let below = self.min.is_some_and(|min| i < min);
        let above = self.max.is_some_and(|max| i > max);
        if below || above {
            return Err(CheckError::OutOfRange {
                min: bound_text(self.min, "-inf"),
                max: bound_text(self.max, "inf"),
            });
        }
        Ok(Value::Int(i))
    }
}

impl Check for IntCheck {
    fn check(&self, value: Value) -> Result<Value, CheckError> {
        match value {
            Value::Int(i) => self.bounds(i),
            _ if self.strict => Err(CheckError::WrongKind {
                expected: "an integer",
                got: value.kind(),
            }),
            Value::Bool(b) => self.bounds(i64::from(b)),
            Value::Float(x) if x.fract() == 0.0 && x.is_finite() => self.bounds(x as i64),
            Value::Text(s) => match s.trim().parse::<i64>() {
                Ok(i) => self.bounds(i),
                Err(_) => Err(CheckError::Unconvertible {
                    got: s,
                    target: "an integer",
                }),
            },
            other => Err(CheckError::Unconvertible {
                got: other.to_string(),
                target: "an integer",
            }),
        }
    }

    fn describe(&self) -> String {
        match (self.min, self.max) {
            (None, None) => "an integer".to_string(),
            (min, max) => format!(
                "an integer in [{}, {}]",
                bound_text(min, "-inf"),
                bound_text(max, "inf")
            ),
        }
    }
}

/// Float rule with optional bounds.
///
/// The default mode coerces booleans, integers, and numeric text; the
/// strict variant rejects anything that is not already a float.
#[derive(Debug, Clone, Default)]
pub struct FloatCheck {
    min: Option<f64>,
    max: Option<f64>,
    strict: bool,
}

impl FloatCheck {
    /// Coercing, unbounded float rule.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Require values in `[min, max]` (inclusive).
    #[must_use]
    pub fn range(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
            strict: false,
        }
    }

    /// Set the lower bound.
    #[must_use]
    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    /// Set the upper bound.
    #[must_use]
    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    /// Reject values whose runtime kind is not already float.
    #[must_use]
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    fn bounds(&self, x: f64) -> Result<Value, CheckError> {
        let below = self.min.is_some_and(|min| x < min);
        let above = self.max.is_some_and(|max| x > max);
        if below || above {
            return Err(CheckError::OutOfRange {
                min: bound_text(self.min, "-inf"),
                max: bound_text(self.max, "inf"),
            });
        }
        Ok(Value::Float(x))
    }
}

impl Check for FloatCheck {
    fn check(&self, value: Value) -> Result<Value, CheckError> {
        match value {
            Value::Float(x) => self.bounds(x),
            _ if self.strict => Err(CheckError::WrongKind {
                expected: "a float",
                got: value.kind(),
            }),
            Value::Int(i) => self.bounds(i as f64),
            Value::Bool(b) => self.bounds(if b { 1.0 } else { 0.0 }),
            Value::Text(s) => match s.trim().parse::<f64>() {
                Ok(x) => self.bounds(x),
                Err(_) => Err(CheckError::Unconvertible {
                    got: s,
                    target: "a float",
                }),
            },
            other => Err(CheckError::Unconvertible {
                got: other.to_string(),
                target: "a float",
            }),
        }
    }

    fn describe(&self) -> String {
        match (self.min, self.max) {
            (None, None) => "a float".to_string(),
            (min, max) => format!(
                "a float in [{}, {}]",
                bound_text(min, "-inf"),
                bound_text(max, "inf")
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Boolean / text checks
// ---------------------------------------------------------------------------

const TRUE_WORDS: [&str; 3] = ["true", "yes", "on"];
const FALSE_WORDS: [&str; 3] = ["false", "no", "off"];

/// Boolean rule accepting fuzzy text forms.
///
/// Any case-insensitive, unambiguous prefix of "true"/"yes"/"on" maps to
/// `true` and of "false"/"no"/"off" to `false` ("Tru", "FAL", "y" all
/// work; "o" is ambiguous between "on" and "off" and is rejected). The
/// integers 0 and 1 also convert.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoolCheck;

impl BoolCheck {
    /// Create the rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn from_text(s: &str) -> Option<bool> {
        let lower = s.trim().to_ascii_lowercase();
        if lower.is_empty() {
            return None;
        }
        match lower.as_str() {
            "1" => return Some(true),
            "0" => return Some(false),
            _ => {}
        }
        let truthy = TRUE_WORDS.iter().any(|w| w.starts_with(&lower));
        let falsy = FALSE_WORDS.iter().any(|w| w.starts_with(&lower));
        match (truthy, falsy) {
            (true, false) => Some(true),
            (false, true) => Some(false),
            _ => None,
        }
    }
}

impl Check for BoolCheck {
    fn check(&self, value: Value) -> Result<Value, CheckError> {
        match value {
            Value::Bool(b) => Ok(Value::Bool(b)),
            Value::Int(0) => Ok(Value::Bool(false)),
            Value::Int(1) => Ok(Value::Bool(true)),
            Value::Text(s) => Self::from_text(&s).map(Value::Bool).ok_or(CheckError::Unconvertible {
                got: s,
                target: "a boolean",
            }),
            other => Err(CheckError::WrongKind {
                expected: "a boolean",
                got: other.kind(),
            }),
        }
    }

    fn describe(&self) -> String {
        "a boolean".to_string()
    }
}

/// Text rule.
///
/// The default mode coerces scalars (bool/int/float) to their display
/// text; the strict variant rejects anything that is not already text.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextCheck {
    strict: bool,
}

impl TextCheck {
    /// Coercing text rule.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject values whose runtime kind is not already text.
    #[must_use]
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }
}

impl Check for TextCheck {
    fn check(&self, value: Value) -> Result<Value, CheckError> {
        match value {
            Value::Text(s) => Ok(Value::Text(s)),
            _ if self.strict => Err(CheckError::WrongKind {
                expected: "text",
                got: value.kind(),
            }),
            Value::Bool(_) | Value::Int(_) | Value::Float(_) => {
                Ok(Value::Text(value.to_string()))
            }
            other => Err(CheckError::WrongKind {
                expected: "text",
                got: other.kind(),
            }),
        }
    }

    fn describe(&self) -> String {
        "text".to_string()
    }
}

// ---------------------------------------------------------------------------
// Set-membership checks
// ---------------------------------------------------------------------------

/// Closed enumerated set of canonical values.
///
/// Rejection messages enumerate the full valid set; UI error text relies on
/// that enumeration, so it is locked by tests.
#[derive(Debug, Clone)]
pub struct ChoiceCheck {
    choices: Vec<Value>,
}

impl ChoiceCheck {
    /// Build from arbitrary canonical values.
    #[must_use]
    pub fn new(choices: impl IntoIterator<Item = Value>) -> Self {
        Self {
            choices: choices.into_iter().collect(),
        }
    }

    /// Build from text choices.
    #[must_use]
    pub fn text<S: Into<String>>(choices: impl IntoIterator<Item = S>) -> Self {
        Self::new(choices.into_iter().map(|s| Value::Text(s.into())))
    }

    /// The canonical values, in declaration order.
    #[must_use]
    pub fn choices(&self) -> &[Value] {
        &self.choices
    }

    fn listing(&self) -> String {
        self.choices
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Check for ChoiceCheck {
    fn check(&self, value: Value) -> Result<Value, CheckError> {
        if self.choices.contains(&value) {
            Ok(value)
        } else {
            Err(CheckError::NotAChoice {
                choices: self.listing(),
            })
        }
    }

    fn describe(&self) -> String {
        format!("one of [{}]", self.listing())
    }
}

/// Key-to-canonical-value lookup that accepts either side.
///
/// Checking a key yields the canonical value; checking a canonical value
/// passes it through unchanged, so canonicalization is stable.
#[derive(Debug, Clone)]
pub struct MappingCheck {
    pairs: Vec<(String, Value)>,
}

impl MappingCheck {
    /// Build from `(key, canonical value)` pairs.
    #[must_use]
    pub fn new<S: Into<String>>(pairs: impl IntoIterator<Item = (S, Value)>) -> Self {
        Self {
            pairs: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    fn listing(&self) -> String {
        self.pairs
            .iter()
            .map(|(k, v)| format!("{k} => {v}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Check for MappingCheck {
    fn check(&self, value: Value) -> Result<Value, CheckError> {
        // Canonical values pass through first, so mapping output is stable.
        if self.pairs.iter().any(|(_, v)| *v == value) {
            return Ok(value);
        }
        if let Value::Text(ref key) = value {
            if let Some((_, canonical)) = self.pairs.iter().find(|(k, _)| k == key) {
                return Ok(canonical.clone());
            }
        }
        Err(CheckError::NotInMapping {
            mapping: self.listing(),
        })
    }

    fn describe(&self) -> String {
        format!("one of {{{}}}", self.listing())
    }
}

// ---------------------------------------------------------------------------
// Pattern / kind checks
// ---------------------------------------------------------------------------

/// Text rule requiring a full regex match.
#[derive(Debug, Clone)]
pub struct RegexCheck {
    pattern: String,
    compiled: regex::Regex,
}

impl RegexCheck {
    /// Compile `pattern` as a full-match rule.
    ///
    /// # Errors
    ///
    /// Returns the regex compilation error for an invalid pattern.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: pattern.to_string(),
            compiled: regex::Regex::new(&format!("^(?:{pattern})$"))?,
        })
    }
}

impl Check for RegexCheck {
    fn check(&self, value: Value) -> Result<Value, CheckError> {
        match value {
            Value::Text(s) if self.compiled.is_match(&s) => Ok(Value::Text(s)),
            Value::Text(_) => Err(CheckError::NoMatch {
                pattern: self.pattern.clone(),
            }),
            other => Err(CheckError::WrongKind {
                expected: "text",
                got: other.kind(),
            }),
        }
    }

    fn describe(&self) -> String {
        format!("text matching `{}`", self.pattern)
    }
}

/// Value must already have the given runtime kind; no coercion.
#[derive(Debug, Clone, Copy)]
pub struct KindCheck {
    expected: ValueKind,
}

impl KindCheck {
    /// Require `expected`.
    #[must_use]
    pub fn new(expected: ValueKind) -> Self {
        Self { expected }
    }
}

impl Check for KindCheck {
    fn check(&self, value: Value) -> Result<Value, CheckError> {
        if value.kind() == self.expected {
            Ok(value)
        } else {
            Err(CheckError::WrongKind {
                expected: match self.expected {
                    ValueKind::Undefined => "undefined",
                    ValueKind::Null => "null",
                    ValueKind::Bool => "a boolean",
                    ValueKind::Int => "an integer",
                    ValueKind::Float => "a float",
                    ValueKind::Text => "text",
                    ValueKind::List => "a list",
                    ValueKind::Map => "a mapping",
                },
                got: value.kind(),
            })
        }
    }

    fn describe(&self) -> String {
        self.expected.to_string()
    }
}

// ---------------------------------------------------------------------------
// Chains
// ---------------------------------------------------------------------------

/// Ordered composition of checks with an optional null pass-through.
///
/// Chains are cheap to clone (rules are reference-counted) and reusable
/// across many attribute descriptors.
#[derive(Clone, Default)]
pub struct CheckChain {
    checks: Vec<Rc<dyn Check>>,
    nullable: bool,
}

impl CheckChain {
    /// An empty chain that accepts anything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A chain with a single rule.
    #[must_use]
    pub fn single(check: impl Check + 'static) -> Self {
        Self::new().with(check)
    }

    /// Append a rule.
    #[must_use]
    pub fn with(mut self, check: impl Check + 'static) -> Self {
        self.checks.push(Rc::new(check));
        self
    }

    /// Let [`Value::Null`] pass through before any rule runs.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Whether null passes through.
    #[must_use]
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Number of rules in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.checks.len()
    }

    /// Whether the chain has no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}

impl Check for CheckChain {
    fn check(&self, value: Value) -> Result<Value, CheckError> {
        if self.nullable && value.is_null() {
            return Ok(Value::Null);
        }
        let mut current = value;
        for check in &self.checks {
            current = check.check(current)?;
        }
        Ok(current)
    }

    fn describe(&self) -> String {
        if self.checks.is_empty() {
            return "any value".to_string();
        }
        let body = self
            .checks
            .iter()
            .map(|c| c.describe())
            .collect::<Vec<_>>()
            .join(", then ");
        if self.nullable {
            format!("null or {body}")
        } else {
            body
        }
    }
}

impl std::fmt::Debug for CheckChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckChain")
            .field("rule", &self.describe())
            .field("nullable", &self.nullable)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_coerces_text_bool_and_whole_floats() {
        let check = IntCheck::new();
        assert_eq!(check.check(Value::from("42")).unwrap(), Value::Int(42));
        assert_eq!(check.check(Value::Bool(true)).unwrap(), Value::Int(1));
        assert_eq!(check.check(Value::Float(3.0)).unwrap(), Value::Int(3));
        assert!(check.check(Value::Float(3.5)).is_err());
        assert!(check.check(Value::from("forty")).is_err());
    }

    #[test]
    fn strict_int_rejects_convertible_kinds() {
        let check = IntCheck::new().strict();
        assert_eq!(check.check(Value::Int(5)).unwrap(), Value::Int(5));
        assert!(matches!(
            check.check(Value::from("5")),
            Err(CheckError::WrongKind { .. })
        ));
        assert!(check.check(Value::Float(5.0)).is_err());
    }

    #[test]
    fn int_range_message_is_readable() {
        let check = IntCheck::range(0, 10);
        let err = check.check(Value::Int(11)).unwrap_err();
        assert_eq!(err.to_string(), "must be in the range [0, 10]");
        assert_eq!(check.check(Value::Int(10)).unwrap(), Value::Int(10));
    }

    #[test]
    fn int_half_open_bounds() {
        let check = IntCheck::new().min(1);
        assert!(check.check(Value::Int(0)).is_err());
        let err = check.check(Value::Int(0)).unwrap_err();
        assert_eq!(err.to_string(), "must be in the range [1, inf]");
    }

    #[test]
    fn float_coerces_int_and_text() {
        let check = FloatCheck::new();
        assert_eq!(check.check(Value::Int(2)).unwrap(), Value::Float(2.0));
        assert_eq!(check.check(Value::from("2.5")).unwrap(), Value::Float(2.5));
        assert!(check.check(Value::from("two")).is_err());
    }

    #[test]
    fn float_bounds() {
        let check = FloatCheck::range(0.0, 1.0);
        assert!(check.check(Value::Float(1.5)).is_err());
        assert_eq!(check.check(Value::Float(0.5)).unwrap(), Value::Float(0.5));
    }

    #[test]
    fn bool_accepts_fuzzy_prefixes() {
        let check = BoolCheck::new();
        for text in ["Tru", "true", "YES", "y", "on", "1"] {
            assert_eq!(
                check.check(Value::from(text)).unwrap(),
                Value::Bool(true),
                "{text} should read as true"
            );
        }
        for text in ["Fal", "FALSE", "n", "off", "0", "No"] {
            assert_eq!(
                check.check(Value::from(text)).unwrap(),
                Value::Bool(false),
                "{text} should read as false"
            );
        }
    }

    #[test]
    fn bool_rejects_ambiguous_prefix() {
        // "o" is a prefix of both "on" and "off".
        assert!(BoolCheck::new().check(Value::from("o")).is_err());
        assert!(BoolCheck::new().check(Value::from("")).is_err());
        assert!(BoolCheck::new().check(Value::from("maybe")).is_err());
    }

    #[test]
    fn text_coerces_scalars() {
        let check = TextCheck::new();
        assert_eq!(check.check(Value::Int(3)).unwrap(), Value::from("3"));
        assert_eq!(check.check(Value::Bool(true)).unwrap(), Value::from("true"));
        assert!(TextCheck::new().strict().check(Value::Int(3)).is_err());
    }

    #[test]
    fn choice_rejects_with_full_listing() {
        let check = ChoiceCheck::text(["X", "Y", "XY", "XERR", "YERR", "LABEL"]);
        let err = check.check(Value::from("Z")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "must be one of [X, Y, XY, XERR, YERR, LABEL]"
        );
        assert_eq!(check.check(Value::from("XERR")).unwrap(), Value::from("XERR"));
    }

    #[test]
    fn mapping_accepts_either_side() {
        let check = MappingCheck::new([("solid", Value::Int(0)), ("dashed", Value::Int(1))]);
        assert_eq!(check.check(Value::from("dashed")).unwrap(), Value::Int(1));
        assert_eq!(check.check(Value::Int(0)).unwrap(), Value::Int(0));
        let err = check.check(Value::from("dotted")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "must be one of {solid => 0, dashed => 1}"
        );
    }

    #[test]
    fn regex_full_match_only() {
        let check = RegexCheck::new("[a-z]+[0-9]*").unwrap();
        assert!(check.check(Value::from("col2")).is_ok());
        assert!(check.check(Value::from("2col")).is_err());
        assert!(check.check(Value::Int(2)).is_err());
    }

    #[test]
    fn kind_check_no_coercion() {
        let check = KindCheck::new(ValueKind::Float);
        assert!(check.check(Value::Float(1.0)).is_ok());
        assert!(check.check(Value::Int(1)).is_err());
    }

    #[test]
    fn chain_threads_in_order() {
        // Coerce to int first, then bound it.
        let chain = CheckChain::new()
            .with(IntCheck::new())
            .with(IntCheck::range(0, 100));
        assert_eq!(chain.check(Value::from("55")).unwrap(), Value::Int(55));
        assert!(chain.check(Value::from("200")).is_err());
    }

    #[test]
    fn nullable_chain_passes_null_through() {
        let chain = CheckChain::single(IntCheck::new()).nullable();
        assert_eq!(chain.check(Value::Null).unwrap(), Value::Null);
        assert!(CheckChain::single(IntCheck::new())
            .check(Value::Null)
            .is_err());
    }

    #[test]
    fn canonicalization_is_idempotent() {
        let checks: Vec<Box<dyn Check>> = vec![
            Box::new(IntCheck::new()),
            Box::new(FloatCheck::new()),
            Box::new(BoolCheck::new()),
            Box::new(TextCheck::new()),
            Box::new(ChoiceCheck::text(["X", "Y"])),
            Box::new(MappingCheck::new([("a", Value::Int(1))])),
        ];
        let inputs = [
            Value::from("42"),
            Value::Float(1.5),
            Value::from("Tru"),
            Value::Int(7),
            Value::from("X"),
            Value::from("a"),
        ];
        for check in &checks {
            for input in &inputs {
                if let Ok(once) = check.check(input.clone()) {
                    let twice = check.check(once.clone()).unwrap();
                    assert_eq!(once, twice, "{} must be stable", check.describe());
                }
            }
        }
    }

    #[test]
    fn describe_is_informative() {
        assert_eq!(IntCheck::range(0, 5).describe(), "an integer in [0, 5]");
        assert_eq!(
            CheckChain::single(FloatCheck::new()).nullable().describe(),
            "null or a float"
        );
        assert_eq!(CheckChain::new().describe(), "any value");
    }
}
