#![forbid(unsafe_code)]

//! Attribute descriptors.
//!
//! A [`Property`] binds a check chain, a default-value rule, and
//! documentation metadata to a named slot on a property-bearing object.
//!
//! # Invariants
//!
//! - A slot's stored value is always either the chain's canonical output or
//!   the [`Value::Undefined`] sentinel meaning "never set".
//! - The default rule is evaluated lazily per-instance on first read, never
//!   once per class, so container defaults keep per-instance identity.

use std::rc::Rc;

use crate::check::{Check, CheckChain};
use crate::error::ValidationError;
use crate::value::Value;

/// How a never-set slot resolves on read.
#[derive(Clone)]
pub enum DefaultRule {
    /// No default; reads yield [`Value::Undefined`].
    None,
    /// A constant canonical value.
    Constant(Value),
    /// A per-instance lazy rule, evaluated on first read.
    Lazy(Rc<dyn Fn() -> Value>),
}

impl DefaultRule {
    /// Evaluate the rule, if any.
    #[must_use]
    pub fn resolve(&self) -> Option<Value> {
        match self {
            Self::None => None,
            Self::Constant(value) => Some(value.clone()),
            Self::Lazy(f) => Some(f()),
        }
    }
}

impl std::fmt::Debug for DefaultRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Constant(value) => write!(f, "Constant({value})"),
            Self::Lazy(_) => f.write_str("Lazy(..)"),
        }
    }
}

/// An attribute descriptor: name, validation, default rule, documentation.
#[derive(Debug, Clone)]
pub struct Property {
    name: String,
    chain: CheckChain,
    default: DefaultRule,
    required: bool,
    doc: String,
    label: String,
}

impl Property {
    /// Create a descriptor for `name` validated by `chain`.
    ///
    /// The display label defaults to the name; documentation is empty.
    #[must_use]
    pub fn new(name: impl Into<String>, chain: CheckChain) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
            chain,
            default: DefaultRule::None,
            required: false,
            doc: String::new(),
        }
    }

    /// Set a constant default.
    ///
    /// # Panics
    ///
    /// Panics if the default fails the descriptor's own chain; a descriptor
    /// whose default is not canonical is a programming error caught at
    /// class-declaration time.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        let canonical = self
            .chain
            .check(value.into())
            .expect("property default must satisfy its own check chain");
        self.default = DefaultRule::Constant(canonical);
        self
    }

    /// Set a lazy per-instance default rule.
    #[must_use]
    pub fn default_with(mut self, f: impl Fn() -> Value + 'static) -> Self {
        self.default = DefaultRule::Lazy(Rc::new(f));
        self
    }

    /// Mark the attribute as required at construction time.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the documentation string.
    #[must_use]
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    /// Set the display label.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// The attribute name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The validating chain.
    #[must_use]
    pub fn chain(&self) -> &CheckChain {
        &self.chain
    }

    /// The default rule.
    #[must_use]
    pub fn default_rule(&self) -> &DefaultRule {
        &self.default
    }

    /// Whether the attribute must be supplied (or defaulted) at
    /// construction.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// The documentation string.
    #[must_use]
    pub fn doc_text(&self) -> &str {
        &self.doc
    }

    /// The display label.
    #[must_use]
    pub fn display_label(&self) -> &str {
        &self.label
    }

    /// Run the chain, wrapping failures with this attribute's context.
    pub fn validate(&self, value: Value) -> Result<Value, ValidationError> {
        let display = value.to_string();
        self.chain
            .check(value)
            .map_err(|source| ValidationError::value(&self.name, display, source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::{ChoiceCheck, IntCheck};
    use std::cell::Cell;

    #[test]
    fn validate_names_the_attribute() {
        let prop = Property::new("linewidth", CheckChain::single(IntCheck::range(0, 10)));
        let err = prop.validate(Value::Int(99)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid value 99 for attribute `linewidth`: must be in the range [0, 10]"
        );
    }

    #[test]
    fn validate_canonicalizes() {
        let prop = Property::new("linewidth", CheckChain::single(IntCheck::new()));
        assert_eq!(prop.validate(Value::from("3")).unwrap(), Value::Int(3));
    }

    #[test]
    fn constant_default_is_canonicalized_up_front() {
        let prop = Property::new("width", CheckChain::single(IntCheck::new())).default_value("4");
        match prop.default_rule() {
            DefaultRule::Constant(v) => assert_eq!(*v, Value::Int(4)),
            other => panic!("expected constant default, got {other:?}"),
        }
    }

    #[test]
    #[should_panic(expected = "property default must satisfy its own check chain")]
    fn invalid_constant_default_panics_at_declaration() {
        let _ = Property::new("d", CheckChain::single(ChoiceCheck::text(["X", "Y"])))
            .default_value("Z");
    }

    #[test]
    fn lazy_default_runs_per_resolve() {
        thread_local! {
            static CALLS: Cell<u32> = const { Cell::new(0) };
        }
        let prop = Property::new("n", CheckChain::single(IntCheck::new())).default_with(|| {
            CALLS.with(|c| c.set(c.get() + 1));
            Value::Int(0)
        });
        assert_eq!(prop.default_rule().resolve(), Some(Value::Int(0)));
        assert_eq!(prop.default_rule().resolve(), Some(Value::Int(0)));
        CALLS.with(|c| assert_eq!(c.get(), 2));
    }

    #[test]
    fn label_defaults_to_name() {
        let prop = Property::new("query", CheckChain::new());
        assert_eq!(prop.display_label(), "query");
        let prop = prop.label("Query expression").doc("Row filter.");
        assert_eq!(prop.display_label(), "Query expression");
        assert_eq!(prop.doc_text(), "Row filter.");
    }
}
