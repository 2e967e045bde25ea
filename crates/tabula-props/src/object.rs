#![forbid(unsafe_code)]

//! Property-bearing objects.
//!
//! A [`ClassSpec`] is a static per-type registry of attribute descriptors,
//! built once at declaration time by walking the class hierarchy base-first.
//! A [`PropObject`] is a cloneable handle to one instance: the registry, the
//! name-to-value map, and the instance's signal hub. Cloning a handle shares
//! the instance; [`PropObject::copy`] makes an independent one.
//!
//! # Invariants
//!
//! 1. Every declared name in the hierarchy has exactly one authoritative
//!    descriptor; a subclass re-declaration overrides the base descriptor in
//!    place, it never shadows it.
//! 2. Unknown constructor keys are a hard error.
//! 3. Every successful set emits `update::<attr>` on the hub; no mutation
//!    path bypasses it, including undo restores.

use std::cell::RefCell;
use std::rc::Rc;

use ahash::AHashMap;
use tabula_undo::{UndoList, UndoRecord};

use crate::error::ValidationError;
use crate::property::{DefaultRule, Property};
use crate::signal::{PropEvent, SignalHub, Subscription};
use crate::value::Value;

/// Static registry of descriptors for one object class.
#[derive(Debug)]
pub struct ClassSpec {
    name: String,
    order: Vec<Rc<Property>>,
    index: AHashMap<String, usize>,
}

impl ClassSpec {
    /// Start declaring a class.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> ClassSpecBuilder {
        ClassSpecBuilder {
            name: name.into(),
            order: Vec::new(),
            index: AHashMap::new(),
        }
    }

    /// The class name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The authoritative descriptor for `name`, if declared.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&Rc<Property>> {
        self.index.get(name).map(|&i| &self.order[i])
    }

    /// Whether `name` is declared anywhere in the hierarchy.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Descriptors in declaration order, base classes first.
    #[must_use]
    pub fn properties(&self) -> &[Rc<Property>] {
        &self.order
    }

    /// Number of declared attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the class declares no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Builder collecting descriptors base-first.
#[derive(Debug)]
pub struct ClassSpecBuilder {
    name: String,
    order: Vec<Rc<Property>>,
    index: AHashMap<String, usize>,
}

impl ClassSpecBuilder {
    /// Inherit every descriptor of `base`, in the base's declaration order.
    ///
    /// Names already collected are overridden in place by the base's
    /// descriptor; later own declarations may override them again.
    #[must_use]
    pub fn extends(mut self, base: &Rc<ClassSpec>) -> Self {
        for prop in &base.order {
            self.declare(Rc::clone(prop));
        }
        self
    }

    /// Declare an attribute. Re-declaring a name overrides the earlier
    /// descriptor in place (the slot keeps its original position).
    #[must_use]
    pub fn property(mut self, property: Property) -> Self {
        self.declare(Rc::new(property));
        self
    }

    fn declare(&mut self, property: Rc<Property>) {
        let name = property.name().to_string();
        if let Some(&i) = self.index.get(&name) {
            self.order[i] = property;
        } else {
            self.index.insert(name, self.order.len());
            self.order.push(property);
        }
    }

    /// Finish the declaration.
    #[must_use]
    pub fn build(self) -> Rc<ClassSpec> {
        Rc::new(ClassSpec {
            name: self.name,
            order: self.order,
            index: self.index,
        })
    }
}

/// A cloneable handle to one property-bearing instance.
///
/// Cloning shares the instance (both handles see the same values and hub);
/// use [`PropObject::copy`] for an independent object.
#[derive(Clone)]
pub struct PropObject {
    spec: Rc<ClassSpec>,
    values: Rc<RefCell<AHashMap<String, Value>>>,
    hub: SignalHub<PropEvent>,
}

impl PropObject {
    /// Construct with every attribute never-set.
    ///
    /// # Errors
    ///
    /// Fails with [`ValidationError::Missing`] if a required attribute has
    /// no default rule.
    pub fn new(spec: Rc<ClassSpec>) -> Result<Self, ValidationError> {
        Self::with_values(spec, [])
    }

    /// Construct from constructor key/value pairs.
    ///
    /// Unknown keys are a hard error; required attributes must be supplied
    /// or carry a default rule.
    pub fn with_values(
        spec: Rc<ClassSpec>,
        values: impl IntoIterator<Item = (String, Value)>,
    ) -> Result<Self, ValidationError> {
        let mut store = AHashMap::new();
        for (name, value) in values {
            let Some(prop) = spec.property(&name) else {
                return Err(ValidationError::UnknownAttribute { attribute: name });
            };
            store.insert(name, prop.validate(value)?);
        }
        for prop in spec.properties() {
            let defaulted = !matches!(prop.default_rule(), DefaultRule::None);
            if prop.is_required() && !defaulted && !store.contains_key(prop.name()) {
                return Err(ValidationError::Missing {
                    attribute: prop.name().to_string(),
                });
            }
        }
        Ok(Self {
            spec,
            values: Rc::new(RefCell::new(store)),
            hub: SignalHub::new(),
        })
    }

    fn from_parts(spec: Rc<ClassSpec>, store: AHashMap<String, Value>) -> Self {
        Self {
            spec,
            values: Rc::new(RefCell::new(store)),
            hub: SignalHub::new(),
        }
    }

    /// The class registry backing this object.
    #[must_use]
    pub fn spec(&self) -> &Rc<ClassSpec> {
        &self.spec
    }

    /// This instance's signal hub.
    #[must_use]
    pub fn signals(&self) -> &SignalHub<PropEvent> {
        &self.hub
    }

    /// Subscribe to `update::<attr>` events.
    pub fn on_update(&self, callback: impl Fn(&PropEvent) + 'static) -> Subscription {
        self.hub.subscribe(callback)
    }

    /// The stored value for `name` without resolving defaults:
    /// [`Value::Undefined`] when never set.
    pub fn stored(&self, name: &str) -> Result<Value, ValidationError> {
        if !self.spec.contains(name) {
            return Err(ValidationError::UnknownAttribute {
                attribute: name.to_string(),
            });
        }
        Ok(self
            .values
            .borrow()
            .get(name)
            .cloned()
            .unwrap_or(Value::Undefined))
    }

    /// Read `name`, resolving and storing the default rule on first read.
    pub fn get(&self, name: &str) -> Result<Value, ValidationError> {
        let Some(prop) = self.spec.property(name).cloned() else {
            return Err(ValidationError::UnknownAttribute {
                attribute: name.to_string(),
            });
        };
        if let Some(value) = self.values.borrow().get(name) {
            return Ok(value.clone());
        }
        match prop.default_rule().resolve() {
            Some(default) => {
                // Canonical by construction for constants; lazy rules run
                // through the chain like any other write.
                let canonical = prop.validate(default)?;
                self.values
                    .borrow_mut()
                    .insert(name.to_string(), canonical.clone());
                Ok(canonical)
            }
            None => Ok(Value::Undefined),
        }
    }

    /// Validate and store `value` for `name`, then emit `update::<name>`.
    pub fn set(&self, name: &str, value: Value) -> Result<(), ValidationError> {
        let Some(prop) = self.spec.property(name).cloned() else {
            return Err(ValidationError::UnknownAttribute {
                attribute: name.to_string(),
            });
        };
        let canonical = prop.validate(value)?;
        self.values
            .borrow_mut()
            .insert(name.to_string(), canonical.clone());
        self.hub.emit(&PropEvent {
            attribute: name.to_string(),
            value: canonical,
        });
        Ok(())
    }

    /// Restore a previously-stored canonical value (or the never-set
    /// sentinel) without re-validating. Emits like any other set.
    ///
    /// Only the undo machinery calls this; the value must have come from
    /// this object's own storage.
    fn restore(&self, name: &str, value: Value) {
        if value.is_undefined() {
            self.values.borrow_mut().remove(name);
        } else {
            self.values
                .borrow_mut()
                .insert(name.to_string(), value.clone());
        }
        self.hub.emit(&PropEvent {
            attribute: name.to_string(),
            value,
        });
    }

    /// Set with the inverse recorded into a caller-owned undo list.
    pub fn set_undoable(
        &self,
        name: &str,
        value: Value,
        undolist: &mut UndoList,
    ) -> Result<(), ValidationError> {
        let prior = self.stored(name)?;
        self.set(name, value)?;
        undolist.push(restore_cmd(self.clone(), name.to_string(), prior));
        Ok(())
    }

    /// Bulk validated set. Every pair is validated against its descriptor
    /// before any is stored, so a failure leaves the object untouched.
    pub fn set_values(
        &self,
        values: impl IntoIterator<Item = (String, Value)>,
    ) -> Result<(), ValidationError> {
        let mut canonical = Vec::new();
        for (name, value) in values {
            let Some(prop) = self.spec.property(&name) else {
                return Err(ValidationError::UnknownAttribute { attribute: name });
            };
            canonical.push((name, prop.validate(value)?));
        }
        for (name, value) in canonical {
            self.values
                .borrow_mut()
                .insert(name.clone(), value.clone());
            self.hub.emit(&PropEvent {
                attribute: name,
                value,
            });
        }
        Ok(())
    }

    /// Bulk undo-aware set; stops at the first failure. Unlike
    /// [`PropObject::set_values`], the already-applied prefix stays stored,
    /// with its inverse recorded in the undo list so it remains revertible.
    pub fn set_values_undoable(
        &self,
        values: impl IntoIterator<Item = (String, Value)>,
        undolist: &mut UndoList,
    ) -> Result<(), ValidationError> {
        for (name, value) in values {
            self.set_undoable(&name, value, undolist)?;
        }
        Ok(())
    }

    /// Every declared attribute with its stored value (never-set slots as
    /// [`Value::Undefined`]), in declaration order.
    #[must_use]
    pub fn get_values(&self) -> Vec<(String, Value)> {
        let values = self.values.borrow();
        self.spec
            .properties()
            .iter()
            .map(|p| {
                let value = values.get(p.name()).cloned().unwrap_or(Value::Undefined);
                (p.name().to_string(), value)
            })
            .collect()
    }

    /// An independent object with the same class and copied values.
    ///
    /// Container contents are copied; container identity is never shared.
    /// The copy gets a fresh hub with no subscribers.
    #[must_use]
    pub fn copy(&self) -> Self {
        Self::from_parts(Rc::clone(&self.spec), self.values.borrow().clone())
    }

    /// Attributes whose stored value differs from `other`'s, with this
    /// object's value, in declaration order.
    #[must_use]
    pub fn diff(&self, other: &PropObject) -> Vec<(String, Value)> {
        let mine = self.values.borrow();
        let theirs = other.values.borrow();
        self.spec
            .properties()
            .iter()
            .filter_map(|p| {
                let a = mine.get(p.name()).cloned().unwrap_or(Value::Undefined);
                let b = theirs.get(p.name()).cloned().unwrap_or(Value::Undefined);
                (a != b).then(|| (p.name().to_string(), a))
            })
            .collect()
    }

    /// Whether both handles refer to the same instance.
    #[must_use]
    pub fn same_instance(&self, other: &PropObject) -> bool {
        Rc::ptr_eq(&self.values, &other.values)
    }
}

impl std::fmt::Debug for PropObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropObject")
            .field("class", &self.spec.name())
            .field("values", &*self.values.borrow())
            .finish()
    }
}

impl PartialEq for PropObject {
    fn eq(&self, other: &Self) -> bool {
        // Observable equality: same class name and same stored values.
        self.spec.name() == other.spec.name() && self.get_values() == other.get_values()
    }
}

fn restore_cmd(obj: PropObject, name: String, value: Value) -> UndoRecord {
    UndoRecord::new(format!("set {name}"), move || {
        // The attribute stays declared for the object's lifetime; a lookup
        // miss can only mean never-set.
        let prior = obj.stored(&name).unwrap_or(Value::Undefined);
        obj.restore(&name, value);
        restore_cmd(obj.clone(), name, prior)
    })
}
