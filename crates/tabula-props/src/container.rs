#![forbid(unsafe_code)]

//! Validated containers: ordered sequence and keyed mapping variants.
//!
//! Every element mutation re-runs the check chain the container was created
//! with, so re-assignment of a whole container preserves validation.
//! Cloning a container clones its contents; identity is never shared, so a
//! copied object can never alias a container with its original.

use crate::check::{Check, CheckChain};
use crate::error::CheckError;
use crate::value::Value;

/// An ordered sequence whose elements all satisfy one check chain.
#[derive(Clone)]
pub struct TypedList {
    chain: CheckChain,
    items: Vec<Value>,
}

impl TypedList {
    /// Create an empty list validated by `chain`.
    #[must_use]
    pub fn new(chain: CheckChain) -> Self {
        Self {
            chain,
            items: Vec::new(),
        }
    }

    /// Create a list from values, validating each.
    ///
    /// # Errors
    ///
    /// Returns the first rule failure.
    pub fn from_values(
        chain: CheckChain,
        values: impl IntoIterator<Item = Value>,
    ) -> Result<Self, CheckError> {
        let mut list = Self::new(chain);
        for value in values {
            list.push(value)?;
        }
        Ok(list)
    }

    /// The chain validating this list's elements.
    #[must_use]
    pub fn chain(&self) -> &CheckChain {
        &self.chain
    }

    /// Append a validated element.
    pub fn push(&mut self, value: Value) -> Result<(), CheckError> {
        let canonical = self.chain.check(value)?;
        self.items.push(canonical);
        Ok(())
    }

    /// Insert a validated element at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index > len` (programmer error, as with `Vec::insert`).
    pub fn insert(&mut self, index: usize, value: Value) -> Result<(), CheckError> {
        let canonical = self.chain.check(value)?;
        self.items.insert(index, canonical);
        Ok(())
    }

    /// Replace the element at `index` with a validated value.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn set(&mut self, index: usize, value: Value) -> Result<(), CheckError> {
        let canonical = self.chain.check(value)?;
        self.items[index] = canonical;
        Ok(())
    }

    /// Remove and return the element at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn remove(&mut self, index: usize) -> Value {
        self.items.remove(index)
    }

    /// Borrow the element at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.items.get(index)
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate over elements in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items.iter()
    }
}

impl PartialEq for TypedList {
    fn eq(&self, other: &Self) -> bool {
        // Equality is content equality; the validating chain is not part of
        // the observable state.
        self.items == other.items
    }
}

impl std::fmt::Debug for TypedList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedList")
            .field("rule", &self.chain.describe())
            .field("items", &self.items)
            .finish()
    }
}

/// A keyed mapping whose values all satisfy one check chain.
///
/// Iteration order is insertion order, so bulk get/set round-trips are
/// deterministic.
#[derive(Clone)]
pub struct TypedMap {
    chain: CheckChain,
    entries: Vec<(String, Value)>,
}

impl TypedMap {
    /// Create an empty map validated by `chain`.
    #[must_use]
    pub fn new(chain: CheckChain) -> Self {
        Self {
            chain,
            entries: Vec::new(),
        }
    }

    /// The chain validating this map's values.
    #[must_use]
    pub fn chain(&self) -> &CheckChain {
        &self.chain
    }

    /// Insert or replace the value for `key`, validating it.
    ///
    /// Returns the previous value, if any.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: Value,
    ) -> Result<Option<Value>, CheckError> {
        let canonical = self.chain.check(value)?;
        let key = key.into();
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            Ok(Some(std::mem::replace(&mut slot.1, canonical)))
        } else {
            self.entries.push((key, canonical));
            Ok(None)
        }
    }

    /// Borrow the value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Remove and return the value for `key`.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    /// Whether `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, (String, Value)> {
        self.entries.iter()
    }
}

impl PartialEq for TypedMap {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl std::fmt::Debug for TypedMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedMap")
            .field("rule", &self.chain.describe())
            .field("entries", &self.entries)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::IntCheck;

    fn int_chain() -> CheckChain {
        CheckChain::single(IntCheck::range(0, 100))
    }

    #[test]
    fn list_validates_every_mutation() {
        let mut list = TypedList::new(int_chain());
        list.push(Value::from("7")).unwrap();
        assert_eq!(list.get(0), Some(&Value::Int(7))); // Canonicalized.

        assert!(list.push(Value::Int(200)).is_err());
        assert_eq!(list.len(), 1); // Failed push leaves the list untouched.

        list.insert(0, Value::Int(1)).unwrap();
        list.set(1, Value::Int(2)).unwrap();
        assert_eq!(list.iter().cloned().collect::<Vec<_>>(), vec![
            Value::Int(1),
            Value::Int(2)
        ]);
    }

    #[test]
    fn from_values_rejects_first_bad_element() {
        let result = TypedList::from_values(
            int_chain(),
            [Value::Int(1), Value::Int(500), Value::Int(2)],
        );
        assert!(result.is_err());
    }

    #[test]
    fn clone_copies_contents_not_identity() {
        let mut original = TypedList::new(int_chain());
        original.push(Value::Int(1)).unwrap();
        let mut copy = original.clone();
        copy.push(Value::Int(2)).unwrap();

        assert_eq!(original.len(), 1);
        assert_eq!(copy.len(), 2);
        assert_ne!(original, copy);
    }

    #[test]
    fn map_insert_get_remove() {
        let mut map = TypedMap::new(int_chain());
        assert_eq!(map.insert("a", Value::from("5")).unwrap(), None);
        assert_eq!(map.get("a"), Some(&Value::Int(5)));

        let prior = map.insert("a", Value::Int(6)).unwrap();
        assert_eq!(prior, Some(Value::Int(5)));

        assert!(map.insert("b", Value::Int(999)).is_err());
        assert!(!map.contains_key("b"));

        assert_eq!(map.remove("a"), Some(Value::Int(6)));
        assert!(map.is_empty());
    }

    #[test]
    fn map_iterates_in_insertion_order() {
        let mut map = TypedMap::new(int_chain());
        map.insert("z", Value::Int(1)).unwrap();
        map.insert("a", Value::Int(2)).unwrap();
        let keys: Vec<&str> = map.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["z", "a"]);
    }
}
