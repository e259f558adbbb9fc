// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Layered execution scopes.
//!
//! Each module load runs against a fresh [`DerivedScope`]: a small inner
//! binding layer that falls through to the one shared [`GlobalScope`] on
//! miss. Reads check the inner layer first; writes always land in the inner
//! layer. A module's top-level assignments therefore shadow globals for that
//! module only and are discarded with the scope when its load finishes,
//! so one module cannot corrupt the globals seen by siblings loaded later.

use crate::value::Value;
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::rc::Rc;

/// The shared global scope of a contract invocation.
///
/// Holds the ambient bridge objects. Only the host defines bindings here;
/// loaded code reads it through a [`DerivedScope`].
#[derive(Debug, Default)]
pub struct GlobalScope {
    bindings: RefCell<FxHashMap<String, Value>>,
}

impl GlobalScope {
    /// Create an empty global scope
    pub fn new() -> Self {
        Self::default()
    }

    /// Define (or replace) a global binding
    pub fn define(&self, name: impl Into<String>, value: Value) {
        self.bindings.borrow_mut().insert(name.into(), value);
    }

    /// Look up a global binding
    pub fn get(&self, name: &str) -> Option<Value> {
        self.bindings.borrow().get(name).cloned()
    }

    /// Check whether a global binding exists
    pub fn contains(&self, name: &str) -> bool {
        self.bindings.borrow().contains_key(name)
    }
}

/// A per-module execution scope derived from the global scope
#[derive(Debug)]
pub struct DerivedScope {
    inner: FxHashMap<String, Value>,
    outer: Rc<GlobalScope>,
}

impl DerivedScope {
    /// Create a fresh scope over the given global scope
    pub fn new(outer: Rc<GlobalScope>) -> Self {
        Self {
            inner: FxHashMap::default(),
            outer,
        }
    }

    /// Look up a name, inner layer first
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.inner.get(name) {
            return Some(value.clone());
        }
        self.outer.get(name)
    }

    /// Bind a name in the inner layer; the global scope is never written
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.inner.insert(name.into(), value);
    }

    /// The shared global scope this scope derives from
    pub fn global(&self) -> &Rc<GlobalScope> {
        &self.outer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_fall_through_to_global() {
        let global = Rc::new(GlobalScope::new());
        global.define("height", Value::Number(7.0));
        let derived = DerivedScope::new(Rc::clone(&global));
        assert_eq!(derived.get("height"), Some(Value::Number(7.0)));
        assert_eq!(derived.get("missing"), None);
    }

    #[test]
    fn writes_shadow_without_touching_global() {
        let global = Rc::new(GlobalScope::new());
        global.define("height", Value::Number(7.0));
        let mut derived = DerivedScope::new(Rc::clone(&global));
        derived.set("height", Value::Number(9.0));
        assert_eq!(derived.get("height"), Some(Value::Number(9.0)));
        assert_eq!(global.get("height"), Some(Value::Number(7.0)));
    }

    #[test]
    fn sibling_scopes_are_isolated() {
        let global = Rc::new(GlobalScope::new());
        let mut first = DerivedScope::new(Rc::clone(&global));
        first.set("leak", Value::string("oops"));
        let second = DerivedScope::new(Rc::clone(&global));
        assert_eq!(second.get("leak"), None);
    }
}
