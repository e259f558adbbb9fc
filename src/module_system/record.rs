// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Module records.
//!
//! A [`ModuleRecord`] is the unit of loaded contract code: an immutable
//! canonical id, the shared exports object, and a back-reference to the
//! record whose require call caused this one to be created. Records are
//! created once per canonical id and live for the lifetime of the registry.

use crate::value::ObjectRef;
use std::cell::Cell;
use std::rc::Rc;

/// Load state of a module record.
///
/// There is no partial-success state: a record is either trustworthy
/// (`Loaded`) or it is not (`Failed`). `Loading` is observable only from
/// within a circular require chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// Source is being evaluated; exports may be partially populated
    Loading,
    /// Top-level code ran to completion; exports are trustworthy
    Loaded,
    /// Fetch or evaluation failed; exports must not be reused
    Failed,
}

/// A loaded (or loading) contract module
#[derive(Debug)]
pub struct ModuleRecord {
    id: String,
    exports: ObjectRef,
    parent: Option<Rc<ModuleRecord>>,
    state: Cell<LoadState>,
}

impl ModuleRecord {
    pub(crate) fn new(id: impl Into<String>, parent: Option<Rc<ModuleRecord>>) -> Self {
        Self {
            id: id.into(),
            exports: ObjectRef::new(),
            parent,
            state: Cell::new(LoadState::Loading),
        }
    }

    /// The canonical module id; assigned at construction, never reassigned
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Handle to the module's exports object.
    ///
    /// Every requester of this id receives a handle to the same object;
    /// mutations after load are visible to all holders.
    pub fn exports(&self) -> ObjectRef {
        self.exports.clone()
    }

    /// The record whose require call created this one, if any.
    ///
    /// Only the root record has no parent. The parent is resolution context,
    /// never execution order.
    pub fn parent(&self) -> Option<&Rc<ModuleRecord>> {
        self.parent.as_ref()
    }

    /// Whether this is the root record of the invocation
    pub fn is_main(&self) -> bool {
        self.parent.is_none()
    }

    /// Current load state
    pub fn state(&self) -> LoadState {
        self.state.get()
    }

    pub(crate) fn set_state(&self, state: LoadState) {
        self.state.set(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn record_starts_loading_with_empty_exports() {
        let record = ModuleRecord::new("a.js", None);
        assert_eq!(record.state(), LoadState::Loading);
        assert!(record.exports().is_empty());
        assert!(record.is_main());
    }

    #[test]
    fn exports_handle_is_stable() {
        let record = ModuleRecord::new("a.js", None);
        let first = record.exports();
        first.insert("x", Value::Number(1.0));
        let second = record.exports();
        assert!(first.ptr_eq(&second));
        assert_eq!(second.get("x"), Some(Value::Number(1.0)));
    }

    #[test]
    fn parent_chain_is_preserved() {
        let root = Rc::new(ModuleRecord::new("main.js", None));
        let child = ModuleRecord::new("jslib/a.js", Some(Rc::clone(&root)));
        assert!(!child.is_main());
        assert_eq!(child.parent().unwrap().id(), "main.js");
    }
}
