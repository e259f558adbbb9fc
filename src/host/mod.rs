// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Host boundary: source fetch and module evaluation.
//!
//! The host owns contract source; this crate only asks it for "the
//! executable associated with an id" through [`SourceStore`]. A
//! [`ModuleSource`] is the evaluation primitive: a native entry function
//! invoked exactly once per record with an explicit [`ModuleCtx`] rather
//! than loose positional values. Fetch must be deterministic given an id.

use crate::error::{Result, VmError};
use crate::module_system::{ModuleRecord, Require};
use crate::sandbox::DerivedScope;
use crate::value::ObjectRef;
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::rc::Rc;

/// Everything a module's top-level code is handed when it runs.
pub struct ModuleCtx<'a> {
    /// The module's derived execution scope
    pub scope: &'a mut DerivedScope,
    /// The module's own exports object, for it to populate
    pub exports: ObjectRef,
    /// The module's own record, for introspection (e.g. its id)
    pub module: Rc<ModuleRecord>,
    /// A require entry point bound to this module's resolution context
    pub require: Require,
}

type ModuleInit = dyn Fn(&mut ModuleCtx<'_>) -> Result<()>;

/// Raw executable for one module id, as handed out by a [`SourceStore`]
#[derive(Clone)]
pub struct ModuleSource {
    init: Rc<ModuleInit>,
}

impl ModuleSource {
    /// Wrap a module entry function
    pub fn new(init: impl Fn(&mut ModuleCtx<'_>) -> Result<()> + 'static) -> Self {
        Self {
            init: Rc::new(init),
        }
    }

    /// Run the module's top-level code to completion
    pub fn evaluate(&self, ctx: &mut ModuleCtx<'_>) -> Result<()> {
        (self.init)(ctx)
    }
}

impl std::fmt::Debug for ModuleSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ModuleSource")
    }
}

/// Host-provided mapping from canonical module ids to raw executables.
///
/// Fetch failure means "module not found"; the loader never substitutes
/// empty source.
pub trait SourceStore {
    /// Fetch the executable for a canonical module id
    fn fetch(&self, id: &str) -> Result<ModuleSource>;
}

/// An in-memory source store.
///
/// Used for the built-in `jslib` modules and by hosts that compile contract
/// text up front and register the results.
#[derive(Default)]
pub struct InMemorySourceStore {
    modules: RefCell<FxHashMap<String, ModuleSource>>,
}

impl InMemorySourceStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an executable under a canonical id, replacing any previous one
    pub fn register(&self, id: impl Into<String>, source: ModuleSource) {
        self.modules.borrow_mut().insert(id.into(), source);
    }

    /// Whether an id is registered
    pub fn contains(&self, id: &str) -> bool {
        self.modules.borrow().contains_key(id)
    }
}

impl SourceStore for InMemorySourceStore {
    fn fetch(&self, id: &str) -> Result<ModuleSource> {
        self.modules
            .borrow()
            .get(id)
            .cloned()
            .ok_or_else(|| VmError::module_not_found(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn fetch_unknown_id_fails() {
        let store = InMemorySourceStore::new();
        assert!(matches!(
            store.fetch("ghost.js"),
            Err(VmError::ModuleNotFound(id)) if id == "ghost.js"
        ));
    }

    #[test]
    fn registered_source_is_returned() {
        let store = InMemorySourceStore::new();
        store.register(
            "a.js",
            ModuleSource::new(|ctx| {
                ctx.exports.insert("ok", Value::Bool(true));
                Ok(())
            }),
        );
        assert!(store.contains("a.js"));
        assert!(store.fetch("a.js").is_ok());
    }
}
