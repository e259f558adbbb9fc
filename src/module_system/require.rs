// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-module require handles.
//!
//! Every module receives its own [`Require`], bound to that module's record
//! as the resolution context. All handles share the same registry and
//! resolution logic; only the bound record differs, so relative requests
//! from different modules can never mix up their directory context.

use crate::error::{Result, VmError};
use crate::module_system::record::ModuleRecord;
use crate::module_system::registry::ModuleRegistry;
use crate::module_system::resolver;
use crate::value::ObjectRef;
use std::rc::Rc;

/// A require entry point bound to one module record
#[derive(Clone)]
pub struct Require {
    record: Rc<ModuleRecord>,
    registry: ModuleRegistry,
}

impl Require {
    pub(crate) fn bind(record: Rc<ModuleRecord>, registry: ModuleRegistry) -> Self {
        Self { record, registry }
    }

    /// Resolve a requested id against the bound record and load it,
    /// returning the target module's exports
    pub fn call(&self, requested_id: &str) -> Result<ObjectRef> {
        let id = resolver::resolve(self.record.id(), requested_id);
        if id.is_empty() {
            return Err(VmError::Resolution {
                module: requested_id.to_owned(),
                reason: "request resolves to an empty id".to_owned(),
            });
        }
        self.registry.load(&id, &self.record)
    }

    /// Resolve a requested id without loading it
    pub fn resolve(&self, requested_id: &str) -> String {
        resolver::resolve(self.record.id(), requested_id)
    }

    /// The record this handle is bound to
    pub fn module(&self) -> &Rc<ModuleRecord> {
        &self.record
    }

    /// The invocation's root module record
    pub fn main(&self) -> Rc<ModuleRecord> {
        self.registry.root()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{InMemorySourceStore, ModuleSource};
    use crate::sandbox::GlobalScope;
    use crate::value::Value;

    #[test]
    fn require_resolves_against_its_own_record() {
        let store = InMemorySourceStore::new();
        store.register(
            "jslib/a/b.js",
            ModuleSource::new(|ctx| {
                ctx.exports
                    .insert("sibling", Value::string(ctx.require.resolve("./c.js")));
                ctx.exports
                    .insert("lib", Value::string(ctx.require.resolve("d.js")));
                Ok(())
            }),
        );

        let registry = ModuleRegistry::new(Rc::new(store), Rc::new(GlobalScope::new()));
        let root = registry.root();
        let exports = registry.load("jslib/a/b.js", &root).unwrap();

        assert_eq!(exports.get("sibling"), Some(Value::string("jslib/a/c.js")));
        assert_eq!(exports.get("lib"), Some(Value::string("jslib/d.js")));
    }

    #[test]
    fn empty_resolution_is_rejected() {
        let store = InMemorySourceStore::new();
        store.register(
            "jslib/a.js",
            ModuleSource::new(|ctx| {
                let err = ctx.require.call("../..").unwrap_err();
                assert!(matches!(err, crate::error::VmError::Resolution { .. }));
                Ok(())
            }),
        );

        let registry = ModuleRegistry::new(Rc::new(store), Rc::new(GlobalScope::new()));
        let root = registry.root();
        registry.load("jslib/a.js", &root).unwrap();
    }

    #[test]
    fn every_handle_exposes_the_root_record() {
        let store = InMemorySourceStore::new();
        store.register(
            "jslib/deep/mod.js",
            ModuleSource::new(|ctx| {
                ctx.exports
                    .insert("main_id", Value::string(ctx.require.main().id()));
                ctx.exports
                    .insert("own_id", Value::string(ctx.module.id()));
                Ok(())
            }),
        );

        let registry = ModuleRegistry::new(Rc::new(store), Rc::new(GlobalScope::new()));
        let root = registry.root();
        let exports = registry.load("jslib/deep/mod.js", &root).unwrap();

        assert_eq!(exports.get("main_id"), Some(Value::string("main.js")));
        assert_eq!(exports.get("own_id"), Some(Value::string("jslib/deep/mod.js")));
    }
}
