// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Module registry and load procedure.
//!
//! The registry is the invocation-wide cache of [`ModuleRecord`]s, keyed by
//! canonical id. It guarantees at-most-one instantiation per id by inserting
//! the record *before* evaluating its source: a circular dependency that
//! requires back into a still-loading id observes that record's (possibly
//! still empty) exports object instead of recursing forever. The guarantee
//! comes from this check-then-insert ordering alone; execution is strictly
//! single-threaded and synchronous, so no locking is involved.
//!
//! Require cycles that do not terminate lexically are bounded by the host's
//! own call-depth and step metering; the registry imposes no recursion cap
//! of its own.

use crate::error::{Result, VmError};
use crate::host::{ModuleCtx, SourceStore};
use crate::module_system::record::{LoadState, ModuleRecord};
use crate::module_system::require::Require;
use crate::sandbox::{DerivedScope, GlobalScope};
use crate::value::ObjectRef;
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::rc::Rc;

/// Conventional id of the root module
pub const MAIN_MODULE_ID: &str = "main.js";

struct RegistryInner {
    modules: RefCell<FxHashMap<String, Rc<ModuleRecord>>>,
    store: Rc<dyn SourceStore>,
    global: Rc<GlobalScope>,
    root: Rc<ModuleRecord>,
}

/// Invocation-wide cache of module records.
///
/// Cheap to clone; clones share the same cache. Constructed per contract
/// invocation by [`crate::runtime::ContractVm`] and discarded with it.
#[derive(Clone)]
pub struct ModuleRegistry {
    inner: Rc<RegistryInner>,
}

impl ModuleRegistry {
    /// Create a registry whose root record is [`MAIN_MODULE_ID`]
    pub fn new(store: Rc<dyn SourceStore>, global: Rc<GlobalScope>) -> Self {
        Self::with_root(store, global, MAIN_MODULE_ID)
    }

    /// Create a registry with a custom root id
    pub fn with_root(
        store: Rc<dyn SourceStore>,
        global: Rc<GlobalScope>,
        root_id: impl Into<String>,
    ) -> Self {
        let root = Rc::new(ModuleRecord::new(root_id, None));
        let mut modules = FxHashMap::default();
        modules.insert(root.id().to_owned(), Rc::clone(&root));
        Self {
            inner: Rc::new(RegistryInner {
                modules: RefCell::new(modules),
                store,
                global,
                root,
            }),
        }
    }

    /// The distinguished root record of this invocation
    pub fn root(&self) -> Rc<ModuleRecord> {
        Rc::clone(&self.inner.root)
    }

    /// Look up a record by canonical id without loading anything
    pub fn get(&self, id: &str) -> Option<Rc<ModuleRecord>> {
        self.inner.modules.borrow().get(id).cloned()
    }

    /// Load the module graph starting at the root record and return the
    /// root's exports. Idempotent: a second call returns the cached exports.
    pub fn load_root(&self) -> Result<ObjectRef> {
        let root = self.root();
        match root.state() {
            LoadState::Loaded => Ok(root.exports()),
            LoadState::Failed => Err(VmError::PoisonedModule(root.id().to_owned())),
            LoadState::Loading => {
                self.load_record(&root)?;
                Ok(root.exports())
            }
        }
    }

    /// Load a canonical id on behalf of `parent` and return its exports.
    ///
    /// If a record already exists for the id, its exports are returned
    /// without re-executing any top-level code; this is both the
    /// idempotence and the circular-require guarantee. `parent` must be a
    /// record this registry knows, otherwise the parent-chain invariant
    /// used for relative resolution would be broken and the call fails
    /// with [`VmError::Construction`].
    pub fn load(&self, id: &str, parent: &Rc<ModuleRecord>) -> Result<ObjectRef> {
        let existing = {
            let modules = self.inner.modules.borrow();
            match modules.get(parent.id()) {
                Some(registered) if Rc::ptr_eq(registered, parent) => {}
                _ => return Err(VmError::Construction(id.to_owned())),
            }
            modules.get(id).cloned()
        };

        if let Some(record) = existing {
            return match record.state() {
                LoadState::Failed => Err(VmError::PoisonedModule(id.to_owned())),
                _ => {
                    tracing::trace!(module = id, "module cache hit");
                    Ok(record.exports())
                }
            };
        }

        let record = Rc::new(ModuleRecord::new(id, Some(Rc::clone(parent))));
        self.inner
            .modules
            .borrow_mut()
            .insert(id.to_owned(), Rc::clone(&record));

        self.load_record(&record)?;
        Ok(record.exports())
    }

    /// Fetch, scope, bind and evaluate one freshly inserted record.
    fn load_record(&self, record: &Rc<ModuleRecord>) -> Result<()> {
        tracing::debug!(module = record.id(), "loading module");

        let source = match self.inner.store.fetch(record.id()) {
            Ok(source) => source,
            Err(err) => {
                record.set_state(LoadState::Failed);
                tracing::warn!(module = record.id(), error = %err, "module fetch failed");
                return Err(err);
            }
        };

        let mut scope = DerivedScope::new(Rc::clone(&self.inner.global));
        let mut ctx = ModuleCtx {
            scope: &mut scope,
            exports: record.exports(),
            module: Rc::clone(record),
            require: Require::bind(Rc::clone(record), self.clone()),
        };

        match source.evaluate(&mut ctx) {
            Ok(()) => {
                record.set_state(LoadState::Loaded);
                tracing::debug!(module = record.id(), "module loaded");
                Ok(())
            }
            Err(err) => {
                record.set_state(LoadState::Failed);
                tracing::warn!(module = record.id(), error = %err, "module evaluation failed");
                Err(VmError::Evaluation {
                    module: record.id().to_owned(),
                    source: Box::new(err),
                })
            }
        }
    }
}
