// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-invocation contract VM.
//!
//! A [`ContractVm`] is constructed for one contract call and discarded after
//! it: it owns the global scope, the installed bridges and the module
//! registry, so nothing about an invocation leaks into the next. The
//! construction order is fixed: policy first, then bridges, then the
//! registry, so the sandbox surface is complete before any module can load.

use crate::bridges::BridgeSet;
use crate::error::Result;
use crate::host::SourceStore;
use crate::module_system::ModuleRegistry;
use crate::sandbox::{GlobalScope, SandboxPolicy};
use crate::value::ObjectRef;
use std::rc::Rc;

/// One contract invocation's module loader and sandbox
pub struct ContractVm {
    registry: ModuleRegistry,
    global: Rc<GlobalScope>,
}

impl ContractVm {
    /// Build a VM whose root module is `main.js`
    pub fn new(store: Rc<dyn SourceStore>, bridges: BridgeSet, policy: SandboxPolicy) -> Self {
        Self::with_root(store, bridges, policy, crate::module_system::MAIN_MODULE_ID)
    }

    /// Build a VM with a custom root module id
    pub fn with_root(
        store: Rc<dyn SourceStore>,
        bridges: BridgeSet,
        policy: SandboxPolicy,
        root_id: impl Into<String>,
    ) -> Self {
        let global = Rc::new(GlobalScope::new());
        policy.install(&global);
        bridges.install(&global);
        let registry = ModuleRegistry::with_root(store, Rc::clone(&global), root_id);
        Self { registry, global }
    }

    /// Load and run the module graph starting at the root id, returning the
    /// root's exports or the first unrecovered load failure.
    pub fn run(&self) -> Result<ObjectRef> {
        tracing::debug!(root = self.registry.root().id(), "running contract");
        self.registry.load_root()
    }

    /// The invocation's module registry
    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    /// The invocation's global scope
    pub fn global(&self) -> &Rc<GlobalScope> {
        &self.global
    }
}
