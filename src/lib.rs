// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # chainvm
//!
//! Module loader and execution sandbox for smart-contract code running
//! inside a blockchain VM. Contract source is a tree of inter-dependent
//! modules resolved on demand from a host-provided source store, loaded into
//! isolated execution scopes, and wired together through a per-module
//! `require` entry point.
//!
//! The host only supplies two primitives: "fetch the executable for an id"
//! ([`SourceStore`]) and the bridges contract code ultimately calls into
//! ([`BridgeSet`]). Everything else lives here:
//!
//! - **Resolution** ([`module_system::resolver`]): pure lexical mapping from
//!   `(requesting id, requested id)` to a canonical id. Non-relative ids
//!   resolve under the fixed `jslib/` namespace.
//! - **Caching** ([`ModuleRegistry`]): at most one [`ModuleRecord`] per id,
//!   inserted before its source runs so circular requires terminate.
//! - **Injection** ([`Require`]): every module gets a require handle curried
//!   over its own record, never a shared global one.
//! - **Sandboxing** ([`sandbox`]): modules evaluate against fresh derived
//!   scopes that read through to, but never mutate, the shared globals, and
//!   no function-source introspection capability exists.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use chainvm::{BridgeSet, ContractVm, InMemorySourceStore, ModuleSource, SandboxPolicy};
//! use std::rc::Rc;
//!
//! let store = InMemorySourceStore::new();
//! chainvm::stdlib::register(&store);
//! store.register("main.js", ModuleSource::new(|ctx| {
//!     let chain = ctx.require.call("blockchain.js")?;
//!     ctx.exports.insert("height", chain.call("getCurrBlockHeight", &[])?);
//!     Ok(())
//! }));
//!
//! let vm = ContractVm::new(Rc::new(store), bridges, SandboxPolicy);
//! let exports = vm.run()?;
//! ```
//!
//! Execution is strictly synchronous and single-threaded; determinism is a
//! consensus requirement, so there is no I/O, no clock and no scheduling
//! here. Runaway require cycles are bounded by the host's step metering,
//! not by this crate.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bridges;
pub mod error;
pub mod host;
pub mod module_system;
pub mod runtime;
pub mod sandbox;
pub mod stdlib;
pub mod value;

// Re-exports
pub use bridges::{
    BridgeSet, LedgerBridge, RewardBridge, SignatureBridge, StorageBridge, TransactionContext,
};
pub use error::{Result, VmError};
pub use host::{InMemorySourceStore, ModuleCtx, ModuleSource, SourceStore};
pub use module_system::{LoadState, MAIN_MODULE_ID, ModuleRecord, ModuleRegistry, Require};
pub use runtime::ContractVm;
pub use sandbox::{DerivedScope, GlobalScope, SandboxPolicy};
pub use value::{FunctionRef, ObjectRef, Value};

/// Version of the chainvm crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
