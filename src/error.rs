// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the contract VM

use thiserror::Error;

/// Result type for contract VM operations
pub type Result<T> = std::result::Result<T, VmError>;

/// Errors that can occur while loading or running contract modules
#[derive(Debug, Error)]
pub enum VmError {
    /// The source store has no source for a resolved id
    #[error("cannot find module '{0}'")]
    ModuleNotFound(String),

    /// A requested id could not be resolved to a canonical id
    #[error("error resolving module '{module}': {reason}")]
    Resolution {
        /// Requested module id
        module: String,
        /// Reason for failure
        reason: String,
    },

    /// The module's own top-level code failed
    #[error("error evaluating module '{module}'")]
    Evaluation {
        /// Canonical id of the failing module
        module: String,
        /// The underlying failure
        #[source]
        source: Box<VmError>,
    },

    /// The module failed to load earlier in this invocation; its exports
    /// must not be reused
    #[error("module '{0}' previously failed to load")]
    PoisonedModule(String),

    /// A module record was constructed with a parent that is not a
    /// registered record
    #[error("parent of module '{0}' must be a registered module record")]
    Construction(String),

    /// A storage bridge primitive reported a non-success code
    #[error("storage {op} failed for key '{key}'")]
    Storage {
        /// Failing operation name
        op: &'static str,
        /// Storage key
        key: String,
    },

    /// A native bridge call failed or is unavailable
    #[error("bridge error: {0}")]
    Bridge(String),

    /// A value had the wrong type for a native call
    #[error("TypeError: {0}")]
    Type(String),

    /// A storage value could not be encoded or decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl VmError {
    /// Create a new type error
    pub fn type_error(msg: impl Into<String>) -> Self {
        Self::Type(msg.into())
    }

    /// Create a new bridge error
    pub fn bridge(msg: impl Into<String>) -> Self {
        Self::Bridge(msg.into())
    }

    /// Create a module not found error
    pub fn module_not_found(module: impl Into<String>) -> Self {
        Self::ModuleNotFound(module.into())
    }
}
