// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Execution sandbox: layered scopes and the hardening policy

pub mod policy;
mod scope;

pub use policy::{SandboxPolicy, source_text};
pub use scope::{DerivedScope, GlobalScope};
