// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Module identity, caching and dependency injection.
//!
//! - [`resolver`]: pure lexical id resolution
//! - [`ModuleRecord`]: the unit of loaded code
//! - [`ModuleRegistry`]: at-most-one-instantiation-per-id cache and loader
//! - [`Require`]: per-module bound require entry points

mod record;
mod registry;
mod require;
pub mod resolver;

pub use record::{LoadState, ModuleRecord};
pub use registry::{MAIN_MODULE_ID, ModuleRegistry};
pub use require::Require;
