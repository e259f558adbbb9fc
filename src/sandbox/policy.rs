// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sandbox hardening policy.
//!
//! Two rules bound what loaded contract code can observe or escape:
//!
//! 1. **No function-source introspection.** Native function values carry no
//!    source representation, and the only conversion surface exposed to
//!    loaded code ([`source_text`], reachable as the `toSource` global)
//!    yields the empty string for every function, bridge functions included.
//!    Nothing is patched at run time; the capability is simply never
//!    constructed.
//! 2. **No direct global execution.** Modules only ever evaluate against a
//!    fresh [`crate::sandbox::DerivedScope`]; the registry is the single
//!    evaluation site and enforces this unconditionally.

use crate::sandbox::scope::GlobalScope;
use crate::value::Value;

/// Source-text conversion available to loaded code.
///
/// Functions never reveal their implementation.
pub fn source_text(value: &Value) -> String {
    match value {
        Value::Function(_) => String::new(),
        other => other.to_string(),
    }
}

/// Hardening policy installed once per invocation, before any module loads.
#[derive(Debug, Default, Clone, Copy)]
pub struct SandboxPolicy;

impl SandboxPolicy {
    /// Install the policy's ambient surface on the global scope.
    pub fn install(&self, global: &GlobalScope) {
        global.define(
            "toSource",
            Value::function("toSource", |args| {
                let value = args.first().cloned().unwrap_or_default();
                Ok(Value::String(source_text(&value)))
            }),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_source_is_empty() {
        let f = Value::function("secretBridge", |_| Ok(Value::Undefined));
        assert_eq!(source_text(&f), "");
    }

    #[test]
    fn non_function_values_still_stringify() {
        assert_eq!(source_text(&Value::Number(3.0)), "3");
        assert_eq!(source_text(&Value::string("hi")), "hi");
    }

    #[test]
    fn installed_to_source_denies_bridge_introspection() {
        let global = GlobalScope::new();
        SandboxPolicy.install(&global);
        let bridge_fn = Value::function("transfer", |_| Ok(Value::Number(0.0)));

        let to_source = global.get("toSource").unwrap();
        let result = to_source
            .as_function()
            .unwrap()
            .call(std::slice::from_ref(&bridge_fn))
            .unwrap();
        assert_eq!(result, Value::string(""));
    }
}
