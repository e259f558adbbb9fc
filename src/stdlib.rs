// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Built-in `jslib` library modules.
//!
//! These are the wrapper libraries contract code requires by bare id
//! (`require("storage.js")` resolves to `jslib/storage.js` from anywhere).
//! Each wraps one ambient `_native_*` bridge object in a stable exports
//! surface. They are ordinary modules: loaded through the registry, cached
//! once per invocation, evaluated in a derived scope like everything else.

use crate::bridges;
use crate::error::{Result, VmError};
use crate::host::{InMemorySourceStore, ModuleCtx, ModuleSource};
use crate::value::{ObjectRef, Value};

/// Canonical ids of the built-in library modules
pub const LIBRARY_MODULES: &[&str] = &[
    "jslib/storage.js",
    "jslib/blockchain.js",
    "jslib/sender.js",
    "jslib/verification.js",
    "jslib/reward.js",
];

/// Register every built-in library module in a source store
pub fn register(store: &InMemorySourceStore) {
    store.register("jslib/storage.js", storage_module());
    store.register("jslib/blockchain.js", blockchain_module());
    store.register("jslib/sender.js", sender_module());
    store.register("jslib/verification.js", verification_module());
    store.register("jslib/reward.js", reward_module());
}

/// Fetch an ambient bridge object from the module's scope
fn ambient(ctx: &ModuleCtx<'_>, name: &str) -> Result<ObjectRef> {
    ctx.scope
        .get(name)
        .as_ref()
        .and_then(Value::as_object)
        .cloned()
        .ok_or_else(|| VmError::bridge(format!("ambient object '{}' is not installed", name)))
}

/// Storage wrapper: JSON-encodes values on the way in, decodes on the way
/// out, and turns a failed delete into an error.
fn storage_module() -> ModuleSource {
    ModuleSource::new(|ctx| {
        let native = ambient(ctx, bridges::NATIVE_STORAGE)?;

        let n = native.clone();
        ctx.exports.insert(
            "get",
            Value::function("get", move |args| {
                match n.call("get", args)? {
                    Value::String(raw) => {
                        let json: serde_json::Value = serde_json::from_str(&raw)?;
                        Ok(Value::from_json(&json))
                    }
                    _ => Ok(Value::Null),
                }
            }),
        );

        let n = native.clone();
        ctx.exports.insert(
            "set",
            Value::function("set", move |args| {
                let key = args.first().cloned().unwrap_or_default();
                let value = args.get(1).cloned().unwrap_or_default();
                let encoded = serde_json::to_string(&value.to_json()?)?;
                n.call("set", &[key, Value::String(encoded)])
            }),
        );

        let n = native;
        ctx.exports.insert(
            "del",
            Value::function("del", move |args| {
                let code = n.call("del", args)?;
                if code != Value::Number(0.0) {
                    let key = args
                        .first()
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_owned();
                    return Err(VmError::Storage { op: "del", key });
                }
                Ok(code)
            }),
        );

        Ok(())
    })
}

/// Forward a bridge-object method as an identically named export
fn forward(exports: &ObjectRef, native: &ObjectRef, method: &'static str) {
    let n = native.clone();
    exports.insert(
        method,
        Value::function(method, move |args| n.call(method, args)),
    );
}

fn blockchain_module() -> ModuleSource {
    ModuleSource::new(|ctx| {
        let native = ambient(ctx, bridges::NATIVE_BLOCKCHAIN)?;
        forward(&ctx.exports, &native, "verifyAddress");
        forward(&ctx.exports, &native, "transfer");
        forward(&ctx.exports, &native, "getCurrBlockHeight");
        forward(&ctx.exports, &native, "getNodeAddress");
        forward(&ctx.exports, &native, "deleteContract");
        // Legacy contracts call this; scheduling happens host-side.
        ctx.exports.insert(
            "dapp_schedule",
            Value::function("dapp_schedule", |_| Ok(Value::Undefined)),
        );
        Ok(())
    })
}

fn sender_module() -> ModuleSource {
    ModuleSource::new(|ctx| {
        let native = ambient(ctx, bridges::NATIVE_TX)?;

        let n = native.clone();
        ctx.exports.insert(
            "getSender",
            Value::function("getSender", move |_| {
                Ok(n.get("sender").unwrap_or_default())
            }),
        );

        ctx.exports.insert(
            "getTxId",
            Value::function("getTxId", move |_| {
                Ok(native.get("id").unwrap_or_default())
            }),
        );

        Ok(())
    })
}

fn verification_module() -> ModuleSource {
    ModuleSource::new(|ctx| {
        let native = ambient(ctx, bridges::NATIVE_VERIFICATION)?;
        forward(&ctx.exports, &native, "verifySignature");
        forward(&ctx.exports, &native, "verifyPublicKey");
        Ok(())
    })
}

fn reward_module() -> ModuleSource {
    ModuleSource::new(|ctx| {
        let native = ambient(ctx, bridges::NATIVE_REWARD)?;
        forward(&ctx.exports, &native, "record");
        Ok(())
    })
}
