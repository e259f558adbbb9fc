// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reward accounting bridge.
//!
//! Contracts record reward amounts against addresses; the host accumulates
//! them into the block's reward ledger. Amounts are decimal strings, same
//! as transfers.

use crate::error::VmError;
use crate::value::{ObjectRef, Value};
use std::rc::Rc;

/// Host-provided reward accumulator
pub trait RewardBridge {
    /// Record a reward amount for an address; zero means accepted
    fn record(&self, address: &str, amount: &str) -> i32;
}

/// Build the `_native_reward` ambient object
pub fn native_reward_object(bridge: Rc<dyn RewardBridge>) -> Value {
    let obj = ObjectRef::new();

    obj.insert(
        "record",
        Value::function("record", move |args| {
            let addr = args
                .first()
                .and_then(Value::as_str)
                .ok_or_else(|| VmError::type_error("expected a string reward address"))?;
            let amount = match args.get(1) {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Number(n))
                    if n.fract() == 0.0
                        && *n >= 0.0
                        && *n <= crate::bridges::ledger::MAX_SAFE_AMOUNT =>
                {
                    format!("{}", *n as u64)
                }
                _ => {
                    return Err(VmError::type_error(
                        "expected a non-negative safe-integer reward amount",
                    ));
                }
            };
            let code = bridge.record(addr, &amount);
            if code != 0 {
                tracing::warn!(address = addr, amount = amount.as_str(), code, "reward record failed");
            }
            Ok(Value::Number(f64::from(code)))
        }),
    );

    Value::Object(obj)
}
