// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ledger bridge: address checks, transfers and chain introspection.
//!
//! Amounts cross the bridge as decimal strings, which is how the host's
//! transaction builder consumes them.

use crate::error::{Result, VmError};
use crate::value::{ObjectRef, Value};
use std::rc::Rc;

/// Host-provided ledger operations
pub trait LedgerBridge {
    /// Whether an address is well formed for this chain
    fn verify_address(&self, address: &str) -> bool;

    /// Queue a transfer from the contract to `to`; zero means accepted
    fn transfer(&self, to: &str, amount: &str, tip: &str) -> i32;

    /// Height of the block this invocation runs in
    fn curr_block_height(&self) -> u64;

    /// Address of the node executing this invocation
    fn node_address(&self) -> String;

    /// Queue destruction of the contract; zero means accepted
    fn delete_contract(&self) -> i32;
}

fn string_arg(args: &[Value], index: usize, what: &str) -> Result<String> {
    args.get(index)
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| VmError::type_error(format!("expected a string for {}", what)))
}

/// Largest float whose integral values are all exactly representable (2^53)
pub(crate) const MAX_SAFE_AMOUNT: f64 = 9_007_199_254_740_992.0;

/// Amounts may arrive as strings or numbers; the bridge wants strings.
/// Numbers beyond [`MAX_SAFE_AMOUNT`] have already lost precision, so they
/// are rejected rather than passed on approximated.
fn amount_arg(args: &[Value], index: usize, what: &str) -> Result<String> {
    match args.get(index) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) if n.fract() == 0.0 && *n >= 0.0 && *n <= MAX_SAFE_AMOUNT => {
            Ok(format!("{}", *n as u64))
        }
        _ => Err(VmError::type_error(format!(
            "expected a non-negative safe-integer amount for {}",
            what
        ))),
    }
}

/// Build the `_native_blockchain` ambient object over a ledger bridge
pub fn native_blockchain_object(bridge: Rc<dyn LedgerBridge>) -> Value {
    let obj = ObjectRef::new();

    let b = Rc::clone(&bridge);
    obj.insert(
        "verifyAddress",
        Value::function("verifyAddress", move |args| {
            let addr = string_arg(args, 0, "address")?;
            Ok(Value::Bool(b.verify_address(&addr)))
        }),
    );

    let b = Rc::clone(&bridge);
    obj.insert(
        "transfer",
        Value::function("transfer", move |args| {
            let to = string_arg(args, 0, "transfer recipient")?;
            let amount = amount_arg(args, 1, "transfer amount")?;
            let tip = amount_arg(args, 2, "transfer tip")?;
            let code = b.transfer(&to, &amount, &tip);
            if code != 0 {
                tracing::warn!(to = to.as_str(), amount = amount.as_str(), code, "transfer rejected");
            }
            Ok(Value::Number(f64::from(code)))
        }),
    );

    let b = Rc::clone(&bridge);
    obj.insert(
        "getCurrBlockHeight",
        Value::function("getCurrBlockHeight", move |_| {
            Ok(Value::Number(b.curr_block_height() as f64))
        }),
    );

    let b = Rc::clone(&bridge);
    obj.insert(
        "getNodeAddress",
        Value::function("getNodeAddress", move |_| {
            Ok(Value::String(b.node_address()))
        }),
    );

    let b = Rc::clone(&bridge);
    obj.insert(
        "deleteContract",
        Value::function("deleteContract", move |_| {
            Ok(Value::Number(f64::from(b.delete_contract())))
        }),
    );

    Value::Object(obj)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct FakeLedger {
        transfers: RefCell<Vec<(String, String, String)>>,
    }

    impl LedgerBridge for FakeLedger {
        fn verify_address(&self, address: &str) -> bool {
            address.starts_with("dW")
        }

        fn transfer(&self, to: &str, amount: &str, tip: &str) -> i32 {
            if !self.verify_address(to) {
                return 1;
            }
            self.transfers
                .borrow_mut()
                .push((to.to_owned(), amount.to_owned(), tip.to_owned()));
            0
        }

        fn curr_block_height(&self) -> u64 {
            42
        }

        fn node_address(&self) -> String {
            "dWnode".to_owned()
        }

        fn delete_contract(&self) -> i32 {
            0
        }
    }

    fn native() -> (ObjectRef, Rc<FakeLedger>) {
        let ledger = Rc::new(FakeLedger {
            transfers: RefCell::new(Vec::new()),
        });
        let obj = match native_blockchain_object(ledger.clone()) {
            Value::Object(obj) => obj,
            _ => unreachable!(),
        };
        (obj, ledger)
    }

    #[test]
    fn verify_address_passes_through() {
        let (chain, _) = native();
        assert_eq!(
            chain.call("verifyAddress", &[Value::string("dWabc")]).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            chain.call("verifyAddress", &[Value::string("bad")]).unwrap(),
            Value::Bool(false)
        );
    }

    #[test]
    fn transfer_accepts_string_and_number_amounts() {
        let (chain, ledger) = native();
        let code = chain
            .call(
                "transfer",
                &[Value::string("dWabc"), Value::string("10"), Value::Number(2.0)],
            )
            .unwrap();
        assert_eq!(code, Value::Number(0.0));
        assert_eq!(
            ledger.transfers.borrow().as_slice(),
            &[("dWabc".to_owned(), "10".to_owned(), "2".to_owned())]
        );
    }

    #[test]
    fn fractional_amount_is_a_type_error() {
        let (chain, _) = native();
        let err = chain.call(
            "transfer",
            &[Value::string("dWabc"), Value::Number(1.5), Value::Number(0.0)],
        );
        assert!(matches!(err, Err(VmError::Type(_))));
    }

    #[test]
    fn amount_beyond_safe_integer_range_is_a_type_error() {
        let (chain, ledger) = native();
        for huge in [1e300, MAX_SAFE_AMOUNT * 2.0, f64::INFINITY] {
            let err = chain.call(
                "transfer",
                &[Value::string("dWabc"), Value::Number(huge), Value::Number(0.0)],
            );
            assert!(matches!(err, Err(VmError::Type(_))));
        }
        assert!(ledger.transfers.borrow().is_empty());

        // The boundary itself is still exact and accepted.
        let code = chain
            .call(
                "transfer",
                &[
                    Value::string("dWabc"),
                    Value::Number(MAX_SAFE_AMOUNT),
                    Value::Number(0.0),
                ],
            )
            .unwrap();
        assert_eq!(code, Value::Number(0.0));
        assert_eq!(
            ledger.transfers.borrow()[0].1,
            format!("{}", 9_007_199_254_740_992u64)
        );
    }

    #[test]
    fn chain_introspection() {
        let (chain, _) = native();
        assert_eq!(
            chain.call("getCurrBlockHeight", &[]).unwrap(),
            Value::Number(42.0)
        );
        assert_eq!(
            chain.call("getNodeAddress", &[]).unwrap(),
            Value::string("dWnode")
        );
    }
}
