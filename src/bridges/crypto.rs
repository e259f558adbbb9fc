// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Signature verification bridge.
//!
//! Verification itself is a host capability (keys, curves and address
//! derivation all belong to the chain); the VM only routes calls through.

use crate::error::{Result, VmError};
use crate::value::{ObjectRef, Value};
use std::rc::Rc;

/// Host-provided signature checks
pub trait SignatureBridge {
    /// Verify a hex signature over `msg` with a hex public key
    fn verify_signature(&self, msg: &str, pubkey: &str, sig: &str) -> bool;

    /// Verify that a public key derives the given address
    fn verify_public_key(&self, address: &str, pubkey: &str) -> bool;
}

fn string_arg(args: &[Value], index: usize, what: &str) -> Result<String> {
    args.get(index)
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| VmError::type_error(format!("expected a string for {}", what)))
}

/// Build the `_native_verification` ambient object
pub fn native_verification_object(bridge: Rc<dyn SignatureBridge>) -> Value {
    let obj = ObjectRef::new();

    let b = Rc::clone(&bridge);
    obj.insert(
        "verifySignature",
        Value::function("verifySignature", move |args| {
            let msg = string_arg(args, 0, "message")?;
            let pubkey = string_arg(args, 1, "public key")?;
            let sig = string_arg(args, 2, "signature")?;
            let ok = b.verify_signature(&msg, &pubkey, &sig);
            if !ok {
                tracing::debug!("signature verification failed");
            }
            Ok(Value::Bool(ok))
        }),
    );

    let b = Rc::clone(&bridge);
    obj.insert(
        "verifyPublicKey",
        Value::function("verifyPublicKey", move |args| {
            let addr = string_arg(args, 0, "address")?;
            let pubkey = string_arg(args, 1, "public key")?;
            Ok(Value::Bool(b.verify_public_key(&addr, &pubkey)))
        }),
    );

    Value::Object(obj)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeVerifier;

    impl SignatureBridge for FakeVerifier {
        fn verify_signature(&self, msg: &str, pubkey: &str, sig: &str) -> bool {
            sig == format!("sig({},{})", msg, pubkey)
        }

        fn verify_public_key(&self, address: &str, pubkey: &str) -> bool {
            address == format!("addr({})", pubkey)
        }
    }

    #[test]
    fn verification_routes_through_the_bridge() {
        let obj = match native_verification_object(Rc::new(FakeVerifier)) {
            Value::Object(obj) => obj,
            _ => unreachable!(),
        };

        assert_eq!(
            obj.call(
                "verifySignature",
                &[
                    Value::string("m"),
                    Value::string("pk"),
                    Value::string("sig(m,pk)")
                ]
            )
            .unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            obj.call(
                "verifyPublicKey",
                &[Value::string("addr(pk)"), Value::string("pk")]
            )
            .unwrap(),
            Value::Bool(true)
        );
        assert!(matches!(
            obj.call("verifySignature", &[Value::Number(1.0)]),
            Err(VmError::Type(_))
        ));
    }
}
