// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Contract state storage bridge.
//!
//! The host persists contract state; the VM only sees string keys and
//! already-encoded string values. Bridge primitives report failure through
//! non-zero return codes, which the `jslib/storage.js` wrapper turns into
//! errors where the original contract convention demands it.

use crate::error::{Result, VmError};
use crate::value::{ObjectRef, Value};
use std::rc::Rc;

/// Host-provided contract state store
pub trait StorageBridge {
    /// Fetch the raw encoded value for a key, if present
    fn get(&self, key: &str) -> Option<String>;

    /// Store a raw encoded value; zero means success
    fn set(&self, key: &str, value: &str) -> i32;

    /// Delete a key; zero means success
    fn delete(&self, key: &str) -> i32;
}

fn key_arg(args: &[Value], op: &'static str) -> Result<String> {
    args.first()
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| VmError::type_error(format!("storage {} expects a string key", op)))
}

/// Build the `_native_storage` ambient object over a storage bridge
pub fn native_storage_object(bridge: Rc<dyn StorageBridge>) -> Value {
    let obj = ObjectRef::new();

    let b = Rc::clone(&bridge);
    obj.insert(
        "get",
        Value::function("get", move |args| {
            let key = key_arg(args, "get")?;
            match b.get(&key) {
                Some(raw) => Ok(Value::String(raw)),
                None => {
                    tracing::debug!(key = key.as_str(), "storage get missed");
                    Ok(Value::Null)
                }
            }
        }),
    );

    let b = Rc::clone(&bridge);
    obj.insert(
        "set",
        Value::function("set", move |args| {
            let key = key_arg(args, "set")?;
            let raw = args
                .get(1)
                .and_then(Value::as_str)
                .ok_or_else(|| VmError::type_error("storage set expects an encoded string value"))?;
            Ok(Value::Number(f64::from(b.set(&key, raw))))
        }),
    );

    let b = Rc::clone(&bridge);
    obj.insert(
        "del",
        Value::function("del", move |args| {
            let key = key_arg(args, "del")?;
            let code = b.delete(&key);
            if code != 0 {
                tracing::warn!(key = key.as_str(), code, "storage delete failed");
            }
            Ok(Value::Number(f64::from(code)))
        }),
    );

    Value::Object(obj)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashMap;
    use std::cell::RefCell;

    #[derive(Default)]
    struct MemoryStorage {
        map: RefCell<FxHashMap<String, String>>,
    }

    impl StorageBridge for MemoryStorage {
        fn get(&self, key: &str) -> Option<String> {
            self.map.borrow().get(key).cloned()
        }

        fn set(&self, key: &str, value: &str) -> i32 {
            self.map.borrow_mut().insert(key.to_owned(), value.to_owned());
            0
        }

        fn delete(&self, key: &str) -> i32 {
            match self.map.borrow_mut().remove(key) {
                Some(_) => 0,
                None => 1,
            }
        }
    }

    fn native() -> ObjectRef {
        match native_storage_object(Rc::new(MemoryStorage::default())) {
            Value::Object(obj) => obj,
            _ => unreachable!(),
        }
    }

    #[test]
    fn set_then_get_round_trips_raw_strings() {
        let storage = native();
        let code = storage
            .call("set", &[Value::string("k"), Value::string("\"v\"")])
            .unwrap();
        assert_eq!(code, Value::Number(0.0));
        let got = storage.call("get", &[Value::string("k")]).unwrap();
        assert_eq!(got, Value::string("\"v\""));
    }

    #[test]
    fn get_of_missing_key_is_null() {
        let storage = native();
        let got = storage.call("get", &[Value::string("nope")]).unwrap();
        assert_eq!(got, Value::Null);
    }

    #[test]
    fn delete_reports_the_bridge_code() {
        let storage = native();
        storage
            .call("set", &[Value::string("k"), Value::string("1")])
            .unwrap();
        assert_eq!(
            storage.call("del", &[Value::string("k")]).unwrap(),
            Value::Number(0.0)
        );
        assert_eq!(
            storage.call("del", &[Value::string("k")]).unwrap(),
            Value::Number(1.0)
        );
    }

    #[test]
    fn non_string_key_is_a_type_error() {
        let storage = native();
        assert!(matches!(
            storage.call("get", &[Value::Number(1.0)]),
            Err(VmError::Type(_))
        ));
    }
}
