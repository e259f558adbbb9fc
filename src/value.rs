// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Dynamic value representation for contract code.
//!
//! Contract execution is strictly single-threaded, so shared structure uses
//! `Rc`/`RefCell` rather than atomics. Objects are reference values: cloning
//! a [`Value::Object`] clones the handle, not the contents, and equality on
//! objects and functions is reference identity. A module's `exports` is an
//! [`ObjectRef`], which is what gives every requester of a module the same
//! exports value rather than a copy.

use crate::error::{Result, VmError};
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Signature of a native function callable from contract code
pub type NativeFn = dyn Fn(&[Value]) -> Result<Value>;

/// A named native function.
///
/// Native functions carry no source representation; see
/// [`crate::sandbox::policy`].
pub struct NativeFunction {
    name: String,
    func: Box<NativeFn>,
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeFunction({})", self.name)
    }
}

/// Shared handle to a native function
#[derive(Clone, Debug)]
pub struct FunctionRef(Rc<NativeFunction>);

impl FunctionRef {
    /// Wrap a native closure as a callable function value
    pub fn new(name: impl Into<String>, func: impl Fn(&[Value]) -> Result<Value> + 'static) -> Self {
        Self(Rc::new(NativeFunction {
            name: name.into(),
            func: Box::new(func),
        }))
    }

    /// The function's name
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Invoke the function
    pub fn call(&self, args: &[Value]) -> Result<Value> {
        (self.0.func)(args)
    }

    /// Reference identity
    pub fn ptr_eq(&self, other: &FunctionRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// Shared handle to a mutable object.
///
/// All clones refer to the same underlying map; mutations through one handle
/// are visible through every other.
#[derive(Clone, Debug, Default)]
pub struct ObjectRef(Rc<RefCell<FxHashMap<String, Value>>>);

impl ObjectRef {
    /// Create a new empty object
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a property value
    pub fn get(&self, key: &str) -> Option<Value> {
        self.0.borrow().get(key).cloned()
    }

    /// Set a property value
    pub fn insert(&self, key: impl Into<String>, value: Value) {
        self.0.borrow_mut().insert(key.into(), value);
    }

    /// Check whether a property exists
    pub fn contains(&self, key: &str) -> bool {
        self.0.borrow().contains_key(key)
    }

    /// Number of properties
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    /// Whether the object has no properties
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Property names, in unspecified order
    pub fn keys(&self) -> Vec<String> {
        self.0.borrow().keys().cloned().collect()
    }

    /// Reference identity
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    fn data_ptr(&self) -> *const () {
        Rc::as_ptr(&self.0) as *const ()
    }

    /// Call a function-valued property
    pub fn call(&self, method: &str, args: &[Value]) -> Result<Value> {
        match self.get(method) {
            Some(Value::Function(f)) => f.call(args),
            Some(other) => Err(VmError::type_error(format!(
                "property '{}' is {}, not a function",
                method,
                other.type_of()
            ))),
            None => Err(VmError::type_error(format!(
                "property '{}' is not defined",
                method
            ))),
        }
    }
}

/// A dynamic value flowing between contract modules and native bridges
#[derive(Clone, Debug, Default)]
pub enum Value {
    /// undefined
    #[default]
    Undefined,
    /// null
    Null,
    /// Boolean value
    Bool(bool),
    /// Number (IEEE 754 double)
    Number(f64),
    /// String
    String(String),
    /// Object reference
    Object(ObjectRef),
    /// Native function reference
    Function(FunctionRef),
}

impl Value {
    /// Create a new empty object value
    pub fn object() -> Self {
        Value::Object(ObjectRef::new())
    }

    /// Create a string value
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    /// Create a native function value
    pub fn function(
        name: impl Into<String>,
        func: impl Fn(&[Value]) -> Result<Value> + 'static,
    ) -> Self {
        Value::Function(FunctionRef::new(name, func))
    }

    /// Returns true if this value is undefined
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Returns true if this value is null or undefined
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    /// Borrow the string contents, if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric contents, if this is a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Boolean contents, if this is a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The object handle, if this is an object
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// The function handle, if this is a function
    pub fn as_function(&self) -> Option<&FunctionRef> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }

    /// The type of this value as a string
    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Object(_) => "object",
            Value::Function(_) => "function",
        }
    }

    /// Convert a JSON value into a contract value
    pub fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(0.0)),
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(arr) => {
                let obj = ObjectRef::new();
                for (i, v) in arr.iter().enumerate() {
                    obj.insert(i.to_string(), Value::from_json(v));
                }
                obj.insert("length", Value::Number(arr.len() as f64));
                Value::Object(obj)
            }
            serde_json::Value::Object(map) => {
                let obj = ObjectRef::new();
                for (k, v) in map {
                    obj.insert(k.clone(), Value::from_json(v));
                }
                Value::Object(obj)
            }
        }
    }

    /// Convert this value to JSON for storage.
    ///
    /// Functions (and undefined) have no storage representation, and a
    /// cyclic object graph cannot be encoded; both are type errors.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        self.to_json_guarded(&mut Vec::new())
    }

    /// `visiting` holds the identities of objects on the current encoding
    /// path; meeting one again means the graph is cyclic.
    fn to_json_guarded(&self, visiting: &mut Vec<*const ()>) -> Result<serde_json::Value> {
        match self {
            Value::Undefined | Value::Function(_) => Err(VmError::type_error(format!(
                "cannot serialize a value of type {}",
                self.type_of()
            ))),
            Value::Null => Ok(serde_json::Value::Null),
            Value::Bool(b) => Ok(serde_json::Value::Bool(*b)),
            Value::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .ok_or_else(|| VmError::type_error("cannot serialize a non-finite number")),
            Value::String(s) => Ok(serde_json::Value::String(s.clone())),
            Value::Object(obj) => {
                let identity = obj.data_ptr();
                if visiting.contains(&identity) {
                    return Err(VmError::type_error("cannot serialize a cyclic value"));
                }
                visiting.push(identity);
                let mut map = serde_json::Map::new();
                let mut keys = obj.keys();
                keys.sort();
                for key in keys {
                    if let Some(v) = obj.get(&key) {
                        map.insert(key, v.to_json_guarded(visiting)?);
                    }
                }
                visiting.pop();
                Ok(serde_json::Value::Object(map))
            }
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => {
                if a.is_nan() && b.is_nan() {
                    false
                } else {
                    a == b
                }
            }
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
            Value::Object(_) => write!(f, "[object Object]"),
            Value::Function(func) => write!(f, "[Function: {}]", func.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_equality_is_identity() {
        let a = ObjectRef::new();
        let b = a.clone();
        let c = ObjectRef::new();
        assert_eq!(Value::Object(a.clone()), Value::Object(b));
        assert_ne!(Value::Object(a), Value::Object(c));
    }

    #[test]
    fn object_mutation_is_shared() {
        let a = ObjectRef::new();
        let b = a.clone();
        a.insert("x", Value::Number(1.0));
        assert_eq!(b.get("x"), Some(Value::Number(1.0)));
    }

    #[test]
    fn native_function_call() {
        let f = FunctionRef::new("add", |args| {
            let a = args.first().and_then(Value::as_number).unwrap_or(0.0);
            let b = args.get(1).and_then(Value::as_number).unwrap_or(0.0);
            Ok(Value::Number(a + b))
        });
        let result = f.call(&[Value::Number(2.0), Value::Number(3.0)]).unwrap();
        assert_eq!(result, Value::Number(5.0));
    }

    #[test]
    fn object_call_rejects_non_function() {
        let obj = ObjectRef::new();
        obj.insert("x", Value::Number(1.0));
        assert!(matches!(obj.call("x", &[]), Err(VmError::Type(_))));
        assert!(matches!(obj.call("missing", &[]), Err(VmError::Type(_))));
    }

    #[test]
    fn json_round_trip() {
        let json: serde_json::Value =
            serde_json::from_str(r#"{"balance": 42, "owner": "addr1", "frozen": false}"#).unwrap();
        let value = Value::from_json(&json);
        assert_eq!(value.to_json().unwrap(), json);
    }

    #[test]
    fn functions_are_not_serializable() {
        let f = Value::function("f", |_| Ok(Value::Undefined));
        assert!(f.to_json().is_err());
    }

    #[test]
    fn cyclic_object_is_a_type_error() {
        let obj = ObjectRef::new();
        obj.insert("self", Value::Object(obj.clone()));
        assert!(matches!(
            Value::Object(obj).to_json(),
            Err(VmError::Type(_))
        ));

        let outer = ObjectRef::new();
        let inner = ObjectRef::new();
        inner.insert("back", Value::Object(outer.clone()));
        outer.insert("inner", Value::Object(inner));
        assert!(matches!(
            Value::Object(outer).to_json(),
            Err(VmError::Type(_))
        ));
    }

    #[test]
    fn shared_acyclic_objects_still_serialize() {
        // The same object twice on different paths is sharing, not a cycle.
        let shared = ObjectRef::new();
        shared.insert("n", Value::Number(1.0));
        let root = ObjectRef::new();
        root.insert("a", Value::Object(shared.clone()));
        root.insert("b", Value::Object(shared));

        let json = Value::Object(root).to_json().unwrap();
        assert_eq!(json["a"]["n"], json["b"]["n"]);
    }
}
