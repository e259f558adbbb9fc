// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Transaction context.
//!
//! The invoking transaction's sender and id, captured once per invocation
//! and exposed read-only to contract code.

use crate::value::{ObjectRef, Value};
use serde::{Deserialize, Serialize};

/// The transaction this contract invocation runs under
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionContext {
    sender: String,
    tx_id: String,
}

impl TransactionContext {
    /// Capture a transaction context
    pub fn new(sender: impl Into<String>, tx_id: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            tx_id: tx_id.into(),
        }
    }

    /// Address of the invoking sender
    pub fn sender(&self) -> &str {
        &self.sender
    }

    /// Id of the invoking transaction
    pub fn tx_id(&self) -> &str {
        &self.tx_id
    }
}

/// Build the `_native_tx` ambient object
pub fn native_tx_object(ctx: &TransactionContext) -> Value {
    let obj = ObjectRef::new();
    obj.insert("sender", Value::string(ctx.sender()));
    obj.insert("id", Value::string(ctx.tx_id()));
    Value::Object(obj)
}
