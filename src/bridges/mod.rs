// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Native bridge objects.
//!
//! Bridges are host capabilities (ledger, storage, signature checks, reward
//! accounting, transaction context) surfaced to contract code as ambient
//! `_native_*` objects on the global scope. The library modules in
//! [`crate::stdlib`] wrap them in friendlier exports; contract code normally
//! requires those wrappers rather than touching `_native_*` directly.

mod context;
mod crypto;
mod ledger;
mod reward;
mod storage;

pub use context::{TransactionContext, native_tx_object};
pub use crypto::{SignatureBridge, native_verification_object};
pub use ledger::{LedgerBridge, native_blockchain_object};
pub use reward::{RewardBridge, native_reward_object};
pub use storage::{StorageBridge, native_storage_object};

use crate::sandbox::GlobalScope;
use std::rc::Rc;

/// Global binding name of the storage bridge object
pub const NATIVE_STORAGE: &str = "_native_storage";
/// Global binding name of the ledger bridge object
pub const NATIVE_BLOCKCHAIN: &str = "_native_blockchain";
/// Global binding name of the verification bridge object
pub const NATIVE_VERIFICATION: &str = "_native_verification";
/// Global binding name of the reward bridge object
pub const NATIVE_REWARD: &str = "_native_reward";
/// Global binding name of the transaction context object
pub const NATIVE_TX: &str = "_native_tx";

/// The full set of host bridges backing one contract invocation
pub struct BridgeSet {
    /// Contract state store
    pub storage: Rc<dyn StorageBridge>,
    /// Ledger operations
    pub ledger: Rc<dyn LedgerBridge>,
    /// Signature checks
    pub signature: Rc<dyn SignatureBridge>,
    /// Reward accounting
    pub reward: Rc<dyn RewardBridge>,
    /// Invoking transaction
    pub tx: TransactionContext,
}

impl BridgeSet {
    /// Install the ambient `_native_*` objects on the global scope
    pub fn install(&self, global: &GlobalScope) {
        global.define(NATIVE_STORAGE, native_storage_object(Rc::clone(&self.storage)));
        global.define(
            NATIVE_BLOCKCHAIN,
            native_blockchain_object(Rc::clone(&self.ledger)),
        );
        global.define(
            NATIVE_VERIFICATION,
            native_verification_object(Rc::clone(&self.signature)),
        );
        global.define(NATIVE_REWARD, native_reward_object(Rc::clone(&self.reward)));
        global.define(NATIVE_TX, native_tx_object(&self.tx));
        tracing::debug!(sender = self.tx.sender(), "bridges installed");
    }
}
