// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Client helpers for talking to an IOTA fullnode (JSON-RPC over HTTP), plus
//! tool-facing ports: [`LedgerClient`] for confirmation/object reads and
//! [`wallet::Wallet`] for signing and broadcasting.

use std::future::Future;

pub mod rpc;
pub mod types;
pub mod wallet;

pub use rpc::{RpcClient, RpcConfig, RpcError};
pub use types::{
    Address, CallArg, CreatedObject, Digest, ExecutionStatus, IdError, MoveCall, ObjectData,
    ObjectId, ObjectRef, PackageId, TransactionEffects,
};
pub use wallet::{CliWallet, Wallet, WalletError};

/// Read-side ledger port: confirmation of submitted transactions and object reads.
pub trait LedgerClient: Send + Sync {
    /// Wait until the node reports effects for `digest`.
    fn wait_for_transaction(
        &self,
        digest: &Digest,
    ) -> impl Future<Output = Result<TransactionEffects, RpcError>> + Send;

    /// Fetch the current content of `id`; `Ok(None)` when it does not exist.
    fn get_object(
        &self,
        id: &ObjectId,
    ) -> impl Future<Output = Result<Option<ObjectData>, RpcError>> + Send;
}
