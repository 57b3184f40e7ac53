//! Token Store: persistence of registry entries keyed by symbol.
//!
//! Two backends implement [`TokenStore`]:
//! - [`MongoTokenStore`]: the `tokens` collection of a MongoDB database
//! - [`InMemoryTokenStore`]: process-local, lost on restart
//!
//! Both guarantee that at most one record exists per symbol and hand out
//! BSON `ObjectId`s as record identifiers.

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

use crate::error::Result;
use crate::types::{TokenPatch, TokenRecord};

pub mod memory;
pub mod mongo;

pub use memory::InMemoryTokenStore;
pub use mongo::MongoTokenStore;

/// Result of a patch against the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PatchOutcome {
    /// Records whose symbol matched.
    pub matched: u64,
    /// Records whose content actually changed.
    pub modified: u64,
}

/// Storage operations on token records.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// All records, in insertion order.
    async fn list_all(&self) -> Result<Vec<TokenRecord>>;

    /// The record registered under `symbol`, if any.
    async fn find_by_symbol(&self, symbol: &str) -> Result<Option<TokenRecord>>;

    /// Persist a new record and return its generated identifier.
    ///
    /// Fails with `DuplicateKey` when the symbol is already taken.
    async fn insert(&self, record: TokenRecord) -> Result<ObjectId>;

    /// Remove the record registered under `symbol`; returns the removed count (0 or 1).
    async fn delete_by_symbol(&self, symbol: &str) -> Result<u64>;

    /// Overwrite the supplied fields of the record registered under `symbol`.
    ///
    /// The write is conditional: it only matches while the stored record
    /// still has the kind (`isNative`, `isToken`, `address`) of `expected`,
    /// the snapshot the patch was validated against. A record changed in
    /// between reports `matched == 0`.
    async fn patch_by_symbol(
        &self,
        symbol: &str,
        expected: &TokenRecord,
        patch: &TokenPatch,
    ) -> Result<PatchOutcome>;
}

/// Whether `stored` still has the native/token kind of `expected`.
pub(crate) fn same_kind(stored: &TokenRecord, expected: &TokenRecord) -> bool {
    stored.is_native == expected.is_native
        && stored.is_token == expected.is_token
        && stored.address == expected.address
}
