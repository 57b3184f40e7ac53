//! In-memory token store.

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use tokio::sync::RwLock;

use super::{same_kind, PatchOutcome, TokenStore};
use crate::error::{AppError, Result};
use crate::types::{TokenPatch, TokenRecord};

/// Token store kept in process memory.
///
/// Records keep their insertion order. Every mutation takes the write lock,
/// so the symbol check and the write are atomic.
#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    records: RwLock<Vec<TokenRecord>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn list_all(&self) -> Result<Vec<TokenRecord>> {
        Ok(self.records.read().await.clone())
    }

    async fn find_by_symbol(&self, symbol: &str) -> Result<Option<TokenRecord>> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.symbol == symbol).cloned())
    }

    async fn insert(&self, mut record: TokenRecord) -> Result<ObjectId> {
        let mut records = self.records.write().await;

        if records.iter().any(|r| r.symbol == record.symbol) {
            return Err(AppError::DuplicateKey(record.symbol));
        }

        let id = ObjectId::new();
        record.id = Some(id);
        records.push(record);
        Ok(id)
    }

    async fn delete_by_symbol(&self, symbol: &str) -> Result<u64> {
        let mut records = self.records.write().await;
        match records.iter().position(|r| r.symbol == symbol) {
            Some(index) => {
                records.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn patch_by_symbol(
        &self,
        symbol: &str,
        expected: &TokenRecord,
        patch: &TokenPatch,
    ) -> Result<PatchOutcome> {
        let mut records = self.records.write().await;

        let Some(index) =
            records.iter().position(|r| r.symbol == symbol && same_kind(r, expected))
        else {
            return Ok(PatchOutcome::default());
        };

        if let Some(new_symbol) = patch.symbol.as_deref() {
            let taken = records
                .iter()
                .enumerate()
                .any(|(i, r)| i != index && r.symbol == new_symbol);
            if taken {
                return Err(AppError::DuplicateKey(new_symbol.to_string()));
            }
        }

        let mut updated = records[index].clone();
        patch.apply_to(&mut updated);
        updated.validate()?;
        let modified = u64::from(updated != records[index]);
        records[index] = updated;

        Ok(PatchOutcome { matched: 1, modified })
    }
}
