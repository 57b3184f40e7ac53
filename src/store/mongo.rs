//! MongoDB token store.

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Document},
    options::IndexOptions,
    Client, Collection, Database, IndexModel,
};
use tracing::{info, warn};

use super::{PatchOutcome, TokenStore};
use crate::error::{is_duplicate_key, AppError, Result};
use crate::types::{TokenPatch, TokenRecord};

/// Collection holding the registry.
pub const TOKENS_COLLECTION: &str = "tokens";

/// Token store backed by the `tokens` collection.
#[derive(Clone)]
pub struct MongoTokenStore {
    collection: Collection<TokenRecord>,
}

impl MongoTokenStore {
    /// Connect to MongoDB and prepare the collection.
    ///
    /// Fails only on a malformed connection string. An unreachable server is
    /// logged and surfaces later as storage errors on the first operation.
    pub async fn connect(uri: &str, database: &str) -> Result<Self> {
        let client = Client::with_uri_str(uri)
            .await
            .map_err(|e| AppError::Config(format!("Invalid MONGODB_URI: {}", e)))?;
        let db = client.database(database);

        match db.run_command(doc! { "ping": 1 }).await {
            Ok(_) => info!(database = %database, "Connected to MongoDB"),
            Err(e) => warn!(database = %database, error = %e, "MongoDB ping failed"),
        }

        let store = Self::from_database(&db);
        if let Err(e) = store.ensure_indexes().await {
            warn!(error = %e, "Failed to create unique index on tokens.symbol");
        }

        Ok(store)
    }

    /// Use an already connected database.
    pub fn from_database(db: &Database) -> Self {
        Self { collection: db.collection::<TokenRecord>(TOKENS_COLLECTION) }
    }

    /// Unique index on `symbol`; closes the race between concurrent inserts.
    async fn ensure_indexes(&self) -> Result<()> {
        let index = IndexModel::builder()
            .keys(doc! { "symbol": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.collection.create_index(index).await?;
        Ok(())
    }
}

#[async_trait]
impl TokenStore for MongoTokenStore {
    async fn list_all(&self) -> Result<Vec<TokenRecord>> {
        let cursor = self.collection.find(doc! {}).await?;
        let records: Vec<TokenRecord> = cursor.try_collect().await?;
        Ok(records)
    }

    async fn find_by_symbol(&self, symbol: &str) -> Result<Option<TokenRecord>> {
        Ok(self.collection.find_one(doc! { "symbol": symbol }).await?)
    }

    async fn insert(&self, mut record: TokenRecord) -> Result<ObjectId> {
        let id = ObjectId::new();
        record.id = Some(id);

        self.collection.insert_one(&record).await.map_err(|e| {
            if is_duplicate_key(&e) {
                AppError::DuplicateKey(record.symbol.clone())
            } else {
                e.into()
            }
        })?;

        Ok(id)
    }

    async fn delete_by_symbol(&self, symbol: &str) -> Result<u64> {
        let result = self.collection.delete_one(doc! { "symbol": symbol }).await?;
        Ok(result.deleted_count)
    }

    async fn patch_by_symbol(
        &self,
        symbol: &str,
        expected: &TokenRecord,
        patch: &TokenPatch,
    ) -> Result<PatchOutcome> {
        let update = update_document(patch)?;
        if update.is_empty() {
            return Err(AppError::Validation("No fields to update".into()));
        }

        let filter = patch_filter(symbol, expected);
        let result = self.collection.update_one(filter, update).await.map_err(|e| {
            if is_duplicate_key(&e) {
                AppError::DuplicateKey(patch.symbol.clone().unwrap_or_default())
            } else {
                e.into()
            }
        })?;

        Ok(PatchOutcome { matched: result.matched_count, modified: result.modified_count })
    }
}

/// Match `symbol` only while it keeps the kind of `expected`.
///
/// A `null` address also matches documents without the field.
fn patch_filter(symbol: &str, expected: &TokenRecord) -> Document {
    doc! {
        "symbol": symbol,
        "isNative": expected.is_native,
        "isToken": expected.is_token,
        "address": expected.address.as_deref(),
    }
}

/// `$set` / `$unset` document for a patch.
fn update_document(patch: &TokenPatch) -> Result<Document> {
    let mut set = Document::new();

    if let Some(chain_id) = patch.chain_id {
        let chain_id = i64::try_from(chain_id)
            .map_err(|_| AppError::NumericOverflow(format!("chainId {} too large", chain_id)))?;
        set.insert("chainId", chain_id);
    }
    if let Some(decimals) = patch.decimals {
        set.insert("decimals", i32::from(decimals));
    }
    if let Some(symbol) = &patch.symbol {
        set.insert("symbol", symbol.as_str());
    }
    if let Some(name) = &patch.name {
        set.insert("name", name.as_str());
    }
    if let Some(is_native) = patch.is_native {
        set.insert("isNative", is_native);
        set.insert("isToken", !is_native);
    }
    if let Some(address) = &patch.address {
        set.insert("address", address.as_str());
    }
    if let Some(logo_uri) = &patch.logo_uri {
        set.insert("logoURI", logo_uri.as_str());
    }
    if let Some(usdt_price) = &patch.usdt_price {
        set.insert("usdtPrice", usdt_price.as_str());
    }

    let mut update = Document::new();
    if !set.is_empty() {
        update.insert("$set", set);
    }
    if patch.clear_address {
        update.insert("$unset", doc! { "address": "" });
    }
    Ok(update)
}
