use crate::domain::account::Account;
use crate::domain::movement::{DateWindow, IdempotencyKey, Movement};
use crate::domain::ports::{AccountStore, InsertOutcome, MovementLog};
use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, Direction, IteratorMode, Options, WriteBatch};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Column Family for account states, keyed by account id.
pub const CF_ACCOUNTS: &str = "accounts";
/// Column Family for movements, keyed by account id + timestamp + movement id.
pub const CF_MOVEMENTS: &str = "movements";
/// Column Family mapping idempotency keys to their movement.
pub const CF_IDEMPOTENCY: &str = "idempotency";

/// A persistent store implementation using RocksDB.
///
/// Implements both storage ports over separate Column Families. Movement keys
/// are prefixed with the owning account id so one account's history sits
/// contiguously and can be range-scanned.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    // RocksDB has no unique constraint; this lock makes the idempotency
    // check and the batched write one atomic step.
    insert_lock: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path, ensuring
    /// the required column families exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cfs = vec![
            ColumnFamilyDescriptor::new(CF_ACCOUNTS, Options::default()),
            ColumnFamilyDescriptor::new(CF_MOVEMENTS, Options::default()),
            ColumnFamilyDescriptor::new(CF_IDEMPOTENCY, Options::default()),
        ];
        let db = DB::open_cf_descriptors(&opts, path, cfs)?;

        Ok(Self {
            db: Arc::new(db),
            insert_lock: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &str) -> Result<&rocksdb::ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| LedgerError::Internal(format!("column family {name} not found")))
    }
}

/// Composite movement key: account id, big-endian microsecond timestamp,
/// movement id. Orders one account's movements by time.
fn movement_key(movement: &Movement) -> [u8; 40] {
    let mut key = [0u8; 40];
    key[..16].copy_from_slice(movement.account_id.as_bytes());
    key[16..24].copy_from_slice(&movement.occurred_at.timestamp_micros().to_be_bytes());
    key[24..].copy_from_slice(movement.id.as_bytes());
    key
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| LedgerError::Internal(format!("serialization error: {e}")))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes)
        .map_err(|e| LedgerError::Internal(format!("deserialization error: {e}")))
}

#[async_trait]
impl AccountStore for RocksDBStore {
    async fn get(&self, account_id: Uuid) -> Result<Option<Account>> {
        let cf = self.cf(CF_ACCOUNTS)?;
        match self.db.get_pinned_cf(cf, account_id.as_bytes())? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, account: Account) -> Result<()> {
        let cf = self.cf(CF_ACCOUNTS)?;
        self.db
            .put_cf(cf, account.id.as_bytes(), encode(&account)?)?;
        Ok(())
    }

    async fn for_customer(&self, customer_id: Uuid) -> Result<Vec<Account>> {
        let cf = self.cf(CF_ACCOUNTS)?;
        let mut accounts = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            let account: Account = decode(&value)?;
            if account.customer_id == customer_id {
                accounts.push(account);
            }
        }
        Ok(accounts)
    }

    async fn all(&self) -> Result<Vec<Account>> {
        let cf = self.cf(CF_ACCOUNTS)?;
        let mut accounts = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            accounts.push(decode(&value)?);
        }
        Ok(accounts)
    }
}

#[async_trait]
impl MovementLog for RocksDBStore {
    async fn find_by_idempotency_key(&self, key: &IdempotencyKey) -> Result<Option<Movement>> {
        let cf = self.cf(CF_IDEMPOTENCY)?;
        match self.db.get_pinned_cf(cf, key.as_str().as_bytes())? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn insert(&self, movement: Movement) -> Result<InsertOutcome> {
        let row = encode(&movement)?;
        let idempotency_cf = self.cf(CF_IDEMPOTENCY)?;
        let movements_cf = self.cf(CF_MOVEMENTS)?;

        let _guard = self.insert_lock.lock().await;
        if self
            .db
            .get_pinned_cf(idempotency_cf, movement.idempotency_key.as_str().as_bytes())?
            .is_some()
        {
            return Ok(InsertOutcome::DuplicateKey);
        }

        let mut batch = WriteBatch::default();
        batch.put_cf(
            idempotency_cf,
            movement.idempotency_key.as_str().as_bytes(),
            &row,
        );
        batch.put_cf(movements_cf, movement_key(&movement), &row);
        self.db.write(batch)?;
        Ok(InsertOutcome::Inserted)
    }

    async fn find_by_customer_and_range(
        &self,
        customer_id: Uuid,
        window: DateWindow,
    ) -> Result<Vec<Movement>> {
        let mut account_ids: Vec<Uuid> = self
            .for_customer(customer_id)
            .await?
            .into_iter()
            .map(|account| account.id)
            .collect();
        account_ids.sort();

        let cf = self.cf(CF_MOVEMENTS)?;
        let mut rows = Vec::new();
        for account_id in account_ids {
            let prefix = account_id.as_bytes();
            for item in self
                .db
                .iterator_cf(cf, IteratorMode::From(prefix, Direction::Forward))
            {
                let (key, value) = item?;
                if !key.starts_with(prefix) {
                    break;
                }
                let movement: Movement = decode(&value)?;
                if window.contains(movement.occurred_at) {
                    rows.push(movement);
                }
            }
        }
        // Newest first. Stable sort keeps per-account key order for ties.
        rows.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
        Ok(rows)
    }
}
