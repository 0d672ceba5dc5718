use crate::domain::account::Account;
use crate::domain::movement::{DateWindow, IdempotencyKey, Movement};
use crate::domain::ports::{AccountStore, InsertOutcome, MovementLog};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// A thread-safe in-memory store implementing both storage ports.
///
/// `Arc<RwLock<..>>` internals make clones share state, so the same
/// instance can serve as account store and movement log at once. Suited
/// to tests and one-shot batch runs where persistence is not required.
#[derive(Default, Clone)]
pub struct InMemoryStore {
    accounts: Arc<RwLock<HashMap<Uuid, Account>>>,
    movements: Arc<RwLock<MovementTable>>,
}

/// Append-only movement rows plus the idempotency key index.
///
/// Both live under one lock so the key check and the append are a single
/// atomic step, which is what `MovementLog::insert` promises.
#[derive(Default)]
struct MovementTable {
    rows: Vec<Movement>,
    by_key: HashMap<String, usize>,
}

impl InMemoryStore {
    /// Creates a new, empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for InMemoryStore {
    async fn get(&self, account_id: Uuid) -> Result<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.get(&account_id).cloned())
    }

    async fn save(&self, account: Account) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        accounts.insert(account.id, account);
        Ok(())
    }

    async fn for_customer(&self, customer_id: Uuid) -> Result<Vec<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts
            .values()
            .filter(|account| account.customer_id == customer_id)
            .cloned()
            .collect())
    }

    async fn all(&self) -> Result<Vec<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.values().cloned().collect())
    }
}

#[async_trait]
impl MovementLog for InMemoryStore {
    async fn find_by_idempotency_key(&self, key: &IdempotencyKey) -> Result<Option<Movement>> {
        let table = self.movements.read().await;
        Ok(table
            .by_key
            .get(key.as_str())
            .and_then(|&index| table.rows.get(index).cloned()))
    }

    async fn insert(&self, movement: Movement) -> Result<InsertOutcome> {
        let mut table = self.movements.write().await;
        let key = movement.idempotency_key.as_str().to_string();
        if table.by_key.contains_key(&key) {
            return Ok(InsertOutcome::DuplicateKey);
        }
        let index = table.rows.len();
        table.by_key.insert(key, index);
        table.rows.push(movement);
        Ok(InsertOutcome::Inserted)
    }

    async fn find_by_customer_and_range(
        &self,
        customer_id: Uuid,
        window: DateWindow,
    ) -> Result<Vec<Movement>> {
        let owned: HashSet<Uuid> = {
            let accounts = self.accounts.read().await;
            accounts
                .values()
                .filter(|account| account.customer_id == customer_id)
                .map(|account| account.id)
                .collect()
        };

        let table = self.movements.read().await;
        let mut matches: Vec<(usize, &Movement)> = table
            .rows
            .iter()
            .enumerate()
            .filter(|(_, movement)| {
                owned.contains(&movement.account_id) && window.contains(movement.occurred_at)
            })
            .collect();
        // Newest first; insertion order breaks timestamp ties.
        matches.sort_by(|a, b| (b.1.occurred_at, b.0).cmp(&(a.1.occurred_at, a.0)));
        Ok(matches.into_iter().map(|(_, movement)| movement.clone()).collect())
    }
}
