use super::account::Account;
use super::movement::{DateWindow, IdempotencyKey, Movement};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

/// Outcome of attempting to insert a movement into the log.
///
/// The log is the arbiter for idempotency: under a concurrent race on the
/// same key, exactly one caller sees `Inserted` and everyone else sees
/// `DuplicateKey`.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum InsertOutcome {
    Inserted,
    DuplicateKey,
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn get(&self, account_id: Uuid) -> Result<Option<Account>>;
    async fn save(&self, account: Account) -> Result<()>;
    async fn for_customer(&self, customer_id: Uuid) -> Result<Vec<Account>>;
    async fn all(&self) -> Result<Vec<Account>>;
}

#[async_trait]
pub trait MovementLog: Send + Sync {
    async fn find_by_idempotency_key(&self, key: &IdempotencyKey) -> Result<Option<Movement>>;

    /// Inserts the movement unless its idempotency key is already taken.
    /// The check and the write are a single atomic step.
    async fn insert(&self, movement: Movement) -> Result<InsertOutcome>;

    /// All movements for the customer's accounts within the window,
    /// newest first.
    async fn find_by_customer_and_range(
        &self,
        customer_id: Uuid,
        window: DateWindow,
    ) -> Result<Vec<Movement>>;
}

pub type AccountStoreRef = Arc<dyn AccountStore>;
pub type MovementLogRef = Arc<dyn MovementLog>;
