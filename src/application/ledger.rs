use crate::domain::account::Amount;
use crate::domain::movement::{IdempotencyKey, Movement, MovementKind, MovementReceipt, MovementRequest};
use crate::domain::ports::{AccountStoreRef, InsertOutcome, MovementLogRef};
use crate::error::{LedgerError, Result};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;
use uuid::Uuid;

/// The main entry point for applying movements to accounts.
///
/// `LedgerEngine` owns the storage ports and serializes all writes to a
/// given account behind a per-account lock, so concurrent callers touching
/// the same account are applied one at a time while different accounts
/// proceed in parallel.
pub struct LedgerEngine {
    accounts: AccountStoreRef,
    movements: MovementLogRef,
    // One lock per account seen; never evicted.
    account_locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl LedgerEngine {
    pub fn new(accounts: AccountStoreRef, movements: MovementLogRef) -> Self {
        Self {
            accounts,
            movements,
            account_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Applies a movement: validates the request, runs the balance change,
    /// and records it, all under the account's lock.
    ///
    /// Replays of an already-applied idempotency key return the original
    /// movement's receipt without touching any balance. The movement log's
    /// uniqueness check is the arbiter when two carriers of the same key
    /// race; the loser re-reads the winner's movement and answers from it.
    pub async fn apply(&self, request: MovementRequest) -> Result<MovementReceipt> {
        let amount = Amount::new(request.amount)?;
        let key = IdempotencyKey::new(request.idempotency_key)?;

        let _guard = self.lock_account(request.account_id).await;

        if let Some(existing) = self.movements.find_by_idempotency_key(&key).await? {
            debug!(key = %key, movement_id = %existing.id, "replayed idempotency key");
            return Ok(existing.receipt());
        }

        let mut account = self
            .accounts
            .get(request.account_id)
            .await?
            .ok_or(LedgerError::AccountNotFound(request.account_id))?;

        match request.kind {
            MovementKind::Credit => account.credit(amount),
            MovementKind::Debit => account.debit(amount)?,
        }

        let movement = Movement {
            id: Uuid::new_v4(),
            account_id: account.id,
            occurred_at: Utc::now(),
            kind: request.kind,
            amount,
            balance_after: account.balance,
            reference: request.reference,
            idempotency_key: key.clone(),
        };

        match self.movements.insert(movement.clone()).await? {
            InsertOutcome::Inserted => {
                self.accounts.save(account).await?;
                debug!(
                    movement_id = %movement.id,
                    account_id = %movement.account_id,
                    kind = ?movement.kind,
                    amount = %movement.amount.value(),
                    balance_after = %movement.balance_after.0,
                    "applied movement"
                );
                Ok(movement.receipt())
            }
            InsertOutcome::DuplicateKey => {
                // Lost the race on this key. Discard our attempt, leave the
                // account unsaved, and answer from the winner's movement.
                let winner = self
                    .movements
                    .find_by_idempotency_key(&key)
                    .await?
                    .ok_or_else(|| {
                        LedgerError::Internal(format!(
                            "movement for duplicate idempotency key {key} disappeared"
                        ))
                    })?;
                debug!(key = %key, movement_id = %winner.id, "lost idempotency race");
                Ok(winner.receipt())
            }
        }
    }

    async fn lock_account(&self, account_id: Uuid) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.account_locks.lock().await;
            Arc::clone(locks.entry(account_id).or_default())
        };
        lock.lock_owned().await
    }
}
