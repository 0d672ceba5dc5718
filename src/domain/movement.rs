use crate::domain::account::{Amount, Balance};
use crate::error::LedgerError;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    #[serde(alias = "CREDIT")]
    Credit,
    #[serde(alias = "DEBIT")]
    Debit,
}

/// Caller-supplied deduplication token.
///
/// Opaque and non-empty; the movement log enforces uniqueness across all
/// movements, which is what makes retries safe.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Clone)]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    pub fn new(key: impl Into<String>) -> Result<Self, LedgerError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(LedgerError::Validation(
                "idempotency key must not be empty".to_string(),
            ));
        }
        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An applied movement: an immutable, dated, signed change to an account's
/// balance.
///
/// `balance_after` is the balance snapshot taken immediately after the
/// movement was applied; it is persisted once and never recomputed.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Movement {
    pub id: Uuid,
    pub account_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub kind: MovementKind,
    pub amount: Amount,
    pub balance_after: Balance,
    pub reference: Option<String>,
    pub idempotency_key: IdempotencyKey,
}

impl Movement {
    /// Projection returned to callers, both for fresh applications and for
    /// duplicate-key replays.
    pub fn receipt(&self) -> MovementReceipt {
        MovementReceipt {
            movement_id: self.id,
            account_id: self.account_id,
            kind: self.kind,
            amount: self.amount,
            balance_after: self.balance_after,
        }
    }
}

/// Request to apply a movement to an account.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MovementRequest {
    pub account_id: Uuid,
    pub kind: MovementKind,
    /// Raw requested amount; validated by the engine before any effect.
    pub amount: Decimal,
    pub reference: Option<String>,
    pub idempotency_key: String,
}

/// Result of applying a movement.
#[derive(Debug, Serialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "camelCase")]
pub struct MovementReceipt {
    pub movement_id: Uuid,
    pub account_id: Uuid,
    pub kind: MovementKind,
    pub amount: Amount,
    pub balance_after: Balance,
}

/// Optional inclusive date bounds for report queries.
///
/// Bounds are calendar dates; a bound covers the whole day in UTC. An
/// unspecified bound means no limit on that side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateWindow {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateWindow {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        let date = at.date_naive();
        if let Some(start) = self.start
            && date < start
        {
            return false;
        }
        if let Some(end) = self.end
            && date > end
        {
            return false;
        }
        true
    }
}
