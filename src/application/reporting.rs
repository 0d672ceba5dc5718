use crate::domain::account::{Account, AccountKind, Amount, Balance};
use crate::domain::movement::{DateWindow, Movement, MovementKind};
use crate::domain::ports::{AccountStoreRef, MovementLogRef};
use crate::error::{LedgerError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

/// Read-side engine: reconstructs per-customer views from the movement log.
///
/// Every report reads the log exactly once and derives its shape from that
/// single snapshot, so totals and lines within one response never disagree.
pub struct ReportingEngine {
    accounts: AccountStoreRef,
    movements: MovementLogRef,
}

/// One movement row in the detail report, newest first.
#[derive(Debug, Serialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MovementDetail {
    pub occurred_at: DateTime<Utc>,
    pub kind: MovementKind,
    pub amount: Amount,
    pub balance_after: Balance,
    pub reference: Option<String>,
    pub account_number: String,
}

/// Aggregated totals over a movement set.
///
/// `final_balance` is the resulting balance of the most recent movement in
/// the set, or zero when the set is empty.
#[derive(Debug, Serialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub customer_id: Uuid,
    pub total_credits: Decimal,
    pub total_debits: Decimal,
    pub final_balance: Decimal,
}

/// Consolidated statement: the window's movements grouped by account, with
/// per-account and grand totals.
#[derive(Debug, Serialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidatedStatement {
    pub customer_id: Uuid,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub generated_at: DateTime<Utc>,
    pub initial_total: Decimal,
    pub total_credits: Decimal,
    pub total_debits: Decimal,
    pub final_total: Decimal,
    pub accounts: Vec<AccountSection>,
}

/// One account's slice of a consolidated statement.
///
/// `initial_balance` and `final_balance` are windowed: the resulting
/// balances of the earliest and latest movements inside the window, not the
/// account's true balance at the window edges.
#[derive(Debug, Serialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AccountSection {
    pub account_id: Uuid,
    pub number: String,
    pub kind: AccountKind,
    pub initial_balance: Balance,
    pub total_credits: Decimal,
    pub total_debits: Decimal,
    pub final_balance: Balance,
    pub movements: Vec<StatementLine>,
}

#[derive(Debug, Serialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct StatementLine {
    pub occurred_at: DateTime<Utc>,
    pub kind: MovementKind,
    pub amount: Amount,
    pub balance_after: Balance,
    pub reference: Option<String>,
}

impl From<Movement> for StatementLine {
    fn from(movement: Movement) -> Self {
        Self {
            occurred_at: movement.occurred_at,
            kind: movement.kind,
            amount: movement.amount,
            balance_after: movement.balance_after,
            reference: movement.reference,
        }
    }
}

impl ReportingEngine {
    pub fn new(accounts: AccountStoreRef, movements: MovementLogRef) -> Self {
        Self {
            accounts,
            movements,
        }
    }

    /// Flat movement list for the customer and window, newest first, with
    /// the owning account's number on each row.
    pub async fn detail(&self, customer_id: Uuid, window: DateWindow) -> Result<Vec<MovementDetail>> {
        let movements = self
            .movements
            .find_by_customer_and_range(customer_id, window)
            .await?;
        let numbers: HashMap<Uuid, String> = self
            .accounts
            .for_customer(customer_id)
            .await?
            .into_iter()
            .map(|account| (account.id, account.number))
            .collect();

        movements
            .into_iter()
            .map(|movement| {
                let account_number = numbers
                    .get(&movement.account_id)
                    .cloned()
                    .ok_or_else(|| {
                        LedgerError::Internal(format!(
                            "movement {} references unknown account {}",
                            movement.id, movement.account_id
                        ))
                    })?;
                Ok(MovementDetail {
                    occurred_at: movement.occurred_at,
                    kind: movement.kind,
                    amount: movement.amount,
                    balance_after: movement.balance_after,
                    reference: movement.reference,
                    account_number,
                })
            })
            .collect()
    }

    /// Credit/debit totals and the final balance over the window.
    pub async fn summary(&self, customer_id: Uuid, window: DateWindow) -> Result<ReportSummary> {
        let movements = self
            .movements
            .find_by_customer_and_range(customer_id, window)
            .await?;
        let final_balance = movements
            .first()
            .map(|movement| movement.balance_after.0)
            .unwrap_or(Decimal::ZERO);

        Ok(ReportSummary {
            customer_id,
            total_credits: Self::total(&movements, MovementKind::Credit),
            total_debits: Self::total(&movements, MovementKind::Debit),
            final_balance,
        })
    }

    /// Consolidated statement for the window, both bounds required.
    ///
    /// Only accounts with at least one movement inside the window appear;
    /// sections are ordered by account number and their movements ascending
    /// by timestamp. An empty window yields zero totals and no sections.
    pub async fn statement(
        &self,
        customer_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ConsolidatedStatement> {
        let movements = self
            .movements
            .find_by_customer_and_range(customer_id, DateWindow::between(start, end))
            .await?;

        // Oldest-first, so the stable per-group sort below keeps
        // application order for movements sharing a timestamp.
        let mut groups: HashMap<Uuid, Vec<Movement>> = HashMap::new();
        for movement in movements.into_iter().rev() {
            groups.entry(movement.account_id).or_default().push(movement);
        }

        let mut accounts = self.accounts.for_customer(customer_id).await?;
        accounts.sort_by(|a, b| a.number.cmp(&b.number));

        let mut sections = Vec::with_capacity(groups.len());
        for account in &accounts {
            if let Some(group) = groups.remove(&account.id) {
                sections.push(Self::section(account, group));
            }
        }
        if let Some(account_id) = groups.keys().next() {
            return Err(LedgerError::Internal(format!(
                "movements reference unknown account {account_id}"
            )));
        }

        Ok(ConsolidatedStatement {
            customer_id,
            window_start: start,
            window_end: end,
            generated_at: Utc::now(),
            initial_total: sections.iter().map(|s| s.initial_balance.0).sum(),
            total_credits: sections.iter().map(|s| s.total_credits).sum(),
            total_debits: sections.iter().map(|s| s.total_debits).sum(),
            final_total: sections.iter().map(|s| s.final_balance.0).sum(),
            accounts: sections,
        })
    }

    fn section(account: &Account, mut movements: Vec<Movement>) -> AccountSection {
        movements.sort_by_key(|movement| movement.occurred_at);
        AccountSection {
            account_id: account.id,
            number: account.number.clone(),
            kind: account.kind,
            initial_balance: movements
                .first()
                .map(|m| m.balance_after)
                .unwrap_or_default(),
            total_credits: Self::total(&movements, MovementKind::Credit),
            total_debits: Self::total(&movements, MovementKind::Debit),
            final_balance: movements
                .last()
                .map(|m| m.balance_after)
                .unwrap_or_default(),
            movements: movements.into_iter().map(StatementLine::from).collect(),
        }
    }

    fn total(movements: &[Movement], kind: MovementKind) -> Decimal {
        movements
            .iter()
            .filter(|movement| movement.kind == kind)
            .map(|movement| movement.amount.value())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::movement::IdempotencyKey;
    use crate::domain::ports::{AccountStore, MovementLog};
    use crate::infrastructure::in_memory::InMemoryStore;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    async fn seed_movement(
        store: &InMemoryStore,
        account: &Account,
        kind: MovementKind,
        amount: Decimal,
        balance_after: Decimal,
        occurred_at: DateTime<Utc>,
        key: &str,
    ) {
        store
            .insert(Movement {
                id: Uuid::new_v4(),
                account_id: account.id,
                occurred_at,
                kind,
                amount: Amount::new(amount).unwrap(),
                balance_after: Balance(balance_after),
                reference: Some(format!("ref-{key}")),
                idempotency_key: IdempotencyKey::new(key).unwrap(),
            })
            .await
            .unwrap();
    }

    fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
    }

    /// Customer with two accounts; account A has one movement outside the
    /// March window, so windowed queries see three movements.
    async fn seed() -> (Arc<InMemoryStore>, Uuid, Account, Account) {
        let store = Arc::new(InMemoryStore::default());
        let customer_id = Uuid::new_v4();

        let a = Account::open(
            Uuid::new_v4(),
            "001-000001",
            AccountKind::Savings,
            customer_id,
            dec!(100.00),
        )
        .unwrap();
        let b = Account::open(
            Uuid::new_v4(),
            "001-000002",
            AccountKind::Checking,
            customer_id,
            dec!(500.00),
        )
        .unwrap();
        store.save(a.clone()).await.unwrap();
        store.save(b.clone()).await.unwrap();

        seed_movement(&store, &a, MovementKind::Credit, dec!(20.00), dec!(120.00), at(2024, 2, 20), "feb").await;
        seed_movement(&store, &a, MovementKind::Credit, dec!(50.00), dec!(170.00), at(2024, 3, 10), "k1").await;
        seed_movement(&store, &b, MovementKind::Credit, dec!(200.00), dec!(700.00), at(2024, 3, 11), "k2").await;
        seed_movement(&store, &a, MovementKind::Debit, dec!(30.00), dec!(140.00), at(2024, 3, 12), "k3").await;

        (store, customer_id, a, b)
    }

    fn march() -> DateWindow {
        DateWindow::between(
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_detail_newest_first_with_account_numbers() {
        let (store, customer_id, a, b) = seed().await;
        let engine = ReportingEngine::new(store.clone(), store.clone());

        let detail = engine.detail(customer_id, march()).await.unwrap();

        assert_eq!(detail.len(), 3);
        assert_eq!(detail[0].account_number, a.number);
        assert_eq!(detail[0].kind, MovementKind::Debit);
        assert_eq!(detail[0].balance_after, Balance(dec!(140.00)));
        assert_eq!(detail[1].account_number, b.number);
        assert_eq!(detail[2].account_number, a.number);
        assert_eq!(detail[2].reference.as_deref(), Some("ref-k1"));
    }

    #[tokio::test]
    async fn test_detail_unbounded_includes_everything() {
        let (store, customer_id, _a, _b) = seed().await;
        let engine = ReportingEngine::new(store.clone(), store.clone());

        let detail = engine
            .detail(customer_id, DateWindow::unbounded())
            .await
            .unwrap();
        assert_eq!(detail.len(), 4);
    }

    #[tokio::test]
    async fn test_summary_totals_and_final_balance() {
        let (store, customer_id, _a, _b) = seed().await;
        let engine = ReportingEngine::new(store.clone(), store.clone());

        let summary = engine.summary(customer_id, march()).await.unwrap();

        assert_eq!(summary.total_credits, dec!(250.00));
        assert_eq!(summary.total_debits, dec!(30.00));
        // Final balance follows the newest movement, regardless of account.
        assert_eq!(summary.final_balance, dec!(140.00));
    }

    #[tokio::test]
    async fn test_summary_empty_set_is_all_zeros() {
        let (store, _customer_id, _a, _b) = seed().await;
        let engine = ReportingEngine::new(store.clone(), store.clone());

        let summary = engine
            .summary(Uuid::new_v4(), DateWindow::unbounded())
            .await
            .unwrap();

        assert_eq!(summary.total_credits, Decimal::ZERO);
        assert_eq!(summary.total_debits, Decimal::ZERO);
        assert_eq!(summary.final_balance, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_statement_groups_and_totals() {
        let (store, customer_id, a, b) = seed().await;
        let engine = ReportingEngine::new(store.clone(), store.clone());

        let statement = engine
            .statement(
                customer_id,
                NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(statement.accounts.len(), 2);

        // Sections ordered by account number.
        let section_a = &statement.accounts[0];
        let section_b = &statement.accounts[1];
        assert_eq!(section_a.number, a.number);
        assert_eq!(section_b.number, b.number);

        // Windowed balances: the February movement is invisible here.
        assert_eq!(section_a.initial_balance, Balance(dec!(170.00)));
        assert_eq!(section_a.final_balance, Balance(dec!(140.00)));
        assert_eq!(section_a.total_credits, dec!(50.00));
        assert_eq!(section_a.total_debits, dec!(30.00));
        assert_eq!(section_a.movements.len(), 2);
        assert!(section_a.movements[0].occurred_at < section_a.movements[1].occurred_at);

        assert_eq!(section_b.initial_balance, Balance(dec!(700.00)));
        assert_eq!(section_b.final_balance, Balance(dec!(700.00)));
        assert_eq!(section_b.total_credits, dec!(200.00));
        assert_eq!(section_b.total_debits, Decimal::ZERO);

        // Grand totals are the sums of the per-account values.
        assert_eq!(statement.initial_total, dec!(870.00));
        assert_eq!(statement.total_credits, dec!(250.00));
        assert_eq!(statement.total_debits, dec!(30.00));
        assert_eq!(statement.final_total, dec!(840.00));
        assert_eq!(statement.window_start, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(statement.window_end, NaiveDate::from_ymd_opt(2024, 3, 31).unwrap());
    }

    #[tokio::test]
    async fn test_statement_empty_window() {
        let (store, customer_id, _a, _b) = seed().await;
        let engine = ReportingEngine::new(store.clone(), store.clone());

        let statement = engine
            .statement(
                customer_id,
                NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
            )
            .await
            .unwrap();

        assert!(statement.accounts.is_empty());
        assert_eq!(statement.initial_total, Decimal::ZERO);
        assert_eq!(statement.total_credits, Decimal::ZERO);
        assert_eq!(statement.total_debits, Decimal::ZERO);
        assert_eq!(statement.final_total, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_statement_for_unknown_customer() {
        let (store, _customer_id, _a, _b) = seed().await;
        let engine = ReportingEngine::new(store.clone(), store.clone());

        let statement = engine
            .statement(
                Uuid::new_v4(),
                NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
            )
            .await
            .unwrap();

        assert!(statement.accounts.is_empty());
        assert_eq!(statement.final_total, Decimal::ZERO);
    }
}
