use crate::domain::account::{Account, AccountKind};
use crate::error::{LedgerError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;
use uuid::Uuid;

/// One row of the account seed file.
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AccountSeed {
    pub id: Uuid,
    pub number: String,
    pub kind: AccountKind,
    pub customer_id: Uuid,
    pub opening_balance: Decimal,
}

impl AccountSeed {
    pub fn into_account(self) -> Result<Account> {
        Account::open(
            self.id,
            self.number,
            self.kind,
            self.customer_id,
            self.opening_balance,
        )
    }
}

/// Reads account seeds from a CSV source.
pub struct AccountReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> AccountReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    pub fn seeds(self) -> impl Iterator<Item = Result<AccountSeed>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(LedgerError::from))
    }
}
