use crate::domain::account::Account;
use crate::error::Result;
use std::io::Write;

/// Writes final account states as CSV, sorted by account number so output
/// is deterministic across runs.
pub struct AccountWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> AccountWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_accounts(mut self, mut accounts: Vec<Account>) -> Result<()> {
        accounts.sort_by(|a, b| a.number.cmp(&b.number));
        for account in accounts {
            self.writer.serialize(account)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
