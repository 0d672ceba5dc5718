use std::io::Write;
use tempfile::NamedTempFile;

// Fixture ids shared across the integration suites.
pub const CUSTOMER: &str = "7c6d5e4f-3a2b-4c0d-9e8f-7a6b5c4d3e2f";
pub const ACCOUNT_A: &str = "0b8e9c3d-5a41-4c2f-9d7e-1f2a3b4c5d6e";
pub const ACCOUNT_B: &str = "1c9fad4e-6b52-4d30-ae8f-2a3b4c5d6e7f";

/// Seed file with two accounts for `CUSTOMER`: A opens at 100.00 (savings),
/// B at 500.00 (checking).
#[allow(dead_code)]
pub fn seed_accounts_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "id, number, kind, customerId, openingBalance").unwrap();
    writeln!(file, "{ACCOUNT_A}, 001-000001, savings, {CUSTOMER}, 100.00").unwrap();
    writeln!(file, "{ACCOUNT_B}, 001-000002, checking, {CUSTOMER}, 500.00").unwrap();
    file
}

/// Movements file from raw CSV rows (without the header).
#[allow(dead_code)]
pub fn movements_file(rows: &[String]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "accountId, kind, amount, reference, idempotencyKey").unwrap();
    for row in rows {
        writeln!(file, "{row}").unwrap();
    }
    file
}
