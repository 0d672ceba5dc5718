use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors surfaced by the ledger and reporting engines.
///
/// Variants map one-to-one onto the machine-readable codes exposed by
/// [`LedgerError::code`], so boundaries can build an error envelope
/// without matching on storage-layer shapes.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Malformed input the caller must fix (empty idempotency key,
    /// unparseable seed row).
    #[error("validation failed: {0}")]
    Validation(String),

    /// Amount outside the accepted range or precision.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// The referenced account does not exist.
    #[error("account {0} not found")]
    AccountNotFound(Uuid),

    /// Business-rule rejection of a debit; the account is left untouched.
    #[error("insufficient funds on account {account_id}: balance {balance}, requested {requested}")]
    InsufficientFunds {
        account_id: Uuid,
        balance: Decimal,
        requested: Decimal,
    },

    /// The backing store is unavailable; retrying the identical request
    /// (same idempotency key) is safe.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// An invariant the store is supposed to uphold did not hold.
    #[error("internal error: {0}")]
    Internal(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "storage-rocksdb")]
    #[error("storage error: {0}")]
    Storage(#[from] rocksdb::Error),
}

impl LedgerError {
    /// Machine-readable code for the error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::Validation(_) => "VALIDATION",
            LedgerError::InvalidAmount(_) => "INVALID_AMOUNT",
            LedgerError::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            LedgerError::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            LedgerError::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            LedgerError::Internal(_) => "INTERNAL",
            LedgerError::Csv(_) => "MALFORMED_RECORD",
            LedgerError::Io(_) => "IO",
            #[cfg(feature = "storage-rocksdb")]
            LedgerError::Storage(_) => "STORE_UNAVAILABLE",
        }
    }

    /// Whether the caller may retry the identical request. Only store
    /// outages qualify; business rejections must never be auto-retried.
    pub fn is_transient(&self) -> bool {
        match self {
            LedgerError::StoreUnavailable(_) => true,
            #[cfg(feature = "storage-rocksdb")]
            LedgerError::Storage(_) => true,
            _ => false,
        }
    }
}
