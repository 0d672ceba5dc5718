//! Application layer containing the core business logic orchestration.
//!
//! This module defines the `LedgerEngine`, the single write path that applies
//! movements to accounts, and the `ReportingEngine`, the read path that
//! reconstructs detail, summary, and consolidated statement views from the
//! movement log.

pub mod ledger;
pub mod reporting;
