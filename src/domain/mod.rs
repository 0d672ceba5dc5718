//! Domain layer: accounts, movements, and the storage ports.
//!
//! Everything here is storage-agnostic. The `ports` module defines the
//! async traits that infrastructure adapters implement.

pub mod account;
pub mod movement;
pub mod ports;
