//! CSV readers and writers for the batch boundary.

pub mod account_reader;
pub mod account_writer;
pub mod movement_reader;
pub mod report_writer;
