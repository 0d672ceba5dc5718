use crate::domain::movement::MovementRequest;
use crate::error::{LedgerError, Result};
use std::io::Read;

/// Reads movement requests from a CSV source.
///
/// Wraps `csv::Reader` with whitespace trimming and flexible record
/// lengths, yielding one `Result<MovementRequest>` per row so a malformed
/// record surfaces on its own without ending the stream.
pub struct MovementReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> MovementReader<R> {
    /// Creates a reader over any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes requests,
    /// so large files stream through without being held in memory.
    pub fn requests(self) -> impl Iterator<Item = Result<MovementRequest>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(LedgerError::from))
    }
}
