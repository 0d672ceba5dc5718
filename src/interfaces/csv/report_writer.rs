use crate::application::reporting::MovementDetail;
use crate::error::Result;
use std::io::Write;

/// Writes the detail report as CSV to any `Write` sink.
///
/// An empty report produces empty output; the header row only appears once
/// there is at least one record.
pub struct ReportWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_detail(mut self, rows: &[MovementDetail]) -> Result<()> {
        for row in rows {
            self.writer.serialize(row)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
