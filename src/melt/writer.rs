use crate::error::Result;
use crate::melt::schema::{header, Row};
use std::io::Write;

/// Destination for melted rows
pub trait RowSink {
    fn write_row(&mut self, row: &Row) -> Result<()>;

    /// Write all rows of one product, returning how many were written
    fn write_rows(&mut self, rows: &[Row]) -> Result<usize> {
        for row in rows {
            self.write_row(row)?;
        }
        Ok(rows.len())
    }
}

/// Collects rows in memory
impl RowSink for Vec<Row> {
    fn write_row(&mut self, row: &Row) -> Result<()> {
        self.push(row.clone());
        Ok(())
    }
}

/// Writes rows as Shopify product-import CSV.
///
/// Quoting follows the csv crate defaults (RFC 4180). Buffered rows are
/// flushed by [`ShopifyWriter::finish`], and on drop if the run ends early.
pub struct ShopifyWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ShopifyWriter<W> {
    pub fn new(writer: W) -> Self {
        ShopifyWriter {
            writer: csv::WriterBuilder::new().from_writer(writer),
        }
    }

    /// Write the column names. Call once, before any row.
    pub fn write_header(&mut self) -> Result<()> {
        self.writer.write_record(header())?;
        Ok(())
    }

    /// Flush and hand back the underlying writer
    pub fn finish(mut self) -> Result<W> {
        self.writer.flush()?;
        self.writer
            .into_inner()
            .map_err(|err| err.into_error().into())
    }
}

impl<W: Write> RowSink for ShopifyWriter<W> {
    fn write_row(&mut self, row: &Row) -> Result<()> {
        self.writer.write_record(row.fields())?;
        Ok(())
    }
}
