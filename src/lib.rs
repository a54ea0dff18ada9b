//! # Squaremelt - Squarespace to Shopify product conversion
//!
//! Reads a Squarespace product export (JSON) and writes a Shopify product
//! import file (CSV).
//!
//! ## Modules
//!
//! - **types**: the decoded Squarespace catalog
//! - **melt**: the Shopify column schema, the flattening of products into rows,
//!   and the CSV writer
//!
//! ## Quick Start
//!
//! ```rust
//! use squaremelt::{convert, Catalog, MeltConfig};
//! use squaremelt::melt::Row;
//!
//! # fn main() -> squaremelt::Result<()> {
//! let catalog = Catalog::from_slice(br#"{
//!     "results": [{
//!         "url": {"productPath": "red-mug"},
//!         "name": "Red Mug",
//!         "images": [{"url": "a.jpg"}, {"url": "b.jpg"}]
//!     }],
//!     "hasPrevPage": false,
//!     "hasNextPage": false
//! }"#)?;
//!
//! let mut rows: Vec<Row> = Vec::new();
//! let summary = convert(&catalog, &mut rows, MeltConfig::default())?;
//!
//! // one product, two images: two rows sharing the handle
//! assert_eq!(summary.rows, 2);
//! assert_eq!(rows[1].get("Handle")?, "red-mug");
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub mod error;
pub mod melt;
pub mod types;

pub use error::{ConvertError, Result};
pub use melt::{MeltConfig, ProductMelter, Row, RowSink, ShopifyWriter};
pub use types::{Catalog, Product};

/// Where the CSV goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Stdout,
    /// Written in place; a failed run leaves the rows written so far
    File(PathBuf),
    /// Written to a temporary file that replaces the destination once complete
    AtomicFile(PathBuf),
}

/// Counts for one conversion run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertSummary {
    pub products: usize,
    pub rows: usize,
    pub skipped: usize,
}

impl fmt::Display for ConvertSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} products, {} rows, {} skipped",
            self.products, self.rows, self.skipped
        )
    }
}

/// Melt every product in catalog order into `sink`.
///
/// The header is not written here. The first product that cannot be melted
/// ends the run, unless `config.skip_invalid` is set, in which case products
/// with too many variant options are logged and skipped.
pub fn convert<S: RowSink>(catalog: &Catalog, sink: &mut S, config: MeltConfig) -> Result<ConvertSummary> {
    if catalog.has_next_page {
        warn!("catalog has more pages; only this page is converted");
    }

    let melter = ProductMelter::new(config);
    let mut summary = ConvertSummary::default();

    for product in &catalog.results {
        let rows = match melter.melt(product) {
            Ok(rows) => rows,
            Err(err @ ConvertError::TooManyVariantOptions { .. }) if melter.config().skip_invalid => {
                warn!(product = %product, error = %err, "skipping product");
                summary.skipped += 1;
                continue;
            }
            Err(err) => return Err(err),
        };

        sink.write_rows(&rows)?;
        summary.products += 1;
        summary.rows += rows.len();
    }

    Ok(summary)
}

/// Write the header and every product of `catalog` to `writer` as CSV
pub fn write_csv<W: Write>(catalog: &Catalog, writer: W, config: MeltConfig) -> Result<(ConvertSummary, W)> {
    let mut shopify = ShopifyWriter::new(writer);
    shopify.write_header()?;
    let summary = convert(catalog, &mut shopify, config)?;
    let writer = shopify.finish()?;
    Ok((summary, writer))
}

/// Attach the output path to a failed write
fn at_output(path: &Path, err: ConvertError) -> ConvertError {
    match err {
        ConvertError::Io(source) => ConvertError::Write {
            path: path.to_path_buf(),
            source,
        },
        ConvertError::Csv(err) if err.is_io_error() => {
            let source = match err.into_kind() {
                csv::ErrorKind::Io(source) => source,
                kind => io::Error::other(format!("{kind:?}")),
            };
            ConvertError::Write {
                path: path.to_path_buf(),
                source,
            }
        }
        other => other,
    }
}

/// Decode the export at `input` and write the Shopify CSV to `output`
pub fn convert_file<P: AsRef<Path>>(input: P, output: &Output, config: MeltConfig) -> Result<ConvertSummary> {
    let catalog = Catalog::from_path(input.as_ref())?;
    info!(input = %input.as_ref().display(), catalog = %catalog, "loaded catalog");

    let summary = match output {
        Output::Stdout => {
            let stdout = std::io::stdout();
            write_csv(&catalog, stdout.lock(), config)?.0
        }
        Output::File(path) => {
            let file = File::create(path).map_err(|source| ConvertError::Write {
                path: path.clone(),
                source,
            })?;
            let (summary, file) = write_csv(&catalog, file, config).map_err(|err| at_output(path, err))?;
            file.sync_all().map_err(|source| ConvertError::Write {
                path: path.clone(),
                source,
            })?;
            summary
        }
        Output::AtomicFile(path) => {
            let dir = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent,
                _ => Path::new("."),
            };
            let temp = tempfile::NamedTempFile::new_in(dir).map_err(|source| ConvertError::Write {
                path: dir.to_path_buf(),
                source,
            })?;
            // An early return drops `temp`, which deletes it
            let (summary, temp) = write_csv(&catalog, temp, config).map_err(|err| at_output(path, err))?;
            temp.persist(path).map_err(|err| ConvertError::Write {
                path: path.clone(),
                source: err.error,
            })?;
            summary
        }
    };

    info!(summary = %summary, "conversion finished");
    Ok(summary)
}
