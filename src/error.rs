//! Error types for catalog conversion.
//!
//! Every failure here is deterministic (bad input data, a schema mismatch or a
//! broken file handle), so nothing is retried. Errors bubble up to the caller,
//! which ends the run.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while decoding a catalog or writing the Shopify CSV.
#[derive(Error, Debug)]
pub enum ConvertError {
    /// The input is not well-formed JSON or does not have the expected shape.
    #[error("unable to decode catalog: {0}")]
    Decode(#[from] serde_json::Error),

    /// A field name that is not part of the Shopify schema was written.
    #[error("field {0:?} is not a Shopify CSV column")]
    UnknownField(String),

    /// A column index outside the Shopify schema was looked up.
    #[error("field index {index} out of range, must be between 0 and {max}")]
    FieldIndexOutOfRange { index: usize, max: usize },

    /// A product uses more distinct variant attributes than Shopify has options.
    #[error(
        "product {product_id} has {} variant attributes ({}), Shopify supports at most three options",
        .names.len(),
        .names.join(", ")
    )]
    TooManyVariantOptions {
        product_id: String,
        names: Vec<String>,
    },

    /// The input document could not be read.
    #[error("unable to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The output file could not be created, written or persisted.
    #[error("unable to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The CSV writer failed.
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, ConvertError>;
