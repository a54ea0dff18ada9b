//! Shopify side of the conversion
//!
//! Flattens Squarespace products into rows of the fixed Shopify product-import
//! schema and writes them as CSV.
//!
//! ## Flattening
//!
//! A product becomes `max(images, variants, 1)` rows sharing one handle. Row 0
//! carries the product-level fields; image `i` and variant `i` land on row `i`.

pub mod extractor;
pub mod schema;
pub mod writer;

pub use extractor::{melt_product, option_names, MeltConfig, ProductMelter, MAX_OPTIONS};
pub use schema::{field_name, header, index_of, width, Row, SHOPIFY_FIELDS};
pub use writer::{RowSink, ShopifyWriter};
