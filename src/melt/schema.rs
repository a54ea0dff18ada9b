//! Shopify product CSV schema
//!
//! The column list is fixed. Mapping code addresses columns by name through
//! [`Row::set`], so the column order lives in exactly one place.

use crate::error::{ConvertError, Result};
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Shopify product import columns, in output order
pub static SHOPIFY_FIELDS: [&str; 44] = [
    "Handle",
    "Title",
    "Body (HTML)",
    "Vendor",
    "Type",
    "Tags",
    "Published",
    "Option1 Name",
    "Option1 Value",
    "Option2 Name",
    "Option2 Value",
    "Option3 Name",
    "Option3 Value",
    "Variant SKU",
    "Variant Grams",
    "Variant Inventory Tracker",
    "Variant Inventory Qty",
    "Variant Inventory Policy",
    "Variant Fulfillment Service",
    "Variant Price",
    "Variant Compare At Price",
    "Variant Requires Shipping",
    "Variant Taxable",
    "Variant Barcode",
    "Image Src",
    "Image Alt Text",
    "Gift Card",
    "Google Shopping / MPN",
    "Google Shopping / Age Group",
    "Google Shopping / Gender",
    "Google Shopping / Google Product Category",
    "SEO Title",
    "SEO Description",
    "Google Shopping / AdWords Grouping",
    "Google Shopping / AdWords Labels",
    "Google Shopping / Condition",
    "Google Shopping / Custom Product",
    "Google Shopping / Custom Label 0",
    "Google Shopping / Custom Label 1",
    "Google Shopping / Custom Label 2",
    "Google Shopping / Custom Label 3",
    "Google Shopping / Custom Label 4",
    "Variant Image",
    "Variant Weight Unit",
];

/// Name to column index, built once on first use
static FIELD_INDEX: Lazy<HashMap<&'static str, usize>> = Lazy::new(|| {
    SHOPIFY_FIELDS
        .iter()
        .enumerate()
        .map(|(index, name)| (*name, index))
        .collect()
});

/// Number of columns in every row
pub fn width() -> usize {
    SHOPIFY_FIELDS.len()
}

/// The header line, in column order
pub fn header() -> &'static [&'static str] {
    &SHOPIFY_FIELDS
}

/// Column index of `name`
pub fn index_of(name: &str) -> Result<usize> {
    FIELD_INDEX
        .get(name)
        .copied()
        .ok_or_else(|| ConvertError::UnknownField(name.to_string()))
}

/// Column name at `index`
pub fn field_name(index: usize) -> Result<&'static str> {
    SHOPIFY_FIELDS
        .get(index)
        .copied()
        .ok_or(ConvertError::FieldIndexOutOfRange {
            index,
            max: width() - 1,
        })
}

/// One output line, always exactly [`width()`] fields wide
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row(Vec<String>);

impl Row {
    /// A row with every field empty
    pub fn empty() -> Self {
        Row(vec![String::new(); width()])
    }

    /// Set the field called `name`
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> Result<()> {
        let index = index_of(name)?;
        self.0[index] = value.into();
        Ok(())
    }

    /// Value of the field called `name`
    pub fn get(&self, name: &str) -> Result<&str> {
        let index = index_of(name)?;
        Ok(&self.0[index])
    }

    pub fn fields(&self) -> &[String] {
        &self.0
    }
}

impl Default for Row {
    fn default() -> Self {
        Row::empty()
    }
}
