//! Squarespace product export model
//!
//! Mirrors the JSON document produced by a Squarespace product export. Only the
//! fields the Shopify mapping needs are interpreted; the rest are decoded so the
//! debug output shows the whole product.

use crate::error::{ConvertError, Result};
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt;
use std::io::Read;
use std::path::Path;

/// Treat an explicit `null` the same as a missing field.
fn nullable<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One page of a product export
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Catalog {
    #[serde(deserialize_with = "nullable")]
    pub results: Vec<Product>,

    /// Informational; earlier pages are not fetched
    #[serde(deserialize_with = "nullable")]
    pub has_prev_page: bool,

    /// Informational; later pages are not fetched
    #[serde(deserialize_with = "nullable")]
    pub has_next_page: bool,
}

impl Catalog {
    /// Decode a catalog held entirely in memory
    pub fn from_slice(data: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(data)?)
    }

    /// Read the whole document from `reader`, then decode it
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_slice(&data)
    }

    /// Read and decode the document at `path`.
    ///
    /// The file is closed as soon as its contents are in memory.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|source| ConvertError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_slice(&data)
    }
}

impl fmt::Display for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Catalog({} products, prev/next: {} / {})",
            self.results.len(),
            self.has_prev_page,
            self.has_next_page
        )
    }
}

/// A single product with all of its images and variants
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Product {
    #[serde(rename = "productType")]
    pub product_type: ProductType,

    #[serde(deserialize_with = "nullable")]
    pub id: String,

    #[serde(deserialize_with = "nullable")]
    pub website_id: String,

    pub url: Option<ProductUrl>,

    pub visibility: Option<Visibility>,

    #[serde(deserialize_with = "nullable")]
    pub name: String,

    #[serde(deserialize_with = "nullable")]
    pub description: String,

    #[serde(deserialize_with = "nullable")]
    pub images: Vec<Image>,

    pub additional_info: Option<Map<String, Value>>,

    #[serde(rename = "featuredProduct", deserialize_with = "nullable")]
    pub featured: bool,

    #[serde(deserialize_with = "nullable")]
    pub tags: Vec<String>,

    #[serde(deserialize_with = "nullable")]
    pub categories: Vec<String>,

    #[serde(rename = "variantAttributeNames", deserialize_with = "nullable")]
    pub variant_attributes: Vec<String>,

    #[serde(deserialize_with = "nullable")]
    pub variants: Vec<Variant>,
}

impl Product {
    /// The Shopify handle: the product path, or empty when the product has no URL
    pub fn handle(&self) -> &str {
        self.url
            .as_ref()
            .map(|url| url.product_path.as_str())
            .unwrap_or("")
    }

    /// Categories followed by tags, comma-joined
    pub fn merged_tags(&self) -> String {
        self.categories
            .iter()
            .chain(self.tags.iter())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Product({}): {} [type {}, {} images, {} variants]",
            self.id,
            self.name,
            self.product_type,
            self.images.len(),
            self.variants.len()
        )
    }
}

/// Product type, which the export emits either as a string or as a number
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductType(pub String);

impl ProductType {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ProductType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct ProductTypeVisitor;

        impl<'de> Visitor<'de> for ProductTypeVisitor {
            type Value = ProductType;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string or a number for productType")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<ProductType, E> {
                Ok(ProductType(v.to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<ProductType, E> {
                Ok(ProductType(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<ProductType, E> {
                Ok(ProductType(v.to_string()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<ProductType, E> {
                Ok(ProductType(v.to_string()))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<ProductType, E> {
                // 2.0 renders as "2", like an integer would
                if v.fract() == 0.0 && v.abs() < 1e15 {
                    Ok(ProductType((v as i64).to_string()))
                } else {
                    Ok(ProductType(v.to_string()))
                }
            }
        }

        deserializer.deserialize_any(ProductTypeVisitor)
    }
}

/// URL information; `product_path` becomes the Shopify handle
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProductUrl {
    #[serde(rename = "fullPath", deserialize_with = "nullable")]
    pub path: String,

    #[serde(rename = "productPath", deserialize_with = "nullable")]
    pub product_path: String,

    #[serde(rename = "collectionPath", deserialize_with = "nullable")]
    pub collection_path: String,
}

/// Visibility is decoded but not mapped
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Visibility {
    #[serde(deserialize_with = "nullable")]
    pub state: String,
    pub visible_on: Option<Value>,
}

/// A product image. Only the URL is mapped.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Image {
    #[serde(deserialize_with = "nullable")]
    pub id: String,

    #[serde(rename = "type", deserialize_with = "nullable")]
    pub kind: String,

    #[serde(deserialize_with = "nullable")]
    pub url: String,
}

impl fmt::Display for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Image({}-{}): {}", self.id, self.kind, self.url)
    }
}

/// A purchasable configuration of a product (a size, a color, ...)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Variant {
    #[serde(deserialize_with = "nullable")]
    pub sku: String,

    #[serde(deserialize_with = "nullable")]
    pub price: Price,

    #[serde(deserialize_with = "nullable")]
    pub stock: Stock,

    pub attributes: VariantAttributes,
}

/// Variant price, kept as the decimal string from the export
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Price {
    #[serde(rename = "decimalValue", deserialize_with = "nullable")]
    pub decimal_value: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Stock {
    #[serde(deserialize_with = "nullable")]
    pub unlimited: bool,

    #[serde(deserialize_with = "nullable")]
    pub quantity: i64,
}

/// Attribute name to value pairs, in the order the document declares them.
///
/// A repeated name keeps its first position and takes the last value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariantAttributes(Vec<(String, String)>);

impl VariantAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `name` to `value`, appending it if the name is new
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for VariantAttributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attributes = VariantAttributes::new();
        for (name, value) in iter {
            attributes.insert(name, value);
        }
        attributes
    }
}

impl<'de> Deserialize<'de> for VariantAttributes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct AttributesVisitor;

        impl<'de> Visitor<'de> for AttributesVisitor {
            type Value = VariantAttributes;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of attribute names to string values")
            }

            fn visit_unit<E: de::Error>(self) -> std::result::Result<VariantAttributes, E> {
                Ok(VariantAttributes::new())
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<VariantAttributes, A::Error> {
                let mut attributes = VariantAttributes::new();
                while let Some((name, value)) = map.next_entry::<String, String>()? {
                    attributes.insert(name, value);
                }
                Ok(attributes)
            }
        }

        deserializer.deserialize_any(AttributesVisitor)
    }
}
