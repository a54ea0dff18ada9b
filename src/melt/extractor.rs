use crate::error::{ConvertError, Result};
use crate::melt::schema::Row;
use crate::types::{Product, Variant};
use tracing::debug;

/// Shopify allows three option name/value pairs per product
pub const MAX_OPTIONS: usize = 3;

/// Options for a conversion run. The column mapping itself is fixed.
#[derive(Debug, Clone, Default)]
pub struct MeltConfig {
    /// Skip products whose data cannot be mapped instead of aborting the run
    pub skip_invalid: bool,
}

/// Flattens Squarespace products into Shopify CSV rows
pub struct ProductMelter {
    config: MeltConfig,
}

impl ProductMelter {
    pub fn new(config: MeltConfig) -> Self {
        ProductMelter { config }
    }

    pub fn config(&self) -> &MeltConfig {
        &self.config
    }

    /// Melt one product into its rows
    pub fn melt(&self, product: &Product) -> Result<Vec<Row>> {
        let rows = melt_product(product)?;
        debug!(
            product = %product,
            handle = product.handle(),
            rows = rows.len(),
            "melted product"
        );
        Ok(rows)
    }
}

/// Distinct variant attribute names of `product`, in the order they first appear.
///
/// The position of a name is its Shopify option slot.
pub fn option_names(product: &Product) -> Result<Vec<&str>> {
    let mut names: Vec<&str> = Vec::new();
    for variant in &product.variants {
        for name in variant.attributes.names() {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }

    if names.len() > MAX_OPTIONS {
        return Err(ConvertError::TooManyVariantOptions {
            product_id: product.id.clone(),
            names: names.iter().map(|name| name.to_string()).collect(),
        });
    }

    Ok(names)
}

/// Flatten one product into `max(images, variants, 1)` rows.
///
/// Row 0 carries the product-level fields. Later rows carry only the handle
/// plus the image and/or variant at their index; Shopify reads them as extra
/// images and variants of the same product.
pub fn melt_product(product: &Product) -> Result<Vec<Row>> {
    let options = option_names(product)?;
    let handle = product.handle();

    let mut first = Row::empty();
    first.set("Handle", handle)?;
    first.set("Title", product.name.as_str())?;
    first.set("Body (HTML)", product.description.as_str())?;
    first.set("Tags", product.merged_tags())?;

    let row_count = product.images.len().max(product.variants.len()).max(1);
    let mut rows = Vec::with_capacity(row_count);
    let mut first = Some(first);

    for index in 0..row_count {
        let mut row = match first.take() {
            Some(row) => row,
            None => {
                let mut row = Row::empty();
                row.set("Handle", handle)?;
                row
            }
        };

        // Images and variants are paired by index; either may run out first
        if let Some(image) = product.images.get(index) {
            row.set("Image Src", image.url.as_str())?;
        }

        if let Some(variant) = product.variants.get(index) {
            set_variant_fields(&mut row, variant, &options)?;
        }

        rows.push(row);
    }

    Ok(rows)
}

fn set_variant_fields(row: &mut Row, variant: &Variant, options: &[&str]) -> Result<()> {
    row.set("Variant Inventory Tracker", "shopify")?;
    row.set("Variant Inventory Policy", "deny")?;
    row.set("Variant Fulfillment Service", "manual")?;

    // Price stays a decimal string, never a float
    row.set("Variant Price", variant.price.decimal_value.as_str())?;
    row.set("Variant SKU", variant.sku.as_str())?;
    row.set("Variant Inventory Qty", variant.stock.quantity.to_string())?;

    // `options` holds every attribute name of the product, so each one has a slot
    for (slot, option) in options.iter().enumerate() {
        if let Some(value) = variant.attributes.get(option) {
            row.set(&format!("Option{} Name", slot + 1), *option)?;
            row.set(&format!("Option{} Value", slot + 1), value)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::melt::schema::{header, SHOPIFY_FIELDS};
    use crate::types::Catalog;
    use serde_json::{json, Value};

    fn product(value: Value) -> Product {
        let catalog = Catalog::from_slice(json!({ "results": [value] }).to_string().as_bytes()).unwrap();
        catalog.results.into_iter().next().unwrap()
    }

    /// Decode from text so attribute keys keep the order they are written in
    fn product_from_str(data: &str) -> Product {
        let document = format!(r#"{{"results": [{data}]}}"#);
        let catalog = Catalog::from_slice(document.as_bytes()).unwrap();
        catalog.results.into_iter().next().unwrap()
    }

    fn field<'a>(row: &'a Row, name: &str) -> &'a str {
        row.get(name).unwrap()
    }

    #[test]
    fn test_red_mug() {
        let input = product(json!({
            "id": "p1",
            "url": {"productPath": "red-mug"},
            "name": "Red Mug",
            "images": [{"url": "a.jpg"}, {"url": "b.jpg"}],
            "variants": [{
                "sku": "SKU1",
                "price": {"decimalValue": "9.99"},
                "stock": {"quantity": 5},
                "attributes": {"Color": "Red"}
            }]
        }));

        let rows = melt_product(&input).unwrap();
        assert_eq!(rows.len(), 2);

        let first = &rows[0];
        assert_eq!(field(first, "Handle"), "red-mug");
        assert_eq!(field(first, "Title"), "Red Mug");
        assert_eq!(field(first, "Image Src"), "a.jpg");
        assert_eq!(field(first, "Variant SKU"), "SKU1");
        assert_eq!(field(first, "Variant Price"), "9.99");
        assert_eq!(field(first, "Variant Inventory Qty"), "5");
        assert_eq!(field(first, "Variant Inventory Tracker"), "shopify");
        assert_eq!(field(first, "Variant Inventory Policy"), "deny");
        assert_eq!(field(first, "Variant Fulfillment Service"), "manual");
        assert_eq!(field(first, "Option1 Name"), "Color");
        assert_eq!(field(first, "Option1 Value"), "Red");

        let second = &rows[1];
        assert_eq!(field(second, "Handle"), "red-mug");
        assert_eq!(field(second, "Image Src"), "b.jpg");
        for name in SHOPIFY_FIELDS.iter().filter(|name| !["Handle", "Image Src"].contains(*name)) {
            assert_eq!(field(second, name), "", "{name} should be empty");
        }
    }

    #[test]
    fn test_no_images_or_variants_yields_base_row() {
        let input = product(json!({
            "url": {"productPath": "gift"},
            "name": "Gift",
            "description": "<p>Nice</p>",
            "categories": ["Mugs"],
            "tags": ["Sale", "New"]
        }));

        let rows = melt_product(&input).unwrap();
        assert_eq!(rows.len(), 1);

        let product_level = ["Handle", "Title", "Body (HTML)", "Tags"];
        for name in header() {
            if !product_level.contains(name) {
                assert_eq!(field(&rows[0], name), "", "{name} should be empty");
            }
        }
        assert_eq!(field(&rows[0], "Tags"), "Mugs,Sale,New");
        assert_eq!(field(&rows[0], "Body (HTML)"), "<p>Nice</p>");
    }

    #[test]
    fn test_row_count_and_shared_handle() {
        for (images, variants) in [(0usize, 0usize), (3, 1), (1, 3), (2, 2), (0, 4)] {
            let image_list: Vec<Value> = (0..images).map(|i| json!({"url": format!("{i}.jpg")})).collect();
            let variant_list: Vec<Value> = (0..variants).map(|i| json!({"sku": format!("S{i}")})).collect();
            let input = product(json!({
                "url": {"productPath": "shirt"},
                "images": image_list,
                "variants": variant_list
            }));

            let rows = melt_product(&input).unwrap();
            assert_eq!(rows.len(), images.max(variants).max(1));
            assert!(rows.iter().all(|row| field(row, "Handle") == "shirt"));
        }
    }

    #[test]
    fn test_more_images_than_variants() {
        let input = product(json!({
            "url": {"productPath": "poster"},
            "images": [{"url": "1.jpg"}, {"url": "2.jpg"}, {"url": "3.jpg"}],
            "variants": [{"sku": "P1", "price": {"decimalValue": "20.00"}}]
        }));

        let rows = melt_product(&input).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(field(&rows[0], "Variant SKU"), "P1");
        assert_eq!(field(&rows[1], "Variant SKU"), "");
        assert_eq!(field(&rows[2], "Variant SKU"), "");
        assert_eq!(field(&rows[2], "Image Src"), "3.jpg");
    }

    #[test]
    fn test_more_variants_than_images() {
        let input = product(json!({
            "url": {"productPath": "tee"},
            "name": "Tee",
            "images": [{"url": "tee.jpg"}],
            "variants": [
                {"sku": "T-S", "attributes": {"Size": "S"}},
                {"sku": "T-M", "attributes": {"Size": "M"}}
            ]
        }));

        let rows = melt_product(&input).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(field(&rows[1], "Image Src"), "");
        assert_eq!(field(&rows[1], "Title"), "");
        assert_eq!(field(&rows[1], "Variant SKU"), "T-M");
        assert_eq!(field(&rows[1], "Option1 Name"), "Size");
        assert_eq!(field(&rows[1], "Option1 Value"), "M");
    }

    #[test]
    fn test_options_follow_declaration_order() {
        let input = product_from_str(
            r#"{
                "url": {"productPath": "hoodie"},
                "variants": [
                    {"sku": "H1", "attributes": {"Size": "L", "Color": "Grey", "Fit": "Slim"}},
                    {"sku": "H2", "attributes": {"Size": "M", "Color": "Black", "Fit": "Regular"}}
                ]
            }"#,
        );

        let rows = melt_product(&input).unwrap();
        for row in &rows {
            assert_eq!(field(row, "Option1 Name"), "Size");
            assert_eq!(field(row, "Option2 Name"), "Color");
            assert_eq!(field(row, "Option3 Name"), "Fit");
        }
        assert_eq!(field(&rows[1], "Option2 Value"), "Black");
    }

    #[test]
    fn test_option_slots_shared_across_variants() {
        let input = product_from_str(
            r#"{
                "url": {"productPath": "cap"},
                "variants": [
                    {"sku": "C1", "attributes": {"Size": "S"}},
                    {"sku": "C2", "attributes": {"Color": "Blue", "Size": "L"}}
                ]
            }"#,
        );

        let rows = melt_product(&input).unwrap();
        assert_eq!(field(&rows[0], "Option1 Name"), "Size");
        assert_eq!(field(&rows[0], "Option1 Value"), "S");
        assert_eq!(field(&rows[0], "Option2 Name"), "");
        assert_eq!(field(&rows[1], "Option1 Name"), "Size");
        assert_eq!(field(&rows[1], "Option1 Value"), "L");
        assert_eq!(field(&rows[1], "Option2 Name"), "Color");
        assert_eq!(field(&rows[1], "Option2 Value"), "Blue");
    }

    #[test]
    fn test_non_alphabetical_order_is_kept() {
        let input = product_from_str(r#"{"variants": [{"sku": "Z", "attributes": {"Size": "XL", "Color": "Teal"}}]}"#);

        assert_eq!(option_names(&input).unwrap(), vec!["Size", "Color"]);
        let rows = melt_product(&input).unwrap();
        assert_eq!(field(&rows[0], "Option1 Name"), "Size");
        assert_eq!(field(&rows[0], "Option1 Value"), "XL");
        assert_eq!(field(&rows[0], "Option2 Name"), "Color");
        assert_eq!(field(&rows[0], "Option2 Value"), "Teal");
    }

    #[test]
    fn test_four_attributes_is_an_error() {
        let input = product_from_str(
            r#"{
                "id": "too-many",
                "url": {"productPath": "jacket"},
                "variants": [
                    {"sku": "J1", "attributes": {"Color": "Red", "Size": "L", "Fit": "Slim", "Fabric": "Wool"}}
                ]
            }"#,
        );

        match melt_product(&input).unwrap_err() {
            ConvertError::TooManyVariantOptions { product_id, names } => {
                assert_eq!(product_id, "too-many");
                assert_eq!(names, vec!["Color", "Size", "Fit", "Fabric"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_four_attributes_across_variants_is_an_error() {
        let input = product(json!({
            "id": "spread",
            "variants": [
                {"attributes": {"Color": "Red", "Size": "L"}},
                {"attributes": {"Fit": "Slim", "Fabric": "Wool"}}
            ]
        }));

        assert!(matches!(
            melt_product(&input),
            Err(ConvertError::TooManyVariantOptions { .. })
        ));
    }

    #[test]
    fn test_melting_is_repeatable() {
        let input = product(json!({
            "url": {"productPath": "vase"},
            "images": [{"url": "v1.jpg"}, {"url": "v2.jpg"}],
            "variants": [
                {"sku": "V1", "attributes": {"Color": "Blue", "Size": "S"}},
                {"sku": "V2", "attributes": {"Color": "Green", "Size": "M"}}
            ]
        }));

        let melter = ProductMelter::new(MeltConfig::default());
        assert_eq!(melter.melt(&input).unwrap(), melter.melt(&input).unwrap());
    }

    #[test]
    fn test_price_is_copied_verbatim() {
        let input = product(json!({
            "variants": [{"sku": "X", "price": {"decimalValue": "0.10"}, "stock": {"quantity": -2}}]
        }));

        let rows = melt_product(&input).unwrap();
        assert_eq!(field(&rows[0], "Variant Price"), "0.10");
        assert_eq!(field(&rows[0], "Variant Inventory Qty"), "-2");
    }
}
