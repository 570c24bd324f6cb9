use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::Context;

use crate::crawler::models::Product;

/// Writes the product collection as pretty-printed JSON to `<base_name>.json`.
pub fn write_products(products: &[Product], base_name: &str) -> anyhow::Result<PathBuf> {
    let path = PathBuf::from(format!("{}.json", base_name));
    let file = File::create(&path)
        .with_context(|| format!("cannot create output file {}", path.display()))?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, products)?;
    writer.flush()?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::models::{Color, Price};
    use std::collections::BTreeSet;

    #[test]
    fn written_document_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("products").to_string_lossy().into_owned();

        let products = vec![Product {
            id: 4711,
            product_name: "Bomber Jacket".to_string(),
            brand_name: "Alpha Industries".to_string(),
            colors: BTreeSet::from([Color::new("schwarz"), Color::new("weiß")]),
            price: Price::new(29.95, "EUR"),
        }];

        let path = write_products(&products, &base).unwrap();
        assert_eq!(path, dir.path().join("products.json"));

        let reread: Vec<Product> =
            serde_json::from_reader(File::open(&path).unwrap()).unwrap();
        assert_eq!(reread, products);
    }

    #[test]
    fn empty_collection_writes_an_empty_array() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("empty").to_string_lossy().into_owned();

        let path = write_products(&[], &base).unwrap();

        let text = std::fs::read_to_string(path).unwrap();
        assert_eq!(text.trim(), "[]");
    }
}
