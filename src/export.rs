//! Serialize the category forest and product list to CSV.
//!
//! Categories are written parent-before-child so a consumer loading rows
//! in order always has the parent on hand when a child references it.
//! Product chains are resolved through the tree once more here, covering
//! any chain that never materialized during the main crawl; that pass
//! runs before the category file is written so both files agree.

use crate::catalog::{CategoryTree, ProductRecord};
use crate::ident;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Serialize)]
struct CategoryRow<'a> {
    id: String,
    name: &'a str,
    parent_id: String,
    is_popular: bool,
}

#[derive(Debug, Serialize)]
struct ProductRow<'a> {
    id: String,
    name: &'a str,
    price: Option<f64>,
    description: &'a str,
    image_url: &'a str,
    is_available: bool,
    category_id: String,
}

/// Paths of the two files one export produces.
#[derive(Debug, Clone)]
pub struct ExportedFiles {
    pub categories_csv: PathBuf,
    pub products_csv: PathBuf,
}

/// Write `categories.csv` and `products.csv` into `out_dir`.
///
/// This is the one place a failure is fatal to the run: a partial catalog
/// with no files is useless, so write errors surface to the caller.
pub fn write_catalog(
    out_dir: &Path,
    tree: &mut CategoryTree,
    products: &[ProductRecord],
    namespace: &str,
) -> Result<ExportedFiles> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create output directory {}", out_dir.display()))?;

    // Resolve every product's category first so late chains land in the
    // category file too.
    let category_ids: Vec<String> = products
        .iter()
        .map(|p| {
            tree.ensure_category(&p.category_chain)
                .and_then(|path| ident::category_id(namespace, &path))
                .map(|id| id.to_string())
                .unwrap_or_default()
        })
        .collect();

    let categories_csv = out_dir.join("categories.csv");
    write_categories(&categories_csv, tree, namespace)
        .with_context(|| format!("failed to write {}", categories_csv.display()))?;

    let products_csv = out_dir.join("products.csv");
    write_products(&products_csv, products, &category_ids, namespace)
        .with_context(|| format!("failed to write {}", products_csv.display()))?;

    info!(
        "wrote {} categories and {} products to {}",
        tree.len(),
        products.len(),
        out_dir.display()
    );

    Ok(ExportedFiles {
        categories_csv,
        products_csv,
    })
}

fn write_categories(path: &Path, tree: &CategoryTree, namespace: &str) -> Result<()> {
    // Headers written up front so even an empty catalog yields valid files.
    let mut w = csv::WriterBuilder::new().has_headers(false).from_path(path)?;
    w.write_record(["id", "name", "parent_id", "is_popular"])?;
    for node in tree.topological() {
        let id = ident::category_id(namespace, &node.path)
            .map(|u| u.to_string())
            .unwrap_or_default();
        let parent_id = node
            .parent_path
            .as_deref()
            .and_then(|p| ident::category_id(namespace, p))
            .map(|u| u.to_string())
            .unwrap_or_default();
        w.serialize(CategoryRow {
            id,
            name: &node.name,
            parent_id,
            is_popular: node.is_popular,
        })?;
    }
    w.flush()?;
    Ok(())
}

fn write_products(
    path: &Path,
    products: &[ProductRecord],
    category_ids: &[String],
    namespace: &str,
) -> Result<()> {
    let mut w = csv::WriterBuilder::new().has_headers(false).from_path(path)?;
    w.write_record([
        "id",
        "name",
        "price",
        "description",
        "image_url",
        "is_available",
        "category_id",
    ])?;
    for (product, category_id) in products.iter().zip(category_ids) {
        let id = ident::product_id(namespace, &product.source_url)
            .map(|u| u.to_string())
            .unwrap_or_default();
        w.serialize(ProductRow {
            id,
            name: product.name.as_deref().unwrap_or(""),
            price: product.price,
            description: product.description.as_deref().unwrap_or(""),
            image_url: product.image_url.as_deref().unwrap_or(""),
            is_available: product.is_available,
            category_id: category_id.clone(),
        })?;
    }
    w.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CategoryTree;

    fn sample_product(url: &str, chain: &[&str]) -> ProductRecord {
        ProductRecord {
            source_url: url.to_string(),
            name: Some("Galaxy S24".to_string()),
            price: Some(27_280_000.0),
            description: None,
            image_url: Some("https://cdn.example.com/s24.jpg".to_string()),
            is_available: true,
            category_chain: chain.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_csv_headers_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let mut tree = CategoryTree::new();
        let products = vec![
            sample_product("https://x/s24.html", &["Điện thoại", "Samsung Galaxy"]),
            sample_product("https://x/no-cat.html", &[]),
        ];

        let files = write_catalog(dir.path(), &mut tree, &products, "cellphones").unwrap();

        let categories = std::fs::read_to_string(&files.categories_csv).unwrap();
        let mut lines = categories.lines();
        assert_eq!(lines.next(), Some("id,name,parent_id,is_popular"));
        let first = lines.next().unwrap();
        assert!(first.contains("Điện thoại"));
        assert!(first.contains(",true"));
        // Top-level row has an empty parent_id field.
        assert!(first.contains(",,"));

        let products_csv = std::fs::read_to_string(&files.products_csv).unwrap();
        let mut lines = products_csv.lines();
        assert_eq!(
            lines.next(),
            Some("id,name,price,description,image_url,is_available,category_id")
        );
        let with_cat = lines.next().unwrap();
        assert!(with_cat.contains("27280000"));
        assert!(with_cat.contains("true"));
        // Second product has no chain: category_id is the empty last field.
        let without_cat = lines.next().unwrap();
        assert!(without_cat.ends_with(','));
    }

    #[test]
    fn test_late_chain_lands_in_categories_file() {
        let dir = tempfile::tempdir().unwrap();
        // Tree starts empty; the only chain arrives via the product.
        let mut tree = CategoryTree::new();
        let products = vec![sample_product("https://x/p.html", &["Tablet"])];

        let files = write_catalog(dir.path(), &mut tree, &products, "cellphones").unwrap();

        let categories = std::fs::read_to_string(&files.categories_csv).unwrap();
        assert!(categories.contains("Tablet"));

        let expected_id = crate::ident::category_id("cellphones", "tablet")
            .unwrap()
            .to_string();
        let products_csv = std::fs::read_to_string(&files.products_csv).unwrap();
        assert!(products_csv.contains(&expected_id));
    }

    #[test]
    fn test_empty_catalog_still_has_headers() {
        let dir = tempfile::tempdir().unwrap();
        let mut tree = CategoryTree::new();
        let files = write_catalog(dir.path(), &mut tree, &[], "cellphones").unwrap();
        assert_eq!(
            std::fs::read_to_string(&files.categories_csv).unwrap().trim(),
            "id,name,parent_id,is_popular"
        );
        assert_eq!(
            std::fs::read_to_string(&files.products_csv).unwrap().trim(),
            "id,name,price,description,image_url,is_available,category_id"
        );
    }

    #[test]
    fn test_parent_rows_precede_children() {
        let dir = tempfile::tempdir().unwrap();
        let mut tree = CategoryTree::new();
        tree.ensure_category(&["Laptop".to_string(), "Gaming".to_string()]);
        tree.ensure_category(&["Điện thoại".to_string()]);

        let files = write_catalog(dir.path(), &mut tree, &[], "cellphones").unwrap();
        let categories = std::fs::read_to_string(&files.categories_csv).unwrap();

        let laptop_line = categories.lines().position(|l| l.contains("Laptop")).unwrap();
        let gaming_line = categories.lines().position(|l| l.contains("Gaming")).unwrap();
        assert!(laptop_line < gaming_line);
    }
}
