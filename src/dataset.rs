use std::fs;
use std::path::Path;

use safemenu_shared::{Catalog, Product, TargetSet};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{AppError, Result};

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path).map_err(|source| AppError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&raw).map_err(|source| AppError::JsonError {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a product dataset: a JSON array of products, or `{ "products": [...] }`.
pub fn load_products(path: &Path) -> Result<Vec<Product>> {
    let value: Value = read_json(path)?;
    let products = parse_products(value)?;

    tracing::info!(path = %path.display(), products = products.len(), "dataset loaded");

    Ok(products)
}

/// Null entries and entries without a usable id are skipped: they can never
/// be displayed, so they are never eligible.
pub fn parse_products(value: Value) -> Result<Vec<Product>> {
    let entries = match value {
        Value::Array(entries) => entries,
        Value::Object(mut map) => match map.remove("products") {
            Some(Value::Array(entries)) => entries,
            _ => return Err(AppError::DatasetShape),
        },
        _ => return Err(AppError::DatasetShape),
    };

    let mut products = Vec::with_capacity(entries.len());

    for (index, entry) in entries.into_iter().enumerate() {
        if entry.is_null() {
            tracing::warn!(index, "skipping null product");
            continue;
        }

        match serde_json::from_value::<Product>(entry) {
            Ok(product) => products.push(product),
            Err(e) => tracing::warn!(index, error = %e, "skipping unreadable product"),
        }
    }

    Ok(products)
}

/// Load a target set file (`avoidDirect` / `avoid_direct`, etc.).
pub fn load_targets(path: &Path) -> Result<TargetSet> {
    read_json(path)
}

/// Merge file and command line targets, rejecting slugs outside the catalog.
pub fn build_targets(
    file: Option<TargetSet>,
    avoid_direct: &[String],
    avoid_fragrance: &[String],
    avoid_trace: &[String],
) -> Result<TargetSet> {
    let targets = file
        .unwrap_or_default()
        .avoid_direct(avoid_direct)
        .avoid_fragrance(avoid_fragrance)
        .avoid_trace(avoid_trace);

    let catalog = Catalog::standard();
    for slug in targets
        .avoid_direct
        .iter()
        .chain(&targets.avoid_fragrance)
        .chain(&targets.avoid_trace)
    {
        catalog.parse_slug(slug)?;
    }

    Ok(targets)
}
