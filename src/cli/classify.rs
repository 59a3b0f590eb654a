use std::path::Path;

use safemenu_allergy::{Classifier, MenuVerdict, is_product_eligible, product_verdicts};
use safemenu_shared::ProductId;
use serde_json::json;

use super::{OutputFormat, TargetArgs};
use crate::config::Config;
use crate::dataset;
use crate::error::{AppError, Result};

/// Per-item verdicts and labels for one product.
#[tracing::instrument(skip(config, targets))]
pub fn run(
    config: &Config,
    data: &Path,
    product_id: &str,
    targets: &TargetArgs,
    format: OutputFormat,
) -> Result<String> {
    let products = dataset::load_products(data)?;
    let targets = targets.resolve()?;
    let classifier = Classifier::new(config.classification.options());

    let id = ProductId::from(product_id.trim());
    let product = products
        .iter()
        .find(|p| p.id == id)
        .ok_or_else(|| AppError::ProductNotFound(product_id.to_string()))?;

    let eligible = is_product_eligible(product, &targets.canonical(), &classifier);
    let verdicts = product_verdicts(product, &targets, &classifier);

    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
            "product_id": product.id,
            "eligible": eligible,
            "items": verdicts,
        }))?),
        OutputFormat::Text => {
            let mut lines = vec![format!(
                "{} {}",
                product.id,
                if eligible { "eligible" } else { "hidden" }
            )];
            lines.extend(verdicts.iter().map(render_item));
            Ok(lines.join("\n"))
        }
    }
}

fn render_item(item: &MenuVerdict) -> String {
    let label = item
        .name
        .as_deref()
        .or(item.item_id.as_deref())
        .unwrap_or("(product)");

    let mut line = if item.verdict.is_hazardous {
        let reasons: Vec<String> = item
            .verdict
            .hazards
            .iter()
            .map(|h| format!("{}:{}", h.slug, h.kind))
            .collect();
        format!("  - {label}: hazardous [{}]", reasons.join(", "))
    } else {
        format!("  - {label}: ok")
    };

    for badge in item.verdict.labels.summary() {
        line.push_str(&format!("\n      {badge}"));
    }

    line
}
