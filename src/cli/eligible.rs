use std::path::Path;

use safemenu_allergy::{Classifier, compute_eligible_products_with};
use serde_json::json;

use super::{OutputFormat, TargetArgs};
use crate::config::Config;
use crate::dataset;
use crate::error::Result;

/// Ids of the products that may be displayed for the target set.
#[tracing::instrument(skip(config, targets))]
pub fn run(
    config: &Config,
    data: &Path,
    targets: &TargetArgs,
    format: OutputFormat,
) -> Result<String> {
    let products = dataset::load_products(data)?;
    let targets = targets.resolve()?;
    let classifier = Classifier::new(config.classification.options());

    let eligible = compute_eligible_products_with(&products, &targets, &classifier);

    tracing::info!(
        total = products.len(),
        eligible = eligible.len(),
        "eligibility computed"
    );

    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
            "targets": targets,
            "total": products.len(),
            "eligible": eligible,
        }))?),
        OutputFormat::Text => {
            // Keep input order in text output
            let lines: Vec<String> = products
                .iter()
                .filter(|p| eligible.contains(&p.id))
                .map(|p| match &p.name {
                    Some(name) => format!("{}\t{}", p.id, name),
                    None => p.id.to_string(),
                })
                .collect();

            Ok(lines.join("\n"))
        }
    }
}
