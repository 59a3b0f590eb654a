use std::path::Path;

use safemenu_allergy::find_product_conflicts;
use safemenu_shared::Catalog;

use super::OutputFormat;
use crate::config::Config;
use crate::dataset;
use crate::error::Result;

/// Report items whose raw allergy shapes disagree with each other.
#[tracing::instrument(skip(config))]
pub fn run(config: &Config, data: &Path, format: OutputFormat) -> Result<String> {
    let products = dataset::load_products(data)?;
    let options = config.classification.options();

    let found = find_product_conflicts(&products, &Catalog::standard(), &options.fragrance_keywords);

    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&found)?),
        OutputFormat::Text => {
            let mut lines = Vec::new();

            for item in &found {
                let item_id = item.item_id.as_deref().unwrap_or("-");
                for conflict in &item.conflicts {
                    let values: Vec<String> = conflict
                        .values
                        .iter()
                        .map(|(kind, presence)| format!("{kind}={presence}"))
                        .collect();
                    let used = if conflict.winner_recorded {
                        format!("{}={}", conflict.winner, conflict.resolved)
                    } else {
                        format!("{} silent, {}", conflict.winner, conflict.resolved)
                    };
                    lines.push(format!(
                        "{}\t{}\t{}\t{} (using {used})",
                        item.product_id,
                        item_id,
                        conflict.slug,
                        values.join(" "),
                    ));
                }
            }

            Ok(lines.join("\n"))
        }
    }
}
