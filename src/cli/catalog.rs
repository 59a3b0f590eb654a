use safemenu_shared::{Catalog, Tier};

use super::OutputFormat;
use crate::error::Result;

/// List the allergen catalog in display order.
pub fn run(tier: Option<Tier>, format: OutputFormat) -> Result<String> {
    let catalog = Catalog::standard();
    let allergens: Vec<_> = catalog
        .iter()
        .filter(|a| tier.is_none_or(|t| a.tier == t))
        .collect();

    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&allergens)?),
        OutputFormat::Text => Ok(allergens
            .iter()
            .map(|a| format!("{:<12}{:<10}{:<14}{}", a.slug, a.name, a.name_en, a.tier))
            .collect::<Vec<_>>()
            .join("\n")),
    }
}
