use safemenu_shared::{Catalog, Presence, Product, ProductId};
use serde::Serialize;

use crate::resolver::{FragranceRule, ItemView, SourceKind, resolve, resolve_from};

/// Raw shapes disagree on a slug. Precedence still picks the value the
/// engine uses; this only reports the upstream data-entry inconsistency.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SourceConflict {
    pub slug: String,
    /// Recognized values stated by each source, in precedence order
    pub values: Vec<(SourceKind, Presence)>,
    /// Source the engine resolves the slug from
    pub winner: SourceKind,
    /// Presence the engine uses, `none` when the winner is silent
    pub resolved: Presence,
    /// The winner states the slug itself
    pub winner_recorded: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ItemConflicts {
    pub product_id: ProductId,
    pub item_id: Option<String>,
    pub conflicts: Vec<SourceConflict>,
}

/// Conflicting source values for one item, over every catalog slug.
///
/// Two cases are reported: recorded values that disagree, and a winning
/// source that is silent on a slug while a lower source records a presence
/// other than `none`.
pub fn find_source_conflicts(
    view: &ItemView<'_>,
    catalog: &Catalog,
    rule: &FragranceRule,
) -> Vec<SourceConflict> {
    let available = view.available_sources();
    if available.len() < 2 {
        return Vec::new();
    }

    catalog
        .iter()
        .filter_map(|allergen| {
            let resolution = resolve(view, allergen.slug, rule);
            let winner = resolution.source?;

            let values: Vec<(SourceKind, Presence)> = available
                .iter()
                .filter_map(|kind| {
                    resolve_from(view, allergen.slug, *kind, rule)
                        .filter(|r| r.recorded)
                        .map(|r| (*kind, r.presence))
                })
                .collect();

            let disagree = values
                .iter()
                .any(|(_, presence)| *presence != resolution.presence);
            let masked = !resolution.recorded
                && values.iter().any(|(_, presence)| *presence != Presence::None);

            if !(disagree && resolution.recorded) && !masked {
                return None;
            }

            Some(SourceConflict {
                slug: allergen.slug.to_string(),
                values,
                winner,
                resolved: resolution.presence,
                winner_recorded: resolution.recorded,
            })
        })
        .collect()
}

/// Conflicts across a whole dataset, grouped per item.
#[tracing::instrument(skip_all, fields(products = products.len()))]
pub fn find_product_conflicts(
    products: &[Product],
    catalog: &Catalog,
    rule: &FragranceRule,
) -> Vec<ItemConflicts> {
    let mut found = Vec::new();

    for product in products {
        for view in ItemView::all(product) {
            let conflicts = find_source_conflicts(&view, catalog, rule);
            if conflicts.is_empty() {
                continue;
            }

            tracing::warn!(
                product_id = %product.id,
                item_id = view.item_id,
                conflicts = conflicts.len(),
                "allergy sources disagree"
            );

            found.push(ItemConflicts {
                product_id: product.id.clone(),
                item_id: view.item_id.map(str::to_string),
                conflicts,
            });
        }
    }

    found
}
