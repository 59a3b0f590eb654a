use std::collections::BTreeSet;

use safemenu_shared::{CanonicalTargets, Product, ProductId, TargetSet};
use serde::Serialize;

use crate::classifier::{Classifier, ItemVerdict};
use crate::resolver::ItemView;

/// Verdict for one menu item of a product, for detail views.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MenuVerdict {
    pub item_id: Option<String>,
    pub name: Option<String>,
    #[serde(flatten)]
    pub verdict: ItemVerdict,
}

/// Ids of the products that have at least one non-hazardous menu item,
/// using default classifier options.
pub fn compute_eligible_products(products: &[Product], targets: &TargetSet) -> BTreeSet<ProductId> {
    compute_eligible_products_with(products, targets, &Classifier::default())
}

/// Ids of the products that have at least one non-hazardous menu item.
///
/// An empty target set makes every product eligible without resolving
/// anything. Products are OR-aggregated over their items, so adding items
/// can only make a product eligible, never the reverse.
#[tracing::instrument(skip_all, fields(products = products.len()))]
pub fn compute_eligible_products_with(
    products: &[Product],
    targets: &TargetSet,
    classifier: &Classifier,
) -> BTreeSet<ProductId> {
    let targets = targets.canonical();

    if targets.is_empty() {
        tracing::debug!("no allergens targeted, every product is eligible");
        return products.iter().map(|p| p.id.clone()).collect();
    }

    let eligible: BTreeSet<ProductId> = products
        .iter()
        .filter(|product| is_product_eligible(product, &targets, classifier))
        .map(|product| product.id.clone())
        .collect();

    tracing::debug!(
        eligible = eligible.len(),
        excluded = products.len() - eligible.len(),
        "eligibility computed"
    );

    eligible
}

/// OR over the product's items of "item is not hazardous".
pub fn is_product_eligible(
    product: &Product,
    targets: &CanonicalTargets,
    classifier: &Classifier,
) -> bool {
    if targets.is_empty() {
        return true;
    }

    let safe = ItemView::all(product)
        .iter()
        .any(|view| !classifier.is_hazardous(view, targets));

    if !safe {
        tracing::debug!(product_id = %product.id, "every menu item is hazardous");
    }

    safe
}

/// Per-item verdicts of a product, implicit item included.
pub fn product_verdicts(
    product: &Product,
    targets: &TargetSet,
    classifier: &Classifier,
) -> Vec<MenuVerdict> {
    let targets = targets.canonical();

    ItemView::all(product)
        .iter()
        .map(|view| MenuVerdict {
            item_id: view.item_id.map(str::to_string),
            name: view.name.map(str::to_string),
            verdict: classifier.classify(view, &targets),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use safemenu_shared::{AllergySources, MenuItem};

    fn item(id: &str, entries: &[(&str, &str)]) -> MenuItem {
        MenuItem::new(Some(id), AllergySources::presence_map(entries.iter().copied()))
    }

    #[test]
    fn test_one_safe_item_makes_product_eligible() {
        let products = vec![
            Product::new("cafe")
                .with_item(item("1", &[("egg", "direct")]))
                .with_item(item("2", &[("egg", "none")])),
            Product::new("bakery").with_item(item("3", &[("egg", "direct")])),
        ];

        let eligible = compute_eligible_products(&products, &TargetSet::new().avoid_direct(["egg"]));

        assert_eq!(eligible, BTreeSet::from([ProductId::from("cafe")]));
    }

    #[test]
    fn test_empty_targets_short_circuit() {
        let products = vec![
            Product::new("a").with_item(item("1", &[("egg", "direct")])),
            Product::new("b"),
        ];

        let eligible = compute_eligible_products(&products, &TargetSet::new().avoid_trace([" "]));

        assert_eq!(eligible.len(), 2);
    }

    #[test]
    fn test_product_verdicts_cover_implicit_item() {
        let product = Product::new("p")
            .named("Cookie")
            .with_sources(AllergySources::presence_map([("milk", "trace")]));

        let verdicts = product_verdicts(
            &product,
            &TargetSet::new().avoid_trace(["milk"]),
            &Classifier::default(),
        );

        assert_eq!(verdicts.len(), 1);
        assert_eq!(verdicts[0].item_id, None);
        assert_eq!(verdicts[0].name.as_deref(), Some("Cookie"));
        assert!(verdicts[0].verdict.is_hazardous);
        assert_eq!(verdicts[0].verdict.labels.contamination, vec!["乳"]);
    }
}
