use std::collections::BTreeMap;

use safemenu_shared::{
    AllergySources, LegacyAllergyRecord, MatrixRow, MenuItem, Presence, Product, canonical_slug,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{AsRefStr, Display, EnumString, VariantArray};

/// Raw shape a presence value was read from, in precedence order.
#[derive(
    EnumString,
    Display,
    VariantArray,
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    PresenceMap,
    Matrix,
    Legacy,
}

/// Keywords in a legacy record's notes that turn a `direct` record into a
/// `fragrance` one.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(from = "Vec<String>")]
pub struct FragranceRule {
    keywords: Vec<String>,
}

impl Default for FragranceRule {
    fn default() -> Self {
        Self::new(["香料", "fragrance"])
    }
}

impl From<Vec<String>> for FragranceRule {
    fn from(keywords: Vec<String>) -> Self {
        Self::new(keywords)
    }
}

impl FragranceRule {
    pub fn new<S: AsRef<str>>(keywords: impl IntoIterator<Item = S>) -> Self {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn matches(&self, notes: &str) -> bool {
        let notes = notes.to_lowercase();
        self.keywords.iter().any(|k| notes.contains(k.as_str()))
    }
}

/// Borrowed view of the raw allergy data that applies to one menu item.
#[derive(Clone, Copy, Debug, Default)]
pub struct ItemView<'a> {
    pub item_id: Option<&'a str>,
    pub name: Option<&'a str>,
    pub presence_by_slug: Option<&'a BTreeMap<String, Value>>,
    pub matrix_rows: Option<&'a [MatrixRow]>,
    pub legacy_records: Option<&'a [LegacyAllergyRecord]>,
}

impl<'a> ItemView<'a> {
    pub fn new(sources: &'a AllergySources, item_id: Option<&'a str>) -> Self {
        Self {
            item_id,
            name: None,
            presence_by_slug: sources.presence_by_slug.as_ref(),
            matrix_rows: sources.matrix_rows.as_deref(),
            legacy_records: sources.legacy_records.as_deref(),
        }
    }

    /// A menu item inside its product. Matrix rows are stored per product and
    /// keyed by menu item id, so an item without rows of its own uses the
    /// product's rows.
    pub fn menu_item(product: &'a Product, item: &'a MenuItem) -> Self {
        let mut view = Self::new(&item.sources, item.id.as_deref());
        view.name = item.name.as_deref();

        if view.matrix_rows.is_none_or(<[MatrixRow]>::is_empty) {
            view.matrix_rows = product.sources.matrix_rows.as_deref();
        }

        view
    }

    /// The single implicit item of a product without menu items.
    pub fn implicit(product: &'a Product) -> Self {
        let mut view = Self::new(&product.sources, None);
        view.name = product.name.as_deref();
        view
    }

    /// Every item view of a product, or its implicit item.
    pub fn all(product: &'a Product) -> Vec<Self> {
        if product.menu_items.is_empty() {
            return vec![Self::implicit(product)];
        }

        product
            .menu_items
            .iter()
            .map(|item| Self::menu_item(product, item))
            .collect()
    }

    /// Presence map, only when it holds at least one entry.
    pub fn presence_map(&self) -> Option<&'a BTreeMap<String, Value>> {
        self.presence_by_slug.filter(|map| !map.is_empty())
    }

    /// Matrix row for this item: `menu_item_id` match, then `menu_name`
    /// match against the item name. An item without an id falls back to the
    /// first row.
    pub fn matrix_row(&self) -> Option<&'a MatrixRow> {
        let rows = self.matrix_rows?;

        let by_id = self.item_id.and_then(|id| {
            rows.iter()
                .find(|row| row.menu_item_id.as_deref().map(str::trim) == Some(id.trim()))
        });
        let by_name = || {
            let name = self.name.map(str::trim).filter(|n| !n.is_empty())?;
            rows.iter()
                .find(|row| row.menu_name.as_deref().map(str::trim) == Some(name))
        };

        by_id.or_else(by_name).or_else(|| match self.item_id {
            Some(_) => None,
            None => rows.first(),
        })
    }

    /// Sources this item can resolve from, in precedence order.
    pub fn available_sources(&self) -> Vec<SourceKind> {
        let mut kinds = Vec::with_capacity(3);

        if self.presence_map().is_some() {
            kinds.push(SourceKind::PresenceMap);
        }
        if self.matrix_row().is_some() {
            kinds.push(SourceKind::Matrix);
        }
        if self.legacy_records.is_some() {
            kinds.push(SourceKind::Legacy);
        }

        kinds
    }
}

/// Outcome of resolving one slug for one item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub presence: Presence,
    /// Source that decided the value, `None` when the item has no data at all.
    pub source: Option<SourceKind>,
    /// The deciding source stated a recognized value for the slug.
    pub recorded: bool,
}

impl Resolution {
    const MISSING: Self = Self {
        presence: Presence::None,
        source: None,
        recorded: false,
    };

    fn stated(presence: Option<Presence>, source: SourceKind) -> Self {
        Self {
            presence: presence.unwrap_or_default(),
            source: Some(source),
            recorded: presence.is_some(),
        }
    }
}

/// Resolve the presence of `slug` for an item with the default fragrance rule.
pub fn resolve_presence(view: &ItemView<'_>, slug: &str) -> Presence {
    resolve(view, slug, &FragranceRule::default()).presence
}

/// Resolve `slug` for an item. The first available source is authoritative;
/// sources are never merged.
pub fn resolve(view: &ItemView<'_>, slug: &str, rule: &FragranceRule) -> Resolution {
    let slug = canonical_slug(slug);

    [SourceKind::PresenceMap, SourceKind::Matrix, SourceKind::Legacy]
        .into_iter()
        .find_map(|kind| resolve_from(view, &slug, kind, rule))
        .unwrap_or(Resolution::MISSING)
}

/// Resolve `slug` from one specific source, `None` when the item does not
/// carry that source. `slug` must already be canonical.
pub fn resolve_from(
    view: &ItemView<'_>,
    slug: &str,
    kind: SourceKind,
    rule: &FragranceRule,
) -> Option<Resolution> {
    match kind {
        SourceKind::PresenceMap => {
            let map = view.presence_map()?;
            let presence = lookup(map, slug).and_then(Presence::recognize_value);
            Some(Resolution::stated(presence, kind))
        }
        SourceKind::Matrix => {
            let row = view.matrix_row()?;
            let presence = lookup(&row.columns, slug).and_then(Presence::recognize_value);
            Some(Resolution::stated(presence, kind))
        }
        SourceKind::Legacy => {
            let records = view.legacy_records?;
            let presence = records
                .iter()
                .find(|record| record.slug().map(canonical_slug).as_deref() == Some(slug))
                .and_then(|record| legacy_presence(record, rule));
            Some(Resolution::stated(presence, kind))
        }
    }
}

fn legacy_presence(record: &LegacyAllergyRecord, rule: &FragranceRule) -> Option<Presence> {
    let presence = Presence::recognize(record.presence_type.as_deref()?)?;

    let via_fragrance = record.notes.as_deref().is_some_and(|notes| rule.matches(notes));
    if presence == Presence::Direct && via_fragrance {
        return Some(Presence::Fragrance);
    }

    Some(presence)
}

/// Look a canonical slug up in a map keyed by raw slugs. An exact key wins
/// over an aliased one.
fn lookup<'m>(map: &'m BTreeMap<String, Value>, slug: &str) -> Option<&'m Value> {
    map.get(slug).or_else(|| {
        map.iter()
            .find(|(key, _)| canonical_slug(key) == slug)
            .map(|(_, value)| value)
    })
}
