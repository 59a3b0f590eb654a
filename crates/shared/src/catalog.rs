use serde::Serialize;
use strum::{AsRefStr, Display, EnumString, VariantArray};

use crate::CatalogError;

/// Labelling tier under the Japanese food labelling standard.
#[derive(
    EnumString, Display, VariantArray, Clone, Copy, Debug, PartialEq, Eq, Serialize, AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Specific raw materials, labelling is mandatory
    Mandatory,
    /// Items equivalent to specific raw materials, labelling is recommended
    Recommended,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Allergen {
    pub slug: &'static str,
    pub name: &'static str,
    pub name_en: &'static str,
    pub tier: Tier,
}

const fn allergen(
    slug: &'static str,
    name: &'static str,
    name_en: &'static str,
    tier: Tier,
) -> Allergen {
    Allergen {
        slug,
        name,
        name_en,
        tier,
    }
}

/// Catalog entries in display order.
pub static ALLERGENS: [Allergen; 28] = [
    allergen("egg", "卵", "Egg", Tier::Mandatory),
    allergen("milk", "乳", "Milk", Tier::Mandatory),
    allergen("wheat", "小麦", "Wheat", Tier::Mandatory),
    allergen("buckwheat", "そば", "Buckwheat", Tier::Mandatory),
    allergen("peanut", "落花生", "Peanut", Tier::Mandatory),
    allergen("shrimp", "えび", "Shrimp", Tier::Mandatory),
    allergen("crab", "かに", "Crab", Tier::Mandatory),
    allergen("walnut", "くるみ", "Walnut", Tier::Mandatory),
    allergen("almond", "アーモンド", "Almond", Tier::Recommended),
    allergen("abalone", "あわび", "Abalone", Tier::Recommended),
    allergen("squid", "いか", "Squid", Tier::Recommended),
    allergen("salmon_roe", "いくら", "Salmon roe", Tier::Recommended),
    allergen("orange", "オレンジ", "Orange", Tier::Recommended),
    allergen("cashew", "カシューナッツ", "Cashew", Tier::Recommended),
    allergen("kiwi", "キウイフルーツ", "Kiwi", Tier::Recommended),
    allergen("beef", "牛肉", "Beef", Tier::Recommended),
    allergen("gelatin", "ゼラチン", "Gelatin", Tier::Recommended),
    allergen("sesame", "ごま", "Sesame", Tier::Recommended),
    allergen("salmon", "さけ", "Salmon", Tier::Recommended),
    allergen("mackerel", "さば", "Mackerel", Tier::Recommended),
    allergen("soy", "大豆", "Soy", Tier::Recommended),
    allergen("chicken", "鶏肉", "Chicken", Tier::Recommended),
    allergen("banana", "バナナ", "Banana", Tier::Recommended),
    allergen("pork", "豚肉", "Pork", Tier::Recommended),
    allergen("matsutake", "まつたけ", "Matsutake", Tier::Recommended),
    allergen("peach", "もも", "Peach", Tier::Recommended),
    allergen("yam", "やまいも", "Yam", Tier::Recommended),
    allergen("apple", "りんご", "Apple", Tier::Recommended),
];

/// Legacy column names mapped onto the slug the catalog uses.
const ALIASES: &[(&str, &str)] = &[("soybean", "soy")];

/// Normalize a raw slug: trim, lowercase and resolve legacy aliases.
///
/// Every comparison between slugs coming from user selections, presence maps,
/// matrix columns and legacy records must go through this function.
pub fn canonical_slug(raw: &str) -> String {
    let normalized = raw.trim().to_lowercase();

    ALIASES
        .iter()
        .find(|(alias, _)| *alias == normalized)
        .map(|(_, slug)| (*slug).to_string())
        .unwrap_or(normalized)
}

/// Ordered allergen catalog.
///
/// Only used for label ordering and name lookup, never for safety decisions.
#[derive(Clone, Copy, Debug)]
pub struct Catalog {
    entries: &'static [Allergen],
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl Catalog {
    pub fn standard() -> Self {
        Self {
            entries: &ALLERGENS,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static Allergen> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, slug: &str) -> Option<&'static Allergen> {
        let slug = canonical_slug(slug);
        self.entries.iter().find(|a| a.slug == slug)
    }

    /// Display position of a slug, `None` when it is not in the catalog.
    pub fn position(&self, slug: &str) -> Option<usize> {
        let slug = canonical_slug(slug);
        self.entries.iter().position(|a| a.slug == slug)
    }

    /// Display name for a slug, falling back to the canonical slug itself.
    pub fn display_name(&self, slug: &str) -> String {
        self.get(slug)
            .map(|a| a.name.to_string())
            .unwrap_or_else(|| canonical_slug(slug))
    }

    pub fn by_tier(&self, tier: Tier) -> impl Iterator<Item = &'static Allergen> {
        self.entries.iter().filter(move |a| a.tier == tier)
    }

    /// Strict lookup for user input.
    pub fn parse_slug(&self, raw: &str) -> Result<&'static Allergen, CatalogError> {
        if raw.trim().is_empty() {
            return Err(CatalogError::EmptySlug);
        }

        self.get(raw)
            .ok_or_else(|| CatalogError::UnknownAllergen(raw.trim().to_string()))
    }
}
