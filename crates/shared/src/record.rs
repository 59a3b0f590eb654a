use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::lenient;

/// Product identifier. The data layer hands out both numeric and string ids.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ProductId(pub String);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ProductId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<i64> for ProductId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for ProductId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;

        match value {
            Value::String(s) => Ok(Self(s)),
            Value::Number(n) => Ok(Self(n.to_string())),
            other => Err(serde::de::Error::custom(format!(
                "product id must be a string or a number, got {other}"
            ))),
        }
    }
}

/// Wide per-menu-item row with one column per allergen slug.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct MatrixRow {
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub product_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub menu_item_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub menu_name: Option<String>,
    /// Allergen columns, keyed by raw slug (e.g. `soybean`).
    #[serde(flatten)]
    pub columns: BTreeMap<String, Value>,
}

impl MatrixRow {
    pub fn new(menu_item_id: Option<&str>) -> Self {
        Self {
            menu_item_id: menu_item_id.map(str::to_string),
            ..Default::default()
        }
    }

    pub fn with(mut self, column: &str, value: &str) -> Self {
        self.columns
            .insert(column.to_string(), Value::String(value.to_string()));
        self
    }
}

/// Older per-allergen-per-item record.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct LegacyAllergyRecord {
    #[serde(default, deserialize_with = "lenient::string")]
    pub allergy_item_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub allergy_item_slug: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::string",
        alias = "presence",
        alias = "presenceType"
    )]
    pub presence_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub notes: Option<String>,
}

impl LegacyAllergyRecord {
    pub fn new(slug: &str, presence_type: &str) -> Self {
        Self {
            allergy_item_id: Some(slug.to_string()),
            presence_type: Some(presence_type.to_string()),
            ..Default::default()
        }
    }

    pub fn with_notes(mut self, notes: &str) -> Self {
        self.notes = Some(notes.to_string());
        self
    }

    /// Slug this record describes, preferring the explicit slug column.
    pub fn slug(&self) -> Option<&str> {
        self.allergy_item_slug
            .as_deref()
            .or(self.allergy_item_id.as_deref())
    }
}

/// The three raw shapes allergy data may arrive in.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct AllergySources {
    #[serde(
        default,
        deserialize_with = "lenient::object",
        alias = "presenceBySlug"
    )]
    pub presence_by_slug: Option<BTreeMap<String, Value>>,
    #[serde(
        default,
        deserialize_with = "lenient::list",
        alias = "matrixRows",
        alias = "allergyMatrix",
        alias = "product_allergies_matrix"
    )]
    pub matrix_rows: Option<Vec<MatrixRow>>,
    #[serde(
        default,
        deserialize_with = "lenient::list",
        alias = "legacyAllergyRecords",
        alias = "menu_item_allergies",
        alias = "product_allergies"
    )]
    pub legacy_records: Option<Vec<LegacyAllergyRecord>>,
}

impl AllergySources {
    pub fn presence_map<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            presence_by_slug: Some(
                entries
                    .into_iter()
                    .map(|(slug, presence)| (slug.to_string(), Value::String(presence.to_string())))
                    .collect(),
            ),
            ..Default::default()
        }
    }

    pub fn matrix(rows: Vec<MatrixRow>) -> Self {
        Self {
            matrix_rows: Some(rows),
            ..Default::default()
        }
    }

    pub fn legacy(records: Vec<LegacyAllergyRecord>) -> Self {
        Self {
            legacy_records: Some(records),
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct MenuItem {
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub sources: AllergySources,
}

impl MenuItem {
    pub fn new(id: Option<&str>, sources: AllergySources) -> Self {
        Self {
            id: id.map(str::to_string),
            name: None,
            sources,
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }
}

/// The unit surfaced to the end user: a restaurant, shop or packaged product.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Product {
    pub id: ProductId,
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::list_or_empty",
        alias = "menuItems"
    )]
    pub menu_items: Vec<MenuItem>,
    #[serde(flatten)]
    pub sources: AllergySources,
}

impl Product {
    pub fn new(id: impl Into<ProductId>) -> Self {
        Self {
            id: id.into(),
            name: None,
            menu_items: Vec::new(),
            sources: AllergySources::default(),
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_sources(mut self, sources: AllergySources) -> Self {
        self.sources = sources;
        self
    }

    pub fn with_item(mut self, item: MenuItem) -> Self {
        self.menu_items.push(item);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_product_id_accepts_numbers_and_strings() {
        let numeric: ProductId = serde_json::from_value(json!(42)).unwrap();
        let text: ProductId = serde_json::from_value(json!("db_42")).unwrap();

        assert_eq!(numeric, ProductId::from("42"));
        assert_eq!(text.to_string(), "db_42");
        assert!(serde_json::from_value::<ProductId>(json!(null)).is_err());
    }

    #[test]
    fn test_product_accepts_camel_case_shapes() {
        let product: Product = serde_json::from_value(json!({
            "id": 7,
            "name": "Cafe",
            "menuItems": [
                { "id": 1, "name": "Pancake", "presenceBySlug": { "egg": "direct" } },
                { "id": 2, "legacyAllergyRecords": [
                    { "allergy_item_id": "wheat", "presence_type": "direct", "notes": "香料" }
                ] }
            ],
            "matrixRows": [ { "menu_item_id": 1, "soybean": "t", "egg": null } ]
        }))
        .unwrap();

        assert_eq!(product.id, ProductId::from("7"));
        assert_eq!(product.menu_items.len(), 2);
        assert_eq!(product.menu_items[0].id.as_deref(), Some("1"));
        assert_eq!(
            product.menu_items[0]
                .sources
                .presence_by_slug
                .as_ref()
                .and_then(|m| m.get("egg")),
            Some(&json!("direct"))
        );

        let legacy = product.menu_items[1].sources.legacy_records.as_ref().unwrap();
        assert_eq!(legacy[0].slug(), Some("wheat"));
        assert_eq!(legacy[0].notes.as_deref(), Some("香料"));

        let rows = product.sources.matrix_rows.as_ref().unwrap();
        assert_eq!(rows[0].menu_item_id.as_deref(), Some("1"));
        assert_eq!(rows[0].columns.get("soybean"), Some(&json!("t")));
        assert_eq!(rows[0].columns.get("egg"), Some(&json!(null)));
        assert!(!rows[0].columns.contains_key("menu_item_id"));
    }

    #[test]
    fn test_data_layer_aliases() {
        let product: Product = serde_json::from_value(json!({
            "id": "p1",
            "product_allergies_matrix": [ { "menu_name": "Curry", "milk": "d" } ],
            "menu_items": [ { "menu_item_allergies": [
                { "allergy_item_slug": "soy", "allergy_item_id": 21, "presence": "trace" }
            ] } ]
        }))
        .unwrap();

        assert!(product.sources.matrix_rows.is_some());
        let record = &product.menu_items[0].sources.legacy_records.as_ref().unwrap()[0];
        assert_eq!(record.slug(), Some("soy"));
        assert_eq!(record.presence_type.as_deref(), Some("trace"));
    }

    #[test]
    fn test_malformed_fields_degrade_to_absent() {
        let product: Product = serde_json::from_value(json!({
            "id": 1,
            "name": { "ja": "x" },
            "menu_items": "not a list",
            "presence_by_slug": ["egg"],
            "legacy_records": [ 5, { "allergy_item_id": "egg", "presence_type": 3 } ]
        }))
        .unwrap();

        assert_eq!(product.name, None);
        assert!(product.menu_items.is_empty());
        assert_eq!(product.sources.presence_by_slug, None);

        let legacy = product.sources.legacy_records.unwrap();
        assert_eq!(legacy.len(), 1);
        assert_eq!(legacy[0].presence_type.as_deref(), Some("3"));
    }
}
