use serde::Serialize;
use serde_json::Value;
use strum::{AsRefStr, Display, EnumString, VariantArray};

/// Normalized relationship between an allergen and a menu item.
#[derive(
    EnumString,
    Display,
    VariantArray,
    Default,
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    AsRefStr,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    /// Deliberate ingredient
    Direct,
    /// Cross-contamination or shared manufacturing line
    Trace,
    /// Present only through added fragrance or flavouring
    Fragrance,
    #[default]
    None,
}

impl Presence {
    /// Parse raw vendor text, `None` when it is not a recognized value.
    ///
    /// Accepts the full words and the single-letter codes used by the matrix
    /// table (`d`, `t`, `f`, `n`), ignoring case and surrounding whitespace.
    pub fn recognize(raw: &str) -> Option<Self> {
        let raw = raw.trim();

        match raw.to_ascii_lowercase().as_str() {
            "d" => Some(Presence::Direct),
            "t" => Some(Presence::Trace),
            "f" => Some(Presence::Fragrance),
            "n" => Some(Presence::None),
            other => other.parse().ok(),
        }
    }

    /// Normalize raw vendor text; anything unrecognized is `none`.
    pub fn normalize(raw: &str) -> Self {
        Self::recognize(raw).unwrap_or_default()
    }

    /// Recognize a raw JSON cell. Non-string values are never recognized.
    pub fn recognize_value(value: &Value) -> Option<Self> {
        value.as_str().and_then(Self::recognize)
    }
}
