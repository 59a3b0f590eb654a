use std::collections::BTreeSet;

use safemenu_shared::{CanonicalTargets, Catalog, Presence, TargetSet, canonical_slug};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, VariantArray};

use crate::resolver::{FragranceRule, ItemView, resolve};

/// What a targeted slug without a recorded value means for an item.
///
/// `TreatAsSafe` keeps the behaviour the product has always shipped with;
/// switching to `TreatAsHazardous` is a product-safety decision made in
/// configuration, never silently.
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
    Serialize,
    Deserialize,
    AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MissingDataPolicy {
    #[default]
    #[serde(alias = "safe")]
    TreatAsSafe,
    #[serde(alias = "hazardous")]
    TreatAsHazardous,
}

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
    Serialize,
    AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum HazardKind {
    /// Avoided as an ingredient and present as one
    Direct,
    /// Avoided as fragrance and present as fragrance
    Fragrance,
    /// Avoided as cross-contamination and present as trace
    Trace,
    /// Targeted but not recorded, only under `TreatAsHazardous`
    Unverified,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Hazard {
    pub slug: String,
    pub kind: HazardKind,
}

/// Advisory badge text. Not a safety gate.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Labels {
    /// Display names of allergens resolved as `trace`, in catalog order
    pub contamination: Vec<String>,
    /// Display names of allergens resolved as `fragrance`, in catalog order
    pub fragrance: Vec<String>,
}

impl Labels {
    pub fn is_empty(&self) -> bool {
        self.contamination.is_empty() && self.fragrance.is_empty()
    }

    /// Badge lines as shown on cards, e.g. `乳、卵コンタミネーション`.
    pub fn summary(&self) -> Vec<String> {
        let mut lines = Vec::new();

        if !self.contamination.is_empty() {
            lines.push(format!("{}コンタミネーション", self.contamination.join("、")));
        }
        if !self.fragrance.is_empty() {
            lines.push(format!("{}香料に含む", self.fragrance.join("、")));
        }

        lines
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ItemVerdict {
    pub is_hazardous: bool,
    pub hazards: Vec<Hazard>,
    pub labels: Labels,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClassifyOptions {
    pub missing_data: MissingDataPolicy,
    pub fragrance_keywords: FragranceRule,
    /// Allergens shown in labels. `None` means the whole catalog.
    pub label_slugs: Option<Vec<String>>,
}

/// Item-level safety decisions for one set of options.
#[derive(Clone, Debug)]
pub struct Classifier {
    options: ClassifyOptions,
    catalog: Catalog,
    label_slugs: Vec<String>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(ClassifyOptions::default())
    }
}

impl Classifier {
    pub fn new(options: ClassifyOptions) -> Self {
        Self::with_catalog(options, Catalog::standard())
    }

    pub fn with_catalog(options: ClassifyOptions, catalog: Catalog) -> Self {
        let label_slugs = label_order(&catalog, options.label_slugs.as_deref());

        Self {
            options,
            catalog,
            label_slugs,
        }
    }

    pub fn options(&self) -> &ClassifyOptions {
        &self.options
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Decide whether an item must be hidden for the given targets and build
    /// its labels.
    pub fn classify(&self, view: &ItemView<'_>, targets: &CanonicalTargets) -> ItemVerdict {
        let hazards = self.hazards(view, targets);

        ItemVerdict {
            is_hazardous: !hazards.is_empty(),
            hazards,
            labels: self.labels(view),
        }
    }

    /// Safety gate alone, without labels.
    pub fn is_hazardous(&self, view: &ItemView<'_>, targets: &CanonicalTargets) -> bool {
        targets
            .slugs()
            .into_iter()
            .any(|slug| self.hazard_for(view, targets, slug).is_some())
    }

    fn hazards(&self, view: &ItemView<'_>, targets: &CanonicalTargets) -> Vec<Hazard> {
        targets
            .slugs()
            .into_iter()
            .filter_map(|slug| {
                self.hazard_for(view, targets, slug).map(|kind| Hazard {
                    slug: slug.to_string(),
                    kind,
                })
            })
            .collect()
    }

    fn hazard_for(
        &self,
        view: &ItemView<'_>,
        targets: &CanonicalTargets,
        slug: &str,
    ) -> Option<HazardKind> {
        let resolution = resolve(view, slug, &self.options.fragrance_keywords);

        let kind = match resolution.presence {
            Presence::Direct if targets.direct.contains(slug) => Some(HazardKind::Direct),
            Presence::Fragrance if targets.fragrance.contains(slug) => Some(HazardKind::Fragrance),
            Presence::Trace if targets.trace.contains(slug) => Some(HazardKind::Trace),
            _ => None,
        };

        kind.or_else(|| {
            let strict = self.options.missing_data == MissingDataPolicy::TreatAsHazardous;
            (strict && !resolution.recorded).then_some(HazardKind::Unverified)
        })
    }

    fn labels(&self, view: &ItemView<'_>) -> Labels {
        let mut labels = Labels::default();

        for slug in &self.label_slugs {
            let presence = resolve(view, slug, &self.options.fragrance_keywords).presence;

            match presence {
                Presence::Trace => labels.contamination.push(self.catalog.display_name(slug)),
                Presence::Fragrance => labels.fragrance.push(self.catalog.display_name(slug)),
                Presence::Direct | Presence::None => {}
            }
        }

        labels
    }
}

/// Canonical label slugs in catalog display order; slugs outside the catalog
/// follow in the order given.
fn label_order(catalog: &Catalog, selected: Option<&[String]>) -> Vec<String> {
    let Some(selected) = selected else {
        return catalog.iter().map(|a| a.slug.to_string()).collect();
    };

    let mut seen = BTreeSet::new();
    let mut slugs: Vec<String> = selected
        .iter()
        .map(|s| canonical_slug(s))
        .filter(|s| !s.is_empty() && seen.insert(s.clone()))
        .collect();

    slugs.sort_by_key(|slug| catalog.position(slug).unwrap_or(usize::MAX));
    slugs
}

/// Classify an item with default options.
pub fn classify_item(view: &ItemView<'_>, targets: &TargetSet) -> ItemVerdict {
    Classifier::default().classify(view, &targets.canonical())
}
