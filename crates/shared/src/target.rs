use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::catalog::canonical_slug;

/// The user's three allergen-avoidance lists.
///
/// The lists are not required to be disjoint: a slug in several lists gets
/// every corresponding hazard check.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetSet {
    #[serde(alias = "avoidDirect")]
    pub avoid_direct: Vec<String>,
    #[serde(alias = "avoidFragrance")]
    pub avoid_fragrance: Vec<String>,
    #[serde(alias = "avoidTrace")]
    pub avoid_trace: Vec<String>,
}

impl TargetSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn avoid_direct<S: AsRef<str>>(mut self, slugs: impl IntoIterator<Item = S>) -> Self {
        self.avoid_direct
            .extend(slugs.into_iter().map(|s| s.as_ref().to_string()));
        self
    }

    pub fn avoid_fragrance<S: AsRef<str>>(mut self, slugs: impl IntoIterator<Item = S>) -> Self {
        self.avoid_fragrance
            .extend(slugs.into_iter().map(|s| s.as_ref().to_string()));
        self
    }

    pub fn avoid_trace<S: AsRef<str>>(mut self, slugs: impl IntoIterator<Item = S>) -> Self {
        self.avoid_trace
            .extend(slugs.into_iter().map(|s| s.as_ref().to_string()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.avoid_direct.is_empty() && self.avoid_fragrance.is_empty() && self.avoid_trace.is_empty()
    }

    /// Canonical form used for comparisons and cache keys: every list
    /// canonicalized, deduplicated and sorted.
    pub fn canonical(&self) -> CanonicalTargets {
        fn canon(slugs: &[String]) -> BTreeSet<String> {
            slugs
                .iter()
                .map(|s| canonical_slug(s))
                .filter(|s| !s.is_empty())
                .collect()
        }

        CanonicalTargets {
            direct: canon(&self.avoid_direct),
            fragrance: canon(&self.avoid_fragrance),
            trace: canon(&self.avoid_trace),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct CanonicalTargets {
    pub direct: BTreeSet<String>,
    pub fragrance: BTreeSet<String>,
    pub trace: BTreeSet<String>,
}

impl CanonicalTargets {
    pub fn is_empty(&self) -> bool {
        self.direct.is_empty() && self.fragrance.is_empty() && self.trace.is_empty()
    }

    /// Every slug that appears in any list, sorted.
    pub fn slugs(&self) -> BTreeSet<&str> {
        self.direct
            .iter()
            .chain(&self.fragrance)
            .chain(&self.trace)
            .map(String::as_str)
            .collect()
    }
}
