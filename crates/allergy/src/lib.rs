//! Allergen presence resolution, item safety classification and
//! product eligibility aggregation.
//!
//! Every function here is pure and synchronous: callers re-run them whenever
//! the product list or the target set changes.

pub mod aggregation;
pub mod classifier;
pub mod conflict;
pub mod resolver;
pub mod selector;

pub use aggregation::{
    MenuVerdict, compute_eligible_products, compute_eligible_products_with, is_product_eligible,
    product_verdicts,
};
pub use classifier::{
    ClassifyOptions, Classifier, Hazard, HazardKind, ItemVerdict, Labels, MissingDataPolicy,
    classify_item,
};
pub use conflict::{ItemConflicts, SourceConflict, find_product_conflicts, find_source_conflicts};
pub use resolver::{
    FragranceRule, ItemView, Resolution, SourceKind, resolve, resolve_from, resolve_presence,
};
pub use selector::{EligibleSelector, ProductStore};
