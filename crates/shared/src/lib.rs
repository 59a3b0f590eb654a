pub mod catalog;
mod error;
pub mod lenient;
pub mod presence;
pub mod record;
pub mod target;

pub use catalog::{ALLERGENS, Allergen, Catalog, Tier, canonical_slug};
pub use error::*;
pub use presence::Presence;
pub use record::{AllergySources, LegacyAllergyRecord, MatrixRow, MenuItem, Product, ProductId};
pub use target::{CanonicalTargets, TargetSet};
