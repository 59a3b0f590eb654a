#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("unknown allergen `{0}`")]
    UnknownAllergen(String),

    #[error("empty allergen slug")]
    EmptySlug,
}
