pub mod catalog;
pub mod classify;
pub mod conflicts;
pub mod eligible;

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use safemenu_shared::TargetSet;
use strum::Display;

use crate::dataset;
use crate::error::Result;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Display)]
#[strum(serialize_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Allergens to avoid, from flags and/or a JSON file
#[derive(Args, Clone, Debug, Default)]
pub struct TargetArgs {
    /// Allergens to avoid as ingredients (comma separated slugs)
    #[arg(long = "avoid", value_delimiter = ',')]
    pub avoid_direct: Vec<String>,

    /// Allergens to avoid when present as fragrance or flavouring
    #[arg(long, value_delimiter = ',')]
    pub avoid_fragrance: Vec<String>,

    /// Allergens to avoid when there is a cross-contamination risk
    #[arg(long, value_delimiter = ',')]
    pub avoid_trace: Vec<String>,

    /// JSON file with avoidDirect / avoidFragrance / avoidTrace lists
    #[arg(long)]
    pub targets: Option<PathBuf>,
}

impl TargetArgs {
    pub fn resolve(&self) -> Result<TargetSet> {
        let file = self
            .targets
            .as_deref()
            .map(dataset::load_targets)
            .transpose()?;

        dataset::build_targets(
            file,
            &self.avoid_direct,
            &self.avoid_fragrance,
            &self.avoid_trace,
        )
    }
}
