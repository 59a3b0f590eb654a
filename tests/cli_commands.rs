//! End-to-end checks of the command handlers against a dataset on disk

use std::fs;
use std::path::PathBuf;

use safemenu::cli::{self, OutputFormat, TargetArgs};
use safemenu::{AppError, Config};
use safemenu_allergy::MissingDataPolicy;
use serde_json::{Value, json};
use temp_dir::TempDir;

fn dataset() -> Value {
    json!({
        "products": [
            {
                "id": 1,
                "name": "Cafe Lumiere",
                "menu_items": [
                    {
                        "id": "m1",
                        "name": "Omelette",
                        "presenceBySlug": { "egg": "direct", "milk": "trace" }
                    },
                    {
                        "id": "m2",
                        "name": "Green salad",
                        "presenceBySlug": { "egg": "none" }
                    }
                ]
            },
            {
                "id": 2,
                "name": "Soba Ichi",
                "menuItems": [
                    {
                        "id": "s1",
                        "name": "Kake soba",
                        "product_allergies_matrix": [
                            { "menu_item_id": "s1", "buckwheat": "d", "soybean": "t" }
                        ]
                    }
                ]
            },
            {
                "id": "3",
                "name": "Bakery Kome",
                "menu_item_allergies": [
                    { "allergy_item_id": "wheat", "presence_type": "direct", "notes": "香料として使用" }
                ]
            },
            null
        ]
    })
}

fn write_dataset(dir: &TempDir) -> anyhow::Result<PathBuf> {
    let path = dir.child("products.json");
    fs::write(&path, serde_json::to_string(&dataset())?)?;
    Ok(path)
}

fn avoid(direct: &[&str], fragrance: &[&str], trace: &[&str]) -> TargetArgs {
    let owned = |slugs: &[&str]| -> Vec<String> { slugs.iter().map(|s| s.to_string()).collect() };

    TargetArgs {
        avoid_direct: owned(direct),
        avoid_fragrance: owned(fragrance),
        avoid_trace: owned(trace),
        targets: None,
    }
}

#[test]
fn test_eligible_without_targets_lists_everything() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let data = write_dataset(&dir)?;

    let output = cli::eligible::run(
        &Config::default(),
        &data,
        &TargetArgs::default(),
        OutputFormat::Text,
    )?;

    assert_eq!(
        output.lines().collect::<Vec<_>>(),
        ["1\tCafe Lumiere", "2\tSoba Ichi", "3\tBakery Kome"]
    );

    Ok(())
}

#[test]
fn test_eligible_keeps_products_with_one_safe_item() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let data = write_dataset(&dir)?;

    let output = cli::eligible::run(
        &Config::default(),
        &data,
        &avoid(&["egg", "buckwheat"], &[], &[]),
        OutputFormat::Json,
    )?;
    let value: Value = serde_json::from_str(&output)?;

    // Salad keeps product 1, soba loses its only item
    assert_eq!(value["total"], 3);
    assert_eq!(value["eligible"], json!(["1", "3"]));

    Ok(())
}

#[test]
fn test_eligible_soy_target_matches_soybean_column() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let data = write_dataset(&dir)?;

    let output = cli::eligible::run(
        &Config::default(),
        &data,
        &avoid(&[], &[], &["soy"]),
        OutputFormat::Json,
    )?;
    let value: Value = serde_json::from_str(&output)?;

    assert_eq!(value["eligible"], json!(["1", "3"]));

    Ok(())
}

#[test]
fn test_eligible_fragrance_note_only_hits_fragrance_bucket() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let data = write_dataset(&dir)?;
    let config = Config::default();

    let direct = cli::eligible::run(&config, &data, &avoid(&["wheat"], &[], &[]), OutputFormat::Json)?;
    let fragrance =
        cli::eligible::run(&config, &data, &avoid(&[], &["wheat"], &[]), OutputFormat::Json)?;

    let direct: Value = serde_json::from_str(&direct)?;
    let fragrance: Value = serde_json::from_str(&fragrance)?;

    assert_eq!(direct["eligible"], json!(["1", "2", "3"]));
    assert_eq!(fragrance["eligible"], json!(["1", "2"]));

    Ok(())
}

#[test]
fn test_eligible_strict_policy_hides_unrecorded_items() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let data = write_dataset(&dir)?;
    let mut config = Config::default();
    config.classification.missing_data = MissingDataPolicy::TreatAsHazardous;

    let output = cli::eligible::run(&config, &data, &avoid(&["peanut"], &[], &[]), OutputFormat::Json)?;
    let value: Value = serde_json::from_str(&output)?;

    // No item records peanut at all
    assert_eq!(value["eligible"], json!([]));

    Ok(())
}

#[test]
fn test_eligible_rejects_unknown_allergen() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let data = write_dataset(&dir)?;

    let result = cli::eligible::run(
        &Config::default(),
        &data,
        &avoid(&["mustard"], &[], &[]),
        OutputFormat::Text,
    );

    assert!(matches!(result, Err(AppError::Catalog(_))));

    Ok(())
}

#[test]
fn test_eligible_reads_targets_file() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let data = write_dataset(&dir)?;
    let targets_path = dir.child("targets.json");
    fs::write(&targets_path, r#"{ "avoidTrace": ["milk"] }"#)?;

    let targets = TargetArgs {
        targets: Some(targets_path),
        ..TargetArgs::default()
    };
    let output = cli::eligible::run(&Config::default(), &data, &targets, OutputFormat::Json)?;
    let value: Value = serde_json::from_str(&output)?;

    // Salad has no milk trace, so product 1 survives
    assert_eq!(value["eligible"], json!(["1", "2", "3"]));
    assert_eq!(value["targets"]["avoid_trace"], json!(["milk"]));

    Ok(())
}

#[test]
fn test_classify_explains_each_item() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let data = write_dataset(&dir)?;

    let output = cli::classify::run(
        &Config::default(),
        &data,
        "1",
        &avoid(&["egg"], &[], &[]),
        OutputFormat::Text,
    )?;

    assert!(output.starts_with("1 eligible"), "{output}");
    assert!(output.contains("Omelette: hazardous [egg:direct]"), "{output}");
    assert!(output.contains("乳コンタミネーション"), "{output}");
    assert!(output.contains("Green salad: ok"), "{output}");

    Ok(())
}

#[test]
fn test_classify_json_for_implicit_item() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let data = write_dataset(&dir)?;

    let output = cli::classify::run(
        &Config::default(),
        &data,
        "3",
        &avoid(&[], &["wheat"], &[]),
        OutputFormat::Json,
    )?;
    let value: Value = serde_json::from_str(&output)?;

    assert_eq!(value["product_id"], "3");
    assert_eq!(value["eligible"], false);
    assert_eq!(value["items"][0]["is_hazardous"], true);
    assert_eq!(value["items"][0]["labels"]["fragrance"], json!(["小麦"]));

    Ok(())
}

#[test]
fn test_classify_unknown_product() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let data = write_dataset(&dir)?;

    let result = cli::classify::run(
        &Config::default(),
        &data,
        "404",
        &TargetArgs::default(),
        OutputFormat::Text,
    );

    assert!(matches!(result, Err(AppError::ProductNotFound(ref id)) if id == "404"));

    Ok(())
}

#[test]
fn test_conflicts_reports_disagreeing_sources() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let data = dir.child("conflicts.json");
    fs::write(
        &data,
        serde_json::to_string(&json!([
            {
                "id": "p1",
                "presenceBySlug": { "egg": "none" },
                "matrixRows": [ { "egg": "direct" } ]
            },
            {
                "id": "p2",
                "presenceBySlug": { "egg": "trace" },
                "matrixRows": [ { "egg": "t" } ]
            },
            {
                "id": "p3",
                "presenceBySlug": { "milk": "none" },
                "matrixRows": [ { "milk": "n", "egg": "d" } ]
            }
        ]))?,
    )?;

    let output = cli::conflicts::run(&Config::default(), &data, OutputFormat::Text)?;
    let lines: Vec<&str> = output.lines().collect();

    assert_eq!(lines.len(), 2, "{output}");
    assert!(lines[0].starts_with("p1\t-\tegg\t"), "{output}");
    assert!(lines[0].ends_with("(using presence_map=none)"), "{output}");
    // The map never mentions egg, so the engine uses none while the matrix says direct
    assert!(lines[1].starts_with("p3\t-\tegg\tmatrix=direct"), "{output}");
    assert!(lines[1].ends_with("(using presence_map silent, none)"), "{output}");

    Ok(())
}

#[test]
fn test_missing_dataset_is_a_read_error() -> anyhow::Result<()> {
    let dir = TempDir::new()?;

    let result = cli::eligible::run(
        &Config::default(),
        &dir.child("nope.json"),
        &TargetArgs::default(),
        OutputFormat::Text,
    );

    assert!(matches!(result, Err(AppError::ReadError { .. })));

    Ok(())
}

#[test]
fn test_catalog_lists_mandatory_tier() -> anyhow::Result<()> {
    let output = cli::catalog::run(Some(safemenu_shared::Tier::Mandatory), OutputFormat::Text)?;

    assert_eq!(output.lines().count(), 8);
    assert!(output.lines().next().is_some_and(|l| l.starts_with("egg")));

    Ok(())
}
