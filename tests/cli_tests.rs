//! Catalog files and CLI commands against on-disk fixtures.

use std::fs;
use std::path::Path;

use clap::Parser;
use okurimono::cli::{OkurimonoArgs, execute_command, write_result};
use okurimono::error::Result;
use okurimono::recommend::{RecommendationConfig, RecommendationEngine};
use okurimono::service::{Catalog, RecommendationService};
use tempfile::TempDir;

const CATALOG: &str = r#"{
    "articles": [
        {
            "id": "a1",
            "title": "Leather gifts for him",
            "content": "A wallet lasts for years.",
            "target_keywords": ["leather", "wallet"],
            "persona": ["30s male"],
            "scene": ["birthday"],
            "budget_range": [3000, 15000]
        },
        {
            "id": "a2",
            "title": "Coffee at home",
            "target_keywords": ["coffee"],
            "budget_range": 3000
        },
        "not an article"
    ],
    "products": [
        {
            "id": "p1",
            "name": "Leather wallet",
            "price": 8000,
            "category": "fashion",
            "tags": ["leather", "wallet"],
            "target_audience": ["30s male"],
            "scene_suitability": ["birthday"],
            "popularity_score": 80,
            "conversion_rate": 6
        },
        {
            "id": "p2",
            "name": "Coffee grinder",
            "price": 4200,
            "category": "kitchen",
            "tags": ["coffee"]
        },
        {"id": "p3", "name": "Broken", "price": "free"}
    ]
}"#;

fn write_fixture(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("catalog.json");
    fs::write(&path, CATALOG).unwrap();
    path
}

#[test]
fn test_catalog_file_skips_bad_entries() -> Result<()> {
    let dir = TempDir::new()?;
    let catalog = Catalog::from_file(write_fixture(dir.path()))?;

    assert_eq!(catalog.articles.len(), 2);
    assert_eq!(catalog.products.len(), 2);
    assert!(catalog.product("p3").is_none());

    let budget = catalog.article("a2").unwrap().budget()?.unwrap();
    assert_eq!((budget.min, budget.max), (1500.0, 4500.0));

    Ok(())
}

#[test]
fn test_fingerprint_tracks_content() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_fixture(dir.path());
    let first = Catalog::from_file(&path)?;
    let second = Catalog::from_file(&path)?;
    assert_eq!(first.fingerprint()?, second.fingerprint()?);

    let mut changed = second;
    changed.products[0].price = 9000.0;
    assert_ne!(first.fingerprint()?, changed.fingerprint()?);

    Ok(())
}

#[test]
fn test_json_output_for_recommendation() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_fixture(dir.path());
    let service = RecommendationService::new(
        RecommendationEngine::new(RecommendationConfig::default())?,
        Catalog::from_file(&path)?,
    )?;
    let response = service.recommend("a1", Some(5), Some(0.0))?;

    let args = OkurimonoArgs::try_parse_from([
        "okurimono",
        "--format",
        "json",
        "recommend",
        path.to_str().unwrap(),
        "a1",
    ])
    .unwrap();
    let mut buffer = Vec::new();
    write_result(&mut buffer, "Recommendations", &response, &args)?;

    let json: serde_json::Value = serde_json::from_slice(&buffer)?;
    assert_eq!(json["article_id"], "a1");
    assert_eq!(json["recommendations"][0]["product_id"], "p1");
    assert!(json["recommendations"][0]["match_reasons"].is_array());

    Ok(())
}

#[test]
fn test_commands_run_against_files() -> Result<()> {
    let dir = TempDir::new()?;
    let catalog = write_fixture(dir.path());
    let catalog = catalog.to_str().unwrap();

    let config = dir.path().join("engine.toml");
    fs::write(
        &config,
        "default_limit = 3\ndefault_min_confidence = 0.1\n\n[calibration]\nkind = \"linear\"\nfactor = 1.1\n",
    )?;
    let truth = dir.path().join("truth.json");
    fs::write(
        &truth,
        r#"[{"article_id": "a1", "relevant_products": ["p1"]}]"#,
    )?;

    let runs: Vec<Vec<&str>> = vec![
        vec!["recommend", catalog, "a1"],
        vec!["batch", catalog, "--threads", "2"],
        vec!["analyze", catalog, "a2", "--top", "1"],
        vec!["summary", catalog],
        vec!["evaluate", catalog, truth.to_str().unwrap(), "-k", "1,5"],
    ];
    for run in runs {
        let mut argv = vec!["okurimono", "-q", "--config", config.to_str().unwrap()];
        argv.extend(run);
        let args = OkurimonoArgs::try_parse_from(argv).unwrap();
        execute_command(args)?;
    }

    Ok(())
}

#[test]
fn test_unknown_article_fails_command() {
    let dir = TempDir::new().unwrap();
    let catalog = write_fixture(dir.path());
    let args = OkurimonoArgs::try_parse_from([
        "okurimono",
        "recommend",
        catalog.to_str().unwrap(),
        "missing",
    ])
    .unwrap();

    assert!(execute_command(args).is_err());
}

#[test]
fn test_bad_config_fails_command() {
    let dir = TempDir::new().unwrap();
    let catalog = write_fixture(dir.path());
    let config = dir.path().join("engine.toml");
    fs::write(&config, "[weights]\nkeyword = 0.9\n").unwrap();

    let args = OkurimonoArgs::try_parse_from([
        "okurimono",
        "--config",
        config.to_str().unwrap(),
        "summary",
        catalog.to_str().unwrap(),
    ])
    .unwrap();

    assert!(execute_command(args).is_err());
}
