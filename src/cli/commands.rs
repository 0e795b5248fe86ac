//! Command implementations for the okurimono CLI.

use std::path::Path;

use tracing::debug;

use crate::cli::args::*;
use crate::cli::output::*;
use crate::error::Result;
use crate::evaluation::{GroundTruth, evaluate};
use crate::recommend::{RecommendationConfig, RecommendationEngine};
use crate::service::{Catalog, RecommendationService};

/// Execute a CLI command.
pub fn execute_command(args: OkurimonoArgs) -> Result<()> {
    match &args.command {
        Command::Recommend(recommend_args) => recommend(recommend_args, &args),
        Command::Batch(batch_args) => batch(batch_args, &args),
        Command::Analyze(analyze_args) => analyze(analyze_args, &args),
        Command::Summary(summary_args) => summary(summary_args, &args),
        Command::Evaluate(evaluate_args) => run_evaluation(evaluate_args, &args),
    }
}

/// Load the engine configuration named on the command line, or the defaults.
pub fn load_config(cli_args: &OkurimonoArgs) -> Result<RecommendationConfig> {
    match &cli_args.config {
        Some(path) => {
            debug!(path = %path.display(), "loading configuration");
            RecommendationConfig::from_file(path)
        }
        None => Ok(RecommendationConfig::default()),
    }
}

/// Build a service over the catalog file.
pub fn open_service(config: RecommendationConfig, catalog_path: &Path) -> Result<RecommendationService> {
    let engine = RecommendationEngine::new(config)?;
    let catalog = Catalog::from_file(catalog_path)?;
    RecommendationService::new(engine, catalog)
}

fn recommend(args: &RecommendArgs, cli_args: &OkurimonoArgs) -> Result<()> {
    let service = open_service(load_config(cli_args)?, &args.catalog)?;
    let response = service.recommend(&args.article_id, args.limit, args.min_confidence)?;
    output_result("Recommendations", &response, cli_args)
}

fn batch(args: &BatchArgs, cli_args: &OkurimonoArgs) -> Result<()> {
    let mut config = load_config(cli_args)?;
    if args.threads.is_some() {
        config.num_threads = args.threads;
    }
    let service = open_service(config, &args.catalog)?;

    let article_ids: Vec<String> = if args.article_ids.is_empty() {
        service
            .snapshot()
            .catalog()
            .articles
            .iter()
            .map(|a| a.id.clone())
            .collect()
    } else {
        args.article_ids.clone()
    };

    let response = service.recommend_batch(article_ids.as_slice(), args.limit, args.min_confidence)?;
    output_result("Batch recommendations", &response, cli_args)
}

fn analyze(args: &AnalyzeArgs, cli_args: &OkurimonoArgs) -> Result<()> {
    let service = open_service(load_config(cli_args)?, &args.catalog)?;
    let mut response = service.analyze_match_quality(&args.article_id)?;
    if let Some(top) = args.top {
        response.per_product_factor_breakdown.truncate(top);
    }
    output_result("Match analysis", &response, cli_args)
}

fn summary(args: &SummaryArgs, cli_args: &OkurimonoArgs) -> Result<()> {
    let service = open_service(load_config(cli_args)?, &args.catalog)?;
    output_result("Catalog summary", &service.data_summary(), cli_args)
}

fn run_evaluation(args: &EvaluateArgs, cli_args: &OkurimonoArgs) -> Result<()> {
    let config = load_config(cli_args)?;
    let min_confidence = args.min_confidence.unwrap_or(config.default_min_confidence);
    let service = open_service(config, &args.catalog)?;
    let ground_truth = GroundTruth::load(&args.ground_truth)?;

    let report = evaluate(&service, &ground_truth, &args.k, min_confidence)?;
    output_result("Evaluation", &report, cli_args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_load_config_defaults_without_file() {
        let mut args = OkurimonoArgs::try_parse_from(["okurimono", "summary", "c.json"]).unwrap();
        // OKURIMONO_CONFIG may be set in the environment
        args.config = None;
        assert_eq!(load_config(&args).unwrap(), RecommendationConfig::default());
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.toml");
        std::fs::write(&path, "default_limit = 3\n").unwrap();
        let args = OkurimonoArgs::try_parse_from([
            "okurimono",
            "--config",
            path.to_str().unwrap(),
            "summary",
            "c.json",
        ])
        .unwrap();
        assert_eq!(load_config(&args).unwrap().default_limit, 3);
    }

    #[test]
    fn test_missing_catalog_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = open_service(RecommendationConfig::default(), &dir.path().join("none.json"));
        assert!(result.is_err());
    }
}
