//! Command line argument parsing for the okurimono CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

/// okurimono - explainable gift recommendations for content articles
#[derive(Parser, Debug, Clone)]
#[command(name = "okurimono")]
#[command(about = "Rank catalog products for content articles and explain why")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct OkurimonoArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Engine configuration file (TOML)
    #[arg(short, long, value_name = "CONFIG_FILE", env = "OKURIMONO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl OkurimonoArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }

    /// Log filter directive for the effective verbosity.
    pub fn log_filter(&self) -> &'static str {
        match self.verbosity() {
            0 => "error",
            1 => "warn",
            2 => "info",
            _ => "debug",
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Recommend products for one article
    Recommend(RecommendArgs),

    /// Recommend products for several articles at once
    Batch(BatchArgs),

    /// Show the full factor breakdown for one article
    Analyze(AnalyzeArgs),

    /// Summarize a catalog
    Summary(SummaryArgs),

    /// Measure ranking quality against labelled relevance
    Evaluate(EvaluateArgs),
}

/// Arguments for a single recommendation
#[derive(Parser, Debug, Clone)]
pub struct RecommendArgs {
    /// Catalog file (JSON with "articles" and "products")
    #[arg(value_name = "CATALOG_FILE")]
    pub catalog: PathBuf,

    /// Article to recommend for
    #[arg(value_name = "ARTICLE_ID")]
    pub article_id: String,

    /// Maximum number of products to return
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Drop products whose confidence is below this value
    #[arg(short, long)]
    pub min_confidence: Option<f64>,
}

/// Arguments for batch recommendation
#[derive(Parser, Debug, Clone)]
pub struct BatchArgs {
    /// Catalog file (JSON with "articles" and "products")
    #[arg(value_name = "CATALOG_FILE")]
    pub catalog: PathBuf,

    /// Articles to recommend for (default: every article in the catalog)
    #[arg(value_name = "ARTICLE_ID")]
    pub article_ids: Vec<String>,

    /// Maximum number of products per article
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Drop products whose confidence is below this value
    #[arg(short, long)]
    pub min_confidence: Option<f64>,

    /// Worker threads (default: number of CPU cores)
    #[arg(short, long)]
    pub threads: Option<usize>,
}

/// Arguments for match analysis
#[derive(Parser, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Catalog file (JSON with "articles" and "products")
    #[arg(value_name = "CATALOG_FILE")]
    pub catalog: PathBuf,

    /// Article to analyze
    #[arg(value_name = "ARTICLE_ID")]
    pub article_id: String,

    /// Only show the first N products of the breakdown
    #[arg(long)]
    pub top: Option<usize>,
}

/// Arguments for catalog summary
#[derive(Parser, Debug, Clone)]
pub struct SummaryArgs {
    /// Catalog file (JSON with "articles" and "products")
    #[arg(value_name = "CATALOG_FILE")]
    pub catalog: PathBuf,
}

/// Arguments for evaluation
#[derive(Parser, Debug, Clone)]
pub struct EvaluateArgs {
    /// Catalog file (JSON with "articles" and "products")
    #[arg(value_name = "CATALOG_FILE")]
    pub catalog: PathBuf,

    /// Ground truth file (JSON array of {article_id, relevant_products})
    #[arg(value_name = "GROUND_TRUTH_FILE")]
    pub ground_truth: PathBuf,

    /// Cutoffs to evaluate (comma-separated)
    #[arg(short, long, value_delimiter = ',', default_value = "5,10,20")]
    pub k: Vec<usize>,

    /// Confidence threshold applied before ranking
    #[arg(short, long)]
    pub min_confidence: Option<f64>,
}

/// Output format for results
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recommend_args() {
        let args = OkurimonoArgs::try_parse_from([
            "okurimono",
            "recommend",
            "catalog.json",
            "a-1",
            "--limit",
            "5",
            "--min-confidence",
            "0.4",
        ])
        .unwrap();

        if let Command::Recommend(recommend_args) = args.command {
            assert_eq!(recommend_args.catalog, PathBuf::from("catalog.json"));
            assert_eq!(recommend_args.article_id, "a-1");
            assert_eq!(recommend_args.limit, Some(5));
            assert_eq!(recommend_args.min_confidence, Some(0.4));
        } else {
            panic!("Expected Recommend command");
        }
    }

    #[test]
    fn test_batch_args() {
        let args =
            OkurimonoArgs::try_parse_from(["okurimono", "batch", "catalog.json", "a-1", "a-2"])
                .unwrap();

        if let Command::Batch(batch_args) = args.command {
            assert_eq!(batch_args.article_ids, vec!["a-1", "a-2"]);
            assert_eq!(batch_args.limit, None);
        } else {
            panic!("Expected Batch command");
        }
    }

    #[test]
    fn test_evaluate_default_cutoffs() {
        let args =
            OkurimonoArgs::try_parse_from(["okurimono", "evaluate", "catalog.json", "truth.json"])
                .unwrap();

        if let Command::Evaluate(evaluate_args) = args.command {
            assert_eq!(evaluate_args.k, vec![5, 10, 20]);
        } else {
            panic!("Expected Evaluate command");
        }

        let args = OkurimonoArgs::try_parse_from([
            "okurimono",
            "evaluate",
            "catalog.json",
            "truth.json",
            "-k",
            "3,7",
        ])
        .unwrap();
        if let Command::Evaluate(evaluate_args) = args.command {
            assert_eq!(evaluate_args.k, vec![3, 7]);
        }
    }

    #[test]
    fn test_verbosity_levels() {
        let args = OkurimonoArgs::try_parse_from(["okurimono", "summary", "c.json"]).unwrap();
        assert_eq!(args.verbosity(), 1);
        assert_eq!(args.log_filter(), "warn");

        let args = OkurimonoArgs::try_parse_from(["okurimono", "-vv", "summary", "c.json"]).unwrap();
        assert_eq!(args.verbosity(), 2);
        assert_eq!(args.log_filter(), "info");

        let args =
            OkurimonoArgs::try_parse_from(["okurimono", "-vvv", "summary", "c.json"]).unwrap();
        assert_eq!(args.log_filter(), "debug");

        let args =
            OkurimonoArgs::try_parse_from(["okurimono", "--quiet", "summary", "c.json"]).unwrap();
        assert_eq!(args.verbosity(), 0);
        assert_eq!(args.log_filter(), "error");
    }

    #[test]
    fn test_output_format() {
        let args =
            OkurimonoArgs::try_parse_from(["okurimono", "--format", "json", "summary", "c.json"])
                .unwrap();
        assert_eq!(args.output_format, OutputFormat::Json);
    }
}
