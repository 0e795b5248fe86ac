//! Output formatting for CLI commands.

use std::io::Write;

use serde::Serialize;

use crate::cli::args::{OkurimonoArgs, OutputFormat};
use crate::error::Result;
use crate::evaluation::EvaluationReport;
use crate::service::{AnalysisResponse, BatchEntry, BatchResponse, DataSummary, RecommendationResponse};

/// Results that know how to print themselves for people.
pub trait HumanOutput {
    fn write_human<W: Write>(&self, out: &mut W) -> Result<()>;
}

/// Output a result in the specified format.
pub fn output_result<T: Serialize + HumanOutput>(
    message: &str,
    result: &T,
    args: &OkurimonoArgs,
) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_result(&mut out, message, result, args)
}

/// Like [`output_result`], into any writer.
pub fn write_result<W: Write, T: Serialize + HumanOutput>(
    out: &mut W,
    message: &str,
    result: &T,
    args: &OkurimonoArgs,
) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => {
            if args.verbosity() > 0 {
                writeln!(out, "{message}")?;
                writeln!(out)?;
            }
            result.write_human(out)
        }
        OutputFormat::Json => {
            if args.pretty {
                serde_json::to_writer_pretty(&mut *out, result)?;
            } else {
                serde_json::to_writer(&mut *out, result)?;
            }
            writeln!(out)?;
            Ok(())
        }
    }
}

fn write_recommendations<W: Write>(out: &mut W, response: &RecommendationResponse) -> Result<()> {
    writeln!(out, "Article: {}", response.article_id)?;
    writeln!(out, "═══════════════")?;

    if response.recommendations.is_empty() {
        writeln!(
            out,
            "No products reached confidence {:.2}.",
            response.min_confidence
        )?;
    }

    for (rank, product) in response.recommendations.iter().enumerate() {
        writeln!(out)?;
        writeln!(
            out,
            "{}. {} [{}]  score {:.3}  confidence {:.3}  price {}",
            rank + 1,
            product.product_name,
            product.product_id,
            product.match_score,
            product.confidence,
            product.price
        )?;
        for reason in &product.match_reasons {
            writeln!(out, "   - {reason}")?;
        }
    }

    writeln!(out)?;
    writeln!(
        out,
        "Total: {} of limit {} (catalog version {})",
        response.total_recommendations, response.requested_limit, response.catalog_version
    )?;
    Ok(())
}

impl HumanOutput for RecommendationResponse {
    fn write_human<W: Write>(&self, out: &mut W) -> Result<()> {
        write_recommendations(out, self)
    }
}

impl HumanOutput for BatchResponse {
    fn write_human<W: Write>(&self, out: &mut W) -> Result<()> {
        for (article_id, entry) in &self.results {
            match entry {
                BatchEntry::Ok(response) => write_recommendations(out, response)?,
                BatchEntry::Err { error } => {
                    writeln!(out, "Article: {article_id}")?;
                    writeln!(out, "═══════════════")?;
                    writeln!(out, "Error: {error}")?;
                }
            }
            writeln!(out)?;
        }
        writeln!(out, "Articles: {}", self.total_articles)?;
        Ok(())
    }
}

impl HumanOutput for AnalysisResponse {
    fn write_human<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "Match analysis for article {}", self.article_id)?;
        writeln!(out, "══════════════════════════")?;
        writeln!(
            out,
            "{:<16} {:>7} {:>7} {:>7} {:>7} {:>7} {:>7} {:>7} {:>7}",
            "product", "score", "keyword", "persona", "scene", "budget", "season", "popular", "convert"
        )?;
        for row in &self.per_product_factor_breakdown {
            let s = &row.factor_scores;
            writeln!(
                out,
                "{:<16} {:>7.3} {:>7.3} {:>7.3} {:>7.3} {:>7.3} {:>7.3} {:>7.3} {:>7.3}",
                row.product_id,
                row.match_score,
                s.keyword,
                s.persona,
                s.scene,
                s.budget,
                s.seasonal,
                s.popularity,
                s.conversion
            )?;
        }

        let summary = &self.summary;
        writeln!(out)?;
        writeln!(out, "Products: {}", summary.total_products)?;
        writeln!(
            out,
            "Score: mean {:.3}, min {:.3}, max {:.3}, std {:.3}",
            summary.average_score, summary.min_score, summary.max_score, summary.score_std
        )?;
        writeln!(
            out,
            "Confidence: {} high, {} medium, {} low",
            summary.high_confidence_count,
            summary.medium_confidence_count,
            summary.low_confidence_count
        )?;
        Ok(())
    }
}

impl HumanOutput for DataSummary {
    fn write_human<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "Catalog Summary:")?;
        writeln!(out, "════════════════")?;
        writeln!(out, "Articles: {}", self.total_articles)?;
        writeln!(out, "Products: {}", self.total_products)?;
        writeln!(
            out,
            "Version: {} (fingerprint {:08x})",
            self.catalog_version, self.fingerprint
        )?;
        if let Some(prices) = &self.price_range {
            writeln!(
                out,
                "Prices: {} - {} (mean {:.0})",
                prices.min, prices.max, prices.mean
            )?;
        }
        if !self.categories.is_empty() {
            writeln!(out)?;
            writeln!(out, "Categories:")?;
            for (category, count) in &self.categories {
                let name = if category.is_empty() { "(none)" } else { category.as_str() };
                writeln!(out, "  {name}: {count}")?;
            }
        }
        Ok(())
    }
}

impl HumanOutput for EvaluationReport {
    fn write_human<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "Evaluation Results:")?;
        writeln!(out, "═══════════════════")?;
        writeln!(
            out,
            "{:>5} {:>9} {:>9} {:>9} {:>9}",
            "k", "precision", "recall", "f1", "ndcg"
        )?;
        for (k, m) in &self.metrics {
            writeln!(
                out,
                "{:>5} {:>9.3} {:>9.3} {:>9.3} {:>9.3}",
                k, m.precision, m.recall, m.f1, m.ndcg
            )?;
        }
        writeln!(out)?;
        writeln!(out, "Articles evaluated: {}", self.articles_evaluated)?;
        if !self.articles_failed.is_empty() {
            writeln!(out, "Articles failed: {}", self.articles_failed.join(", "))?;
        }
        Ok(())
    }
}
