//! Aggregation of per-citation results into a [`ValidationReport`].
//!
//! The report is a pure function of its results plus the scoring config and
//! the current year; nothing is carried between batches.

use std::collections::BTreeMap;
use std::time::Duration;

use cite_config::{ScoreWeights, ScoringConfig};
use cite_core::{
    ReportIssue, Severity, ValidationLevel, ValidationReport, ValidationResult, clamp_score,
};

/// Sources published within this many years count as recent.
pub const RECENT_YEARS: i32 = 5;
/// Sources older than this many years count as outdated.
pub const OUTDATED_YEARS: i32 = 10;
/// Characters of citation text kept in report-level issue buckets.
pub const CITATION_PREFIX_CHARS: usize = 50;
/// Pass rate (percent) below which identifiers are recommended.
pub const LOW_PASS_RATE: f64 = 70.0;

/// Builds reports from results.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    min_credibility: f64,
    use_weighted_score: bool,
    weights: ScoreWeights,
}

impl ScoringEngine {
    #[must_use]
    pub const fn new(config: &ScoringConfig) -> Self {
        Self {
            min_credibility: config.min_credibility,
            use_weighted_score: config.use_weighted_score,
            weights: config.weights,
        }
    }

    #[must_use]
    pub fn aggregate(
        &self,
        results: Vec<ValidationResult>,
        level: ValidationLevel,
        elapsed: Duration,
    ) -> ValidationReport {
        self.aggregate_at(results, level, elapsed, cite_parser::current_year())
    }

    /// [`Self::aggregate`] with an explicit current year.
    #[must_use]
    pub fn aggregate_at(
        &self,
        results: Vec<ValidationResult>,
        level: ValidationLevel,
        elapsed: Duration,
        current_year: i32,
    ) -> ValidationReport {
        let mut report = ValidationReport::empty(level);
        report.elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        if results.is_empty() {
            return report;
        }

        let total = results.len();
        let valid = results.iter().filter(|r| r.is_valid).count();
        report.total = total;
        report.valid = valid;
        report.invalid = total - valid;
        report.pass_rate = percent(valid, total);

        let mean = results.iter().map(|r| r.credibility_score).sum::<f64>() / count(total);
        report.weighted_score = weighted_score_at(&results, &self.weights, current_year);
        report.overall_score = if self.use_weighted_score {
            report.weighted_score
        } else {
            clamp_score(mean)
        };

        report.peer_reviewed_count = results
            .iter()
            .filter(|r| r.metadata.peer_reviewed == Some(true))
            .count();
        report.recent_count = results
            .iter()
            .filter(|r| r.metadata.year.is_some_and(|y| is_recent(y, current_year)))
            .count();

        let mut source_types = BTreeMap::new();
        for result in &results {
            *source_types.entry(result.source_type).or_insert(0) += 1;
        }
        report.source_types = source_types;

        let hits = results.iter().filter(|r| r.provenance.cache_hit).count();
        report.cache_hit_rate = count(hits) / count(total);

        for result in &results {
            for issue in &result.issues {
                let bucket = match issue.severity {
                    Severity::Critical => &mut report.critical_issues,
                    Severity::High => &mut report.high_issues,
                    _ => continue,
                };
                bucket.push(ReportIssue {
                    citation_id: result.id.clone(),
                    citation_prefix: result.citation.chars().take(CITATION_PREFIX_CHARS).collect(),
                    severity: issue.severity,
                    message: issue.message.clone(),
                    fix: issue.fix.clone(),
                });
            }
            for warning in &result.warnings {
                if !report.warnings.contains(warning) {
                    report.warnings.push(warning.clone());
                }
            }
        }

        report.recommendations = recommendations(&results, self.min_credibility, current_year);
        report.results = results;
        report
    }
}

/// Batch-level advice in a fixed order, at most one message per rule.
#[must_use]
pub fn recommendations(
    results: &[ValidationResult],
    min_credibility: f64,
    current_year: i32,
) -> Vec<String> {
    let mut out = Vec::new();
    if results.is_empty() {
        return out;
    }

    let valid = results.iter().filter(|r| r.is_valid).count();
    let pass_rate = percent(valid, results.len());
    if pass_rate < LOW_PASS_RATE {
        out.push(format!(
            "Only {pass_rate:.0}% of citations validated; add DOIs or PubMed IDs so sources can be verified"
        ));
    }

    let low = results
        .iter()
        .filter(|r| r.credibility_score < min_credibility)
        .count();
    if low > 0 {
        out.push(format!(
            "{low} citation(s) scored below {min_credibility:.0}; review them manually"
        ));
    }

    let unverifiable = results
        .iter()
        .filter(|r| r.metadata.lacks_identifiers())
        .count();
    if unverifiable > 0 {
        out.push(format!(
            "{unverifiable} citation(s) have no DOI, PMID, arXiv id or URL and cannot be verified"
        ));
    }

    let broken = results
        .iter()
        .filter(|r| r.checks.url_accessible == Some(false))
        .count();
    if broken > 0 {
        out.push(format!(
            "{broken} citation(s) link to inaccessible URLs; check for broken or paywalled links"
        ));
    }

    if !results.iter().any(|r| r.metadata.peer_reviewed == Some(true)) {
        out.push("No peer-reviewed sources found; add peer-reviewed research".to_string());
    }

    let years: Vec<i32> = results.iter().filter_map(|r| r.metadata.year).collect();
    let outdated = years
        .iter()
        .filter(|&&y| y < current_year - OUTDATED_YEARS)
        .count();
    if outdated * 2 > years.len() {
        out.push(format!(
            "Most dated sources are more than {OUTDATED_YEARS} years old; supplement with recent research"
        ));
    }

    out
}

/// Weighted blend of credibility, validity, verifiability and recency in
/// `[0, 100]`, averaged over `results`.
#[must_use]
pub fn weighted_score(results: &[ValidationResult], weights: &ScoreWeights) -> f64 {
    weighted_score_at(results, weights, cite_parser::current_year())
}

fn weighted_score_at(results: &[ValidationResult], weights: &ScoreWeights, current_year: i32) -> f64 {
    let sum = weights.sum();
    if results.is_empty() || sum <= 0.0 {
        return 0.0;
    }
    let total: f64 = results
        .iter()
        .map(|r| {
            let credibility = clamp_score(r.credibility_score) / 100.0;
            let validity = if r.is_valid { 1.0 } else { 0.0 };
            weights.credibility * credibility
                + weights.validity * validity
                + weights.verifiability * verifiability(r)
                + weights.recency * recency(r.metadata.year, current_year)
        })
        .sum();
    clamp_score(100.0 * total / sum / count(results.len()))
}

fn verifiability(result: &ValidationResult) -> f64 {
    if result.checks.registry_verified() || result.checks.url_accessible == Some(true) {
        1.0
    } else if result.metadata.lacks_identifiers() {
        0.0
    } else {
        0.5
    }
}

fn recency(year: Option<i32>, current_year: i32) -> f64 {
    match year {
        Some(y) if is_recent(y, current_year) => 1.0,
        Some(y) if y >= current_year - OUTDATED_YEARS => 0.5,
        _ => 0.0,
    }
}

const fn is_recent(year: i32, current_year: i32) -> bool {
    year >= current_year - RECENT_YEARS
}

#[allow(clippy::cast_precision_loss)]
fn count(n: usize) -> f64 {
    n as f64
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * count(part) / count(total)
    }
}
