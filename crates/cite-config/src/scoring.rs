//! Scoring thresholds and report weights.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

const fn default_min_credibility() -> f64 {
    60.0
}

const fn default_valid_format_threshold() -> f64 {
    60.0
}

const fn default_correspondence_threshold() -> f64 {
    0.70
}

const fn default_search_acceptance_threshold() -> f64 {
    0.80
}

/// Weights of the report's weighted score. They need not sum to 1;
/// the blend is normalized by their sum.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct ScoreWeights {
    pub credibility: f64,
    pub validity: f64,
    pub verifiability: f64,
    pub recency: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            credibility: 0.4,
            validity: 0.3,
            verifiability: 0.2,
            recency: 0.1,
        }
    }
}

impl ScoreWeights {
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.credibility + self.validity + self.verifiability + self.recency
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScoringConfig {
    /// Results below this credibility get a manual-review recommendation.
    #[serde(default = "default_min_credibility")]
    pub min_credibility: f64,

    /// Format score at which a well-formed citation counts as valid
    /// without verifier evidence.
    #[serde(default = "default_valid_format_threshold")]
    pub valid_format_threshold: f64,

    /// Minimum correspondence confidence for a URL to match its citation.
    #[serde(default = "default_correspondence_threshold")]
    pub correspondence_threshold: f64,

    /// Minimum title similarity for accepting a search hit.
    #[serde(default = "default_search_acceptance_threshold")]
    pub search_acceptance_threshold: f64,

    /// Report the weighted score as the overall score.
    #[serde(default)]
    pub use_weighted_score: bool,

    #[serde(default)]
    pub weights: ScoreWeights,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            min_credibility: default_min_credibility(),
            valid_format_threshold: default_valid_format_threshold(),
            correspondence_threshold: default_correspondence_threshold(),
            search_acceptance_threshold: default_search_acceptance_threshold(),
            use_weighted_score: false,
            weights: ScoreWeights::default(),
        }
    }
}

impl ScoringConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        check_range("scoring.min_credibility", self.min_credibility, 0.0, 100.0)?;
        check_range(
            "scoring.valid_format_threshold",
            self.valid_format_threshold,
            0.0,
            100.0,
        )?;
        check_range(
            "scoring.correspondence_threshold",
            self.correspondence_threshold,
            0.0,
            1.0,
        )?;
        check_range(
            "scoring.search_acceptance_threshold",
            self.search_acceptance_threshold,
            0.0,
            1.0,
        )?;

        let w = &self.weights;
        if [w.credibility, w.validity, w.verifiability, w.recency]
            .iter()
            .any(|v| *v < 0.0 || v.is_nan())
        {
            return Err(ConfigError::invalid(
                "scoring.weights",
                "weights must be non-negative",
            ));
        }
        if w.sum() <= 0.0 {
            return Err(ConfigError::invalid(
                "scoring.weights",
                "weights must sum to a positive value",
            ));
        }
        Ok(())
    }
}

fn check_range(field: &str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            field,
            format!("{value} is outside [{min}, {max}]"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = ScoringConfig::default();
        assert!((config.min_credibility - 60.0).abs() < f64::EPSILON);
        assert!((config.correspondence_threshold - 0.70).abs() < f64::EPSILON);
        assert!((config.search_acceptance_threshold - 0.80).abs() < f64::EPSILON);
        assert!(!config.use_weighted_score);
        assert!((config.weights.sum() - 1.0).abs() < 1e-9);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn threshold_outside_unit_interval_rejected() {
        let config = ScoringConfig {
            correspondence_threshold: 1.5,
            ..ScoringConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("correspondence_threshold"));
    }

    #[test]
    fn nan_threshold_rejected() {
        let config = ScoringConfig {
            search_acceptance_threshold: f64::NAN,
            ..ScoringConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_weights_rejected() {
        let config = ScoringConfig {
            weights: ScoreWeights {
                credibility: 0.0,
                validity: 0.0,
                verifiability: 0.0,
                recency: 0.0,
            },
            ..ScoringConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
