//! Per-source toggles and verification priority.

use std::collections::HashSet;

use cite_core::SourceKind;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

const fn enabled() -> bool {
    true
}

fn default_priority() -> Vec<SourceKind> {
    SourceKind::DEFAULT_PRIORITY.to_vec()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct SourcesConfig {
    #[serde(default = "enabled")]
    pub pubmed: bool,

    #[serde(default = "enabled")]
    pub doi: bool,

    #[serde(default = "enabled")]
    pub arxiv: bool,

    #[serde(default = "enabled")]
    pub url: bool,

    /// URL-to-citation correspondence checks at the thorough level.
    #[serde(default = "enabled")]
    pub correspondence: bool,

    /// Bibliographic title searches used to recover a correct URL.
    #[serde(default = "enabled")]
    pub title_search: bool,

    /// Order in which verifiers are tried; the first success wins.
    #[serde(default = "default_priority")]
    pub priority: Vec<SourceKind>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            pubmed: true,
            doi: true,
            arxiv: true,
            url: true,
            correspondence: true,
            title_search: true,
            priority: default_priority(),
        }
    }
}

impl SourcesConfig {
    #[must_use]
    pub const fn is_enabled(&self, kind: SourceKind) -> bool {
        match kind {
            SourceKind::Pubmed => self.pubmed,
            SourceKind::Doi => self.doi,
            SourceKind::Arxiv => self.arxiv,
            SourceKind::Url => self.url,
        }
    }

    /// Enabled sources in priority order.
    pub fn enabled_in_order(&self) -> impl Iterator<Item = SourceKind> + '_ {
        self.priority.iter().copied().filter(|k| self.is_enabled(*k))
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.priority.is_empty() {
            return Err(ConfigError::invalid(
                "sources.priority",
                "must list at least one source",
            ));
        }
        let mut seen = HashSet::new();
        for kind in &self.priority {
            if !seen.insert(*kind) {
                return Err(ConfigError::invalid(
                    "sources.priority",
                    format!("'{kind}' is listed more than once"),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_enable_everything_in_default_order() {
        let config = SourcesConfig::default();
        assert!(config.pubmed && config.doi && config.arxiv && config.url);
        assert_eq!(
            config.enabled_in_order().collect::<Vec<_>>(),
            SourceKind::DEFAULT_PRIORITY.to_vec()
        );
    }

    #[test]
    fn disabled_sources_are_skipped() {
        let config = SourcesConfig {
            doi: false,
            ..SourcesConfig::default()
        };
        let order: Vec<_> = config.enabled_in_order().collect();
        assert_eq!(
            order,
            vec![SourceKind::Pubmed, SourceKind::Arxiv, SourceKind::Url]
        );
    }

    #[test]
    fn duplicate_priority_rejected() {
        let config = SourcesConfig {
            priority: vec![SourceKind::Doi, SourceKind::Doi],
            ..SourcesConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn empty_priority_rejected() {
        let config = SourcesConfig {
            priority: Vec::new(),
            ..SourcesConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
