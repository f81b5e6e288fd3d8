//! Base URLs of the external APIs.
//!
//! Every base is configurable so mirrors and local fixture servers can stand
//! in for the real services.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EndpointsConfig {
    /// NCBI E-utilities root (`esummary.fcgi` lives below it).
    #[serde(default = "default_pubmed_eutils")]
    pub pubmed_eutils: String,

    /// Human-facing PubMed article pages.
    #[serde(default = "default_pubmed_web")]
    pub pubmed_web: String,

    #[serde(default = "default_doi_resolver")]
    pub doi_resolver: String,

    #[serde(default = "default_crossref")]
    pub crossref: String,

    #[serde(default = "default_arxiv")]
    pub arxiv: String,

    #[serde(default = "default_openalex")]
    pub openalex: String,

    #[serde(default = "default_semantic_scholar")]
    pub semantic_scholar: String,
}

fn default_pubmed_eutils() -> String {
    "https://eutils.ncbi.nlm.nih.gov/entrez/eutils".to_string()
}

fn default_pubmed_web() -> String {
    "https://pubmed.ncbi.nlm.nih.gov".to_string()
}

fn default_doi_resolver() -> String {
    "https://doi.org".to_string()
}

fn default_crossref() -> String {
    "https://api.crossref.org".to_string()
}

fn default_arxiv() -> String {
    "https://export.arxiv.org/api".to_string()
}

fn default_openalex() -> String {
    "https://api.openalex.org".to_string()
}

fn default_semantic_scholar() -> String {
    "https://api.semanticscholar.org/graph/v1".to_string()
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            pubmed_eutils: default_pubmed_eutils(),
            pubmed_web: default_pubmed_web(),
            doi_resolver: default_doi_resolver(),
            crossref: default_crossref(),
            arxiv: default_arxiv(),
            openalex: default_openalex(),
            semantic_scholar: default_semantic_scholar(),
        }
    }
}

impl EndpointsConfig {
    /// Point every endpoint at `base`, each under its own path segment.
    ///
    /// `http://127.0.0.1:4000` yields `http://127.0.0.1:4000/pubmed`,
    /// `http://127.0.0.1:4000/doi`, and so on.
    #[must_use]
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            pubmed_eutils: format!("{base}/eutils"),
            pubmed_web: format!("{base}/pubmed"),
            doi_resolver: format!("{base}/doi"),
            crossref: format!("{base}/crossref"),
            arxiv: format!("{base}/arxiv"),
            openalex: format!("{base}/openalex"),
            semantic_scholar: format!("{base}/s2"),
        }
    }

    fn all(&self) -> [(&'static str, &str); 7] {
        [
            ("endpoints.pubmed_eutils", &self.pubmed_eutils),
            ("endpoints.pubmed_web", &self.pubmed_web),
            ("endpoints.doi_resolver", &self.doi_resolver),
            ("endpoints.crossref", &self.crossref),
            ("endpoints.arxiv", &self.arxiv),
            ("endpoints.openalex", &self.openalex),
            ("endpoints.semantic_scholar", &self.semantic_scholar),
        ]
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in self.all() {
            if !(value.starts_with("http://") || value.starts_with("https://")) {
                return Err(ConfigError::invalid(
                    field,
                    format!("'{value}' is not an http(s) URL"),
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
    fn defaults_point_at_public_apis() {
        let config = EndpointsConfig::default();
        assert_eq!(config.doi_resolver, "https://doi.org");
        assert!(config.pubmed_eutils.contains("ncbi.nlm.nih.gov"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn with_base_trims_trailing_slash() {
        let config = EndpointsConfig::with_base("http://127.0.0.1:4000/");
        assert_eq!(config.doi_resolver, "http://127.0.0.1:4000/doi");
        assert_eq!(config.semantic_scholar, "http://127.0.0.1:4000/s2");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn non_http_endpoint_rejected() {
        let config = EndpointsConfig {
            arxiv: "ftp://arxiv.org".into(),
            ..EndpointsConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
