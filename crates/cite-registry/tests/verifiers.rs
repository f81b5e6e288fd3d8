//! Verifier chain against a local fixture server.

use cite_config::{SourcesConfig, ValidationConfig};
use cite_core::{ParsedCitation, SourceKind, SourceType};
use cite_registry::{RegistryClient, SourceVerifier, Verifier, VerifierChain};
use cite_testkit::{FixtureServer, Route};
use pretty_assertions::assert_eq;

const ESUMMARY: &str = r#"{
    "result": {
        "uids": ["33301246"],
        "33301246": {
            "uid": "33301246",
            "pubdate": "2020 Dec 31",
            "source": "N Engl J Med",
            "fulljournalname": "The New England journal of medicine",
            "title": "Safety and Efficacy of the BNT162b2 mRNA Covid-19 Vaccine.",
            "authors": [{"name": "Polack FP"}, {"name": "Thomas SJ"}],
            "articleids": [{"idtype": "doi", "value": "10.1056/NEJMoa2034577"}]
        }
    }
}"#;

const CROSSREF_WORK: &str = r#"{
    "message": {
        "DOI": "10.1038/nature14539",
        "type": "journal-article",
        "title": ["Deep learning"],
        "container-title": ["Nature"],
        "issued": {"date-parts": [[2015, 5, 27]]},
        "author": [{"given": "Yann", "family": "LeCun"}]
    }
}"#;

const ARXIV_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <entry>
    <id>http://arxiv.org/abs/1706.03762v7</id>
    <published>2017-06-12T17:57:34Z</published>
    <title>Attention Is All You Need</title>
    <author><name>Ashish Vaswani</name></author>
  </entry>
</feed>"#;

fn client(server: &FixtureServer) -> RegistryClient {
    RegistryClient::new(&ValidationConfig::offline(server.base())).unwrap()
}

#[tokio::test]
async fn pubmed_verifier_confirms_pmid() {
    let server = FixtureServer::start(vec![Route::json("/eutils/esummary.fcgi", ESUMMARY)]);
    let parsed = ParsedCitation {
        pmid: Some("33301246".into()),
        ..ParsedCitation::default()
    };

    let outcome = Verifier::for_kind(SourceKind::Pubmed, client(&server))
        .verify(&parsed)
        .await;

    assert!(outcome.verified);
    assert_eq!(outcome.source_type, Some(SourceType::JournalArticle));
    assert_eq!(outcome.metadata.peer_reviewed, Some(true));
    assert_eq!(outcome.metadata.year, Some(2020));
    assert!((outcome.contribution - 70.0).abs() < f64::EPSILON);
    assert_eq!(
        outcome.metadata.url.as_deref(),
        Some(format!("{}/pubmed/33301246/", server.base()).as_str())
    );
    assert!(server.hits()[0].contains("id=33301246"));
}

#[tokio::test]
async fn doi_verifier_follows_redirects_and_reads_crossref() {
    let server = FixtureServer::start(vec![
        Route::redirect("/doi/10.1038/nature14539", "/landing/nature14539"),
        Route::html("/landing/", "<html><title>Deep learning</title></html>"),
        Route::json("/crossref/works/", CROSSREF_WORK),
    ]);
    let parsed = ParsedCitation {
        doi: Some("10.1038/nature14539".into()),
        ..ParsedCitation::default()
    };

    let outcome = Verifier::for_kind(SourceKind::Doi, client(&server))
        .verify(&parsed)
        .await;

    assert!(outcome.verified, "{:?}", outcome.error);
    assert_eq!(outcome.metadata.title.as_deref(), Some("Deep learning"));
    assert_eq!(outcome.metadata.journal.as_deref(), Some("Nature"));
    assert_eq!(outcome.source_type, Some(SourceType::JournalArticle));
    assert!((outcome.confidence - 0.90).abs() < f64::EPSILON);
}

#[tokio::test]
async fn doi_verifier_survives_missing_crossref_record() {
    let server = FixtureServer::start(vec![
        Route::status("/doi/", 200),
        Route::status("/crossref/works/", 404),
    ]);
    let parsed = ParsedCitation {
        doi: Some("10.5555/unknown".into()),
        ..ParsedCitation::default()
    };

    let outcome = Verifier::for_kind(SourceKind::Doi, client(&server))
        .verify(&parsed)
        .await;

    assert!(outcome.verified);
    assert_eq!(outcome.metadata.title, None);
    assert_eq!(outcome.metadata.doi.as_deref(), Some("10.5555/unknown"));
    assert_eq!(outcome.source_type, None);
}

#[tokio::test]
async fn unresolvable_doi_is_not_verified() {
    let server = FixtureServer::start(vec![Route::status("/doi/", 404)]);
    let parsed = ParsedCitation {
        doi: Some("10.9999/fake.2024".into()),
        ..ParsedCitation::default()
    };

    let outcome = Verifier::for_kind(SourceKind::Doi, client(&server))
        .verify(&parsed)
        .await;

    assert!(!outcome.verified);
    assert!(outcome.error.unwrap().contains("404"));
}

#[tokio::test]
async fn arxiv_verifier_marks_preprint() {
    let server = FixtureServer::start(vec![Route::xml("/arxiv/query", ARXIV_FEED)]);
    let parsed = ParsedCitation {
        arxiv_id: Some("1706.03762".into()),
        ..ParsedCitation::default()
    };

    let outcome = Verifier::for_kind(SourceKind::Arxiv, client(&server))
        .verify(&parsed)
        .await;

    assert!(outcome.verified);
    assert_eq!(outcome.source_type, Some(SourceType::Preprint));
    assert_eq!(outcome.metadata.peer_reviewed, Some(false));
    assert_eq!(outcome.metadata.arxiv_id.as_deref(), Some("1706.03762"));
}

#[tokio::test]
async fn url_verifier_falls_back_to_get_when_head_rejected() {
    let server = FixtureServer::start(vec![
        Route::html("/article", "<html></html>").with_head_status(405),
    ]);
    let parsed = ParsedCitation {
        url: Some(format!("{}/article", server.base())),
        ..ParsedCitation::default()
    };

    let outcome = Verifier::for_kind(SourceKind::Url, client(&server))
        .verify(&parsed)
        .await;

    assert!(outcome.verified);
    // 127.0.0.1 is not on the reliable-domain list.
    assert!((outcome.contribution - 50.0).abs() < f64::EPSILON);
    let hits = server.hits();
    assert_eq!(hits.len(), 2);
    assert!(hits[0].starts_with("HEAD"));
    assert!(hits[1].starts_with("GET"));
}

#[tokio::test]
async fn chain_stops_at_first_success() {
    let server = FixtureServer::start(vec![
        Route::json("/eutils/esummary.fcgi", ESUMMARY),
        Route::status("/doi/", 200),
        Route::status("/page", 200),
    ]);
    let parsed = ParsedCitation {
        pmid: Some("33301246".into()),
        doi: Some("10.1056/NEJMoa2034577".into()),
        url: Some(format!("{}/page", server.base())),
        ..ParsedCitation::default()
    };

    let chain = VerifierChain::new(&client(&server), &SourcesConfig::default());
    let result = chain.verify(&parsed).await;

    assert!(result.verified());
    assert_eq!(result.attempted, vec![SourceKind::Pubmed]);
    assert_eq!(server.hit_count("/doi/"), 0);
    assert_eq!(server.hit_count("/page"), 0);
}

#[tokio::test]
async fn chain_falls_through_failures() {
    let server = FixtureServer::start(vec![
        Route::status("/eutils/", 500),
        Route::status("/doi/", 404),
        Route::status("/page", 200),
    ]);
    let parsed = ParsedCitation {
        pmid: Some("12345678".into()),
        doi: Some("10.9999/missing".into()),
        url: Some(format!("{}/page", server.base())),
        ..ParsedCitation::default()
    };

    let chain = VerifierChain::new(&client(&server), &SourcesConfig::default());
    let result = chain.verify(&parsed).await;

    assert_eq!(
        result.attempted,
        vec![SourceKind::Pubmed, SourceKind::Doi, SourceKind::Url]
    );
    assert_eq!(result.failures.len(), 2);
    let checks = result.checks();
    assert_eq!(checks.pubmed_verified, Some(false));
    assert_eq!(checks.doi_valid, Some(false));
    assert_eq!(checks.url_accessible, Some(true));
}

#[tokio::test]
async fn disabled_source_is_skipped() {
    let server = FixtureServer::start(vec![Route::json("/eutils/esummary.fcgi", ESUMMARY)]);
    let parsed = ParsedCitation {
        pmid: Some("33301246".into()),
        ..ParsedCitation::default()
    };
    let sources = SourcesConfig {
        pubmed: false,
        ..SourcesConfig::default()
    };

    let result = VerifierChain::new(&client(&server), &sources).verify(&parsed).await;

    assert!(!result.verified());
    assert!(result.attempted.is_empty());
    assert!(server.hits().is_empty());
}
