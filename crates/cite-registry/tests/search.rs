//! Title search and page fetches against a local fixture server.

use cite_config::ValidationConfig;
use cite_registry::{RegistryClient, RegistryError};
use cite_testkit::{FixtureServer, Route};
use pretty_assertions::assert_eq;

fn client(server: &FixtureServer) -> RegistryClient {
    RegistryClient::new(&ValidationConfig::offline(server.base())).unwrap()
}

#[tokio::test]
async fn crossref_search_encodes_query() {
    let server = FixtureServer::start(vec![Route::json(
        "/crossref/works?",
        r#"{"message": {"items": [{"DOI": "10.1038/nature14539", "title": ["Deep learning"]}]}}"#,
    )]);

    let hits = client(&server)
        .search_crossref("LeCun Deep learning", 1)
        .await
        .unwrap();

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].doi.as_deref(), Some("10.1038/nature14539"));
    assert!(server.hits()[0].contains("query.bibliographic=LeCun%20Deep%20learning"));
    assert!(server.hits()[0].contains("rows=1"));
}

#[tokio::test]
async fn openalex_and_semantic_scholar_search() {
    let server = FixtureServer::start(vec![
        Route::json(
            "/openalex/works",
            r#"{"results": [{"title": "Deep learning", "doi": "https://doi.org/10.1038/nature14539"}]}"#,
        ),
        Route::json(
            "/s2/paper/search",
            r#"{"data": [{"title": "Deep learning", "url": "https://example.org/p/1"}]}"#,
        ),
    ]);
    let client = client(&server);

    let openalex = client.search_openalex("Deep learning", 5).await.unwrap();
    let s2 = client.search_semantic_scholar("Deep learning", 5).await.unwrap();

    assert_eq!(openalex[0].doi.as_deref(), Some("10.1038/nature14539"));
    assert_eq!(s2[0].url.as_deref(), Some("https://example.org/p/1"));
    assert!(server.hits()[1].contains("fields=title,year,url,externalIds,authors"));
}

#[tokio::test]
async fn search_error_status_is_reported() {
    let server = FixtureServer::start(vec![Route::status("/openalex/", 503)]);

    let err = client(&server)
        .search_openalex("anything", 5)
        .await
        .unwrap_err();

    assert!(matches!(err, RegistryError::Api { status: 503, .. }));
}

#[tokio::test]
async fn rate_limited_response_is_reported() {
    let server = FixtureServer::start(vec![Route::status("/s2/", 429)]);

    let err = client(&server)
        .search_semantic_scholar("anything", 5)
        .await
        .unwrap_err();

    assert!(matches!(err, RegistryError::RateLimited { .. }));
}

#[tokio::test]
async fn fetch_page_reports_final_url() {
    let server = FixtureServer::start(vec![
        Route::redirect("/old", "/new"),
        Route::html("/new", "<html><title>Moved</title></html>"),
    ]);

    let page = client(&server)
        .fetch_page(&format!("{}/old", server.base()))
        .await
        .unwrap();

    assert_eq!(page.status, 200);
    assert!(page.final_url.ends_with("/new"));
    assert!(page.body.contains("Moved"));
}

#[tokio::test]
async fn transient_failures_are_retried_when_configured() {
    let server = FixtureServer::start(vec![Route::status("/crossref/", 503)]);
    let mut config = ValidationConfig::offline(server.base());
    config.network.max_retries = 2;
    config.network.retry_backoff_ms = 1;
    let client = RegistryClient::new(&config).unwrap();

    let result = client.search_crossref("anything", 1).await;

    assert!(result.is_err());
    assert_eq!(server.hit_count("/crossref/"), 3);
}
