//! arXiv Atom API client.
//!
//! `query?id_list=<id>` returns an Atom feed. Unknown ids still return a
//! feed, either empty or holding a single entry titled `Error`.

use cite_core::CitationMetadata;
use cite_core::citation::MAX_AUTHORS;
use quick_xml::Reader;
use quick_xml::events::Event;

use crate::http::check_response;
use crate::retry::with_retry;
use crate::{RegistryClient, clean_title, error::RegistryError, leading_year};

#[derive(Default)]
struct AtomEntry {
    title: String,
    published: String,
    authors: Vec<String>,
    id: String,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Published,
    Name,
    Id,
}

impl RegistryClient {
    /// Look up `arxiv_id` on arXiv. Returns `None` when no real entry exists.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] if the request fails, the service returns a
    /// non-success status, or the feed is not well-formed XML.
    pub async fn arxiv_entry(&self, arxiv_id: &str) -> Result<Option<CitationMetadata>, RegistryError> {
        let url = format!(
            "{}/query?id_list={}&max_results=1",
            self.endpoints.arxiv.trim_end_matches('/'),
            urlencoding::encode(arxiv_id)
        );
        let body = with_retry(&self.retry, || async {
            self.limiters.arxiv.acquire().await;
            let resp = check_response(self.http.get(&url).send().await?).await?;
            Ok(resp.text().await?)
        })
        .await?;
        let mut metadata = parse_feed(&body)?;
        if let Some(m) = metadata.as_mut() {
            m.arxiv_id = Some(arxiv_id.to_string());
        }
        Ok(metadata)
    }
}

/// Parse the first `<entry>` of an arXiv Atom feed.
///
/// # Errors
///
/// Returns [`RegistryError::Parse`] if the feed is not well-formed XML.
pub fn parse_feed(body: &str) -> Result<Option<CitationMetadata>, RegistryError> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);

    let mut entry: Option<AtomEntry> = None;
    let mut field: Option<Field> = None;
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"entry" if entry.is_none() => entry = Some(AtomEntry::default()),
                b"title" => field = Some(Field::Title),
                b"published" => field = Some(Field::Published),
                b"name" => field = Some(Field::Name),
                b"id" => field = Some(Field::Id),
                _ => field = None,
            },
            Event::Text(t) => {
                if let (Some(current), Some(f)) = (entry.as_mut(), field) {
                    let text = t.unescape()?;
                    match f {
                        Field::Title => current.title.push_str(&text),
                        Field::Published => current.published.push_str(&text),
                        Field::Name => current.authors.push(text.trim().to_string()),
                        Field::Id => current.id.push_str(&text),
                    }
                }
            }
            Event::End(e) => {
                field = None;
                if e.local_name().as_ref() == b"entry" {
                    break;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let Some(entry) = entry else {
        return Ok(None);
    };
    let title = clean_title(&entry.title);
    if title.is_empty() || title == "Error" {
        return Ok(None);
    }
    Ok(Some(CitationMetadata {
        title: Some(title),
        year: leading_year(&entry.published),
        journal: Some("arXiv".to_string()),
        authors: entry.authors.into_iter().take(MAX_AUTHORS).collect(),
        peer_reviewed: Some(false),
        doi: None,
        pmid: None,
        arxiv_id: None,
        url: (!entry.id.is_empty()).then(|| entry.id.trim().to_string()),
    }))
}
