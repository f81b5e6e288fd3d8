//! Shared test utilities for Citadel integration tests.
//!
//! [`FixtureServer`] is a local `tiny_http` server standing in for
//! registries, search APIs and publisher pages. Point a config at it with
//! `ValidationConfig::offline(server.base())`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
/// A canned response for every request whose path starts with `prefix`.
#[derive(Debug, Clone)]
pub struct Route {
    pub prefix: String,
    pub status: u16,
    pub body: String,
    pub content_type: &'static str,
    pub location: Option<String>,
    /// Status returned to HEAD requests instead of `status`.
    pub head_status: Option<u16>,
}

impl Route {
    pub fn json(prefix: &str, body: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            status: 200,
            body: body.to_string(),
            content_type: "application/json",
            location: None,
            head_status: None,
        }
    }

    pub fn xml(prefix: &str, body: &str) -> Self {
        Self {
            content_type: "application/atom+xml",
            ..Self::json(prefix, body)
        }
    }

    pub fn html(prefix: &str, body: &str) -> Self {
        Self {
            content_type: "text/html",
            ..Self::json(prefix, body)
        }
    }

    pub fn status(prefix: &str, status: u16) -> Self {
        Self {
            status,
            content_type: "text/plain",
            ..Self::json(prefix, "")
        }
    }

    pub fn redirect(prefix: &str, location: &str) -> Self {
        Self {
            location: Some(location.to_string()),
            ..Self::status(prefix, 302)
        }
    }

    #[must_use]
    pub const fn with_head_status(mut self, status: u16) -> Self {
        self.head_status = Some(status);
        self
    }
}

pub struct FixtureServer {
    server: Arc<tiny_http::Server>,
    handle: Option<JoinHandle<()>>,
    base: String,
    hits: Arc<Mutex<Vec<String>>>,
}

impl FixtureServer {
    /// Bind `127.0.0.1:0` and serve `routes` (first matching prefix wins).
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub fn start(routes: Vec<Route>) -> Self {
        let server = Arc::new(tiny_http::Server::http("127.0.0.1:0").expect("bind fixture server"));
        let port = server
            .server_addr()
            .to_ip()
            .map(|a| a.port())
            .expect("fixture server port");
        let hits = Arc::new(Mutex::new(Vec::new()));

        let handle = {
            let server = Arc::clone(&server);
            let hits = Arc::clone(&hits);
            std::thread::spawn(move || {
                for request in server.incoming_requests() {
                    let url = request.url().to_string();
                    let is_head = *request.method() == tiny_http::Method::Head;
                    lock(&hits).push(format!("{} {url}", request.method()));

                    let Some(route) = routes.iter().find(|r| url.starts_with(&r.prefix)) else {
                        let _ = request.respond(tiny_http::Response::from_string("not found").with_status_code(404));
                        continue;
                    };
                    let status = if is_head {
                        route.head_status.unwrap_or(route.status)
                    } else {
                        route.status
                    };
                    let mut response =
                        tiny_http::Response::from_string(route.body.clone()).with_status_code(status);
                    if let Ok(header) = tiny_http::Header::from_bytes("Content-Type", route.content_type) {
                        response = response.with_header(header);
                    }
                    if let Some(header) = route
                        .location
                        .as_deref()
                        .and_then(|location| tiny_http::Header::from_bytes("Location", location).ok())
                    {
                        response = response.with_header(header);
                    }
                    let _ = request.respond(response);
                }
            })
        };

        Self {
            server,
            handle: Some(handle),
            base: format!("http://127.0.0.1:{port}"),
            hits,
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// `"METHOD /path?query"` for every request received so far.
    pub fn hits(&self) -> Vec<String> {
        lock(&self.hits).clone()
    }

    pub fn hit_count(&self, prefix: &str) -> usize {
        self.hits()
            .iter()
            .filter(|h| h.split_once(' ').is_some_and(|(_, url)| url.starts_with(prefix)))
            .count()
    }
}

fn lock(hits: &Mutex<Vec<String>>) -> MutexGuard<'_, Vec<String>> {
    hits.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Drop for FixtureServer {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
