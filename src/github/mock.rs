//! In-memory [`PageTransport`] for tests.
//!
//! Answers each request through a closure keyed by the requested page and records
//! every query it receives, so tests can assert on request order.

use crate::error::FetchCause;
use crate::github::transport::{PageResponse, PageTransport};
use std::sync::Mutex;

type Responder = dyn Fn(u32) -> Result<PageResponse, FetchCause> + Send + Sync;

/// A request as seen by the mock
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub url: String,
    pub token: String,
    pub query: Vec<(String, String)>,
}

impl RecordedRequest {
    /// The `page` query parameter, if it was sent
    pub fn page(&self) -> Option<u32> {
        self.query
            .iter()
            .find(|(key, _)| key == "page")
            .and_then(|(_, value)| value.parse().ok())
    }
}

pub struct MockTransport {
    responder: Box<Responder>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockTransport {
    /// Builds a mock answering with `responder(page)`; a request without a
    /// `page` parameter is treated as page 1
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(u32) -> Result<PageResponse, FetchCause> + Send + Sync + 'static,
    {
        MockTransport {
            responder: Box::new(responder),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every page returns the same body; page 1 also carries `link`
    pub fn uniform(link: Option<&str>, body: serde_json::Value) -> Self {
        let link = link.map(str::to_string);
        MockTransport::new(move |page| {
            let link = if page == 1 { link.clone() } else { None };
            Ok(json_page(200, link, &body))
        })
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

impl PageTransport for MockTransport {
    async fn get_page(
        &self,
        url: &str,
        token: &str,
        query: &[(&str, String)],
    ) -> Result<PageResponse, FetchCause> {
        let request = RecordedRequest {
            url: url.to_string(),
            token: token.to_string(),
            query: query
                .iter()
                .map(|(key, value)| (key.to_string(), value.clone()))
                .collect(),
        };
        let page = request.page().unwrap_or(1);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }

        let mut response = (self.responder)(page)?;
        if response.url.is_empty() {
            response.url = format!("{url}?page={page}");
        }
        Ok(response)
    }
}

/// Builds a response whose body is the serialized `body`
pub fn json_page(status: u16, link: Option<String>, body: &serde_json::Value) -> PageResponse {
    let mut headers = vec![("content-type".to_string(), "application/json".to_string())];
    if let Some(link) = &link {
        headers.push(("link".to_string(), link.clone()));
    }
    PageResponse {
        url: String::new(),
        status,
        reason: reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|code| code.canonical_reason())
            .unwrap_or("")
            .to_string(),
        link,
        headers,
        body: body.to_string(),
    }
}
