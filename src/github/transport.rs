use crate::config::ExportConfig;
use crate::error::FetchCause;
use crate::github::pagination::LINK_HEADER;
use std::future::Future;

/// Raw outcome of a single GET against the issues endpoint
#[derive(Debug, Clone, Default)]
pub struct PageResponse {
    /// Final request URL including the query string
    pub url: String,
    pub status: u16,
    pub reason: String,
    /// Value of the `Link` header, if any
    pub link: Option<String>,
    /// All response headers, kept for diagnostics
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl PageResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs one authenticated page request
///
/// Implementations report only transport-level failures; status handling is left
/// to the caller.
pub trait PageTransport {
    fn get_page(
        &self,
        url: &str,
        token: &str,
        query: &[(&str, String)],
    ) -> impl Future<Output = Result<PageResponse, FetchCause>> + Send;
}

/// [`PageTransport`] backed by a `reqwest` client
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(config: &ExportConfig) -> anyhow::Result<Self> {
        let client = anyhow::Context::context(
            reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .user_agent(config.user_agent.clone())
                .build(),
            "Failed to create HTTP client",
        )?;
        Ok(ReqwestTransport { client })
    }
}

impl PageTransport for ReqwestTransport {
    async fn get_page(
        &self,
        url: &str,
        token: &str,
        query: &[(&str, String)],
    ) -> Result<PageResponse, FetchCause> {
        let response = self
            .client
            .get(url)
            .query(query)
            .header("Authorization", format!("token {token}"))
            .header("Accept", "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| FetchCause::Transport(e.to_string()))?;

        let status = response.status();
        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.to_string(),
                    value.to_str().unwrap_or("<non-ascii>").to_string(),
                )
            })
            .collect();
        let link = response
            .headers()
            .get(LINK_HEADER)
            .map(|value| {
                value
                    .to_str()
                    .map(str::to_string)
                    .map_err(|e| FetchCause::Decode(format!("unreadable Link header: {e}")))
            })
            .transpose()?;
        let final_url = response.url().to_string();

        let body = response
            .text()
            .await
            .map_err(|e| FetchCause::Transport(e.to_string()))?;

        Ok(PageResponse {
            url: final_url,
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("").to_string(),
            link,
            headers,
            body,
        })
    }
}
