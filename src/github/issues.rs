use crate::config::ExportConfig;
use crate::error::{ExportError, FetchCause};
use crate::github::pagination::resolve_last_page;
use crate::github::transport::{PageResponse, PageTransport};
use crate::repository::RepositoryRef;
use tracing::{debug, info};

/// An issue record exactly as returned by the API
pub type RawIssue = serde_json::Value;

/// Paged retrieval of every record behind a repository's issues endpoint
pub struct IssueFetcher<T> {
    transport: T,
    config: ExportConfig,
}

impl<T: PageTransport> IssueFetcher<T> {
    pub fn new(transport: T, config: ExportConfig) -> Self {
        IssueFetcher { transport, config }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetches all pages in increasing order and returns the records in page order.
    ///
    /// The first request (no `page` parameter) is only used to discover the page
    /// count; page 1 is then requested again with the rest. Any failure aborts the
    /// whole fetch.
    pub async fn fetch_all(
        &self,
        repo: &RepositoryRef,
        token: &str,
    ) -> Result<Vec<RawIssue>, ExportError> {
        let url = repo.issues_url(&self.config.api_base_url);
        let per_page = self.config.per_page.to_string();

        info!(repository = %repo, url = %url, per_page = %per_page, "Fetching issues");

        let first = self
            .request(&url, token, 1, &[("per_page", per_page.clone())])
            .await?;
        let last_page = resolve_last_page(first.link.as_deref())?;
        info!(last_page, "Last page: {last_page}");

        let mut issues = Vec::new();
        for page in 1..=last_page {
            let query = [("per_page", per_page.clone()), ("page", page.to_string())];
            info!(page, "Querying page: {page}, {url}");
            let response = self.request(&url, token, page, &query).await?;
            let records = parse_page(&response.body)
                .map_err(|cause| ExportError::FetchFailed { page, cause })?;
            debug!(page, count = records.len(), "Page parsed");
            issues.extend(records);
        }

        Ok(issues)
    }

    async fn request(
        &self,
        url: &str,
        token: &str,
        page: u32,
        query: &[(&str, String)],
    ) -> Result<PageResponse, ExportError> {
        let response = self
            .transport
            .get_page(url, token, query)
            .await
            .map_err(|cause| ExportError::FetchFailed { page, cause })?;

        debug!(
            url = %response.url,
            status = response.status,
            reason = %response.reason,
            headers = ?response.headers,
            "{} => response status: {}, {}",
            response.url,
            response.status,
            response.reason
        );

        if !response.is_success() {
            return Err(ExportError::FetchFailed {
                page,
                cause: FetchCause::from_status(response.status, &response.reason),
            });
        }
        Ok(response)
    }
}

/// Parses a page body as a JSON array of objects
fn parse_page(body: &str) -> Result<Vec<RawIssue>, FetchCause> {
    let records: Vec<RawIssue> =
        serde_json::from_str(body).map_err(|e| FetchCause::Decode(e.to_string()))?;
    if let Some(position) = records.iter().position(|record| !record.is_object()) {
        return Err(FetchCause::Decode(format!(
            "element {position} is not an object"
        )));
    }
    Ok(records)
}

/// Whether the record is a pull request rather than an issue
pub fn is_pull_request(issue: &RawIssue) -> bool {
    issue
        .get("pull_request")
        .is_some_and(|marker| !marker.is_null())
}

/// Drops pull requests, keeping the remaining records in order
pub fn issues_only(issues: Vec<RawIssue>) -> Vec<RawIssue> {
    issues
        .into_iter()
        .filter(|issue| !is_pull_request(issue))
        .collect()
}
