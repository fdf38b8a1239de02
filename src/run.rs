use crate::cli;
use crate::config::ExportConfig;
use crate::credentials::{CredentialSource, EnvOrFileCredentials};
use crate::export::{self, OutputFiles};
use crate::github::issues::{IssueFetcher, issues_only};
use crate::github::transport::{PageTransport, ReqwestTransport};
use crate::output;
use crate::repository::RepositoryRef;
use crate::transform;
use anyhow::Context;
use chrono::{DateTime, Local};
use std::io::Write;
use tracing::info;

/// Counts and paths of a completed export
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSummary {
    /// Records received from the API, pull requests included
    pub fetched: usize,
    /// Records left after dropping pull requests
    pub issues: usize,
    pub files: OutputFiles,
}

/// Entry point shared by the binary and the acceptance tests.
///
/// Input is resolved before configuration, credentials or the network are touched.
pub async fn run(
    args: Vec<String>,
    mut stdout_additional: Option<&mut dyn Write>,
) -> anyhow::Result<()> {
    let Some(repo) = cli::parser::parse_args(&args).into_repository()? else {
        output::println(cli::parser::USAGE, &mut stdout_additional)?;
        return Ok(());
    };

    let cwd = std::env::current_dir().context("Failed to determine working directory")?;
    let config = ExportConfig::load(&cwd)?;
    let transport = ReqwestTransport::new(&config)?;

    export_issues(
        &repo,
        &config,
        &EnvOrFileCredentials::new(),
        transport,
        Local::now(),
        &mut stdout_additional,
    )
    .await?;
    Ok(())
}

/// Fetches, filters and normalizes every issue of `repo`, then writes the reports.
///
/// Nothing is written unless all of those steps succeed.
pub async fn export_issues<T, C>(
    repo: &RepositoryRef,
    config: &ExportConfig,
    credentials: &C,
    transport: T,
    now: DateTime<Local>,
    stdout_additional: &mut Option<&mut dyn Write>,
) -> anyhow::Result<ExportSummary>
where
    T: PageTransport,
    C: CredentialSource,
{
    let timestamp = export::timestamp(&now);
    output::println(&format!("Current time is: {timestamp}"), stdout_additional)?;
    info!(owner = %repo.owner, name = %repo.name, "Exporting issues of {repo}");

    let token = credentials.token()?;

    let fetcher = IssueFetcher::new(transport, config.clone());
    let raw = fetcher.fetch_all(repo, &token).await?;
    let fetched = raw.len();

    let issues = issues_only(raw);
    info!(
        fetched,
        issues = issues.len(),
        pull_requests = fetched - issues.len(),
        "Filtered pull requests"
    );

    let normalized = transform::normalize_all(&issues)?;
    output::println(
        &format!("Received {} issues", normalized.len()),
        stdout_additional,
    )?;

    let files = export::write_outputs(&config.output_dir, &timestamp, &normalized, &issues)?;
    for path in [&files.csv, &files.json, &files.raw_json] {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        output::println(
            &format!("Saved {} issues into: {name}", issues.len()),
            stdout_additional,
        )?;
    }

    Ok(ExportSummary {
        fetched,
        issues: issues.len(),
        files,
    })
}
