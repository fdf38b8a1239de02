use crate::error::ExportError;
use crate::repository::RepositoryRef;
use url::Url;

pub const USAGE: &str = "Usage: issuedump <repository-url>\n       issuedump <owner> <name>";

/// Enum representing CLI commands
#[derive(Debug, PartialEq)]
pub enum Command {
    Export(RepositoryRef),
    Help,
    /// Input that does not resolve to a repository, with the reason
    Invalid(String),
}

/// Parse command line arguments and return a Command
///
/// # Arguments
/// * `args` - Command line arguments (including program name)
///
/// # Returns
/// * `Command` - The parsed command
pub fn parse_args(args: &[String]) -> Command {
    match args.len() {
        0 | 1 => Command::Invalid("Missing repository argument.".to_string()),
        2 => match args[1].as_str() {
            "help" | "--help" | "-h" => Command::Help,
            input => match resolve_repository_url(input) {
                Ok(repo) => Command::Export(repo),
                Err(err) => Command::Invalid(err.to_string()),
            },
        },
        3 => match validate_pair(&args[1], &args[2]) {
            Ok(repo) => Command::Export(repo),
            Err(err) => Command::Invalid(err.to_string()),
        },
        n => Command::Invalid(format!(
            "Expected one or two arguments, got {}.",
            n - 1
        )),
    }
}

impl Command {
    /// The repository to export, or `InputResolutionFailed` with usage text
    pub fn into_repository(self) -> Result<Option<RepositoryRef>, ExportError> {
        match self {
            Command::Export(repo) => Ok(Some(repo)),
            Command::Help => Ok(None),
            Command::Invalid(reason) => Err(ExportError::InputResolutionFailed(format!(
                "{reason}\n{USAGE}"
            ))),
        }
    }
}

/// Resolves `https://github.com/<owner>/<name>[.git][/...]` or
/// `git@github.com:<owner>/<name>.git` to a repository reference
pub fn resolve_repository_url(input: &str) -> Result<RepositoryRef, ExportError> {
    let input = input.trim();
    let invalid = || {
        ExportError::InputResolutionFailed(format!(
            "Cannot resolve `{input}` to a repository. Please use a URL like https://github.com/<owner>/<name>."
        ))
    };

    let path = if let Some(scp) = input.strip_prefix("git@") {
        let (host, path) = scp.split_once(':').ok_or_else(invalid)?;
        if !is_github_host(host) {
            return Err(invalid());
        }
        path.to_string()
    } else {
        let with_scheme = if input.contains("://") {
            input.to_string()
        } else {
            format!("https://{input}")
        };
        let url = Url::parse(&with_scheme).map_err(|_| invalid())?;
        if !matches!(url.scheme(), "http" | "https" | "ssh" | "git")
            || !url.host_str().is_some_and(is_github_host)
        {
            return Err(invalid());
        }
        url.path().to_string()
    };

    let mut segments = path.split('/').filter(|segment| !segment.is_empty());
    let owner = segments.next().ok_or_else(invalid)?;
    let name = segments.next().ok_or_else(invalid)?;
    let name = name.strip_suffix(".git").unwrap_or(name);

    validate_pair(owner, name).map_err(|_| invalid())
}

fn is_github_host(host: &str) -> bool {
    host.eq_ignore_ascii_case("github.com") || host.eq_ignore_ascii_case("www.github.com")
}

fn validate_pair(owner: &str, name: &str) -> Result<RepositoryRef, ExportError> {
    let valid = |part: &str| {
        !part.is_empty()
            && part
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    };
    if valid(owner) && valid(name) {
        Ok(RepositoryRef::new(owner, name))
    } else {
        Err(ExportError::InputResolutionFailed(format!(
            "Invalid repository `{owner}` `{name}`. Owner and name must be non-empty and contain only letters, digits, '-', '_' or '.'."
        )))
    }
}
