use std::fmt;

/// Identity of the target repository on the hosting provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRef {
    pub owner: String,
    pub name: String,
}

impl RepositoryRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        RepositoryRef {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Issues endpoint under the given API base, e.g.
    /// `https://api.github.com/repos/<owner>/<name>/issues`
    pub fn issues_url(&self, api_base_url: &str) -> String {
        format!(
            "{}/repos/{}/{}/issues",
            api_base_url.trim_end_matches('/'),
            self.owner,
            self.name
        )
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}
