use crate::error::ExportError;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Configuration keys enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    ApiBaseUrl,
    PerPage,
    OutputDir,
    UserAgent,
}

impl ConfigKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigKey::ApiBaseUrl => "api_base_url",
            ConfigKey::PerPage => "per_page",
            ConfigKey::OutputDir => "output_dir",
            ConfigKey::UserAgent => "user_agent",
        }
    }

    /// Environment variable overriding this key, if any
    pub fn env_var(&self) -> Option<&'static str> {
        match self {
            ConfigKey::ApiBaseUrl => Some("ISSUEDUMP_API_URL"),
            ConfigKey::PerPage => Some("ISSUEDUMP_PER_PAGE"),
            ConfigKey::OutputDir => Some("ISSUEDUMP_OUTPUT_DIR"),
            ConfigKey::UserAgent => None,
        }
    }

    /// Get all config keys
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::ApiBaseUrl,
            ConfigKey::PerPage,
            ConfigKey::OutputDir,
            ConfigKey::UserAgent,
        ]
    }
}

/// Directory name for project-specific configuration.
pub const PROJECT_CONFIG_DIR: &str = ".issuedump";
/// Filename for the project-specific configuration within the .issuedump directory.
pub const PROJECT_CONFIG_FILENAME: &str = "config.json";

pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";
pub const DEFAULT_PER_PAGE: u32 = 50;
pub const DEFAULT_OUTPUT_DIR: &str = "outputs";
pub const DEFAULT_USER_AGENT: &str = "issuedump-cli";
/// Largest page size the issues endpoint accepts
pub const MAX_PER_PAGE: u32 = 100;

/// Settings handed explicitly to the fetcher and the writers
#[derive(Debug, Clone, PartialEq)]
pub struct ExportConfig {
    pub api_base_url: String,
    pub per_page: u32,
    pub output_dir: PathBuf,
    pub user_agent: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            per_page: DEFAULT_PER_PAGE,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ExportConfig {
    /// Loads defaults, then `<dir>/.issuedump/config.json` if present, then
    /// environment overrides.
    pub fn load(dir: &Path) -> Result<Self, ExportError> {
        let path = dir.join(PROJECT_CONFIG_DIR).join(PROJECT_CONFIG_FILENAME);
        let file_config = match std::fs::read(&path) {
            Ok(content) => parse_config(&content).map_err(|e| match e {
                ExportError::Config(msg) => {
                    ExportError::Config(format!("{}: {msg}", path.display()))
                }
                other => other,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                return Err(ExportError::Config(format!(
                    "Failed to read {}: {e}",
                    path.display()
                )));
            }
        };

        let env_config = env_overrides(|name| std::env::var(name).ok());
        ExportConfig::default().apply(&update_config(&file_config, &env_config))
    }

    /// Returns a copy with the given values applied, validating their types
    pub fn apply(&self, values: &HashMap<ConfigKey, Value>) -> Result<Self, ExportError> {
        let mut config = self.clone();
        for (key, value) in values {
            match key {
                ConfigKey::ApiBaseUrl => config.api_base_url = non_empty_string(*key, value)?,
                ConfigKey::OutputDir => {
                    config.output_dir = PathBuf::from(non_empty_string(*key, value)?)
                }
                ConfigKey::UserAgent => config.user_agent = non_empty_string(*key, value)?,
                ConfigKey::PerPage => config.per_page = per_page(value)?,
            }
        }
        url::Url::parse(&config.api_base_url).map_err(|e| {
            ExportError::Config(format!(
                "`{}` is not a valid URL ({e}): {}",
                ConfigKey::ApiBaseUrl.as_str(),
                config.api_base_url
            ))
        })?;
        Ok(config)
    }
}

fn non_empty_string(key: ConfigKey, value: &Value) -> Result<String, ExportError> {
    match value.as_str().map(str::trim) {
        Some(s) if !s.is_empty() => Ok(s.to_string()),
        _ => Err(ExportError::Config(format!(
            "`{}` must be a non-empty string",
            key.as_str()
        ))),
    }
}

/// Accepts a number or a numeric string (as read from the environment)
fn per_page(value: &Value) -> Result<u32, ExportError> {
    let parsed = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    match parsed {
        Some(n) if (1..=u64::from(MAX_PER_PAGE)).contains(&n) => Ok(n as u32),
        _ => Err(ExportError::Config(format!(
            "`{}` must be an integer between 1 and {MAX_PER_PAGE}, got {value}",
            ConfigKey::PerPage.as_str()
        ))),
    }
}

/// Collects overrides from environment variables using `lookup`
pub fn env_overrides<F>(lookup: F) -> HashMap<ConfigKey, Value>
where
    F: Fn(&str) -> Option<String>,
{
    ConfigKey::all()
        .iter()
        .filter_map(|key| {
            let value = lookup(key.env_var()?)?;
            Some((*key, Value::String(value)))
        })
        .collect()
}

/// Parses a JSON configuration file content into a map of configuration values.
///
/// - Returns an empty HashMap if the input `content` is empty or contains only whitespace.
/// - Unknown keys are skipped with a warning.
/// - Returns an `Err` if the content is not a JSON object.
pub fn parse_config(content: &[u8]) -> Result<HashMap<ConfigKey, Value>, ExportError> {
    if content.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(HashMap::new());
    }

    let value: Value = serde_json::from_slice(content)
        .map_err(|e| ExportError::Config(format!("Failed to parse config JSON: {e}")))?;

    let Value::Object(map) = &value else {
        return Err(ExportError::Config("Config must be a JSON object".to_string()));
    };

    for name in map.keys() {
        if !ConfigKey::all().iter().any(|key| key.as_str() == name) {
            warn!(key = %name, "Ignoring unknown config key");
        }
    }

    Ok(ConfigKey::all()
        .iter()
        .filter_map(|key| map.get(key.as_str()).map(|val| (*key, val.clone())))
        .collect())
}

/// Merges `updates` into `base_config` and returns a new configuration map.
///
/// If a key exists in both, the value from `updates` wins.
pub fn update_config(
    base_config: &HashMap<ConfigKey, Value>,
    updates: &HashMap<ConfigKey, Value>,
) -> HashMap<ConfigKey, Value> {
    let mut new_config = base_config.clone();
    for (key, value) in updates {
        new_config.insert(*key, value.clone());
    }
    new_config
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn object_with_keys_works() {
        let json = r#"{"api_base_url": "http://localhost:8080", "per_page": 25}"#.as_bytes();
        let config = parse_config(json).unwrap();
        assert_eq!(
            config.get(&ConfigKey::ApiBaseUrl).unwrap(),
            &json!("http://localhost:8080")
        );
        assert_eq!(config.get(&ConfigKey::PerPage).unwrap(), &json!(25));
        assert!(!config.contains_key(&ConfigKey::OutputDir));
    }

    #[test]
    fn empty_input_works() {
        let config = parse_config(b"").unwrap();
        assert!(config.is_empty());
    }

    #[test]
    fn whitespace_input_works() {
        let config = parse_config(b"   \n").unwrap();
        assert!(config.is_empty());
    }

    #[test]
    fn invalid_json_fails() {
        assert!(parse_config(br#"{"per_page": "#).is_err());
    }

    #[test]
    fn array_fails() {
        assert!(parse_config(br#"["owner/repo1"]"#).is_err());
    }

    #[test]
    fn unknown_key_skipped() {
        let config = parse_config(br#"{"unknown": "value"}"#).unwrap();
        assert!(config.is_empty());
    }

    #[test]
    fn test_update_config_overwrites_and_keeps_base() {
        let mut base_config = HashMap::new();
        base_config.insert(ConfigKey::PerPage, json!(10));
        base_config.insert(ConfigKey::OutputDir, json!("out"));
        let mut updates = HashMap::new();
        updates.insert(ConfigKey::PerPage, json!("30"));

        let original_base_clone = base_config.clone();
        let result_config = update_config(&base_config, &updates);

        assert_eq!(result_config.get(&ConfigKey::PerPage).unwrap(), &json!("30"));
        assert_eq!(result_config.get(&ConfigKey::OutputDir).unwrap(), &json!("out"));
        assert_eq!(base_config, original_base_clone);
    }

    #[test]
    fn test_defaults() {
        let config = ExportConfig::default();
        assert_eq!(config.api_base_url, "https://api.github.com");
        assert_eq!(config.per_page, 50);
        assert_eq!(config.output_dir, PathBuf::from("outputs"));
    }

    #[test]
    fn test_apply_values() {
        let mut values = HashMap::new();
        values.insert(ConfigKey::ApiBaseUrl, json!("http://127.0.0.1:3000"));
        values.insert(ConfigKey::PerPage, json!("100"));
        values.insert(ConfigKey::OutputDir, json!("reports"));
        values.insert(ConfigKey::UserAgent, json!("tester"));

        let config = ExportConfig::default().apply(&values).unwrap();
        assert_eq!(config.api_base_url, "http://127.0.0.1:3000");
        assert_eq!(config.per_page, 100);
        assert_eq!(config.output_dir, PathBuf::from("reports"));
        assert_eq!(config.user_agent, "tester");
    }

    #[test]
    fn test_apply_rejects_out_of_range_page_size() {
        for bad in [json!(0), json!(101), json!("many"), json!(true)] {
            let mut values = HashMap::new();
            values.insert(ConfigKey::PerPage, bad);
            assert!(ExportConfig::default().apply(&values).is_err());
        }
    }

    #[test]
    fn test_apply_rejects_invalid_url() {
        let mut values = HashMap::new();
        values.insert(ConfigKey::ApiBaseUrl, json!("not a url"));
        assert!(ExportConfig::default().apply(&values).is_err());
    }

    #[test]
    fn test_apply_rejects_empty_string() {
        let mut values = HashMap::new();
        values.insert(ConfigKey::OutputDir, json!("  "));
        assert!(ExportConfig::default().apply(&values).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let overrides = env_overrides(|name| match name {
            "ISSUEDUMP_PER_PAGE" => Some("10".to_string()),
            "ISSUEDUMP_OUTPUT_DIR" => Some("/tmp/out".to_string()),
            _ => None,
        });
        assert_eq!(overrides.len(), 2);
        assert_eq!(overrides.get(&ConfigKey::PerPage).unwrap(), &json!("10"));
        assert!(!overrides.contains_key(&ConfigKey::UserAgent));
    }

    #[test]
    fn test_load_reads_project_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_dir = dir.path().join(PROJECT_CONFIG_DIR);
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(
            config_dir.join(PROJECT_CONFIG_FILENAME),
            r#"{"user_agent": "from-file"}"#,
        )
        .unwrap();

        let config = ExportConfig::load(dir.path()).unwrap();
        assert_eq!(config.user_agent, "from-file");
    }

    #[test]
    fn test_load_without_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = ExportConfig::load(dir.path()).unwrap();
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_load_reports_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_dir = dir.path().join(PROJECT_CONFIG_DIR);
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(config_dir.join(PROJECT_CONFIG_FILENAME), "[1, 2]").unwrap();

        let err = ExportConfig::load(dir.path()).unwrap_err();
        assert!(err.to_string().contains(PROJECT_CONFIG_FILENAME));
    }
}
