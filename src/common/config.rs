//! Configuration file handling

use serde::Deserialize;
use std::path::Path;

use super::paths::config_path;
use super::{Error, Result};

/// Main configuration structure
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// System under test
    #[serde(default)]
    pub target: TargetConfig,

    /// Timeout settings
    #[serde(default)]
    pub timeouts: Timeouts,

    /// Credentials used for the registration/login steps
    #[serde(default)]
    pub account: AccountConfig,

    /// Console output settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Document upload fixture
    #[serde(default)]
    pub upload: UploadConfig,
}

/// Where the API under test lives
#[derive(Debug, Deserialize)]
pub struct TargetConfig {
    /// Base URL every endpoint path is appended to
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

/// Timeout settings in seconds
#[derive(Debug, Deserialize)]
pub struct Timeouts {
    /// Upper bound for one request, connect to last body byte
    #[serde(default = "default_request")]
    pub request_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            request_secs: default_request(),
        }
    }
}

fn default_request() -> u64 {
    10
}

/// Account settings
///
/// The email is generated fresh for every run; only the domain is fixed.
#[derive(Debug, Deserialize)]
pub struct AccountConfig {
    #[serde(default = "default_password")]
    pub password: String,

    #[serde(default = "default_display_name")]
    pub display_name: String,

    #[serde(default = "default_email_domain")]
    pub email_domain: String,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            password: default_password(),
            display_name: default_display_name(),
            email_domain: default_email_domain(),
        }
    }
}

fn default_password() -> String {
    "Test1234!".to_string()
}
fn default_display_name() -> String {
    "E2E User".to_string()
}
fn default_email_domain() -> String {
    "test.com".to_string()
}

/// Output configuration
#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    /// Characters of a failing response body shown in the report
    #[serde(default = "default_body_excerpt")]
    pub body_excerpt_chars: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            body_excerpt_chars: default_body_excerpt(),
        }
    }
}

fn default_body_excerpt() -> usize {
    200
}

/// Upload fixture configuration
#[derive(Debug, Deserialize, Clone)]
pub struct UploadConfig {
    /// Multipart field name carrying the file
    #[serde(default = "default_upload_field")]
    pub field: String,

    /// File name sent in the Content-Disposition header
    #[serde(default = "default_upload_filename")]
    pub filename: String,

    /// Text written to the fixture file before upload
    #[serde(default = "default_upload_content")]
    pub content: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            field: default_upload_field(),
            filename: default_upload_filename(),
            content: default_upload_content(),
        }
    }
}

fn default_upload_field() -> String {
    "file".to_string()
}
fn default_upload_filename() -> String {
    "test.txt".to_string()
}
fn default_upload_content() -> String {
    "Hello world test document for PipeRAG E2E testing.".to_string()
}

impl Config {
    /// Load configuration from the default config file
    ///
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = config_path() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }
        Ok(Self::default())
    }

    /// Load configuration from an explicit path, which must exist
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::file_read(path, e))?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(content).map_err(|e| Error::ConfigParse(e.to_string()))?;
        config.target.base_url = normalize_base_url(&config.target.base_url)?;
        validate_timeout(config.timeouts.request_secs)?;
        Ok(config)
    }

    /// Apply command-line overrides on top of the file values
    pub fn apply_overrides(&mut self, base_url: Option<String>, timeout: Option<u64>) -> Result<()> {
        if let Some(url) = base_url {
            self.target.base_url = normalize_base_url(&url)?;
        }
        if let Some(secs) = timeout {
            validate_timeout(secs)?;
            self.timeouts.request_secs = secs;
        }
        Ok(())
    }
}

/// A zero timeout would fail every request before it is sent
fn validate_timeout(secs: u64) -> Result<()> {
    if secs == 0 {
        return Err(Error::Config("Timeout must be at least 1 second".to_string()));
    }
    Ok(())
}

/// Strip trailing slashes and reject relative URLs
fn normalize_base_url(url: &str) -> Result<String> {
    let trimmed = url.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(Error::Config(format!(
            "Base URL '{}' must start with http:// or https://",
            url
        )));
    }
    Ok(trimmed.to_string())
}
