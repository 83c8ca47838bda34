use std::time::Duration;

use serde::Deserialize;

use crate::config::ConfigError;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepoMode {
    Test,
    Prod,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendChoice {
    Http,
    Git,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Tree,
    Flat,
    Dot,
    Json,
}

/// Raw settings as read from a config file or collected from flags.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsFile {
    #[serde(default)]
    pub package_name: Option<String>,
    #[serde(default)]
    pub repository_url: Option<String>,
    #[serde(default)]
    pub repo_mode: Option<RepoMode>,
    #[serde(default)]
    pub package_version: Option<String>,
    #[serde(default)]
    pub backend: Option<BackendChoice>,
    #[serde(default)]
    pub ascii_output: Option<bool>,
    #[serde(default)]
    pub format: Option<OutputFormat>,
    #[serde(default)]
    pub transport: Option<TransportSettings>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransportSettings {
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub accept_invalid_certs: Option<bool>,
}

/// HTTP transport options handed to the index backend at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    pub timeout: Duration,
    pub user_agent: String,
    pub accept_invalid_certs: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: format!("apkgraph/{}", env!("CARGO_PKG_VERSION")),
            accept_invalid_certs: false,
        }
    }
}

/// Validated settings for one resolution run.
#[derive(Debug, Clone)]
pub struct ResolveConfig {
    pub package_name: String,
    pub repository_url: String,
    pub repo_mode: RepoMode,
    pub package_version: Option<String>,
    pub backend: Option<BackendChoice>,
    pub ascii_output: bool,
    pub format: OutputFormat,
    pub transport: TransportConfig,
}

impl SettingsFile {
    /// Layers `overrides` on top of `self`; set fields in `overrides` win.
    pub fn merge(self, overrides: SettingsFile) -> SettingsFile {
        let transport = match (self.transport, overrides.transport) {
            (Some(base), Some(over)) => Some(TransportSettings {
                timeout_secs: over.timeout_secs.or(base.timeout_secs),
                user_agent: over.user_agent.or(base.user_agent),
                accept_invalid_certs: over.accept_invalid_certs.or(base.accept_invalid_certs),
            }),
            (base, over) => over.or(base),
        };
        SettingsFile {
            package_name: overrides.package_name.or(self.package_name),
            repository_url: overrides.repository_url.or(self.repository_url),
            repo_mode: overrides.repo_mode.or(self.repo_mode),
            package_version: overrides.package_version.or(self.package_version),
            backend: overrides.backend.or(self.backend),
            ascii_output: overrides.ascii_output.or(self.ascii_output),
            format: overrides.format.or(self.format),
            transport,
        }
    }

    pub fn finalize(self) -> Result<ResolveConfig, ConfigError> {
        let package_name = required(self.package_name, "package_name")?;
        let repository_url = required(self.repository_url, "repository_url")?;
        let repo_mode = self
            .repo_mode
            .ok_or(ConfigError::MissingField("repo_mode"))?;
        let package_version = self
            .package_version
            .map(|version| version.trim().to_string())
            .filter(|version| !version.is_empty());

        let mut transport = TransportConfig::default();
        if let Some(settings) = self.transport {
            if let Some(secs) = settings.timeout_secs {
                if secs == 0 {
                    return Err(ConfigError::Invalid {
                        field: "transport.timeout_secs",
                        value: secs.to_string(),
                    });
                }
                transport.timeout = Duration::from_secs(secs);
            }
            if let Some(agent) = settings.user_agent.filter(|agent| !agent.trim().is_empty()) {
                transport.user_agent = agent;
            }
            if let Some(accept) = settings.accept_invalid_certs {
                transport.accept_invalid_certs = accept;
            }
        }

        Ok(ResolveConfig {
            package_name,
            repository_url,
            repo_mode,
            package_version,
            backend: self.backend,
            ascii_output: self.ascii_output.unwrap_or(false),
            format: self.format.unwrap_or_default(),
            transport,
        })
    }
}

impl ResolveConfig {
    /// `param = value` pairs in a stable order, for display.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("package_name", self.package_name.clone()),
            ("repository_url", self.repository_url.clone()),
            ("repo_mode", repo_mode_name(self.repo_mode).to_string()),
            (
                "package_version",
                self.package_version.clone().unwrap_or_default(),
            ),
            (
                "backend",
                self.backend
                    .map(|choice| backend_name(choice).to_string())
                    .unwrap_or_else(|| "auto".to_string()),
            ),
            ("ascii_output", self.ascii_output.to_string()),
            ("format", format_name(self.format).to_string()),
            (
                "transport.timeout_secs",
                self.transport.timeout.as_secs().to_string(),
            ),
            ("transport.user_agent", self.transport.user_agent.clone()),
            (
                "transport.accept_invalid_certs",
                self.transport.accept_invalid_certs.to_string(),
            ),
        ]
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ConfigError> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or(ConfigError::MissingField(field))
}

pub fn parse_repo_mode(input: &str) -> Option<RepoMode> {
    match input.to_ascii_lowercase().as_str() {
        "test" => Some(RepoMode::Test),
        "prod" => Some(RepoMode::Prod),
        _ => None,
    }
}

pub fn parse_backend_choice(input: &str) -> Option<BackendChoice> {
    match input.to_ascii_lowercase().as_str() {
        "http" => Some(BackendChoice::Http),
        "git" => Some(BackendChoice::Git),
        _ => None,
    }
}

pub fn parse_output_format(input: &str) -> Option<OutputFormat> {
    match input.to_ascii_lowercase().as_str() {
        "tree" => Some(OutputFormat::Tree),
        "flat" => Some(OutputFormat::Flat),
        "dot" => Some(OutputFormat::Dot),
        "json" => Some(OutputFormat::Json),
        _ => None,
    }
}

pub fn repo_mode_name(mode: RepoMode) -> &'static str {
    match mode {
        RepoMode::Test => "test",
        RepoMode::Prod => "prod",
    }
}

pub fn backend_name(choice: BackendChoice) -> &'static str {
    match choice {
        BackendChoice::Http => "http",
        BackendChoice::Git => "git",
    }
}

pub fn format_name(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::Tree => "tree",
        OutputFormat::Flat => "flat",
        OutputFormat::Dot => "dot",
        OutputFormat::Json => "json",
    }
}
