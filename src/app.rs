use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const ENV_PREFIX: &str = "PORTFOLIO_CONTACT_";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read or write config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid provider base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),
    #[error("failed to build HTTP client: {0}")]
    Http(String),
    #[error("no config dir")]
    NoConfigDir,
    #[error("missing required config fields: {}", .0.join(", "))]
    Missing(Vec<&'static str>),
}

/// Provider credentials and delivery settings for the contact form.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AppConfig {
    pub service_id: String,
    pub template_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_reply_template_id: Option<String>,
    pub public_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
    /// Inbox that receives the forwarded messages.
    pub to_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn default_path() -> Option<PathBuf> {
        let base = BaseDirs::new()?;
        Some(base.config_dir().join("portfolio-contact.toml"))
    }

    /// Loads from `path`, or from the default location when `None`, then
    /// applies `PORTFOLIO_CONTACT_*` environment overrides. A missing default
    /// file yields an empty config; a missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::load_from(p)?,
            None => Self::load_default()?,
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Ok(toml::from_str::<AppConfig>(&text)?)
    }

    fn load_default() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) => Self::load_or_empty(&path),
            None => Ok(Self::new()),
        }
    }

    /// Like [`AppConfig::load_from`], but a missing file yields an empty config.
    pub fn load_or_empty(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load_from(path)
        } else {
            log::debug!("no config at {}, starting empty", path.display());
            Ok(Self::new())
        }
    }

    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::default_path().ok_or(ConfigError::NoConfigDir)?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let toml = toml::to_string_pretty(self)?;
        fs::write(path, toml)?;
        Ok(())
    }

    /// Overrides fields from `lookup("PORTFOLIO_CONTACT_<FIELD>")`. Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |field: &str| {
            lookup(&format!("{}{}", ENV_PREFIX, field))
                .filter(|v| !v.trim().is_empty())
        };
        if let Some(v) = get("SERVICE_ID") {
            self.service_id = v;
        }
        if let Some(v) = get("TEMPLATE_ID") {
            self.template_id = v;
        }
        if let Some(v) = get("AUTO_REPLY_TEMPLATE_ID") {
            self.auto_reply_template_id = Some(v);
        }
        if let Some(v) = get("PUBLIC_KEY") {
            self.public_key = v;
        }
        if let Some(v) = get("PRIVATE_KEY") {
            self.private_key = Some(v);
        }
        if let Some(v) = get("TO_EMAIL") {
            self.to_email = v;
        }
        if let Some(v) = get("BASE_URL") {
            self.base_url = Some(v);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("service_id", &self.service_id),
            ("template_id", &self.template_id),
            ("public_key", &self.public_key),
            ("to_email", &self.to_email),
        ];
        let missing: Vec<&'static str> = required
            .iter()
            .filter(|(_, v)| v.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Missing(missing))
        }
    }

    /// Placeholder values written by `init-config`.
    pub fn template() -> Self {
        Self {
            service_id: "service_xxxxxxx".into(),
            template_id: "template_xxxxxxx".into(),
            auto_reply_template_id: None,
            public_key: "your-public-key".into(),
            private_key: None,
            to_email: "you@example.com".into(),
            base_url: None,
        }
    }
}
