//! Layered configuration for the loader and the query service.
//!
//! Uses Figment to merge built-in defaults + `config.toml` +
//! `config.<env>.toml` + `APP_*` env vars + the `TYPESENSE_*` names the
//! deployment scripts already export.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::types::{MappingMode, DEFAULT_PAGE_SIZE};

/// Connection settings for the search engine transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub host: String,
    pub port: u16,
    pub protocol: String,
    pub api_key: String,
    pub connection_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8018,
            protocol: "http".to_string(),
            api_key: "xyz".to_string(),
            connection_timeout_secs: 2,
            request_timeout_secs: 10,
        }
    }
}

impl EngineConfig {
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.protocol, self.host, self.port)
    }

    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(self.connection_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8017,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub query_by: String,
    pub default_page_size: u32,
    pub facet_fields: Vec<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            query_by: "*".to_string(),
            default_page_size: DEFAULT_PAGE_SIZE,
            facet_fields: vec!["collections".into(), "tags".into(), "price".into()],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub collection_name: Option<String>,
    pub mapping_mode: MappingMode,
    pub engine: EngineConfig,
    pub server: ServerConfig,
    pub search: SearchConfig,
}

impl Settings {
    /// The target collection; the query service cannot start without it.
    pub fn require_collection(&self) -> Result<&str> {
        self.collection_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| {
                Error::Config(
                    "TYPESENSE_COLLECTION_NAME environment variable is not set.".to_string(),
                )
            })
    }

    fn validate(&self) -> Result<()> {
        if !matches!(self.engine.protocol.as_str(), "http" | "https") {
            return Err(Error::Config(format!(
                "engine.protocol must be http or https, got {}",
                self.engine.protocol
            )));
        }
        if self.engine.host.is_empty() {
            return Err(Error::Config("engine.host is empty".to_string()));
        }
        if self.search.default_page_size == 0 {
            return Err(Error::Config(
                "search.default_page_size must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        Ok(Self {
            figment: Self::figment_for_env(&env_name),
        })
    }

    /// Defaults, then `config.toml`, then `config.<env>.toml`, then `APP_*`
    /// variables, then the legacy `TYPESENSE_*` / `SERVER_PORT` names.
    pub fn figment_for_env(env_name: &str) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file("config.toml"));
        match env_name {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment
            .merge(Env::prefixed("APP_").split("__"))
            .merge(Env::prefixed("TYPESENSE_").map(|key| {
                if key.as_str().eq_ignore_ascii_case("collection_name") {
                    "collection_name".into()
                } else {
                    format!("engine.{}", key.as_str().to_ascii_lowercase()).into()
                }
            }))
            .merge(
                Env::raw()
                    .only(&["SERVER_PORT"])
                    .map(|_| "server.port".into()),
            )
    }

    pub fn settings(&self) -> Result<Settings> {
        let settings: Settings = self
            .figment
            .extract()
            .map_err(|e| Error::Config(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }
}

impl From<Figment> for Config {
    fn from(figment: Figment) -> Self {
        Self { figment }
    }
}

/// Expands `${VAR}`/`$VAR` and a leading `~` in a CLI path argument.
/// Unknown variables leave the input untouched.
pub fn expand_path(input: &str) -> PathBuf {
    let with_vars = shellexpand::env(input).unwrap_or(Cow::Borrowed(input));
    PathBuf::from(shellexpand::tilde(&with_vars).as_ref())
}
