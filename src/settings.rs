use crate::ingest::normalizer::FailurePolicy;
use crate::store::ImportMode;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

const ENV_PREFIX: &str = "FUNDALYTICS";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("failed to load settings: {0}")]
    Load(#[from] ConfigError),

    #[error("invalid setting {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Application settings.
///
/// Layered as built-in defaults, then an optional TOML file, then
/// `FUNDALYTICS__SECTION__KEY` environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub ingest: IngestSettings,
    pub http: HttpSettings,
    pub store: StoreSettings,
    pub cities: CitySettings,
    pub search: SearchSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IngestSettings {
    /// Size tag of the photo variant used as cover image
    pub preferred_size_tag: String,
    /// Cover images fetched at once; 1 keeps the fetch strictly sequential
    pub fetch_concurrency: usize,
    pub failure_policy: FailurePolicy,
    pub import_mode: ImportMode,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            preferred_size_tag: "180w".to_string(),
            fetch_concurrency: 1,
            failure_policy: FailurePolicy::default(),
            import_mode: ImportMode::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Weaviate,
    /// In-process store, lost on exit
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    pub backend: StoreBackend,
    /// Base URL of the Weaviate REST endpoint
    pub url: String,
    /// Path of the collection definition JSON
    pub collection_def: PathBuf,
    /// Most objects a viewer query returns
    pub fetch_limit: usize,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            url: "http://localhost:8080".to_string(),
            collection_def: PathBuf::from("collection_def.json"),
            fetch_limit: 10_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CitySettings {
    pub url: String,
}

impl Default for CitySettings {
    fn default() -> Self {
        Self {
            url: "https://simplemaps.com/static/data/country-cities/nl/nl.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub limit: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self { limit: 5 }
    }
}

impl Settings {
    /// Load settings, reading `path` if it exists
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let settings: Settings = Config::builder()
            .add_source(File::from(path.as_ref()).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.ingest.preferred_size_tag.trim().is_empty() {
            return Err(SettingsError::Invalid {
                key: "ingest.preferred_size_tag",
                reason: "must not be empty".to_string(),
            });
        }
        if self.ingest.fetch_concurrency == 0 {
            return Err(SettingsError::Invalid {
                key: "ingest.fetch_concurrency",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.store.fetch_limit == 0 {
            return Err(SettingsError::Invalid {
                key: "store.fetch_limit",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.search.limit == 0 {
            return Err(SettingsError::Invalid {
                key: "search.limit",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
