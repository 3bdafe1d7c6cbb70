use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_STORAGE_PATH: &str = ".recrutamento/storage.json";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
    pub api: ApiSettings,
    pub storage: StorageSettings,
    pub session: SessionSettings,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ApiSettings {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StorageSettings {
    pub path: PathBuf,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SessionSettings {
    pub cache_ttl_secs: u64,
    pub min_check_interval_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api: ApiSettings {
                base_url: DEFAULT_BASE_URL.to_string(),
                timeout_secs: 5,
            },
            storage: StorageSettings {
                path: PathBuf::from(DEFAULT_STORAGE_PATH),
            },
            session: SessionSettings {
                cache_ttl_secs: 300,
                min_check_interval_ms: 3000,
            },
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_dir("config")
    }

    /// Carrega `<dir>/default`, `<dir>/<RUN_MODE>` e as variáveis de ambiente
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let dir = dir.as_ref();
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        let defaults = Settings::default();

        let mut builder = Config::builder()
            .set_default("api.base_url", defaults.api.base_url)?
            .set_default("api.timeout_secs", defaults.api.timeout_secs)?
            .set_default("storage.path", DEFAULT_STORAGE_PATH)?
            .set_default("session.cache_ttl_secs", defaults.session.cache_ttl_secs)?
            .set_default(
                "session.min_check_interval_ms",
                defaults.session.min_check_interval_ms,
            )?
            // Arquivo de configuração base
            .add_source(File::from(dir.join("default")).required(false))
            // Arquivo específico do ambiente
            .add_source(File::from(dir.join(&run_mode)).required(false))
            .add_source(
                Environment::with_prefix("RECRUTAMENTO")
                    .separator("__")
                    .try_parsing(true),
            );

        // Nome curto usado pelo frontend
        if let Ok(url) = std::env::var("RECRUTAMENTO_API_URL") {
            builder = builder.set_override("api.base_url", url)?;
        }

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::Message("api.base_url não pode ser vazio".into()));
        }
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::Message("api.timeout_secs deve ser maior que zero".into()));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.session.cache_ttl_secs)
    }

    pub fn min_check_interval(&self) -> Duration {
        Duration::from_millis(self.session.min_check_interval_ms)
    }
}
