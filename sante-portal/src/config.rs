use sante_core::Branding;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Portal configuration loaded from YAML file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    pub api: ApiSettings,
    pub storage: StorageSettings,
    pub log: LogSettings,
    pub branding: Branding,
    pub session: SessionSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Root of the REST API, request paths are appended to it
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub data_dir: PathBuf,
    pub state_db: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// End the session when the profile endpoint answers 401
    pub logout_on_unauthorized: bool,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_string(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            state_db: "state.redb".to_string(),
        }
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            logout_on_unauthorized: true,
        }
    }
}

impl PortalConfig {
    /// Load configuration from a YAML file
    pub fn load_from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: PortalConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<&str>) -> Result<Self, Box<dyn std::error::Error>> {
        let mut config = if let Some(path) = config_path {
            Self::load_from_file(path)?
        } else {
            Self::default()
        };

        if let Ok(url) = std::env::var("SANTE_API_URL") {
            config.api.base_url = url;
        }

        if let Ok(data_dir) = std::env::var("SANTE_DATA_DIR") {
            config.storage.data_dir = PathBuf::from(data_dir);
        }

        if let Ok(level) = std::env::var("SANTE_LOG_LEVEL") {
            config.log.level = level;
        }

        Ok(config)
    }

    /// Get the full path to the client state database
    pub fn state_db_path(&self) -> PathBuf {
        self.storage.data_dir.join(&self.storage.state_db)
    }

    /// Build a config pointing at a specific API root, everything else default
    pub fn for_api(base_url: impl Into<String>) -> Self {
        let mut config = Self::default();
        config.api.base_url = base_url.into();
        config
    }
}
