use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use crate::error::PlacesError;
use crate::http::DEFAULT_TIMEOUT_SECS;
use crate::registry::DatasetRegistry;
use crate::store::DEFAULT_DATA_DIR;

pub const CONFIG_FILE_NAME: &str = "places.json";

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub years: Option<Vec<u16>>,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub schema_version: u32,
    pub data_dir: PathBuf,
    pub timeout: Duration,
    pub years: Vec<u16>,
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(
        path: Option<&str>,
        registry: &DatasetRegistry,
    ) -> Result<ResolvedConfig, PlacesError> {
        let config_path = match path {
            Some(path) => Some(PathBuf::from(path)),
            None => Self::discover(),
        };

        let config = match config_path {
            Some(config_path) => {
                let content = fs::read_to_string(&config_path)
                    .map_err(|_| PlacesError::ConfigRead(config_path.clone()))?;
                serde_json::from_str(&content)
                    .map_err(|err| PlacesError::ConfigParse(err.to_string()))?
            }
            None => Config::default(),
        };

        Self::resolve_config(config, registry)
    }

    pub fn resolve_config(
        config: Config,
        registry: &DatasetRegistry,
    ) -> Result<ResolvedConfig, PlacesError> {
        let schema_version = config.schema_version.unwrap_or(1);

        let years = match config.years {
            Some(years) => {
                for &year in &years {
                    registry.get(year)?;
                }
                years
            }
            None => registry.years(),
        };

        Ok(ResolvedConfig {
            schema_version,
            data_dir: config
                .data_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            timeout: Duration::from_secs(config.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
            years,
        })
    }

    pub fn user_config_path() -> Option<PathBuf> {
        BaseDirs::new().map(|dirs| {
            dirs.config_dir()
                .join("cdc-places")
                .join(CONFIG_FILE_NAME)
        })
    }

    fn discover() -> Option<PathBuf> {
        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.exists() {
            return Some(local);
        }
        Self::user_config_path().filter(|path| path.exists())
    }
}
