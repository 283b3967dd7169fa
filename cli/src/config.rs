use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const API_URL_ENV: &str = "BITELOG_API_URL";

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Shape of `config.json`. Every field is optional.
#[derive(Debug, Deserialize)]
#[serde(default)]
struct FileConfig {
    api_url: Option<String>,
    timeout_secs: u64,
    connect_timeout_secs: u64,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Config {
    /// Resolve settings from the config file, then `BITELOG_API_URL`, then
    /// the `--api-url` flag. Later sources win.
    pub fn load(flag_url: Option<&str>) -> Result<Self> {
        let proj_dirs =
            ProjectDirs::from("", "", "bitelog").context("Could not determine home directory")?;
        let path = proj_dirs.config_dir().join("config.json");
        let env_url = std::env::var(API_URL_ENV).ok();
        Self::resolve(&path, env_url.as_deref(), flag_url)
    }

    fn resolve(path: &Path, env_url: Option<&str>, flag_url: Option<&str>) -> Result<Self> {
        let file = read_file_config(path)?;

        let api_url = flag_url
            .or(env_url)
            .map(str::to_string)
            .or(file.api_url)
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .with_context(|| {
                format!(
                    "No meal API configured. Set \"api_url\" in {}, export {API_URL_ENV}, or pass --api-url",
                    path.display()
                )
            })?;

        Ok(Config {
            api_url,
            timeout: Duration::from_secs(file.timeout_secs),
            connect_timeout: Duration::from_secs(file.connect_timeout_secs),
        })
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig> {
    if !path.exists() {
        return Ok(FileConfig::default());
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}
