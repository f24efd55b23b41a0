use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use std::path::PathBuf;
use std::time::Duration;

use pantry_core::generation::DEFAULT_MODEL;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_REPORT_TIMEOUT_SECS: u64 = 15;
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

pub struct Config {
    pub db_path: PathBuf,
    pub data_dir: PathBuf,
}

impl Config {
    pub fn load() -> Result<Self> {
        let proj_dirs =
            ProjectDirs::from("", "", "pantry").context("Could not determine home directory")?;

        let data_dir = proj_dirs.data_dir().to_path_buf();
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        let db_path = data_dir.join("pantry.db");

        Ok(Config { db_path, data_dir })
    }

    /// Gemini API key from `GEMINI_API_KEY`, or from a `gemini_api_key` file in the data dir.
    pub fn gemini_api_key(&self) -> Result<String> {
        if let Some(key) = env_nonempty("GEMINI_API_KEY") {
            return Ok(key);
        }

        let path = self.data_dir.join("gemini_api_key");
        if path.exists() {
            let key = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let key = key.trim().to_string();
            if !key.is_empty() {
                return Ok(key);
            }
        }

        bail!(
            "No Gemini API key found. Set GEMINI_API_KEY or write the key to {}",
            path.display()
        )
    }

    pub fn generation_settings(
        &self,
        model: Option<String>,
        timeout_secs: Option<u64>,
    ) -> Result<GenerationSettings> {
        let timeout_secs = match timeout_secs {
            Some(secs) => secs,
            None => match env_nonempty("PANTRY_GENERATION_TIMEOUT_SECS") {
                Some(v) => v
                    .parse()
                    .with_context(|| format!("Invalid PANTRY_GENERATION_TIMEOUT_SECS '{v}'"))?,
                None => DEFAULT_GENERATION_TIMEOUT_SECS,
            },
        };
        if timeout_secs == 0 {
            bail!("Timeout must be greater than 0 seconds");
        }

        Ok(GenerationSettings {
            api_key: self.gemini_api_key()?,
            model: model
                .or_else(|| env_nonempty("PANTRY_MODEL"))
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: env_nonempty("PANTRY_GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Base URL of the callable functions, e.g. `https://us-central1-<project>.cloudfunctions.net`.
    pub fn functions_url(&self) -> Result<String> {
        env_nonempty("PANTRY_FUNCTIONS_URL")
            .context("PANTRY_FUNCTIONS_URL is not set; it should point at the cloud functions base URL")
    }
}

#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

fn env_nonempty(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
