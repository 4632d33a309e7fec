use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::utils::validate_and_normalize_url;

const IOS_USER_AGENT: &str =
    "com.google.ios.youtube/19.29.1 (iPhone14,5; U; CPU iOS 17_5_1 like Mac OS X;)";
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/116.0.0.0 Safari/537.36";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Provider endpoints and request identity
    pub providers: ProvidersConfig,

    /// Session and file settings
    pub batch: BatchConfig,

    /// Column names in the row source
    pub columns: ColumnsConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub voicetube: VoiceTubeConfig,
    pub youtube: YouTubeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceTubeConfig {
    /// API host, without trailing slash
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YouTubeConfig {
    /// API host, without trailing slash
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Caption language requested
    pub language: String,

    /// Client context sent with every transcript request
    pub client: ClientContext,
}

/// Client identity embedded in the request body and headers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientContext {
    pub hl: String,
    pub gl: String,
    pub client_name: String,
    pub client_version: String,
    pub device_model: String,
    pub user_agent: String,
    pub time_zone: String,

    /// Numeric client id sent as `X-Youtube-Client-Name`
    pub client_name_header: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Delimited row file listing the items
    pub rows_file: PathBuf,

    /// Checkpoint file
    pub progress_file: PathBuf,

    /// Output directory for VoiceTube transcripts
    pub voicetube_dir: PathBuf,

    /// Output directory for YouTube transcripts
    pub youtube_dir: PathBuf,

    /// Items processed per session before stopping
    pub max_per_session: usize,

    /// Fetch attempts per provider per item
    pub max_retries: u32,

    /// Pause between failed attempts and between items, in seconds
    pub delay_secs: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnsConfig {
    pub id: String,
    pub voicetube: String,
    pub youtube: String,
}

impl Default for VoiceTubeConfig {
    fn default() -> Self {
        Self {
            base_url: "https://vtapi.voicetube.com".to_string(),
            timeout_secs: 15,
            user_agent: BROWSER_USER_AGENT.to_string(),
        }
    }
}

impl Default for YouTubeConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.youtube.com".to_string(),
            timeout_secs: 30,
            language: "en".to_string(),
            client: ClientContext::default(),
        }
    }
}

impl Default for ClientContext {
    fn default() -> Self {
        Self {
            hl: "en".to_string(),
            gl: "US".to_string(),
            client_name: "IOS".to_string(),
            client_version: "19.29.1".to_string(),
            device_model: "iPhone14,5".to_string(),
            user_agent: IOS_USER_AGENT.to_string(),
            time_zone: "Asia/Ho_Chi_Minh".to_string(),
            client_name_header: "5".to_string(),
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            rows_file: PathBuf::from("allvideos_rows.csv"),
            progress_file: PathBuf::from("progress.json"),
            voicetube_dir: PathBuf::from("vtsubtitle"),
            youtube_dir: PathBuf::from("ytsubtitle"),
            max_per_session: 100,
            max_retries: 3,
            delay_secs: 3.5,
        }
    }
}

impl Default for ColumnsConfig {
    fn default() -> Self {
        Self {
            id: "id".to_string(),
            voicetube: "vtid".to_string(),
            youtube: "ytid".to_string(),
        }
    }
}

impl VoiceTubeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl YouTubeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl BatchConfig {
    /// Pause applied between failed attempts and between items
    pub fn delay(&self) -> Duration {
        Duration::from_secs_f64(self.delay_secs)
    }
}

impl Config {
    /// Load configuration from file, falling back to defaults
    pub async fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::debug!("No config file at {}, using defaults", config_path.display());
            Ok(Self::default())
        }
    }

    /// Load and validate configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs_err::read_to_string(path).context("Failed to read config file")?;

        let config: Config =
            serde_yaml::from_str(&content).context("Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save(&self) -> Result<PathBuf> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self).context("Failed to serialize config")?;

        fs_err::write(&config_path, content).context("Failed to write config file")?;

        Ok(config_path)
    }

    /// Get configuration file path
    pub fn config_path() -> Result<PathBuf> {
        // A file in the working directory wins
        let local_config = PathBuf::from("harvester.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir().context("Could not determine config directory")?;

        Ok(config_dir.join("subtitle-harvester").join("config.yaml"))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.batch.max_per_session == 0 {
            anyhow::bail!("batch.max_per_session must be at least 1");
        }

        if self.batch.max_retries == 0 {
            anyhow::bail!("batch.max_retries must be at least 1");
        }

        if !self.batch.delay_secs.is_finite() || self.batch.delay_secs < 0.0 {
            anyhow::bail!("batch.delay_secs must be a non-negative number of seconds");
        }

        validate_and_normalize_url(&self.providers.voicetube.base_url)
            .context("Invalid providers.voicetube.base_url")?;
        validate_and_normalize_url(&self.providers.youtube.base_url)
            .context("Invalid providers.youtube.base_url")?;

        if self.providers.youtube.language.trim().is_empty() {
            anyhow::bail!("providers.youtube.language must not be empty");
        }

        Ok(())
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  Rows File: {}", self.batch.rows_file.display());
        println!("  Progress File: {}", self.batch.progress_file.display());
        println!("  VoiceTube Output: {}", self.batch.voicetube_dir.display());
        println!("  YouTube Output: {}", self.batch.youtube_dir.display());
        println!("  Max Per Session: {}", self.batch.max_per_session);
        println!("  Max Retries: {}", self.batch.max_retries);
        println!("  Delay: {}s", self.batch.delay_secs);
        println!("  VoiceTube API: {}", self.providers.voicetube.base_url);
        println!("  YouTube API: {}", self.providers.youtube.base_url);
        println!("  YouTube Language: {}", self.providers.youtube.language);
    }
}
