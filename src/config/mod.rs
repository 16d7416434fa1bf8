mod file_config;

pub use file_config::{FetchConfig, FileConfig};

use anyhow::{bail, Result};
use std::path::{Path, PathBuf};

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_MXM_MATCHES_URL: &str =
    "http://millionsongdataset.com/sites/default/files/AdditionalFiles/mxm_779k_matches.txt.zip";
pub const DEFAULT_TAGTRAUM_URL: &str = "https://www.tagtraum.com/genres/msd_tagtraum_cd2c.cls.zip";
pub const DEFAULT_GENIUS_API_BASE: &str = "https://api.genius.com";

/// CLI arguments that can be used for config resolution.
/// Only the values shared by the stage binaries live here, stage specific
/// flags (chunk size, window bounds) stay in the binary that owns them.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub data_dir: Option<PathBuf>,
    pub genius_access_token: Option<String>,
    pub concurrency: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    // Core settings
    pub data_dir: PathBuf,
    pub genius_access_token: Option<String>,
    pub concurrency: usize,

    // Remote sources
    pub mxm_matches_url: String,
    pub tagtraum_url: String,
    pub genius_api_base: String,
    pub request_timeout_secs: u64,
    pub remove_section_headers: bool,

    // Feature configs (with defaults)
    pub fetch: FetchSettings,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let data_dir = file
            .data_dir
            .map(PathBuf::from)
            .or_else(|| cli.data_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        if data_dir.exists() && !data_dir.is_dir() {
            bail!("data_dir is not a directory: {:?}", data_dir);
        }

        let genius_access_token = file
            .genius_access_token
            .or_else(|| cli.genius_access_token.clone())
            .filter(|token| !token.trim().is_empty());

        let concurrency = file
            .concurrency
            .or(cli.concurrency)
            .unwrap_or_else(default_concurrency);
        if concurrency == 0 {
            bail!("concurrency must be at least 1");
        }

        let fetch_file = file.fetch.unwrap_or_default();
        let defaults = FetchSettings::default();
        let fetch = FetchSettings {
            max_retries: fetch_file.max_retries.unwrap_or(defaults.max_retries),
            initial_backoff_ms: fetch_file
                .initial_backoff_ms
                .unwrap_or(defaults.initial_backoff_ms),
            max_backoff_ms: fetch_file.max_backoff_ms.unwrap_or(defaults.max_backoff_ms),
            backoff_multiplier: fetch_file
                .backoff_multiplier
                .unwrap_or(defaults.backoff_multiplier),
        };
        if fetch.backoff_multiplier < 1.0 {
            bail!(
                "fetch.backoff_multiplier must be >= 1.0, got {}",
                fetch.backoff_multiplier
            );
        }

        Ok(Self {
            data_dir,
            genius_access_token,
            concurrency,
            mxm_matches_url: file
                .mxm_matches_url
                .unwrap_or_else(|| DEFAULT_MXM_MATCHES_URL.to_string()),
            tagtraum_url: file
                .tagtraum_url
                .unwrap_or_else(|| DEFAULT_TAGTRAUM_URL.to_string()),
            genius_api_base: file
                .genius_api_base
                .unwrap_or_else(|| DEFAULT_GENIUS_API_BASE.to_string()),
            request_timeout_secs: file.request_timeout_secs.unwrap_or(30),
            remove_section_headers: file.remove_section_headers.unwrap_or(true),
            fetch,
        })
    }

    /// Loads the optional TOML file and resolves it against the CLI values.
    pub fn load(cli: &CliConfig, config_path: Option<&Path>) -> Result<Self> {
        let file_config = config_path.map(FileConfig::load).transpose()?;
        Self::resolve(cli, file_config)
    }

    /// The Genius access token, which only the lyrics fetch stage needs.
    pub fn require_genius_token(&self) -> Result<&str> {
        match self.genius_access_token.as_deref() {
            Some(token) => Ok(token),
            None => bail!(
                "No Genius access token configured. Set GENIUS_ACCESS_TOKEN, pass --genius-token \
                 or add genius_access_token to the config file"
            ),
        }
    }

    pub fn mxm_db_path(&self) -> PathBuf {
        self.data_dir.join("mxm_dataset.db")
    }

    pub fn msd_to_mxm_path(&self) -> PathBuf {
        self.data_dir.join("msd_to_mxm.csv")
    }

    pub fn mxm_matches_path(&self) -> PathBuf {
        self.data_dir.join("mxm_779k_matches.txt")
    }

    pub fn tagtraum_path(&self) -> PathBuf {
        self.data_dir.join("msd_tagtraum_cd2c.cls")
    }

    pub fn data_no_lyrics_path(&self) -> PathBuf {
        self.data_dir.join("data_no_lyrics.csv")
    }

    pub fn lyric_chunks_dir(&self) -> PathBuf {
        self.data_dir.join("lyric_chunks")
    }

    pub fn merged_lyrics_path(&self) -> PathBuf {
        self.data_dir.join("genius_api_data.json")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchSettings {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub backoff_multiplier: f64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            max_retries: 8,
            initial_backoff_ms: 500,
            max_backoff_ms: 30_000,
            backoff_multiplier: 2.0,
        }
    }
}

fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
