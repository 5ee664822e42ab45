//! Environment-backed configuration.
//!
//! Most settings have defaults. Override with `GAPCHECK_*` environment variables.
//! Evaluator credentials are read from `GROQ_API_KEY`; without them the pipeline runs
//! in mock mode.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{
    DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, DEFAULT_CONTROL_DELAY_MS, DEFAULT_MODEL,
    DEFAULT_RELEVANCE_TOP_K,
};

/// Service configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `GAPCHECK_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8000`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Directory holding one `<framework_id>.jsonl` control file per framework.
    pub frameworks_dir: PathBuf,

    /// Directory uploaded documents are written to. Default: `./uploads`.
    pub upload_dir: PathBuf,

    /// Directory for the durable job store. Default: `./job_data`.
    pub job_dir: PathBuf,

    /// Target chunk size in characters. Default: `1000`.
    pub chunk_size: usize,

    /// Characters carried over between consecutive chunks. Default: `100`.
    pub chunk_overlap: usize,

    /// Chunks handed to the evaluator per control. Default: `5`.
    pub relevance_top_k: usize,

    /// Pause between controls to respect provider rate limits. Default: `100ms`.
    pub control_delay: Duration,

    /// Model used by the relevance gate.
    pub fast_model: String,

    /// Model used by gap analysis.
    pub balanced_model: String,

    /// Model used by final scoring.
    pub precise_model: String,

    /// Language generated justifications and recommendations should be written in.
    pub response_language: Option<String>,

    /// Jobs older than this are swept from the store. Default: 30 days.
    pub job_retention: Duration,

    /// `true` when `GROQ_API_KEY` is set to a non-empty value.
    pub llm_credentials_present: bool,

    /// Forces mock evaluation even when credentials are present.
    pub force_mock_evaluator: bool,
}

const SECS_PER_DAY: u64 = 24 * 60 * 60;

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8000,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            frameworks_dir: PathBuf::from("./frameworks"),
            upload_dir: PathBuf::from("./uploads"),
            job_dir: PathBuf::from("./job_data"),
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            relevance_top_k: DEFAULT_RELEVANCE_TOP_K,
            control_delay: Duration::from_millis(DEFAULT_CONTROL_DELAY_MS),
            fast_model: DEFAULT_MODEL.to_string(),
            balanced_model: DEFAULT_MODEL.to_string(),
            precise_model: DEFAULT_MODEL.to_string(),
            response_language: None,
            job_retention: Duration::from_secs(30 * SECS_PER_DAY),
            llm_credentials_present: false,
            force_mock_evaluator: false,
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "GAPCHECK_PORT";
    const ENV_BIND_ADDR: &'static str = "GAPCHECK_BIND_ADDR";
    const ENV_FRAMEWORKS_DIR: &'static str = "GAPCHECK_FRAMEWORKS_DIR";
    const ENV_UPLOAD_DIR: &'static str = "GAPCHECK_UPLOAD_DIR";
    const ENV_JOB_DIR: &'static str = "GAPCHECK_JOB_DIR";
    const ENV_CHUNK_SIZE: &'static str = "GAPCHECK_CHUNK_SIZE";
    const ENV_CHUNK_OVERLAP: &'static str = "GAPCHECK_CHUNK_OVERLAP";
    const ENV_RELEVANCE_TOP_K: &'static str = "GAPCHECK_RELEVANCE_TOP_K";
    const ENV_CONTROL_DELAY_MS: &'static str = "GAPCHECK_CONTROL_DELAY_MS";
    const ENV_FAST_MODEL: &'static str = "GAPCHECK_FAST_MODEL";
    const ENV_BALANCED_MODEL: &'static str = "GAPCHECK_BALANCED_MODEL";
    const ENV_PRECISE_MODEL: &'static str = "GAPCHECK_PRECISE_MODEL";
    const ENV_RESPONSE_LANGUAGE: &'static str = "GAPCHECK_RESPONSE_LANGUAGE";
    const ENV_JOB_RETENTION_DAYS: &'static str = "GAPCHECK_JOB_RETENTION_DAYS";
    const ENV_MOCK_EVALUATOR: &'static str = "GAPCHECK_MOCK_EVALUATOR";
    const ENV_API_KEY: &'static str = "GROQ_API_KEY";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let frameworks_dir =
            Self::parse_path_from_env(Self::ENV_FRAMEWORKS_DIR, defaults.frameworks_dir);
        let upload_dir = Self::parse_path_from_env(Self::ENV_UPLOAD_DIR, defaults.upload_dir);
        let job_dir = Self::parse_path_from_env(Self::ENV_JOB_DIR, defaults.job_dir);
        let chunk_size = Self::parse_usize_from_env(Self::ENV_CHUNK_SIZE, defaults.chunk_size);
        let chunk_overlap =
            Self::parse_usize_from_env(Self::ENV_CHUNK_OVERLAP, defaults.chunk_overlap);
        let relevance_top_k =
            Self::parse_usize_from_env(Self::ENV_RELEVANCE_TOP_K, defaults.relevance_top_k);
        let control_delay = env::var(Self::ENV_CONTROL_DELAY_MS)
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.control_delay);
        let fast_model = Self::parse_string_from_env(Self::ENV_FAST_MODEL, defaults.fast_model);
        let balanced_model =
            Self::parse_string_from_env(Self::ENV_BALANCED_MODEL, defaults.balanced_model);
        let precise_model =
            Self::parse_string_from_env(Self::ENV_PRECISE_MODEL, defaults.precise_model);
        let response_language = Self::parse_optional_string_from_env(Self::ENV_RESPONSE_LANGUAGE);
        let job_retention = env::var(Self::ENV_JOB_RETENTION_DAYS)
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(|days| Duration::from_secs(days * SECS_PER_DAY))
            .unwrap_or(defaults.job_retention);
        let llm_credentials_present = Self::parse_optional_string_from_env(Self::ENV_API_KEY)
            .is_some();
        let force_mock_evaluator = env::var(Self::ENV_MOCK_EVALUATOR)
            .map(|v| v != "false" && v != "0" && !v.is_empty())
            .unwrap_or(false);

        Ok(Self {
            port,
            bind_addr,
            frameworks_dir,
            upload_dir,
            job_dir,
            chunk_size,
            chunk_overlap,
            relevance_top_k,
            control_delay,
            fast_model,
            balanced_model,
            precise_model,
            response_language,
            job_retention,
            llm_credentials_present,
            force_mock_evaluator,
        })
    }

    /// Validates paths and basic invariants (does not create directories).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::ZeroValue { name: "chunk size" });
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(ConfigError::InvalidChunking {
                size: self.chunk_size,
                overlap: self.chunk_overlap,
            });
        }
        if self.relevance_top_k == 0 {
            return Err(ConfigError::ZeroValue {
                name: "relevance top-k",
            });
        }

        if !self.frameworks_dir.exists() {
            return Err(ConfigError::PathNotFound {
                path: self.frameworks_dir.clone(),
            });
        }

        for dir in [&self.frameworks_dir, &self.upload_dir, &self.job_dir] {
            if dir.exists() && !dir.is_dir() {
                return Err(ConfigError::NotADirectory { path: dir.clone() });
            }
        }

        Ok(())
    }

    /// Returns `true` when the staged evaluator can reach a model provider.
    pub fn evaluator_available(&self) -> bool {
        self.llm_credentials_present && !self.force_mock_evaluator
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        env::var(var_name).map(PathBuf::from).unwrap_or(default)
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        Self::parse_optional_string_from_env(var_name).unwrap_or(default)
    }

    fn parse_usize_from_env(var_name: &str, default: usize) -> usize {
        env::var(var_name)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }
}
