use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use lexi_algo::SchedulerParams;

const DEFAULT_DEEPL_URL: &str = "https://api-free.deepl.com/v2/translate";
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
const DEFAULT_EMBEDDING_ENDPOINT: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub request_timeout: Duration,
    pub database: DatabaseConfig,
    pub scheduler: SchedulerParams,
    pub alignment: AlignmentConfig,
    pub translator: TranslatorConfig,
    pub embedding: EmbeddingConfig,
}

impl Config {
    pub fn from_env() -> Self {
        let port = env_parse::<u16>("PORT").unwrap_or(5000);

        let host = env_parse::<IpAddr>("HOST").unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));

        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Self {
            host,
            port,
            log_level,
            request_timeout: Duration::from_secs(env_parse("REQUEST_TIMEOUT_SECS").unwrap_or(30)),
            database: DatabaseConfig::from_env(),
            scheduler: scheduler_params_from_env(),
            alignment: AlignmentConfig::from_env(),
            translator: TranslatorConfig::from_env(),
            embedding: EmbeddingConfig::from_env(),
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub max_connections: u32,
    pub busy_timeout: Duration,
}

impl DatabaseConfig {
    pub fn from_env() -> Self {
        let path = env_string("DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(default_db_path);

        Self {
            path,
            max_connections: env_parse("SQLITE_MAX_CONNECTIONS").unwrap_or(5).max(1),
            busy_timeout: Duration::from_millis(env_parse("SQLITE_BUSY_TIMEOUT_MS").unwrap_or(30_000)),
        }
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_connections: 5,
            busy_timeout: Duration::from_secs(30),
        }
    }
}

fn default_db_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("lexi")
        .join("vocabulary.db")
}

#[derive(Debug, Clone)]
pub struct AlignmentConfig {
    pub cache_capacity: usize,
    pub threshold: f64,
}

impl AlignmentConfig {
    pub fn from_env() -> Self {
        Self {
            cache_capacity: env_parse("ALIGNMENT_CACHE_CAPACITY").unwrap_or(1024).max(1),
            threshold: env_parse("ALIGNMENT_THRESHOLD").unwrap_or(0.3),
        }
    }
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            cache_capacity: 1024,
            threshold: 0.3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TranslatorConfig {
    pub api_key: Option<String>,
    pub api_url: String,
    pub timeout: Duration,
    pub cache_capacity: usize,
}

impl TranslatorConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: env_string("DEEPL_API_KEY"),
            api_url: env_string("DEEPL_API_URL").unwrap_or_else(|| DEFAULT_DEEPL_URL.to_string()),
            timeout: Duration::from_millis(env_parse("DEEPL_TIMEOUT_MS").unwrap_or(15_000)),
            cache_capacity: env_parse("TRANSLATION_CACHE_CAPACITY").unwrap_or(4096).max(1),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub api_endpoint: String,
    pub timeout: Duration,
    pub dimension: usize,
}

impl EmbeddingConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: env_string("EMBEDDING_API_KEY"),
            model: env_string("EMBEDDING_MODEL").unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
            api_endpoint: normalize_endpoint(
                env_string("EMBEDDING_API_ENDPOINT")
                    .or_else(|| env_string("EMBEDDING_BASE_URL"))
                    .unwrap_or_else(|| DEFAULT_EMBEDDING_ENDPOINT.to_string()),
            ),
            timeout: Duration::from_millis(env_parse("EMBEDDING_TIMEOUT").unwrap_or(60_000)),
            dimension: env_parse("EMBEDDING_DIMENSION").unwrap_or(1536),
        }
    }

    pub fn is_available(&self) -> bool {
        self.api_key.as_deref().is_some_and(|v| !v.trim().is_empty())
            && !self.model.trim().is_empty()
            && !self.api_endpoint.trim().is_empty()
    }
}

/// Largest accepted `FSRS_MAXIMUM_INTERVAL_DAYS`, well inside chrono's range.
pub const MAX_INTERVAL_CEILING_DAYS: f64 = 1_000_000.0;

fn maximum_interval_days(raw: Option<f64>, defaults: &SchedulerParams) -> f64 {
    raw.filter(|d| d.is_finite() && *d >= defaults.minimum_interval_days)
        .map(|d| d.min(MAX_INTERVAL_CEILING_DAYS))
        .unwrap_or(defaults.maximum_interval_days)
}

fn scheduler_params_from_env() -> SchedulerParams {
    let defaults = SchedulerParams::default();
    SchedulerParams {
        desired_retention: env_parse::<f64>("FSRS_DESIRED_RETENTION")
            .filter(|r| *r > 0.0 && *r < 1.0)
            .unwrap_or(defaults.desired_retention),
        maximum_interval_days: maximum_interval_days(env_parse("FSRS_MAXIMUM_INTERVAL_DAYS"), &defaults),
        learning_steps: env_parse("FSRS_LEARNING_STEPS").unwrap_or(defaults.learning_steps),
        relearning_steps: env_parse("FSRS_RELEARNING_STEPS").unwrap_or(defaults.relearning_steps),
        ..defaults
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env_string(key)?.trim().parse().ok()
}

fn normalize_endpoint(endpoint: String) -> String {
    let trimmed = endpoint.trim().trim_end_matches('/');
    if trimmed.ends_with("/v1") || trimmed.contains("/v1/") {
        trimmed.to_string()
    } else {
        format!("{trimmed}/v1")
    }
}
