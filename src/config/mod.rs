use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

/// Service configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "shipcheck")]
#[command(about = "Cross-border shipment compliance screening service")]
pub struct Config {
    /// HTTP server listen address
    #[arg(long, default_value = "0.0.0.0:8080", env = "SHIPCHECK_LISTEN_ADDR")]
    pub listen_addr: String,

    /// PostgreSQL connection string (takes precedence over the rulebook file)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Minimum database pool connections
    #[arg(long, default_value = "1", env = "SHIPCHECK_DB_MIN_CONNECTIONS")]
    pub db_min_connections: u32,

    /// Maximum database pool connections
    #[arg(long, default_value = "10", env = "SHIPCHECK_DB_MAX_CONNECTIONS")]
    pub db_max_connections: u32,

    /// Run embedded migrations on startup
    #[arg(long, default_value = "true", env = "SHIPCHECK_RUN_MIGRATIONS")]
    pub run_migrations: bool,

    /// Path to a YAML rulebook (used when no database is configured)
    #[arg(long, env = "SHIPCHECK_RULEBOOK_PATH")]
    pub rulebook_path: Option<PathBuf>,

    /// Rulebook reload check interval in seconds
    #[arg(long, default_value = "30", env = "SHIPCHECK_RULEBOOK_RELOAD_SECS")]
    pub rulebook_reload_secs: u64,

    /// Shipments evaluated concurrently per bulk chunk
    #[arg(long, default_value = "100", env = "SHIPCHECK_BATCH_CHUNK_SIZE")]
    pub batch_chunk_size: usize,

    /// Per-request timeout in seconds
    #[arg(long, default_value = "120", env = "SHIPCHECK_REQUEST_TIMEOUT_SECS")]
    pub request_timeout_secs: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, default_value = "false", env = "SHIPCHECK_LOG_JSON")]
    pub log_json: bool,

    /// Gemini API key; narrative endpoints are disabled without it
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    /// Gemini model name
    #[arg(long, default_value = "gemini-1.5-pro", env = "SHIPCHECK_GEMINI_MODEL")]
    pub gemini_model: String,

    /// Gemini API base URL
    #[arg(
        long,
        default_value = "https://generativelanguage.googleapis.com",
        env = "SHIPCHECK_GEMINI_BASE_URL"
    )]
    pub gemini_base_url: String,

    /// Ollama base URL; enables the local quick check before item assessments
    #[arg(long, env = "OLLAMA_BASE_URL")]
    pub ollama_base_url: Option<String>,

    /// Ollama model name
    #[arg(long, default_value = "llama3", env = "SHIPCHECK_OLLAMA_MODEL")]
    pub ollama_model: String,

    /// Model call timeout in seconds
    #[arg(long, default_value = "60", env = "SHIPCHECK_LLM_TIMEOUT_SECS")]
    pub llm_timeout_secs: u64,

    /// Attempts per model call before giving up
    #[arg(long, default_value = "3", env = "SHIPCHECK_LLM_MAX_ATTEMPTS")]
    pub llm_max_attempts: u32,

    /// Base backoff between model attempts in milliseconds
    #[arg(long, default_value = "1000", env = "SHIPCHECK_LLM_BACKOFF_BASE_MS")]
    pub llm_backoff_base_ms: u64,

    /// Enable graceful shutdown
    #[arg(long, default_value = "true", env = "SHIPCHECK_GRACEFUL_SHUTDOWN")]
    pub graceful_shutdown: bool,

    /// Graceful shutdown timeout in seconds
    #[arg(long, default_value = "30", env = "SHIPCHECK_SHUTDOWN_TIMEOUT_SECS")]
    pub shutdown_timeout_secs: u64,
}

impl Config {
    pub fn rulebook_reload_interval(&self) -> Duration {
        Duration::from_secs(self.rulebook_reload_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_secs)
    }

    pub fn llm_backoff_base(&self) -> Duration {
        Duration::from_millis(self.llm_backoff_base_ms)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }

    /// API key, if set and non-blank.
    pub fn gemini_api_key(&self) -> Option<&str> {
        self.gemini_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    /// Ollama base URL, if set and non-blank.
    pub fn ollama_base_url(&self) -> Option<&str> {
        self.ollama_base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            listen_addr: "0.0.0.0:8080".to_string(),
            database_url: None,
            db_min_connections: 1,
            db_max_connections: 10,
            run_migrations: true,
            rulebook_path: None,
            rulebook_reload_secs: 30,
            batch_chunk_size: 100,
            request_timeout_secs: 120,
            log_level: "info".to_string(),
            log_json: false,
            gemini_api_key: None,
            gemini_model: "gemini-1.5-pro".to_string(),
            gemini_base_url: "https://generativelanguage.googleapis.com".to_string(),
            ollama_base_url: None,
            ollama_model: "llama3".to_string(),
            llm_timeout_secs: 60,
            llm_max_attempts: 3,
            llm_backoff_base_ms: 1000,
            graceful_shutdown: true,
            shutdown_timeout_secs: 30,
        }
    }
}
