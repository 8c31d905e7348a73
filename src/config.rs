use axum_extra::extract::cookie::Key;
use std::env;
use std::time::Duration;

/// Signing keys for cookies are derived from at least this many bytes.
const MIN_SECRET_KEY_BYTES: usize = 64;

#[derive(Clone, Debug)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub api_host_name: String,
    pub admin_client_user_name: String,
    pub admin_client_secret: String,
    pub secret_key: String,
    pub redis_enabled: bool,
    pub redis_url: String,
    pub template_preview_api_host: String,
    pub template_preview_api_key: String,
    pub template_prefill_api_host: String,
    pub activity_stats_limit_days: i64,
    pub show_styleguide: bool,
    pub notify_environment: String,
    pub api_cache_ttl_seconds: u64,
    pub otel_exporter_endpoint: Option<String>,
    pub service_name: String,
    pub metrics_port: u16,
}

fn env_bool(name: &str) -> bool {
    env::var(name)
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let server_port = env::var("PORT")
            .unwrap_or_else(|_| "6012".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidPort)?;

        let api_host_name = env::var("API_HOST_NAME").unwrap_or_else(|_| "http://localhost:6011".to_string());

        let admin_client_user_name =
            env::var("ADMIN_CLIENT_USER_NAME").unwrap_or_else(|_| "notify-admin".to_string());

        let admin_client_secret =
            env::var("ADMIN_CLIENT_SECRET").map_err(|_| ConfigError::MissingAdminClientSecret)?;

        let secret_key = env::var("SECRET_KEY").map_err(|_| ConfigError::MissingSecretKey)?;
        if secret_key.len() < MIN_SECRET_KEY_BYTES {
            return Err(ConfigError::SecretKeyTooShort(MIN_SECRET_KEY_BYTES));
        }

        let redis_enabled = env_bool("REDIS_ENABLED");
        let redis_url = env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
        if redis_enabled && redis_url.is_empty() {
            return Err(ConfigError::MissingRedisUrl);
        }

        let template_preview_api_host =
            env::var("TEMPLATE_PREVIEW_API_HOST").unwrap_or_else(|_| "http://localhost:6013".to_string());
        let template_preview_api_key =
            env::var("TEMPLATE_PREVIEW_API_KEY").unwrap_or_else(|_| "my-secret-key".to_string());
        let template_prefill_api_host =
            env::var("TEMPLATE_PREFILL_API_HOST").unwrap_or_else(|_| "http://localhost:6014".to_string());

        let activity_stats_limit_days = env::var("ACTIVITY_STATS_LIMIT_DAYS")
            .unwrap_or_else(|_| "7".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidNumber("ACTIVITY_STATS_LIMIT_DAYS"))?;

        let show_styleguide = env_bool("SHOW_STYLEGUIDE");

        let notify_environment = env::var("NOTIFY_ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let api_cache_ttl_seconds = env::var("API_CACHE_TTL_SECONDS")
            .unwrap_or_else(|_| "604800".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidNumber("API_CACHE_TTL_SECONDS"))?;

        let otel_exporter_endpoint = env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok();

        let service_name = env::var("SERVICE_NAME").unwrap_or_else(|_| "notify-admin".to_string());

        let metrics_port = env::var("METRICS_PORT")
            .unwrap_or_else(|_| "9000".to_string())
            .parse()
            .unwrap_or(9000);

        Ok(Config {
            server_host,
            server_port,
            api_host_name,
            admin_client_user_name,
            admin_client_secret,
            secret_key,
            redis_enabled,
            redis_url,
            template_preview_api_host,
            template_preview_api_key,
            template_prefill_api_host,
            activity_stats_limit_days,
            show_styleguide,
            notify_environment,
            api_cache_ttl_seconds,
            otel_exporter_endpoint,
            service_name,
            metrics_port,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// Longer than the load balancer's 60s idle timeout in production and
    /// staging.
    pub fn keep_alive(&self) -> Option<Duration> {
        match self.notify_environment.as_str() {
            "production" | "staging" => Some(Duration::from_secs(75)),
            _ => None,
        }
    }

    pub fn api_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.api_cache_ttl_seconds)
    }

    /// Key that signs the session cookie.
    pub fn cookie_key(&self) -> Result<Key, ConfigError> {
        Key::try_from(self.secret_key.as_bytes())
            .map_err(|_| ConfigError::SecretKeyTooShort(MIN_SECRET_KEY_BYTES))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("ADMIN_CLIENT_SECRET environment variable not set")]
    MissingAdminClientSecret,

    #[error("SECRET_KEY environment variable not set")]
    MissingSecretKey,

    #[error("SECRET_KEY must be at least {0} bytes")]
    SecretKeyTooShort(usize),

    #[error("REDIS_URL must be set when REDIS_ENABLED is on")]
    MissingRedisUrl,

    #[error("Invalid port number")]
    InvalidPort,

    #[error("{0} must be a number")]
    InvalidNumber(&'static str),
}
