//! Application configuration loaded from environment variables.

/// Server configuration with sensible defaults.
///
/// Reads from environment variables (a `.env` file is loaded first by `main`):
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `5000`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `DATABASE_URL` — PostgreSQL URL; unset runs on the in-memory store
/// - `DATABASE_MAX_CONNECTIONS` — pool size (default: `5`)
/// - `COURSES_TABLE_SCHEMA` — schema holding the courses table (default: search path)
/// - `API_TOKEN` — the accepted API token; unset rejects every protected request
/// - `API_TOKEN_USER` — user name bound to the token (default: `"appuser"`)
/// - `API_TOKEN_HEADER` — header carrying the token (default: `"API_TOKEN"`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub table_schema: Option<String>,
    pub api_token: Option<String>,
    pub api_user: String,
    pub token_header: String,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from an arbitrary key lookup.
    ///
    /// Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Self {
            host: var("HOST").unwrap_or(defaults.host),
            port: var("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: var("RUST_LOG").unwrap_or(defaults.log_level),
            database_url: var("DATABASE_URL"),
            max_connections: var("DATABASE_MAX_CONNECTIONS")
                .and_then(|n| n.parse().ok())
                .unwrap_or(defaults.max_connections),
            table_schema: var("COURSES_TABLE_SCHEMA"),
            api_token: var("API_TOKEN"),
            api_user: var("API_TOKEN_USER").unwrap_or(defaults.api_user),
            token_header: var("API_TOKEN_HEADER").unwrap_or(defaults.token_header),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            log_level: "info".to_string(),
            database_url: None,
            max_connections: 5,
            table_schema: None,
            api_token: None,
            api_user: "appuser".to_string(),
            token_header: "API_TOKEN".to_string(),
        }
    }
}
