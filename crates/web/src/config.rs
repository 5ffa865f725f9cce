//! Site configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `RECIPE_FINDER_SESSION_SECRET` - Session signing secret (min 32 chars, high entropy)
//! - `SPOONACULAR_API_KEY` - API key for the Spoonacular recipe API
//!
//! ## Optional
//! - `RECIPE_FINDER_DATABASE_URL` - `SQLite` connection string (falls back to
//!   `DATABASE_URL`, then `sqlite://recipe_finder.db`)
//! - `RECIPE_FINDER_HOST` - Bind address (default: 127.0.0.1)
//! - `RECIPE_FINDER_PORT` - Listen port (default: 3000)
//! - `RECIPE_FINDER_BASE_URL` - Public URL (default: `http://localhost:<port>`)
//! - `SPOONACULAR_BASE_URL` - API root (default: `https://api.spoonacular.com`)
//! - `SPOONACULAR_RESULTS` - Number of search results per query (default: 10)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Performance trace sample rate (default: 0.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_SESSION_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const MAX_RESULTS_PER_SEARCH: u32 = 100;
const DEFAULT_DATABASE_URL: &str = "sqlite://recipe_finder.db";
const DEFAULT_SPOONACULAR_BASE_URL: &str = "https://api.spoonacular.com";

/// Fragments that mark a copied-from-docs secret (matched case-insensitively).
const PLACEHOLDER_FRAGMENTS: &[&str] = &[
    "your-",
    "changeme",
    "change-this",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "replace",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Site configuration.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// `SQLite` database connection URL
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the site
    pub base_url: String,
    /// Session signing secret
    pub session_secret: SecretString,
    /// Recipe API configuration
    pub recipes: RecipeApiConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name (e.g. "production")
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

/// Spoonacular recipe API configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct RecipeApiConfig {
    /// API root, without trailing slash
    pub base_url: String,
    /// API key sent as the `apiKey` query parameter
    pub api_key: SecretString,
    /// Number of results requested per search
    pub results_per_search: u32,
}

impl std::fmt::Debug for RecipeApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecipeApiConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("results_per_search", &self.results_per_search)
            .finish()
    }
}

impl SiteConfig {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is read first if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing, a value does
    /// not parse, or the session secret is too weak.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let port: u16 = env_parse("RECIPE_FINDER_PORT", "3000")?;
        let session_secret = env_required("RECIPE_FINDER_SESSION_SECRET")?;
        check_session_secret(session_secret.expose_secret()).map_err(|reason| {
            ConfigError::InsecureSecret("RECIPE_FINDER_SESSION_SECRET".into(), reason)
        })?;

        Ok(Self {
            database_url: database_url(),
            host: env_parse("RECIPE_FINDER_HOST", "127.0.0.1")?,
            port,
            base_url: env_optional("RECIPE_FINDER_BASE_URL")
                .unwrap_or_else(|| format!("http://localhost:{port}")),
            session_secret,
            recipes: RecipeApiConfig::from_env()?,
            sentry_dsn: env_optional("SENTRY_DSN"),
            sentry_environment: env_optional("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: env_parse("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: env_parse("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

/// Load only the database URL.
///
/// For tools such as the CLI that touch the database but never serve HTTP,
/// and so have no session secret or API key configured.
#[must_use]
pub fn database_url_from_env() -> SecretString {
    let _ = dotenvy::dotenv();
    database_url()
}

impl RecipeApiConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let raw_base = env_optional("SPOONACULAR_BASE_URL")
            .unwrap_or_else(|| DEFAULT_SPOONACULAR_BASE_URL.to_owned());
        let base_url = raw_base.trim_end_matches('/').to_owned();
        if let Err(e) = url::Url::parse(&base_url) {
            return Err(ConfigError::InvalidEnvVar("SPOONACULAR_BASE_URL".into(), e.to_string()));
        }

        let results_per_search: u32 = env_parse("SPOONACULAR_RESULTS", "10")?;
        if !(1..=MAX_RESULTS_PER_SEARCH).contains(&results_per_search) {
            return Err(ConfigError::InvalidEnvVar(
                "SPOONACULAR_RESULTS".into(),
                format!("must be between 1 and {MAX_RESULTS_PER_SEARCH}"),
            ));
        }

        Ok(Self {
            base_url,
            api_key: env_required("SPOONACULAR_API_KEY")?,
            results_per_search,
        })
    }
}

// =============================================================================
// Environment Helpers
// =============================================================================

/// A required, non-blank variable, wrapped as a secret.
fn env_required(key: &str) -> Result<SecretString, ConfigError> {
    env_optional(key)
        .filter(|v| !v.trim().is_empty())
        .map(SecretString::from)
        .ok_or_else(|| ConfigError::MissingEnvVar(key.into()))
}

/// A variable that is unset or empty reads as `None`.
fn env_optional(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Parse a variable, using `default` when it is unset.
fn env_parse<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = env_optional(key);
    raw.as_deref()
        .unwrap_or(default)
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.into(), e.to_string()))
}

/// `RECIPE_FINDER_DATABASE_URL`, then `DATABASE_URL`, then the local file.
fn database_url() -> SecretString {
    let url = env_optional("RECIPE_FINDER_DATABASE_URL")
        .or_else(|| env_optional("DATABASE_URL"))
        .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_owned());
    SecretString::from(url)
}

// =============================================================================
// Session Secret Checks
// =============================================================================

/// Reject short, placeholder-looking or low-entropy session secrets.
///
/// Returns the reason on failure.
fn check_session_secret(secret: &str) -> Result<(), String> {
    let length = secret.chars().count();
    if length < MIN_SESSION_SECRET_LENGTH {
        return Err(format!(
            "must be at least {MIN_SESSION_SECRET_LENGTH} characters (got {length})"
        ));
    }

    let lower = secret.to_lowercase();
    if let Some(fragment) = PLACEHOLDER_FRAGMENTS.iter().find(|f| lower.contains(**f)) {
        return Err(format!("looks like a placeholder (contains '{fragment}')"));
    }

    let entropy = bits_per_char(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(format!(
            "entropy too low ({entropy:.2} bits/char, need {MIN_ENTROPY_BITS_PER_CHAR:.1}); generate it randomly"
        ));
    }

    Ok(())
}

/// Shannon entropy of the character distribution, in bits per character.
#[allow(clippy::cast_precision_loss)]
fn bits_per_char(s: &str) -> f64 {
    let mut counts: HashMap<char, u32> = HashMap::new();
    for c in s.chars() {
        *counts.entry(c).or_default() += 1;
    }

    let total: u32 = counts.values().sum();
    if total == 0 {
        return 0.0;
    }

    counts
        .values()
        .map(|&n| f64::from(n) / f64::from(total))
        .map(|p| -p * p.log2())
        .sum()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_config() -> SiteConfig {
        SiteConfig {
            database_url: SecretString::from("sqlite::memory:"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            session_secret: SecretString::from("x".repeat(32)),
            recipes: RecipeApiConfig {
                base_url: DEFAULT_SPOONACULAR_BASE_URL.to_string(),
                api_key: SecretString::from("spoonacular-test-key"),
                results_per_search: 10,
            },
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    #[test]
    fn test_bits_per_char() {
        assert!(bits_per_char("").abs() < f64::EPSILON);
        assert!(bits_per_char("zzzzzz").abs() < f64::EPSILON);
        assert!((bits_per_char("ab") - 1.0).abs() < 0.01);
        assert!(bits_per_char("q8Zp3Lm7Vx2Rt9Kc") > MIN_ENTROPY_BITS_PER_CHAR);
    }

    #[test]
    fn test_session_secret_length() {
        let err = check_session_secret("q8Zp3Lm7").unwrap_err();
        assert!(err.contains("got 8"));
    }

    #[test]
    fn test_session_secret_rejects_placeholders() {
        // A typical copy-pasted default.
        let err = check_session_secret("your-secret-key-change-this-in-production").unwrap_err();
        assert!(err.contains("placeholder"));
    }

    #[test]
    fn test_session_secret_rejects_low_entropy() {
        let err = check_session_secret(&"ab".repeat(16)).unwrap_err();
        assert!(err.contains("entropy"));
    }

    #[test]
    fn test_session_secret_accepts_random_value() {
        assert!(check_session_secret("q8Zp3Lm7Vx2Rt9Kc4Wn6Bh1Jd5Fs0Gy8Ue").is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let addr = sample_config().socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_is_secure_follows_base_url_scheme() {
        let mut config = sample_config();
        assert!(!config.is_secure());
        config.base_url = "https://recipes.example.org".to_string();
        assert!(config.is_secure());
    }

    #[test]
    fn test_recipe_config_debug_redacts_api_key() {
        let debug_output = format!("{:?}", sample_config().recipes);

        assert!(debug_output.contains("api.spoonacular.com"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("spoonacular-test-key"));
    }
}
