use std::env;
use std::str::FromStr;

/// Deployment environment. Production turns on secure session cookies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Ok(Environment::Development),
            "prod" | "production" => Ok(Environment::Production),
            other => Err(format!("unknown environment: {}", other)),
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StripeConfig {
    /// Publishable key, rendered into checkout pages
    pub publishable_key: String,
    /// Secret key, used for server-side API calls
    pub secret_key: String,
    pub api_base: String,
}

/// Per-IP request budgets for the API server.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    /// Endpoints that call the payment processor
    pub strict_rpm: u32,
    pub standard_rpm: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            strict_rpm: 10,
            standard_rpm: 60,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub env: Environment,
    /// SQLite database file (the store's DSN)
    pub database_path: String,
    /// Base URL of the API server, handed to checkout pages
    pub api_url: String,
    pub stripe: StripeConfig,
    pub session_lifetime_hours: i64,
    /// Budget for a single database call, in seconds
    pub db_timeout_secs: u64,
    pub rate_limit: RateLimitConfig,
    /// Directory served under `/static` by the storefront
    pub static_dir: String,
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let env = env::var("STOREFRONT_ENV")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_default();

        let defaults = RateLimitConfig::default();

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env_parse("PORT", 4000),
            env,
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "storefront.db".to_string()),
            api_url: env::var("API_URL").unwrap_or_else(|_| "http://localhost:4001".to_string()),
            stripe: StripeConfig {
                publishable_key: env::var("STRIPE_KEY").unwrap_or_default(),
                secret_key: env::var("STRIPE_SECRET_KEY").unwrap_or_default(),
                api_base: env::var("STRIPE_API_BASE")
                    .unwrap_or_else(|_| "https://api.stripe.com".to_string()),
            },
            session_lifetime_hours: env_parse("SESSION_LIFETIME_HOURS", 24),
            db_timeout_secs: env_parse("DB_TIMEOUT_SECS", 3),
            rate_limit: RateLimitConfig {
                strict_rpm: env_parse("RATE_LIMIT_STRICT_RPM", defaults.strict_rpm),
                standard_rpm: env_parse("RATE_LIMIT_STANDARD_RPM", defaults.standard_rpm),
            },
            static_dir: env::var("STATIC_DIR").unwrap_or_else(|_| "static".to_string()),
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn is_production(&self) -> bool {
        self.env == Environment::Production
    }
}
