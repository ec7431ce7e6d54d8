use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub payment: PaymentConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
    /// Optional listener exposing `/healthz` and `/metrics`.
    #[serde(default)]
    pub admin_addr: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080, worker_threads: Some(4), admin_addr: None }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_secs: u64,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default)]
    pub sqlx_logging: bool,
}

fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 2 }
fn default_connect_timeout() -> u64 { 30 }
fn default_idle_timeout() -> u64 { 600 }
fn default_max_lifetime() -> u64 { 3600 }
fn default_acquire_timeout() -> u64 { 30 }

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl")]
    pub token_ttl_hours: i64,
    #[serde(default)]
    pub admin_email: Option<String>,
    #[serde(default)]
    pub admin_password: Option<String>,
}

fn default_token_ttl() -> i64 { 12 }

impl Default for AuthConfig {
    fn default() -> Self {
        Self { jwt_secret: String::new(), token_ttl_hours: default_token_ttl(), admin_email: None, admin_password: None }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentProvider {
    #[default]
    Mock,
    Http,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    #[serde(default)]
    pub provider: PaymentProvider,
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_payment_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_retry_attempts")]
    pub retry_max_attempts: u32,
    #[serde(default = "default_backoff_base")]
    pub retry_backoff_base_ms: u64,
    #[serde(default = "default_backoff_max")]
    pub retry_backoff_max_ms: u64,
}

fn default_currency() -> String { "USD".into() }
fn default_payment_timeout() -> u64 { 15 }
fn default_retry_attempts() -> u32 { 3 }
fn default_backoff_base() -> u64 { 200 }
fn default_backoff_max() -> u64 { 2000 }

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            provider: PaymentProvider::Mock,
            base_url: String::new(),
            api_key: String::new(),
            currency: default_currency(),
            timeout_secs: default_payment_timeout(),
            retry_max_attempts: default_retry_attempts(),
            retry_backoff_base_ms: default_backoff_base(),
            retry_backoff_max_ms: default_backoff_max(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
    #[serde(default = "default_revenue_months")]
    pub revenue_months: u32,
    #[serde(default = "default_expiry_window")]
    pub expiry_window_days: i64,
}

fn default_cache_ttl() -> u64 { 30 }
fn default_revenue_months() -> u32 { 12 }
fn default_expiry_window() -> i64 { 30 }

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: default_cache_ttl(),
            revenue_months: default_revenue_months(),
            expiry_window_days: default_expiry_window(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingConfig {
    #[serde(default)]
    pub json: bool,
}

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Build a configuration purely from environment variables, used when
    /// no config file is present.
    pub fn from_env() -> Result<Self> {
        let mut cfg = AppConfig::default();
        if let Ok(host) = std::env::var("SERVER_HOST") {
            cfg.server.host = host;
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            cfg.server.port = port;
        }
        cfg.database.max_connections = default_max_connections();
        cfg.database.min_connections = default_min_connections();
        cfg.database.connect_timeout_secs = default_connect_timeout();
        cfg.database.idle_timeout_secs = default_idle_timeout();
        cfg.database.max_lifetime_secs = default_max_lifetime();
        cfg.database.acquire_timeout_secs = default_acquire_timeout();
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.database.normalize_from_env();
        self.database.validate()?;
        self.auth.normalize_from_env();
        self.auth.validate()?;
        self.payment.validate()?;
        self.dashboard.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        match self.worker_threads {
            Some(w) if w > 0 => {}
            _ => self.worker_threads = Some(4),
        }
        if let Some(addr) = &self.admin_addr {
            if addr.trim().is_empty() { self.admin_addr = None; }
        }
        Ok(())
    }
}

impl DatabaseConfig {
    pub fn normalize_from_env(&mut self) {
        if self.url.trim().is_empty() {
            if let Ok(url) = std::env::var("DATABASE_URL") {
                self.url = url;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(anyhow!("database.url is empty; set it in config.toml or DATABASE_URL"));
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("postgresql://") || lower.starts_with("postgres://")) {
            return Err(anyhow!("database.url must start with postgresql:// or postgres://"));
        }
        if self.min_connections == 0 {
            return Err(anyhow!("database.min_connections must be >= 1"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("database.max_connections must be >= min_connections"));
        }
        if self.connect_timeout_secs == 0 || self.acquire_timeout_secs == 0 {
            return Err(anyhow!("database timeouts must be positive seconds"));
        }
        Ok(())
    }
}

impl AuthConfig {
    pub fn normalize_from_env(&mut self) {
        if self.jwt_secret.trim().is_empty() {
            if let Ok(secret) = std::env::var("JWT_SECRET") {
                self.jwt_secret = secret;
            }
        }
        if self.admin_email.is_none() {
            self.admin_email = std::env::var("ADMIN_EMAIL").ok();
        }
        if self.admin_password.is_none() {
            self.admin_password = std::env::var("ADMIN_PASSWORD").ok();
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.jwt_secret.trim().is_empty() {
            return Err(anyhow!("auth.jwt_secret is empty; set it in config.toml or JWT_SECRET"));
        }
        if self.token_ttl_hours <= 0 {
            return Err(anyhow!("auth.token_ttl_hours must be positive"));
        }
        if self.admin_email.is_some() != self.admin_password.is_some() {
            return Err(anyhow!("auth.admin_email and auth.admin_password must be set together"));
        }
        Ok(())
    }
}

impl PaymentConfig {
    pub fn validate(&self) -> Result<()> {
        if self.provider == PaymentProvider::Http {
            let lower = self.base_url.to_lowercase();
            if !(lower.starts_with("http://") || lower.starts_with("https://")) {
                return Err(anyhow!("payment.base_url must start with http(s) when provider = \"http\""));
            }
        }
        if self.currency.len() != 3 || !self.currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(anyhow!("payment.currency must be a 3-letter code"));
        }
        if self.timeout_secs == 0 {
            return Err(anyhow!("payment.timeout_secs must be positive"));
        }
        if self.retry_max_attempts == 0 {
            return Err(anyhow!("payment.retry_max_attempts must be >= 1"));
        }
        if self.retry_backoff_max_ms < self.retry_backoff_base_ms {
            return Err(anyhow!("payment.retry_backoff_max_ms must be >= retry_backoff_base_ms"));
        }
        Ok(())
    }
}

impl DashboardConfig {
    pub fn validate(&self) -> Result<()> {
        if !(1..=36).contains(&self.revenue_months) {
            return Err(anyhow!("dashboard.revenue_months must be within 1..=36"));
        }
        if self.expiry_window_days < 0 {
            return Err(anyhow!("dashboard.expiry_window_days must not be negative"));
        }
        Ok(())
    }
}
