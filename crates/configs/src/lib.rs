use anyhow::Result;
use serde::Deserialize;
use anyhow::{anyhow, Context};

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
    #[serde(default = "default_media_dir")]
    pub media_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080, worker_threads: Some(4), media_dir: default_media_dir() }
    }
}

#[derive(Debug, Clone, Deserialize)]
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

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            max_lifetime_secs: default_max_lifetime(),
            acquire_timeout_secs: default_acquire_timeout(),
            sqlx_logging: false,
        }
    }
}

/// Home feed response cache.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
    #[serde(default = "default_cache_capacity")]
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_secs: default_cache_ttl(), max_capacity: default_cache_capacity() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaginationConfig {
    #[serde(default = "default_per_page")]
    pub per_page: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self { per_page: default_per_page() }
    }
}

fn default_media_dir() -> String { "media".into() }
fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 2 }
fn default_connect_timeout() -> u64 { 30 }
fn default_idle_timeout() -> u64 { 600 }
fn default_max_lifetime() -> u64 { 3600 }
fn default_acquire_timeout() -> u64 { 30 }
fn default_cache_ttl() -> u64 { 20 }
fn default_cache_capacity() -> u64 { 1000 }
fn default_per_page() -> u64 { 10 }

fn config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string())
}

pub fn load_default() -> Result<AppConfig> {
    load_from_file(&config_path())
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

    /// File config if present, otherwise defaults; env fills the database URL.
    pub fn load_or_default() -> Result<Self> {
        Self::load_or_default_from(&config_path())
    }

    /// Like [`AppConfig::load_or_default`] for an explicit path. Only a
    /// missing file falls back to defaults; unreadable or malformed files
    /// are errors.
    pub fn load_or_default_from(path: &str) -> Result<Self> {
        let mut cfg = match std::fs::read_to_string(path) {
            Ok(content) => parse(&content).with_context(|| format!("invalid config file {path}"))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => AppConfig::default(),
            Err(e) => return Err(anyhow!("cannot read config file {path}: {e}")),
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.database.normalize_from_env();
        self.database.validate()?;
        self.cache.validate()?;
        self.pagination.normalize();
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
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        if self.media_dir.trim().is_empty() {
            self.media_dir = default_media_dir();
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

    pub fn is_sqlite(&self) -> bool {
        self.url.to_lowercase().starts_with("sqlite:")
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(anyhow!("database.url is empty; set it in config.toml or DATABASE_URL"));
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("postgresql://") || lower.starts_with("postgres://") || self.is_sqlite()) {
            return Err(anyhow!("database.url must start with postgresql://, postgres:// or sqlite:"));
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

impl CacheConfig {
    fn validate(&self) -> Result<()> {
        if self.max_capacity == 0 {
            return Err(anyhow!("cache.max_capacity must be >= 1"));
        }
        Ok(())
    }
}

impl PaginationConfig {
    fn normalize(&mut self) {
        if self.per_page == 0 {
            self.per_page = default_per_page();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_sections() {
        let mut cfg = parse("[database]\nurl = \"sqlite::memory:\"\n").unwrap();
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.server.media_dir, "media");
        assert_eq!(cfg.cache.ttl_secs, 20);
        assert_eq!(cfg.pagination.per_page, 10);
        assert!(cfg.database.is_sqlite());
    }

    #[test]
    fn zero_per_page_falls_back_to_default() {
        let mut cfg = parse("[database]\nurl = \"postgres://u:p@localhost/db\"\n[pagination]\nper_page = 0\n").unwrap();
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.pagination.per_page, 10);
    }

    #[test]
    fn rejects_unknown_database_scheme() {
        let mut cfg = parse("[database]\nurl = \"mysql://localhost/db\"\n").unwrap();
        assert!(cfg.normalize_and_validate().is_err());
    }

    #[test]
    fn rejects_inverted_pool_bounds() {
        let mut cfg = parse("[database]\nurl = \"sqlite::memory:\"\nmin_connections = 5\nmax_connections = 2\n").unwrap();
        assert!(cfg.normalize_and_validate().is_err());
    }

    fn write_temp(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("yatube-{}-{name}", std::process::id()));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join("yatube-config-that-does-not-exist.toml");
        std::env::set_var("DATABASE_URL", "sqlite::memory:");
        let cfg = AppConfig::load_or_default_from(&path.to_string_lossy()).unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.pagination.per_page, 10);
    }

    #[test]
    fn malformed_file_is_an_error() {
        // `host` is required once the [server] table is present
        let path = write_temp("malformed.toml", "[server]\nport = 9000\n[cache]\nttl_secs = 1\n");
        let res = AppConfig::load_or_default_from(&path.to_string_lossy());
        std::fs::remove_file(&path).unwrap();
        let err = res.unwrap_err();
        assert!(format!("{err:#}").contains("missing field `host`"), "{err:#}");
    }

    #[test]
    fn invalid_values_in_file_are_an_error() {
        let path = write_temp("bad-scheme.toml", "[database]\nurl = \"mysql://localhost/db\"\n");
        let res = AppConfig::load_or_default_from(&path.to_string_lossy());
        std::fs::remove_file(&path).unwrap();
        assert!(res.is_err());
    }

    #[test]
    fn valid_file_is_honoured() {
        let path = write_temp(
            "valid.toml",
            "[server]\nhost = \"0.0.0.0\"\nport = 9000\n[database]\nurl = \"sqlite::memory:\"\n[cache]\nttl_secs = 1\n[pagination]\nper_page = 5\n",
        );
        let res = AppConfig::load_or_default_from(&path.to_string_lossy());
        std::fs::remove_file(&path).unwrap();
        let cfg = res.unwrap();
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.cache.ttl_secs, 1);
        assert_eq!(cfg.pagination.per_page, 5);
    }

    #[test]
    fn server_section_overrides() {
        let cfg = parse("[server]\nhost = \"0.0.0.0\"\nport = 9000\n").unwrap();
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.server.worker_threads, None);
    }
}
