/// Server configuration
use crate::error::{Result, ServerError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_server")]
    pub server: ServerSettings,

    #[serde(default = "default_storage")]
    pub storage: StorageSettings,

    #[serde(default = "default_auth")]
    pub auth: AuthSettings,

    #[serde(default = "default_cache")]
    pub cache: CacheSettings,

    #[serde(default = "default_broker")]
    pub broker: BrokerSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Base URL under which uploaded files are reachable
    #[serde(default = "default_public_url")]
    pub public_url: String,

    /// Allowed CORS origins; empty allows any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    #[serde(default = "default_database_url")]
    pub database_url: String,

    #[serde(default = "default_upload_path")]
    pub upload_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthSettings {
    pub jwt_secret: String,

    #[serde(default = "default_jwt_expiration_hours")]
    pub jwt_expiration_hours: u64,

    #[serde(default = "default_jwt_refresh_expiration_days")]
    pub jwt_refresh_expiration_days: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheSettings {
    /// Maximum number of cached keys
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,

    /// Maximum number of pending one-time codes
    #[serde(default = "default_code_capacity")]
    pub code_capacity: usize,
}

/// RabbitMQ management API settings; without `url` messages are only logged
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BrokerSettings {
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default = "default_vhost")]
    pub vhost: String,

    #[serde(default = "default_exchange")]
    pub exchange: String,

    #[serde(default = "default_broker_user")]
    pub username: String,

    #[serde(default = "default_broker_user")]
    pub password: String,
}

impl ServerConfig {
    /// Load configuration from `config.toml` and environment
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("config.toml"))
    }

    /// Load configuration from the given file (if present) and environment
    ///
    /// Environment variables use the `FREETUNES_` prefix and a double
    /// underscore between section and key, e.g. `FREETUNES_AUTH__JWT_SECRET`.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut settings = config::Config::builder();

        if path.exists() {
            settings = settings.add_source(config::File::from(path));
        }

        settings = settings.add_source(
            config::Environment::with_prefix("FREETUNES")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("server.cors_origins")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| ServerError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.is_empty() {
            return Err(ServerError::Config(
                "JWT secret is required (set FREETUNES_AUTH__JWT_SECRET)".to_string(),
            ));
        }

        if self.cache.capacity == 0 || self.cache.code_capacity == 0 {
            return Err(ServerError::Config(
                "cache.capacity and cache.code_capacity must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

// Default values
fn default_server() -> ServerSettings {
    ServerSettings {
        host: default_host(),
        port: default_port(),
        public_url: default_public_url(),
        cors_origins: Vec::new(),
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_public_url() -> String {
    format!("http://localhost:{}", default_port())
}

fn default_storage() -> StorageSettings {
    StorageSettings {
        database_url: default_database_url(),
        upload_path: default_upload_path(),
    }
}

fn default_database_url() -> String {
    "sqlite://./data/freetunes.db".to_string()
}

fn default_upload_path() -> PathBuf {
    PathBuf::from("./data/uploads")
}

fn default_auth() -> AuthSettings {
    AuthSettings {
        jwt_secret: String::new(),
        jwt_expiration_hours: default_jwt_expiration_hours(),
        jwt_refresh_expiration_days: default_jwt_refresh_expiration_days(),
    }
}

fn default_jwt_expiration_hours() -> u64 {
    1
}

fn default_jwt_refresh_expiration_days() -> u64 {
    30
}

fn default_cache() -> CacheSettings {
    CacheSettings {
        capacity: default_cache_capacity(),
        code_capacity: default_code_capacity(),
    }
}

fn default_cache_capacity() -> usize {
    10_000
}

fn default_code_capacity() -> usize {
    10_000
}

fn default_broker() -> BrokerSettings {
    BrokerSettings {
        url: None,
        vhost: default_vhost(),
        exchange: default_exchange(),
        username: default_broker_user(),
        password: default_broker_user(),
    }
}

fn default_vhost() -> String {
    "/".to_string()
}

fn default_exchange() -> String {
    "amq.default".to_string()
}

fn default_broker_user() -> String {
    "guest".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            storage: default_storage(),
            auth: default_auth(),
            cache: default_cache(),
            broker: default_broker(),
        }
    }
}
