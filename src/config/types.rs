use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub library: LibraryConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Require a bearer credential on the catalog routes
    #[serde(default)]
    pub enabled: bool,

    /// Static API key accepted in `Authorization: Bearer <key>` alongside
    /// session tokens
    #[serde(default)]
    pub api_key: Option<String>,

    /// Session token lifetime in hours (default: 24)
    #[serde(default = "default_session_timeout")]
    pub session_timeout_hours: u64,
}

fn default_session_timeout() -> u64 {
    24
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: None,
            session_timeout_hours: default_session_timeout(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8888
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            auth: AuthConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LibraryConfig {
    /// Directory whose audio files make up the catalog (created if missing)
    #[serde(default = "default_music_dir")]
    pub music_dir: PathBuf,

    /// SQLite database file holding the catalog
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
}

fn default_music_dir() -> PathBuf {
    PathBuf::from("./songs")
}

fn default_database_path() -> PathBuf {
    PathBuf::from("./melodex.db")
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            music_dir: default_music_dir(),
            database_path: default_database_path(),
        }
    }
}
