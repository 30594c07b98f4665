mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Environment variables that override file settings.
pub const ENV_MUSIC_DIR: &str = "MUSIC_DIR";
pub const ENV_DATABASE_PATH: &str = "DATABASE_PATH";
pub const ENV_SERVER_HOST: &str = "SERVER_HOST";
pub const ENV_SERVER_PORT: &str = "SERVER_PORT";

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    apply_env_overrides(&mut config)?;
    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./melodex.toml",
        "./config.toml",
        "~/.config/melodex/config.toml",
        "/etc/melodex/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    let mut config = Config::default();
    apply_env_overrides(&mut config)?;
    validate_config(&config)?;
    Ok(config)
}

/// Apply `MUSIC_DIR`, `DATABASE_PATH`, `SERVER_HOST` and `SERVER_PORT`.
///
/// Empty values are ignored.
pub fn apply_env_overrides(config: &mut Config) -> Result<()> {
    if let Some(dir) = env_value(ENV_MUSIC_DIR) {
        config.library.music_dir = expand_path(&dir);
    }
    if let Some(db) = env_value(ENV_DATABASE_PATH) {
        config.library.database_path = expand_path(&db);
    }
    if let Some(host) = env_value(ENV_SERVER_HOST) {
        config.server.host = host;
    }
    if let Some(port) = env_value(ENV_SERVER_PORT) {
        config.server.port = port
            .parse()
            .with_context(|| format!("Invalid {}: {:?}", ENV_SERVER_PORT, port))?;
    }
    Ok(())
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn expand_path(value: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(value).as_ref())
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    if config.library.music_dir.as_os_str().is_empty() {
        anyhow::bail!("Music directory cannot be empty");
    }

    if config
        .server
        .auth
        .api_key
        .as_deref()
        .is_some_and(str::is_empty)
    {
        anyhow::bail!("API key cannot be empty");
    }

    if config.server.auth.session_timeout_hours == 0 {
        anyhow::bail!("Session timeout must be at least one hour");
    }

    Ok(())
}
