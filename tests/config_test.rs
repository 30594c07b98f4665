//! Tests for configuration loading, environment overrides and validation.

use std::path::PathBuf;

use melodex::config::{
    apply_env_overrides, load_config, load_config_or_default, Config, ENV_DATABASE_PATH,
    ENV_MUSIC_DIR, ENV_SERVER_HOST, ENV_SERVER_PORT,
};
use serial_test::serial;

fn clear_env() {
    for key in [ENV_MUSIC_DIR, ENV_DATABASE_PATH, ENV_SERVER_HOST, ENV_SERVER_PORT] {
        std::env::remove_var(key);
    }
}

fn write_config(contents: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("melodex.toml");
    std::fs::write(&path, contents).unwrap();
    (dir, path)
}

#[test]
fn defaults() {
    let config = Config::default();
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 8888);
    assert!(!config.server.auth.enabled);
    assert_eq!(config.server.auth.session_timeout_hours, 24);
    assert_eq!(config.library.music_dir, PathBuf::from("./songs"));
    assert_eq!(config.library.database_path, PathBuf::from("./melodex.db"));
}

#[test]
#[serial]
fn load_full_file() {
    clear_env();
    let (_dir, path) = write_config(
        r#"
[server]
host = "127.0.0.1"
port = 9000

[server.auth]
enabled = true
api_key = "secret"

[library]
music_dir = "/srv/music"
database_path = "/srv/catalog.db"
"#,
    );

    let config = load_config(&path).unwrap();
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 9000);
    assert!(config.server.auth.enabled);
    assert_eq!(config.server.auth.api_key.as_deref(), Some("secret"));
    assert_eq!(config.library.music_dir, PathBuf::from("/srv/music"));
    assert_eq!(config.library.database_path, PathBuf::from("/srv/catalog.db"));
}

#[test]
#[serial]
fn partial_file_keeps_defaults() {
    clear_env();
    let (_dir, path) = write_config("[library]\nmusic_dir = \"/data/songs\"\n");

    let config = load_config(&path).unwrap();
    assert_eq!(config.library.music_dir, PathBuf::from("/data/songs"));
    assert_eq!(config.library.database_path, PathBuf::from("./melodex.db"));
    assert_eq!(config.server.port, 8888);
}

#[test]
#[serial]
fn env_overrides_file_values() {
    clear_env();
    let (_dir, path) = write_config("[server]\nport = 9000\n");
    std::env::set_var(ENV_SERVER_PORT, "7000");
    std::env::set_var(ENV_MUSIC_DIR, "/env/songs");
    std::env::set_var(ENV_SERVER_HOST, "");

    let config = load_config(&path);
    clear_env();

    let config = config.unwrap();
    assert_eq!(config.server.port, 7000);
    assert_eq!(config.library.music_dir, PathBuf::from("/env/songs"));
    // Empty values are ignored.
    assert_eq!(config.server.host, "0.0.0.0");
}

#[test]
#[serial]
fn invalid_port_override_is_an_error() {
    clear_env();
    std::env::set_var(ENV_SERVER_PORT, "not-a-port");

    let mut config = Config::default();
    let result = apply_env_overrides(&mut config);
    clear_env();

    let err = result.unwrap_err();
    assert!(err.to_string().contains(ENV_SERVER_PORT));
}

#[test]
#[serial]
fn database_path_override() {
    clear_env();
    std::env::set_var(ENV_DATABASE_PATH, "/tmp/other.db");

    let mut config = Config::default();
    let result = apply_env_overrides(&mut config);
    clear_env();

    result.unwrap();
    assert_eq!(config.library.database_path, PathBuf::from("/tmp/other.db"));
}

#[test]
#[serial]
fn auth_without_api_key_relies_on_sessions() {
    clear_env();
    let (_dir, path) = write_config("[server.auth]\nenabled = true\nsession_timeout_hours = 2\n");
    let config = load_config(&path).unwrap();
    assert!(config.server.auth.enabled);
    assert!(config.server.auth.api_key.is_none());
    assert_eq!(config.server.auth.session_timeout_hours, 2);
}

#[test]
#[serial]
fn empty_api_key_is_rejected() {
    clear_env();
    let (_dir, path) = write_config("[server.auth]\nenabled = true\napi_key = \"\"\n");
    assert!(load_config(&path).is_err());
}

#[test]
#[serial]
fn zero_session_timeout_is_rejected() {
    clear_env();
    let (_dir, path) = write_config("[server.auth]\nsession_timeout_hours = 0\n");
    assert!(load_config(&path).is_err());
}

#[test]
#[serial]
fn zero_port_is_rejected() {
    clear_env();
    let (_dir, path) = write_config("[server]\nport = 0\n");
    assert!(load_config(&path).is_err());
}

#[test]
#[serial]
fn malformed_toml_is_rejected() {
    clear_env();
    let (_dir, path) = write_config("[server\nport = ");
    let err = load_config(&path).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));
}

#[test]
#[serial]
fn explicit_path_is_used() {
    clear_env();
    let (_dir, path) = write_config("[server]\nport = 1234\n");
    let config = load_config_or_default(Some(&path)).unwrap();
    assert_eq!(config.server.port, 1234);
}

#[test]
#[serial]
fn missing_explicit_path_is_an_error() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    assert!(load_config_or_default(Some(&dir.path().join("absent.toml"))).is_err());
}
