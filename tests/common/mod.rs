//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which creates a temporary music directory, a
//! catalog database beside it, and a full [`AppContext`]. The
//! [`TestHarness::with_server`] constructor starts Axum on a random port for
//! HTTP-level testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use melodex::config::Config;
use melodex::server::{create_router, AppContext};
use chrono::{Duration as ChronoDuration, Utc};
use melodex_db::models::{CatalogEntry, User};
use melodex_db::pool::{get_conn, init_pool, DbPool, PooledConnection};
use melodex_db::queries::{auth_tokens, catalog, users};
use tempfile::TempDir;

/// Test harness wrapping an [`AppContext`] backed by a temporary database.
pub struct TestHarness {
    pub ctx: AppContext,
    pub db: DbPool,
    pub music_dir: PathBuf,
    _dir: TempDir,
}

impl TestHarness {
    /// Create a new harness with default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create a new harness with a custom configuration. The library paths
    /// are always redirected into a fresh temporary directory.
    pub fn with_config(mut config: Config) -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let music_dir = dir.path().join("songs");
        config.library.music_dir = music_dir.clone();
        config.library.database_path = dir.path().join("melodex.db");

        let db = init_pool(&config.library.database_path.to_string_lossy())
            .expect("failed to create database pool");
        let ctx = AppContext::new(config, db.clone());

        Self {
            ctx,
            db,
            music_dir,
            _dir: dir,
        }
    }

    /// Start an Axum server on a random port and return the harness together
    /// with the bound socket address.
    pub async fn with_server() -> (Self, SocketAddr) {
        Self::with_server_config(Config::default()).await
    }

    /// Start an Axum server with custom config on a random port.
    pub async fn with_server_config(config: Config) -> (Self, SocketAddr) {
        let harness = Self::with_config(config);
        let app = create_router(harness.ctx.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        (harness, addr)
    }

    /// Get a database connection from the pool.
    pub fn conn(&self) -> PooledConnection {
        get_conn(&self.db).expect("failed to get db connection")
    }

    /// Insert a catalog entry directly, bypassing the watcher.
    pub fn catalog_entry(&self, name: &str, relative_path: &str) -> CatalogEntry {
        catalog::insert_entry(&self.conn(), name, relative_path)
            .expect("failed to insert catalog entry")
    }

    pub fn entries(&self) -> Vec<CatalogEntry> {
        catalog::list_all(&self.conn()).expect("failed to list catalog")
    }

    pub fn entry_named(&self, name: &str) -> Option<CatalogEntry> {
        catalog::find_by_name(&self.conn(), name).expect("failed to query catalog")
    }

    /// Create a user directly in the database. Uses the minimum bcrypt cost
    /// so tests stay fast; login verifies any cost.
    pub fn create_user(&self, username: &str, password: &str) -> User {
        let hash = bcrypt::hash(password, 4).expect("failed to hash password");
        users::create_user(&self.conn(), username, None, &hash).expect("failed to create user")
    }

    /// Create a user and a session token for them, bypassing login.
    pub fn user_session(&self, username: &str) -> (User, String) {
        let user = self.create_user(username, "password123");
        let expires_at = Utc::now() + ChronoDuration::hours(1);
        let token = auth_tokens::create_token(&self.conn(), user.id, expires_at)
            .expect("failed to create token");
        (user, token.token)
    }

    /// Write a small file into the music directory.
    pub fn write_song(&self, file_name: &str) -> PathBuf {
        write_file(&self.music_dir, file_name)
    }
}

pub fn write_file(dir: &Path, file_name: &str) -> PathBuf {
    std::fs::create_dir_all(dir).expect("failed to create directory");
    let path = dir.join(file_name);
    std::fs::write(&path, b"not really audio").expect("failed to write file");
    path
}

/// Poll `check` until it returns true or `timeout` elapses.
pub async fn eventually<F>(timeout: Duration, mut check: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if check() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}
