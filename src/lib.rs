//! Melodex - music catalog kept in sync with a watched directory
//!
//! This library crate exposes the watcher, server, and configuration for
//! the binary and for integration testing.

pub mod config;
pub mod server;
pub mod watch;
