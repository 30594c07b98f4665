//! Melodex-Common: Shared types, constants, and utilities.
//!
//! This crate provides common functionality used across melodex:
//!
//! - **Typed IDs**: Newtype wrappers for catalog entry and user identifiers
//! - **Classification**: Deciding which files belong in the catalog and
//!   under which name
//! - **Error Handling**: Common error types and result aliases
//!
//! # Examples
//!
//! ```
//! use melodex_common::paths::classify;
//! use melodex_common::{Error, Result};
//! use std::path::Path;
//!
//! let class = classify(Path::new("Song.MP3"));
//! assert!(class.eligible);
//! assert_eq!(class.normalized_name, "Song");
//!
//! fn example() -> Result<()> {
//!     Err(Error::not_found("catalog entry"))
//! }
//! ```

pub mod error;
pub mod ids;
pub mod paths;

pub use error::{Error, Result};
pub use ids::*;
