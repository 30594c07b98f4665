//! Translation of host filesystem notifications into catalog events.
//!
//! `notify` reports a wide union of event kinds. The catalog only cares
//! about three of them, and only for eligible files sitting directly in the
//! watched directory.

use melodex_common::paths::classify;
use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind};
use std::path::{Path, PathBuf};

/// Structural change relevant to the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogEventKind {
    /// A file appeared (created or moved into the directory).
    Created,
    /// A file was deleted.
    Removed,
    /// A file was moved away. Handled exactly like [`CatalogEventKind::Removed`].
    RenamedAway,
}

/// A catalog event for a single path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEvent {
    pub kind: CatalogEventKind,
    pub path: PathBuf,
}

impl CatalogEvent {
    pub fn created(path: impl Into<PathBuf>) -> Self {
        Self {
            kind: CatalogEventKind::Created,
            path: path.into(),
        }
    }

    pub fn removed(path: impl Into<PathBuf>) -> Self {
        Self {
            kind: CatalogEventKind::Removed,
            path: path.into(),
        }
    }

    pub fn renamed_away(path: impl Into<PathBuf>) -> Self {
        Self {
            kind: CatalogEventKind::RenamedAway,
            path: path.into(),
        }
    }
}

/// Map a host event kind onto the catalog vocabulary.
///
/// `Name(Both)` is dropped: backends that emit it have already delivered the
/// `From` and `To` halves as separate events. The two halves of a rename are
/// never correlated.
pub fn translate(kind: &EventKind) -> Option<CatalogEventKind> {
    match kind {
        EventKind::Create(_) => Some(CatalogEventKind::Created),
        EventKind::Remove(_) => Some(CatalogEventKind::Removed),
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => Some(CatalogEventKind::Created),
        EventKind::Modify(ModifyKind::Name(RenameMode::From | RenameMode::Any)) => {
            Some(CatalogEventKind::RenamedAway)
        }
        _ => None,
    }
}

/// Turn one host event into catalog events for eligible paths directly under `root`.
pub fn normalize(event: &Event, root: &Path) -> Vec<CatalogEvent> {
    let Some(kind) = translate(&event.kind) else {
        return Vec::new();
    };

    event
        .paths
        .iter()
        .filter(|path| path.parent() == Some(root))
        .filter(|path| classify(path).eligible)
        .map(|path| {
            // Some backends report both halves of a rename as `Name(Any)`;
            // the half that still exists is the one that arrived.
            let arrived = matches!(
                event.kind,
                EventKind::Modify(ModifyKind::Name(RenameMode::Any))
            ) && path.exists();
            let kind = if arrived {
                CatalogEventKind::Created
            } else {
                kind
            };
            CatalogEvent {
                kind,
                path: path.clone(),
            }
        })
        .collect()
}
