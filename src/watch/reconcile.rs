//! Catalog reconciliation.
//!
//! Every catalog write goes through [`Reconciler::apply`]. Per catalog name
//! there are two states, absent and present:
//!
//! - `Created` on an absent name inserts an entry; on a present name it is
//!   a no-op (duplicate creates from the scan and the live stream are
//!   expected).
//! - `Removed`/`RenamedAway` deletes by name; deleting an absent name is a
//!   no-op.
//!
//! Entries are never updated in place. A rename therefore shows up as a
//! removal of the old name followed by an unrelated creation, and the new
//! entry gets a fresh id.
//!
//! Store failures are logged and the event is dropped. Nothing is retried.

use melodex_common::paths::{catalog_relative_path, classify};
use melodex_common::EntryId;
use melodex_db::pool::{get_conn, DbPool};
use melodex_db::queries::catalog;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

use super::events::{CatalogEvent, CatalogEventKind};

/// What applying one event did to the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Inserted(EntryId),
    AlreadyPresent,
    Deleted,
    AlreadyAbsent,
    /// The path is not an eligible audio file.
    Ignored,
    /// The store reported an error; the event was dropped.
    Failed,
}

/// Tally of outcomes over a batch of events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub inserted: usize,
    pub deleted: usize,
    pub unchanged: usize,
    pub failed: usize,
}

impl ReconcileSummary {
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Inserted(_) => self.inserted += 1,
            Outcome::Deleted => self.deleted += 1,
            Outcome::AlreadyPresent | Outcome::AlreadyAbsent | Outcome::Ignored => {
                self.unchanged += 1
            }
            Outcome::Failed => self.failed += 1,
        }
    }
}

/// Applies catalog events for one watched directory.
pub struct Reconciler {
    pool: DbPool,
    root: PathBuf,
}

impl Reconciler {
    pub fn new(pool: DbPool, root: impl Into<PathBuf>) -> Self {
        Self {
            pool,
            root: root.into(),
        }
    }

    /// The watched directory relative paths are computed against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Apply a single event.
    pub fn apply(&self, event: &CatalogEvent) -> Outcome {
        let class = classify(&event.path);
        if !class.eligible {
            return Outcome::Ignored;
        }

        let conn = match get_conn(&self.pool) {
            Ok(conn) => conn,
            Err(e) => {
                error!(
                    file = %event.path.display(),
                    kind = ?event.kind,
                    error = %e,
                    "No database connection for catalog update"
                );
                return Outcome::Failed;
            }
        };

        match event.kind {
            CatalogEventKind::Created => self.insert(&conn, &class.normalized_name, &event.path),
            CatalogEventKind::Removed | CatalogEventKind::RenamedAway => {
                remove(&conn, &class.normalized_name, &event.path)
            }
        }
    }

    /// Apply events in order and tally the outcomes.
    pub fn apply_all<I>(&self, events: I) -> ReconcileSummary
    where
        I: IntoIterator<Item = CatalogEvent>,
    {
        let mut summary = ReconcileSummary::default();
        for event in events {
            summary.record(self.apply(&event));
        }
        summary
    }

    fn insert(&self, conn: &Connection, name: &str, path: &Path) -> Outcome {
        match catalog::find_by_name(conn, name) {
            Ok(Some(existing)) => {
                debug!(
                    name = %name,
                    existing = %existing.relative_path,
                    file = %path.display(),
                    "Already cataloged"
                );
                return Outcome::AlreadyPresent;
            }
            Ok(None) => {}
            Err(e) => {
                error!(name = %name, file = %path.display(), error = %e, "Failed to look up catalog entry");
                return Outcome::Failed;
            }
        }

        let relative_path = catalog_relative_path(&self.root, path);
        match catalog::insert_entry(conn, name, &relative_path) {
            Ok(entry) => {
                info!(name = %name, id = %entry.id, path = %entry.relative_path, "Cataloged music file");
                Outcome::Inserted(entry.id)
            }
            // Another writer got there between the lookup and the insert.
            Err(e) if e.is_conflict() => {
                debug!(name = %name, file = %path.display(), "Already cataloged");
                Outcome::AlreadyPresent
            }
            Err(e) => {
                error!(name = %name, file = %path.display(), error = %e, "Failed to insert catalog entry");
                Outcome::Failed
            }
        }
    }
}

fn remove(conn: &Connection, name: &str, path: &Path) -> Outcome {
    match catalog::delete_by_name(conn, name) {
        Ok(0) => {
            debug!(name = %name, file = %path.display(), "Nothing cataloged to remove");
            Outcome::AlreadyAbsent
        }
        Ok(_) => {
            info!(name = %name, file = %path.display(), "Removed music file from catalog");
            Outcome::Deleted
        }
        Err(e) => {
            error!(name = %name, file = %path.display(), error = %e, "Failed to delete catalog entry");
            Outcome::Failed
        }
    }
}
