//! Service layer: the only path from the outside world to the store.
//!
//! Every operation takes the caller's [`Session`](crate::models::Session)
//! explicitly, resolves their [`Access`](crate::access::Access) to the
//! dashboard involved and checks it against the permission matrix before any
//! store call is made. After a mutation nothing is cached; callers re-read.
//!
//! - [`identity`]: login, `me`, logout
//! - [`resolver`]: owner / editor / viewer / denied resolution
//! - [`shares`]: the share registry
//! - [`ledger`]: the append-only note version ledger
//! - [`notes`]: note CRUD
//! - [`dashboards`]: dashboard lifecycle, cascade delete and orphan sweep

mod dashboards;
mod identity;
mod ledger;
mod notes;
mod resolver;
mod shares;

use crate::db::Database;

#[derive(Clone)]
pub struct NotesService {
    db: Database,
}

impl NotesService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}
