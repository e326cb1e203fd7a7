//! Domain models for Mom Notes.
//!
//! # Core Concepts
//!
//! - [`Dashboard`]: A named collection of notes with exactly one owner. The owner
//!   is never represented as a share; ownership is the `owner_email` column.
//! - [`DashboardShare`]: A grant of [`ShareLevel::Viewer`] or [`ShareLevel::Editor`]
//!   on one dashboard to one email. At most one grant exists per (dashboard, email).
//! - [`Note`]: Free text tagged with one [`Symbol`] from a fixed vocabulary.
//! - [`NoteVersion`]: Append-only snapshot of a note, written on every save.
//! - [`User`] and [`Session`]: Identity handed to us by the identity provider and
//!   the explicit session context threaded through every service call.
//!
//! Dashboards own their notes and shares; notes own their versions. The store has
//! no cascade of its own, the service layer deletes dependents explicitly.

mod dashboard;
mod note;
mod share;
mod symbol;
mod user;
mod version;

pub use dashboard::*;
pub use note::*;
pub use share::*;
pub use symbol::*;
pub use user::*;
pub use version::*;
