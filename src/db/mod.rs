//! SQLite-backed entity store.
//!
//! The store knows nothing about permissions or cascades. It offers the same
//! per-kind surface a hosted object store would (`create`, `update`, `delete`,
//! `get`, `filter`) and the service layer composes those calls.

mod query;
mod schema;

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, Row};
use uuid::Uuid;

use crate::models::*;

pub use query::{DashboardQuery, NoteQuery, ShareQuery, Sort, VersionQuery};
use query::Conditions;

const DASHBOARD_COLUMNS: &str = "id, name, owner_email, created_date, updated_date";
const SHARE_COLUMNS: &str =
    "id, dashboard_id, shared_with_email, permission_level, created_date, updated_date";
const NOTE_COLUMNS: &str = "id, dashboard_id, content, symbol, created_date, updated_date";
const VERSION_COLUMNS: &str = "id, note_id, content, symbol, created_date";

const DASHBOARD_SORTS: &[&str] = &["name", "created_date", "updated_date"];
const SHARE_SORTS: &[&str] = &["shared_with_email", "created_date", "updated_date"];
const NOTE_SORTS: &[&str] = &["created_date", "updated_date", "symbol"];
const VERSION_SORTS: &[&str] = &["created_date"];

pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

/// Ids of records whose parent no longer exists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Orphans {
    pub versions: Vec<Uuid>,
    pub notes: Vec<Uuid>,
    pub shares: Vec<Uuid>,
}

impl Orphans {
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty() && self.notes.is_empty() && self.shares.is_empty()
    }
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn default_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", "mom-notes")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        Ok(dirs.data_dir().join("mom-notes.db"))
    }

    pub fn open_default() -> Result<Self> {
        Self::open(Self::default_path()?)
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn();
        schema::run_migrations(&conn)
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("database lock poisoned")
    }

    // ============================================================
    // Session operations (identity provider)
    // ============================================================

    pub fn create_session(&self, user: &User) -> Result<Session> {
        let conn = self.conn();
        let token = Uuid::new_v4();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO sessions (token, email, full_name, started_at) VALUES (?, ?, ?, ?)",
            (
                token.to_string(),
                &user.email,
                &user.full_name,
                format_datetime(now),
            ),
        )?;

        Ok(Session {
            token,
            user: user.clone(),
            started_at: now,
        })
    }

    pub fn get_session(&self, token: Uuid) -> Result<Option<Session>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT token, email, full_name, started_at FROM sessions WHERE token = ?",
        )?;

        let mut rows = stmt.query([token.to_string()])?;
        if let Some(row) = rows.next()? {
            Ok(Some(Session {
                token: parse_uuid(row.get::<_, String>(0)?),
                user: User {
                    email: row.get(1)?,
                    full_name: row.get(2)?,
                },
                started_at: parse_datetime(row.get::<_, String>(3)?),
            }))
        } else {
            Ok(None)
        }
    }

    pub fn delete_session(&self, token: Uuid) -> Result<bool> {
        let conn = self.conn();
        let rows = conn.execute("DELETE FROM sessions WHERE token = ?", [token.to_string()])?;
        Ok(rows > 0)
    }

    // ============================================================
    // Dashboard operations
    // ============================================================

    pub fn create_dashboard(&self, input: NewDashboard) -> Result<Dashboard> {
        let conn = self.conn();
        let id = Uuid::new_v4();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO dashboards (id, name, owner_email, created_date, updated_date)
             VALUES (?, ?, ?, ?, ?)",
            (
                id.to_string(),
                &input.name,
                &input.owner_email,
                format_datetime(now),
                format_datetime(now),
            ),
        )?;

        Ok(Dashboard {
            id,
            name: input.name,
            owner_email: input.owner_email,
            created_date: now,
            updated_date: now,
        })
    }

    pub fn get_dashboard(&self, id: Uuid) -> Result<Option<Dashboard>> {
        let conn = self.conn();
        select_dashboard(&conn, id)
    }

    pub fn update_dashboard(&self, id: Uuid, name: &str) -> Result<Option<Dashboard>> {
        let conn = self.conn();
        let rows = conn.execute(
            "UPDATE dashboards SET name = ?, updated_date = ? WHERE id = ?",
            (name, format_datetime(Utc::now()), id.to_string()),
        )?;
        if rows == 0 {
            return Ok(None);
        }
        select_dashboard(&conn, id)
    }

    pub fn delete_dashboard(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn();
        let rows = conn.execute("DELETE FROM dashboards WHERE id = ?", [id.to_string()])?;
        Ok(rows > 0)
    }

    pub fn filter_dashboards(
        &self,
        query: &DashboardQuery,
        sort: Option<&Sort>,
        limit: Option<u32>,
    ) -> Result<Vec<Dashboard>> {
        let mut conditions = Conditions::default();
        conditions.eq("owner_email = ?", query.owner_email.clone());

        let sql = conditions.to_sql(
            &format!("SELECT {DASHBOARD_COLUMNS} FROM dashboards"),
            sort,
            DASHBOARD_SORTS,
            limit,
        )?;

        let conn = self.conn();
        let mut stmt = conn.prepare(&sql)?;
        let dashboards = stmt
            .query_map(conditions.params().as_slice(), dashboard_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(dashboards)
    }

    // ============================================================
    // Dashboard share operations
    // ============================================================

    pub fn create_share(&self, input: NewShare) -> Result<DashboardShare> {
        let conn = self.conn();
        let id = Uuid::new_v4();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO dashboard_shares
                (id, dashboard_id, shared_with_email, permission_level, created_date, updated_date)
             VALUES (?, ?, ?, ?, ?, ?)",
            (
                id.to_string(),
                input.dashboard_id.to_string(),
                &input.shared_with_email,
                input.permission_level.as_str(),
                format_datetime(now),
                format_datetime(now),
            ),
        )?;

        Ok(DashboardShare {
            id,
            dashboard_id: input.dashboard_id,
            shared_with_email: input.shared_with_email,
            permission_level: input.permission_level,
            created_date: now,
            updated_date: now,
        })
    }

    pub fn get_share(&self, id: Uuid) -> Result<Option<DashboardShare>> {
        let conn = self.conn();
        select_share(&conn, id)
    }

    pub fn update_share(&self, id: Uuid, level: ShareLevel) -> Result<Option<DashboardShare>> {
        let conn = self.conn();
        let rows = conn.execute(
            "UPDATE dashboard_shares SET permission_level = ?, updated_date = ? WHERE id = ?",
            (level.as_str(), format_datetime(Utc::now()), id.to_string()),
        )?;
        if rows == 0 {
            return Ok(None);
        }
        select_share(&conn, id)
    }

    pub fn delete_share(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn();
        let rows = conn.execute(
            "DELETE FROM dashboard_shares WHERE id = ?",
            [id.to_string()],
        )?;
        Ok(rows > 0)
    }

    pub fn filter_shares(
        &self,
        query: &ShareQuery,
        sort: Option<&Sort>,
        limit: Option<u32>,
    ) -> Result<Vec<DashboardShare>> {
        let mut conditions = Conditions::default();
        conditions
            .eq("dashboard_id = ?", query.dashboard_id.map(|id| id.to_string()))
            .eq("shared_with_email = ?", query.shared_with_email.clone())
            .eq(
                "permission_level = ?",
                query.permission_level.map(|l| l.as_str().to_string()),
            );

        let sql = conditions.to_sql(
            &format!("SELECT {SHARE_COLUMNS} FROM dashboard_shares"),
            sort,
            SHARE_SORTS,
            limit,
        )?;

        let conn = self.conn();
        let mut stmt = conn.prepare(&sql)?;
        let shares = stmt
            .query_map(conditions.params().as_slice(), share_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(shares)
    }

    // ============================================================
    // Note operations
    // ============================================================

    pub fn create_note(&self, input: NewNote) -> Result<Note> {
        let conn = self.conn();
        insert_note(&conn, input)
    }

    /// Create a note and its first version in one transaction.
    pub fn create_note_with_version(&self, input: NewNote) -> Result<(Note, NoteVersion)> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let note = insert_note(&tx, input)?;
        let version = insert_version(&tx, snapshot(&note))?;

        tx.commit()?;
        Ok((note, version))
    }

    pub fn get_note(&self, id: Uuid) -> Result<Option<Note>> {
        let conn = self.conn();
        select_note(&conn, id)
    }

    pub fn update_note(&self, id: Uuid, changes: NoteChanges) -> Result<Option<Note>> {
        let conn = self.conn();
        update_note_row(&conn, id, changes)
    }

    /// Update a note and append the resulting version in one transaction.
    ///
    /// Returns `None` and writes nothing when the note no longer exists.
    pub fn update_note_with_version(
        &self,
        id: Uuid,
        changes: NoteChanges,
    ) -> Result<Option<(Note, NoteVersion)>> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let Some(note) = update_note_row(&tx, id, changes)? else {
            return Ok(None);
        };
        let version = insert_version(&tx, snapshot(&note))?;

        tx.commit()?;
        Ok(Some((note, version)))
    }

    pub fn delete_note(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn();
        let rows = conn.execute("DELETE FROM notes WHERE id = ?", [id.to_string()])?;
        Ok(rows > 0)
    }

    /// Delete a note's versions and then the note, in one transaction.
    ///
    /// Returns how many versions went with it, or `None` when the note does
    /// not exist (nothing is deleted in that case).
    pub fn delete_note_with_versions(&self, id: Uuid) -> Result<Option<usize>> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let versions = tx.execute(
            "DELETE FROM note_versions WHERE note_id = ?",
            [id.to_string()],
        )?;
        let notes = tx.execute("DELETE FROM notes WHERE id = ?", [id.to_string()])?;
        if notes == 0 {
            return Ok(None);
        }

        tx.commit()?;
        Ok(Some(versions))
    }

    pub fn filter_notes(
        &self,
        query: &NoteQuery,
        sort: Option<&Sort>,
        limit: Option<u32>,
    ) -> Result<Vec<Note>> {
        let mut conditions = Conditions::default();
        conditions
            .eq("dashboard_id = ?", query.dashboard_id.map(|id| id.to_string()))
            .eq("symbol = ?", query.symbol.map(|s| s.as_str().to_string()));

        let sql = conditions.to_sql(
            &format!("SELECT {NOTE_COLUMNS} FROM notes"),
            sort,
            NOTE_SORTS,
            limit,
        )?;

        let conn = self.conn();
        let mut stmt = conn.prepare(&sql)?;
        let notes = stmt
            .query_map(conditions.params().as_slice(), note_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(notes)
    }

    /// Every note in the store, across dashboards.
    pub fn list_notes(&self, sort: Option<&Sort>) -> Result<Vec<Note>> {
        self.filter_notes(&NoteQuery::default(), sort, None)
    }

    // ============================================================
    // Note version operations
    // ============================================================

    pub fn create_version(&self, input: NewNoteVersion) -> Result<NoteVersion> {
        let conn = self.conn();
        insert_version(&conn, input)
    }

    pub fn delete_version(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn();
        let rows = conn.execute("DELETE FROM note_versions WHERE id = ?", [id.to_string()])?;
        Ok(rows > 0)
    }

    pub fn filter_versions(
        &self,
        query: &VersionQuery,
        sort: Option<&Sort>,
        limit: Option<u32>,
    ) -> Result<Vec<NoteVersion>> {
        let mut conditions = Conditions::default();
        conditions.eq("note_id = ?", query.note_id.map(|id| id.to_string()));

        let sql = conditions.to_sql(
            &format!("SELECT {VERSION_COLUMNS} FROM note_versions"),
            sort,
            VERSION_SORTS,
            limit,
        )?;

        let conn = self.conn();
        let mut stmt = conn.prepare(&sql)?;
        let versions = stmt
            .query_map(conditions.params().as_slice(), version_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(versions)
    }

    // ============================================================
    // Integrity
    // ============================================================

    /// Find records left behind when a parent was deleted without its dependents.
    pub fn find_orphans(&self) -> Result<Orphans> {
        let conn = self.conn();

        let collect_ids = |sql: &str| -> Result<Vec<Uuid>> {
            let mut stmt = conn.prepare(sql)?;
            let ids = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .map(|id| id.map(parse_uuid))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(ids)
        };

        Ok(Orphans {
            versions: collect_ids(
                "SELECT v.id FROM note_versions v
                 LEFT JOIN notes n ON n.id = v.note_id
                 WHERE n.id IS NULL ORDER BY v.rowid",
            )?,
            notes: collect_ids(
                "SELECT n.id FROM notes n
                 LEFT JOIN dashboards d ON d.id = n.dashboard_id
                 WHERE d.id IS NULL ORDER BY n.rowid",
            )?,
            shares: collect_ids(
                "SELECT s.id FROM dashboard_shares s
                 LEFT JOIN dashboards d ON d.id = s.dashboard_id
                 WHERE d.id IS NULL ORDER BY s.rowid",
            )?,
        })
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}

/// Whether a store error was caused by a UNIQUE or CHECK constraint.
pub fn is_constraint_violation(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<rusqlite::Error>(),
        Some(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

// Statements shared by the locked single-call methods and the transactional ones.

fn select_dashboard(conn: &Connection, id: Uuid) -> Result<Option<Dashboard>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {DASHBOARD_COLUMNS} FROM dashboards WHERE id = ?"
    ))?;

    let mut rows = stmt.query([id.to_string()])?;
    match rows.next()? {
        Some(row) => Ok(Some(dashboard_from_row(row)?)),
        None => Ok(None),
    }
}

fn select_share(conn: &Connection, id: Uuid) -> Result<Option<DashboardShare>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SHARE_COLUMNS} FROM dashboard_shares WHERE id = ?"
    ))?;

    let mut rows = stmt.query([id.to_string()])?;
    match rows.next()? {
        Some(row) => Ok(Some(share_from_row(row)?)),
        None => Ok(None),
    }
}

fn select_note(conn: &Connection, id: Uuid) -> Result<Option<Note>> {
    let mut stmt = conn.prepare(&format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = ?"))?;

    let mut rows = stmt.query([id.to_string()])?;
    match rows.next()? {
        Some(row) => Ok(Some(note_from_row(row)?)),
        None => Ok(None),
    }
}

fn insert_note(conn: &Connection, input: NewNote) -> Result<Note> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    conn.execute(
        "INSERT INTO notes (id, dashboard_id, content, symbol, created_date, updated_date)
         VALUES (?, ?, ?, ?, ?, ?)",
        (
            id.to_string(),
            input.dashboard_id.to_string(),
            &input.content,
            input.symbol.as_str(),
            format_datetime(now),
            format_datetime(now),
        ),
    )?;

    Ok(Note {
        id,
        dashboard_id: input.dashboard_id,
        content: input.content,
        symbol: input.symbol,
        created_date: now,
        updated_date: now,
    })
}

fn update_note_row(conn: &Connection, id: Uuid, changes: NoteChanges) -> Result<Option<Note>> {
    let rows = conn.execute(
        "UPDATE notes SET content = ?, symbol = ?, updated_date = ? WHERE id = ?",
        (
            &changes.content,
            changes.symbol.as_str(),
            format_datetime(Utc::now()),
            id.to_string(),
        ),
    )?;
    if rows == 0 {
        return Ok(None);
    }
    select_note(conn, id)
}

fn insert_version(conn: &Connection, input: NewNoteVersion) -> Result<NoteVersion> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    conn.execute(
        "INSERT INTO note_versions (id, note_id, content, symbol, created_date)
         VALUES (?, ?, ?, ?, ?)",
        (
            id.to_string(),
            input.note_id.to_string(),
            &input.content,
            input.symbol.as_str(),
            format_datetime(now),
        ),
    )?;

    Ok(NoteVersion {
        id,
        note_id: input.note_id,
        content: input.content,
        symbol: input.symbol,
        created_date: now,
    })
}

fn snapshot(note: &Note) -> NewNoteVersion {
    NewNoteVersion {
        note_id: note.id,
        content: note.content.clone(),
        symbol: note.symbol,
    }
}

fn dashboard_from_row(row: &Row<'_>) -> rusqlite::Result<Dashboard> {
    Ok(Dashboard {
        id: parse_uuid(row.get::<_, String>(0)?),
        name: row.get(1)?,
        owner_email: row.get(2)?,
        created_date: parse_datetime(row.get::<_, String>(3)?),
        updated_date: parse_datetime(row.get::<_, String>(4)?),
    })
}

fn share_from_row(row: &Row<'_>) -> rusqlite::Result<DashboardShare> {
    Ok(DashboardShare {
        id: parse_uuid(row.get::<_, String>(0)?),
        dashboard_id: parse_uuid(row.get::<_, String>(1)?),
        shared_with_email: row.get(2)?,
        permission_level: ShareLevel::from_str(&row.get::<_, String>(3)?)
            .unwrap_or(ShareLevel::Viewer),
        created_date: parse_datetime(row.get::<_, String>(4)?),
        updated_date: parse_datetime(row.get::<_, String>(5)?),
    })
}

fn note_from_row(row: &Row<'_>) -> rusqlite::Result<Note> {
    Ok(Note {
        id: parse_uuid(row.get::<_, String>(0)?),
        dashboard_id: parse_uuid(row.get::<_, String>(1)?),
        content: row.get(2)?,
        symbol: Symbol::from_str(&row.get::<_, String>(3)?).unwrap_or_default(),
        created_date: parse_datetime(row.get::<_, String>(4)?),
        updated_date: parse_datetime(row.get::<_, String>(5)?),
    })
}

fn version_from_row(row: &Row<'_>) -> rusqlite::Result<NoteVersion> {
    Ok(NoteVersion {
        id: parse_uuid(row.get::<_, String>(0)?),
        note_id: parse_uuid(row.get::<_, String>(1)?),
        content: row.get(2)?,
        symbol: Symbol::from_str(&row.get::<_, String>(3)?).unwrap_or_default(),
        created_date: parse_datetime(row.get::<_, String>(4)?),
    })
}

// Fixed-width timestamps so lexical order in SQLite matches chronological order.
fn format_datetime(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_uuid(s: String) -> Uuid {
    Uuid::parse_str(&s).unwrap_or_else(|_| Uuid::nil())
}

fn parse_datetime(s: String) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
