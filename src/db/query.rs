//! Filter queries and sort specifiers for the entity store.
//!
//! Every `filter_*` call on [`Database`](super::Database) takes an exact-match
//! query (unset fields match everything), an optional [`Sort`] and an optional
//! row limit.

use std::fmt;

use anyhow::Result;
use uuid::Uuid;

use crate::models::{ShareLevel, Symbol};

/// A sort specifier: a field name, optionally prefixed with `-` for descending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub field: String,
    pub descending: bool,
}

impl Sort {
    pub fn parse(spec: &str) -> Option<Self> {
        let spec = spec.trim();
        let (field, descending) = match spec.strip_prefix('-') {
            Some(rest) => (rest, true),
            None => (spec, false),
        };
        if field.is_empty() {
            return None;
        }
        Some(Self {
            field: field.to_string(),
            descending,
        })
    }

    pub fn asc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            descending: false,
        }
    }

    pub fn desc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            descending: true,
        }
    }

    /// Render an `ORDER BY` body, rejecting fields outside `allowed`.
    ///
    /// Rows with equal sort keys fall back to insertion order in the same
    /// direction.
    pub(crate) fn order_by(&self, allowed: &[&str]) -> Result<String> {
        if !allowed.contains(&self.field.as_str()) {
            anyhow::bail!("Unsupported sort field: {}", self.field);
        }
        let dir = if self.descending { "DESC" } else { "ASC" };
        Ok(format!("{} {dir}, rowid {dir}", self.field))
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.descending {
            write!(f, "-{}", self.field)
        } else {
            f.write_str(&self.field)
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DashboardQuery {
    pub owner_email: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ShareQuery {
    pub dashboard_id: Option<Uuid>,
    pub shared_with_email: Option<String>,
    pub permission_level: Option<ShareLevel>,
}

#[derive(Debug, Clone, Default)]
pub struct NoteQuery {
    pub dashboard_id: Option<Uuid>,
    pub symbol: Option<Symbol>,
}

#[derive(Debug, Clone, Default)]
pub struct VersionQuery {
    pub note_id: Option<Uuid>,
}

/// Accumulates `column = ?` clauses and their parameters.
#[derive(Default)]
pub(crate) struct Conditions {
    clauses: Vec<&'static str>,
    params: Vec<Box<dyn rusqlite::ToSql>>,
}

impl Conditions {
    pub fn eq(&mut self, clause: &'static str, value: Option<String>) -> &mut Self {
        if let Some(value) = value {
            self.clauses.push(clause);
            self.params.push(Box::new(value));
        }
        self
    }

    /// Assemble the full statement from a `SELECT ... FROM table` prefix.
    pub fn to_sql(
        &self,
        select: &str,
        sort: Option<&Sort>,
        allowed_sorts: &[&str],
        limit: Option<u32>,
    ) -> Result<String> {
        let mut sql = select.to_string();
        if !self.clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.clauses.join(" AND "));
        }
        match sort {
            Some(sort) => {
                sql.push_str(" ORDER BY ");
                sql.push_str(&sort.order_by(allowed_sorts)?);
            }
            None => sql.push_str(" ORDER BY rowid"),
        }
        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        Ok(sql)
    }

    pub fn params(&self) -> Vec<&dyn rusqlite::ToSql> {
        self.params.iter().map(|p| p.as_ref()).collect()
    }
}
