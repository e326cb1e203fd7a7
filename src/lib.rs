//! Research notes with emoji tags, organised into dashboards that owners can
//! share with viewers and editors.

pub mod access;
pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod service;
