//! # Cxperia Common Library
//!
//! Shared code for the Cxperia backend:
//! - Database schema, migrations and row models
//! - API response envelope and public-secret handling
//! - Configuration loading
//! - Slug and timestamp helpers

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod slug;
pub mod time;

pub use error::{Error, Result};
