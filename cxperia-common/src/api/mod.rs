//! API module for shared HTTP API functionality
//!
//! Contains ONLY framework-independent pieces:
//! - Public secret loading and validation
//! - Response envelope and paging types
//!
//! The server crate wraps these with axum middleware and extractors.

pub mod auth;
pub mod types;

pub use auth::{
    initialize_shared_secret, load_shared_secret, store_shared_secret, validate_secret,
    ApiAuthError, SECRET_HEADER,
};
pub use types::{ApiResponse, Page};
