//! # Dropbox Provider
//!
//! Request builders and response normalizers for the Dropbox API v2.
//!
//! ## Overview
//!
//! This module provides:
//! - Search (`files/search_v2`) capped to a result count
//! - Folder listing with pagination, sorted folders-first
//! - Text download and upload through the content endpoints
//! - Rename (`files/move_v2`) with server-side autorename
//! - Delete (`files/delete_v2`)
//!
//! Every call carries the session's bearer token. Failures are reported once;
//! nothing is retried.

pub mod connector;
pub mod error;
pub mod listing;
pub mod types;

pub use connector::{
    header_safe_json, normalize_path, DropboxConnector, SearchOptions, UploadOptions,
};
pub use error::{DropboxError, Result};
pub use listing::{sort_listing, ListingEntry, ListingOrder};
pub use types::WriteMode;
