//! HTTP client for the search cluster endpoints used by the guardian.
//!
//! Wraps node stats, alias listing and index deletion, and maps the
//! responses onto `esguard-core` types.

pub mod api;
pub mod types;
