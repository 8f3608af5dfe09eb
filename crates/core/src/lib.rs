//! `esguard-core` -- index retirement logic.
//!
//! Pure logic with no I/O: index age parsing, catalog ordering, node
//! free-space reduction and the [`cluster::ClusterApi`] seam that the
//! HTTP client implements.

pub mod catalog;
pub mod cluster;
pub mod duration;
pub mod error;
pub mod index_age;
pub mod space;
