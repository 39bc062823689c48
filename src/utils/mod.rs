//! Utility modules shared by the repository and service layers.
//!
//! - [`grade`] - Final grade value type and averaging
//! - [`search`] - Free-text search normalisation and `LIKE` patterns

pub mod grade;
pub mod search;
