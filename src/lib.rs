//! campus-records - academic records for a university
//!
//! This library stores programs, courses, students and enrollments in a
//! SQLite database and serves the filtered, paginated listings and
//! per-record aggregates a records office works with.
//!
//! # Modules
//!
//! The library is organized into several key modules:
//!
//! * [`config`] - Application configuration management
//! * [`entities`] - SeaORM models for the four tables
//! * [`repositories`] - Queries, listings and aggregate counts
//! * [`service`] - The [`Registrar`] that validates and applies changes
//! * [`storage`] - Database connection and schema creation
//! * [`utils`] - Grade values and search helpers

/// Configuration module for managing application settings
pub mod config;

/// Application constants and default values
pub mod constants;

/// SeaORM entity models for database tables
pub mod entities;

/// Error type shared by the repository and service layers
pub mod error;

/// File logging setup
pub mod logger;

/// Repository layer for database operations
pub mod repositories;

/// Registrar service: validation, transactions and detail bundles
pub mod service;

/// Database connection and schema
pub mod storage;

/// Grade values and search term helpers
pub mod utils;

// Re-export entity models for convenient access
pub use entities::{course, enrollment, program, student};
pub use error::{RecordsError, Result};
pub use service::Registrar;
