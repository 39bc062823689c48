//! Local storage module for academic records persistence
//!
//! Opens the SQLite connection and creates the schema:
//! - Programs
//! - Courses (owned by a program)
//! - Students (optional primary program)
//! - Enrollments (student and course, unique per pair)

pub mod db;

pub use db::{Storage, WriteTransaction};
