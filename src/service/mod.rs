//! Registrar service: the boundary the presentation layer calls.
//!
//! This module provides the [`Registrar`] struct which validates input,
//! runs every write inside a transaction and assembles the detail bundles
//! shown on record pages. Listings and aggregates are plain reads through
//! the repository layer; nothing is cached between calls.
//!
//! # Example
//! ```rust,no_run
//! use campus_records::config::Config;
//! use campus_records::service::{CreateProgramArgs, Registrar};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let registrar = Registrar::open(&Config::default()).await?;
//!
//! registrar
//!     .create_program(CreateProgramArgs {
//!         code: "ING-SIS".into(),
//!         name: "Ingeniería de Sistemas".into(),
//!         description: String::new(),
//!         duration_semesters: 10,
//!     })
//!     .await?;
//!
//! let page = registrar.list_programs(&registrar.program_params().search("sis")).await?;
//! assert_eq!(page.total_count, 1);
//! # Ok(())
//! # }
//! ```

pub mod args;
pub mod courses;
pub mod dashboard;
pub mod enrollments;
pub mod programs;
pub mod students;

pub use args::{
    CreateCourseArgs, CreateEnrollmentArgs, CreateProgramArgs, CreateStudentArgs, UpdateCourseArgs,
    UpdateEnrollmentArgs, UpdateProgramArgs, UpdateStudentArgs,
};
pub use courses::{CourseDetail, CourseEnrollment};
pub use dashboard::Dashboard;
pub use enrollments::EnrollmentDetail;
pub use programs::{ProgramDeletion, ProgramDetail};
pub use students::{StudentDetail, StudentEnrollment};

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::{Config, PaginationConfig};
use crate::error::Result;
use crate::repositories::ListParams;
use crate::storage::{Storage, WriteTransaction};

/// Service for reading and writing academic records.
///
/// Cloning is cheap; clones share the same connection pool.
#[derive(Clone)]
pub struct Registrar {
    storage: Arc<Storage>,
    pagination: PaginationConfig,
}

impl Registrar {
    pub fn new(storage: Arc<Storage>, pagination: PaginationConfig) -> Self {
        Self { storage, pagination }
    }

    /// Open the storage described by `config`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or the schema
    /// cannot be created
    pub async fn open(config: &Config) -> anyhow::Result<Self> {
        let storage = Storage::new(&config.database).await?;
        Ok(Self::new(Arc::new(storage), config.pagination.clone()))
    }

    pub(crate) fn conn(&self) -> &DatabaseConnection {
        &self.storage.conn
    }

    /// Every mutation runs inside one of these; writers queue on the
    /// storage's write gate.
    pub(crate) async fn begin_write(&self) -> Result<WriteTransaction<'_>> {
        self.storage.begin_write().await
    }

    pub fn storage(&self) -> &Arc<Storage> {
        &self.storage
    }

    /// First page of programs at the configured page size.
    pub fn program_params(&self) -> ListParams {
        ListParams::new(self.pagination.programs)
    }

    /// First page of courses at the configured page size.
    pub fn course_params(&self) -> ListParams {
        ListParams::new(self.pagination.courses)
    }

    /// First page of students at the configured page size.
    pub fn student_params(&self) -> ListParams {
        ListParams::new(self.pagination.students)
    }

    /// First page of enrollments at the configured page size.
    pub fn enrollment_params(&self) -> ListParams {
        ListParams::new(self.pagination.enrollments)
    }
}
