use chrono::Utc;
use log::{debug, info};
use sea_orm::{ActiveValue, IntoActiveModel, TransactionTrait};
use serde::Serialize;
use uuid::Uuid;

use super::args::{CreateProgramArgs, UpdateProgramArgs};
use super::Registrar;
use crate::constants::PROGRAM_DETAIL_STUDENT_LIMIT;
use crate::entities::{course, program, student};
use crate::error::{RecordsError, Result};
use crate::repositories::{
    CourseRepository, EnrollmentRepository, ListParams, Page, ProgramRepository, ProgramRow, StudentRepository,
};

/// A program with its active courses and a first slice of its students.
#[derive(Debug, Clone, Serialize)]
pub struct ProgramDetail {
    pub program: program::Model,
    /// Active courses ordered by semester and name
    pub courses: Vec<course::Model>,
    /// First active students ordered by last and first names
    pub students: Vec<student::Model>,
    pub course_count: u64,
    pub student_count: u64,
}

/// What a program hard delete removed or detached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProgramDeletion {
    pub courses_deleted: u64,
    pub enrollments_deleted: u64,
    pub students_detached: u64,
}

impl Registrar {
    /// Active programs matching `params`, each with its course count.
    ///
    /// # Errors
    /// Returns an error for an invalid page or if the query fails
    pub async fn list_programs(&self, params: &ListParams) -> Result<Page<ProgramRow>> {
        debug!("Listing programs: {:?}", params);
        ProgramRepository::list(self.conn(), params).await
    }

    /// Active programs ordered by name, for filter options.
    pub async fn active_programs(&self) -> Result<Vec<program::Model>> {
        ProgramRepository::get_all_active(self.conn()).await
    }

    /// Look up a program, active or not.
    ///
    /// # Errors
    /// Returns [`RecordsError::NotFound`] if no program has this UUID
    pub async fn get_program(&self, uuid: &Uuid) -> Result<program::Model> {
        ProgramRepository::get_by_id(self.conn(), uuid)
            .await?
            .ok_or_else(|| RecordsError::not_found("Program", *uuid))
    }

    /// The program with its active courses and first active students, read
    /// in one transaction so the counts agree with the lists.
    pub async fn program_detail(&self, uuid: &Uuid) -> Result<ProgramDetail> {
        let txn = self.conn().begin().await?;

        let program = ProgramRepository::get_by_id(&txn, uuid)
            .await?
            .ok_or_else(|| RecordsError::not_found("Program", *uuid))?;
        let detail = ProgramDetail {
            courses: CourseRepository::get_active_for_program(&txn, uuid).await?,
            students: StudentRepository::get_active_for_program(&txn, uuid, PROGRAM_DETAIL_STUDENT_LIMIT).await?,
            course_count: CourseRepository::count_active_for_program(&txn, uuid).await?,
            student_count: StudentRepository::count_active_for_program(&txn, uuid).await?,
            program,
        };
        txn.commit().await?;

        Ok(detail)
    }

    /// Creates a program. The code must not be in use by any other program.
    ///
    /// # Errors
    /// Returns [`RecordsError::Validation`] for malformed fields and
    /// [`RecordsError::UniquenessConflict`] if the code is taken
    pub async fn create_program(&self, args: CreateProgramArgs) -> Result<program::Model> {
        let args = args.validated()?;
        let write = self.begin_write().await?;

        let result = async {
            let txn = write.txn();
            if ProgramRepository::get_by_code(txn, &args.code).await?.is_some() {
                return Err(RecordsError::conflict("Program", "code"));
            }

            let model = program::ActiveModel {
                uuid: ActiveValue::Set(Uuid::new_v4()),
                code: ActiveValue::Set(args.code),
                name: ActiveValue::Set(args.name),
                description: ActiveValue::Set(args.description),
                duration_semesters: ActiveValue::Set(args.duration_semesters),
                created_at: ActiveValue::Set(Utc::now()),
                is_active: ActiveValue::Set(true),
            };
            ProgramRepository::create(txn, model).await
        }
        .await;
        let program = write.finish(result).await?;

        info!("Created program {} ({})", program.code, program.uuid);
        Ok(program)
    }

    /// Updates the given fields of a program. `created_at` never changes.
    ///
    /// # Errors
    /// Returns [`RecordsError::NotFound`], [`RecordsError::Validation`] or
    /// [`RecordsError::UniquenessConflict`]
    pub async fn update_program(&self, uuid: &Uuid, args: UpdateProgramArgs) -> Result<program::Model> {
        let args = args.validated()?;
        let write = self.begin_write().await?;

        let result = async {
            let txn = write.txn();
            let existing = ProgramRepository::get_by_id(txn, uuid)
                .await?
                .ok_or_else(|| RecordsError::not_found("Program", *uuid))?;

            if let Some(code) = &args.code {
                if let Some(other) = ProgramRepository::get_by_code(txn, code).await? {
                    if other.uuid != existing.uuid {
                        return Err(RecordsError::conflict("Program", "code"));
                    }
                }
            }

            let mut model = existing.into_active_model();
            if let Some(code) = args.code {
                model.code = ActiveValue::Set(code);
            }
            if let Some(name) = args.name {
                model.name = ActiveValue::Set(name);
            }
            if let Some(description) = args.description {
                model.description = ActiveValue::Set(description);
            }
            if let Some(duration) = args.duration_semesters {
                model.duration_semesters = ActiveValue::Set(duration);
            }
            if let Some(is_active) = args.is_active {
                model.is_active = ActiveValue::Set(is_active);
            }

            ProgramRepository::update(txn, model).await
        }
        .await;
        let program = write.finish(result).await?;

        info!("Updated program {} ({})", program.code, program.uuid);
        Ok(program)
    }

    /// Soft delete: the program disappears from listings but keeps its rows.
    pub async fn deactivate_program(&self, uuid: &Uuid) -> Result<program::Model> {
        self.update_program(
            uuid,
            UpdateProgramArgs {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
    }

    /// Hard delete. Removes the program's courses and their enrollments and
    /// clears the primary program of its students, in one transaction.
    ///
    /// # Errors
    /// Returns [`RecordsError::NotFound`] if no program has this UUID
    pub async fn delete_program(&self, uuid: &Uuid) -> Result<ProgramDeletion> {
        let write = self.begin_write().await?;

        let result = async {
            let txn = write.txn();
            let program = ProgramRepository::get_by_id(txn, uuid)
                .await?
                .ok_or_else(|| RecordsError::not_found("Program", *uuid))?;

            let course_uuids = CourseRepository::get_uuids_for_program(txn, uuid).await?;
            let deletion = ProgramDeletion {
                enrollments_deleted: EnrollmentRepository::delete_for_courses(txn, &course_uuids).await?,
                courses_deleted: CourseRepository::delete_for_program(txn, uuid).await?,
                students_detached: StudentRepository::clear_program(txn, uuid).await?,
            };
            ProgramRepository::delete(txn, uuid).await?;
            Ok::<_, RecordsError>((program, deletion))
        }
        .await;
        let (program, deletion) = write.finish(result).await?;

        info!(
            "Deleted program {} with {} courses and {} enrollments; detached {} students",
            program.code, deletion.courses_deleted, deletion.enrollments_deleted, deletion.students_detached
        );
        Ok(deletion)
    }
}
