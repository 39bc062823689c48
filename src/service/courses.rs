use chrono::Utc;
use log::{debug, info};
use sea_orm::{ActiveValue, IntoActiveModel, TransactionTrait};
use serde::Serialize;
use uuid::Uuid;

use super::args::{CreateCourseArgs, UpdateCourseArgs};
use super::Registrar;
use crate::entities::{course, enrollment, program, student};
use crate::error::{RecordsError, Result};
use crate::repositories::{
    CourseRepository, CourseRow, EnrollmentRepository, ListParams, OutcomeStats, Page, ProgramRepository,
};

/// An enrollment in a course together with its student.
#[derive(Debug, Clone, Serialize)]
pub struct CourseEnrollment {
    pub enrollment: enrollment::Model,
    pub student: Option<student::Model>,
}

/// A course with its program, its enrollments and their outcomes.
#[derive(Debug, Clone, Serialize)]
pub struct CourseDetail {
    pub course: course::Model,
    pub program: Option<program::Model>,
    /// Most recent first
    pub enrollments: Vec<CourseEnrollment>,
    pub stats: OutcomeStats,
}

impl Registrar {
    /// Active courses matching `params`, each with its enrollment count.
    pub async fn list_courses(&self, params: &ListParams) -> Result<Page<CourseRow>> {
        debug!("Listing courses: {:?}", params);
        CourseRepository::list(self.conn(), params).await
    }

    /// Look up a course, active or not.
    ///
    /// # Errors
    /// Returns [`RecordsError::NotFound`] if no course has this UUID
    pub async fn get_course(&self, uuid: &Uuid) -> Result<course::Model> {
        CourseRepository::get_by_id(self.conn(), uuid)
            .await?
            .ok_or_else(|| RecordsError::not_found("Course", *uuid))
    }

    /// The course with its program, enrollments and outcome counts, read in
    /// one transaction so `stats.total` matches the enrollment list.
    pub async fn course_detail(&self, uuid: &Uuid) -> Result<CourseDetail> {
        let txn = self.conn().begin().await?;

        let course = CourseRepository::get_by_id(&txn, uuid)
            .await?
            .ok_or_else(|| RecordsError::not_found("Course", *uuid))?;
        let program = ProgramRepository::get_by_id(&txn, &course.program_uuid).await?;
        let enrollments = EnrollmentRepository::get_for_course(&txn, uuid)
            .await?
            .into_iter()
            .map(|(enrollment, student)| CourseEnrollment { enrollment, student })
            .collect();
        let stats = EnrollmentRepository::outcome_stats_for_course(&txn, uuid).await?;
        txn.commit().await?;

        Ok(CourseDetail {
            course,
            program,
            enrollments,
            stats,
        })
    }

    /// Creates a course in an existing program.
    ///
    /// # Errors
    /// Returns [`RecordsError::Validation`], [`RecordsError::UniquenessConflict`]
    /// if the code is taken, or [`RecordsError::ReferentialViolation`] if the
    /// program does not exist
    pub async fn create_course(&self, args: CreateCourseArgs) -> Result<course::Model> {
        let args = args.validated()?;
        let write = self.begin_write().await?;

        let result = async {
            let txn = write.txn();
            if ProgramRepository::get_by_id(txn, &args.program_uuid).await?.is_none() {
                return Err(RecordsError::ReferentialViolation {
                    entity: "Program",
                    uuid: args.program_uuid,
                });
            }
            if CourseRepository::get_by_code(txn, &args.code).await?.is_some() {
                return Err(RecordsError::conflict("Course", "code"));
            }

            let model = course::ActiveModel {
                uuid: ActiveValue::Set(Uuid::new_v4()),
                code: ActiveValue::Set(args.code),
                name: ActiveValue::Set(args.name),
                credits: ActiveValue::Set(args.credits),
                semester: ActiveValue::Set(args.semester),
                description: ActiveValue::Set(args.description),
                created_at: ActiveValue::Set(Utc::now()),
                is_active: ActiveValue::Set(true),
                program_uuid: ActiveValue::Set(args.program_uuid),
            };
            CourseRepository::create(txn, model).await
        }
        .await;
        let course = write.finish(result).await?;

        info!("Created course {} ({}) in program {}", course.code, course.uuid, course.program_uuid);
        Ok(course)
    }

    /// Updates the given fields of a course, possibly moving it to another
    /// program.
    pub async fn update_course(&self, uuid: &Uuid, args: UpdateCourseArgs) -> Result<course::Model> {
        let args = args.validated()?;
        let write = self.begin_write().await?;

        let result = async {
            let txn = write.txn();
            let existing = CourseRepository::get_by_id(txn, uuid)
                .await?
                .ok_or_else(|| RecordsError::not_found("Course", *uuid))?;

            if let Some(program_uuid) = args.program_uuid {
                if ProgramRepository::get_by_id(txn, &program_uuid).await?.is_none() {
                    return Err(RecordsError::ReferentialViolation {
                        entity: "Program",
                        uuid: program_uuid,
                    });
                }
            }
            if let Some(code) = &args.code {
                if let Some(other) = CourseRepository::get_by_code(txn, code).await? {
                    if other.uuid != existing.uuid {
                        return Err(RecordsError::conflict("Course", "code"));
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
            if let Some(credits) = args.credits {
                model.credits = ActiveValue::Set(credits);
            }
            if let Some(semester) = args.semester {
                model.semester = ActiveValue::Set(semester);
            }
            if let Some(description) = args.description {
                model.description = ActiveValue::Set(description);
            }
            if let Some(program_uuid) = args.program_uuid {
                model.program_uuid = ActiveValue::Set(program_uuid);
            }
            if let Some(is_active) = args.is_active {
                model.is_active = ActiveValue::Set(is_active);
            }

            CourseRepository::update(txn, model).await
        }
        .await;
        let course = write.finish(result).await?;

        info!("Updated course {} ({})", course.code, course.uuid);
        Ok(course)
    }

    /// Soft delete: the course disappears from listings but keeps its rows.
    pub async fn deactivate_course(&self, uuid: &Uuid) -> Result<course::Model> {
        self.update_course(
            uuid,
            UpdateCourseArgs {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
    }

    /// Hard delete of a course and its enrollments. Returns the number of
    /// enrollments removed.
    pub async fn delete_course(&self, uuid: &Uuid) -> Result<u64> {
        let write = self.begin_write().await?;

        let result = async {
            let txn = write.txn();
            let course = CourseRepository::get_by_id(txn, uuid)
                .await?
                .ok_or_else(|| RecordsError::not_found("Course", *uuid))?;

            let enrollments_deleted = EnrollmentRepository::delete_for_courses(txn, &[course.uuid]).await?;
            CourseRepository::delete(txn, uuid).await?;
            Ok::<_, RecordsError>((course, enrollments_deleted))
        }
        .await;
        let (course, enrollments_deleted) = write.finish(result).await?;

        info!("Deleted course {} with {} enrollments", course.code, enrollments_deleted);
        Ok(enrollments_deleted)
    }
}
