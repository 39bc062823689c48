use chrono::Utc;
use log::{debug, info, warn};
use sea_orm::{ActiveValue, ConnectionTrait, IntoActiveModel, TransactionTrait};
use serde::Serialize;
use uuid::Uuid;

use super::args::{CreateEnrollmentArgs, UpdateEnrollmentArgs};
use super::Registrar;
use crate::entities::{course, enrollment, student};
use crate::error::{RecordsError, Result};
use crate::repositories::{CourseRepository, EnrollmentRepository, EnrollmentRow, ListParams, Page, StudentRepository};
use crate::utils::grade::Grade;

/// An enrollment with the student and course it joins.
#[derive(Debug, Clone, Serialize)]
pub struct EnrollmentDetail {
    pub enrollment: enrollment::Model,
    pub student: Option<student::Model>,
    pub course: Option<course::Model>,
}

impl Registrar {
    /// Enrollments matching `params`, most recent first. Enrollments have no
    /// active flag so nothing is filtered out by default.
    pub async fn list_enrollments(&self, params: &ListParams) -> Result<Page<EnrollmentRow>> {
        debug!("Listing enrollments: {:?}", params);
        EnrollmentRepository::list(self.conn(), params).await
    }

    /// # Errors
    /// Returns [`RecordsError::NotFound`] if no enrollment has this UUID
    pub async fn get_enrollment(&self, uuid: &Uuid) -> Result<enrollment::Model> {
        EnrollmentRepository::get_by_id(self.conn(), uuid)
            .await?
            .ok_or_else(|| RecordsError::not_found("Enrollment", *uuid))
    }

    pub async fn enrollment_detail(&self, uuid: &Uuid) -> Result<EnrollmentDetail> {
        let txn = self.conn().begin().await?;

        let enrollment = EnrollmentRepository::get_by_id(&txn, uuid)
            .await?
            .ok_or_else(|| RecordsError::not_found("Enrollment", *uuid))?;
        let detail = EnrollmentDetail {
            student: StudentRepository::get_by_id(&txn, &enrollment.student_uuid).await?,
            course: CourseRepository::get_by_id(&txn, &enrollment.course_uuid).await?,
            enrollment,
        };
        txn.commit().await?;

        Ok(detail)
    }

    /// Distinct semester labels used by any enrollment, newest first.
    pub async fn semester_options(&self) -> Result<Vec<String>> {
        EnrollmentRepository::get_semester_labels(self.conn()).await
    }

    /// Enrolls a student in a course.
    ///
    /// # Errors
    /// Returns [`RecordsError::InvalidGrade`] for a grade outside 0.0 to 5.0
    /// or with more than one decimal, [`RecordsError::ReferentialViolation`]
    /// if the student or course does not exist, or
    /// [`RecordsError::DuplicateEnrollment`] if the pair is already enrolled
    pub async fn create_enrollment(&self, args: CreateEnrollmentArgs) -> Result<enrollment::Model> {
        let args = args.validated()?;
        let write = self.begin_write().await?;

        let result = async {
            let txn = write.txn();
            ensure_parents_exist(txn, &args.student_uuid, &args.course_uuid).await?;
            if EnrollmentRepository::get_by_pair(txn, &args.student_uuid, &args.course_uuid)
                .await?
                .is_some()
            {
                return Err(RecordsError::DuplicateEnrollment);
            }

            let model = enrollment::ActiveModel {
                uuid: ActiveValue::Set(Uuid::new_v4()),
                student_uuid: ActiveValue::Set(args.student_uuid),
                course_uuid: ActiveValue::Set(args.course_uuid),
                enrolled_at: ActiveValue::Set(Utc::now()),
                semester_taken: ActiveValue::Set(args.semester_taken),
                final_grade_tenths: ActiveValue::Set(args.final_grade.map(Grade::tenths)),
                passed: ActiveValue::Set(args.passed),
            };
            EnrollmentRepository::create(txn, model).await
        }
        .await;
        let enrollment = write.finish(result).await?;

        warn_if_inconsistent(&enrollment);
        info!(
            "Enrolled student {} in course {} for {} ({})",
            enrollment.student_uuid, enrollment.course_uuid, enrollment.semester_taken, enrollment.uuid
        );
        Ok(enrollment)
    }

    /// Updates the given fields of an enrollment. `enrolled_at` never
    /// changes.
    pub async fn update_enrollment(&self, uuid: &Uuid, args: UpdateEnrollmentArgs) -> Result<enrollment::Model> {
        let args = args.validated()?;
        let write = self.begin_write().await?;

        let result = async {
            let txn = write.txn();
            let existing = EnrollmentRepository::get_by_id(txn, uuid)
                .await?
                .ok_or_else(|| RecordsError::not_found("Enrollment", *uuid))?;

            let student_uuid = args.student_uuid.unwrap_or(existing.student_uuid);
            let course_uuid = args.course_uuid.unwrap_or(existing.course_uuid);
            if student_uuid != existing.student_uuid || course_uuid != existing.course_uuid {
                ensure_parents_exist(txn, &student_uuid, &course_uuid).await?;
                if let Some(other) = EnrollmentRepository::get_by_pair(txn, &student_uuid, &course_uuid).await? {
                    if other.uuid != existing.uuid {
                        return Err(RecordsError::DuplicateEnrollment);
                    }
                }
            }

            let mut model = existing.into_active_model();
            model.student_uuid = ActiveValue::Set(student_uuid);
            model.course_uuid = ActiveValue::Set(course_uuid);
            if let Some(semester_taken) = args.semester_taken {
                model.semester_taken = ActiveValue::Set(semester_taken);
            }
            if let Some(final_grade) = args.final_grade {
                model.final_grade_tenths = ActiveValue::Set(final_grade.map(Grade::tenths));
            }
            if let Some(passed) = args.passed {
                model.passed = ActiveValue::Set(passed);
            }

            EnrollmentRepository::update(txn, model).await
        }
        .await;
        let enrollment = write.finish(result).await?;

        warn_if_inconsistent(&enrollment);
        info!("Updated enrollment {}", enrollment.uuid);
        Ok(enrollment)
    }

    pub async fn delete_enrollment(&self, uuid: &Uuid) -> Result<()> {
        let write = self.begin_write().await?;

        let result = async {
            if EnrollmentRepository::delete(write.txn(), uuid).await? == 0 {
                return Err(RecordsError::not_found("Enrollment", *uuid));
            }
            Ok::<_, RecordsError>(())
        }
        .await;
        write.finish(result).await?;

        info!("Deleted enrollment {}", uuid);
        Ok(())
    }
}

async fn ensure_parents_exist<C>(conn: &C, student_uuid: &Uuid, course_uuid: &Uuid) -> Result<()>
where
    C: ConnectionTrait,
{
    if StudentRepository::get_by_id(conn, student_uuid).await?.is_none() {
        return Err(RecordsError::ReferentialViolation {
            entity: "Student",
            uuid: *student_uuid,
        });
    }
    if CourseRepository::get_by_id(conn, course_uuid).await?.is_none() {
        return Err(RecordsError::ReferentialViolation {
            entity: "Course",
            uuid: *course_uuid,
        });
    }
    Ok(())
}

/// The passed flag is stored as given; an unusual combination with the
/// grade is only reported.
fn warn_if_inconsistent(enrollment: &enrollment::Model) {
    match enrollment.final_grade() {
        None if enrollment.passed => {
            warn!("Enrollment {} is marked passed without a final grade", enrollment.uuid)
        }
        Some(grade) if enrollment.passed && !grade.is_passing() => {
            warn!("Enrollment {} is marked passed with failing grade {}", enrollment.uuid, grade)
        }
        Some(grade) if enrollment.is_failed() && grade.is_passing() => {
            warn!("Enrollment {} is not marked passed despite grade {}", enrollment.uuid, grade)
        }
        _ => {}
    }
}
