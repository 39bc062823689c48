use log::{debug, info};
use rust_decimal::Decimal;
use sea_orm::{ActiveValue, IntoActiveModel, TransactionTrait};
use serde::Serialize;
use uuid::Uuid;

use super::args::{CreateStudentArgs, UpdateStudentArgs};
use super::Registrar;
use crate::entities::{course, enrollment, program, student};
use crate::error::{RecordsError, Result};
use crate::repositories::{
    EnrollmentRepository, ListParams, OutcomeStats, Page, ProgramRepository, StudentRepository, StudentRow,
};

/// An enrollment of a student together with the course and its program.
#[derive(Debug, Clone, Serialize)]
pub struct StudentEnrollment {
    pub enrollment: enrollment::Model,
    pub course: Option<course::Model>,
    pub program: Option<program::Model>,
}

/// A student's academic record.
#[derive(Debug, Clone, Serialize)]
pub struct StudentDetail {
    pub student: student::Model,
    pub program: Option<program::Model>,
    /// Most recent first
    pub enrollments: Vec<StudentEnrollment>,
    pub stats: OutcomeStats,
    /// `None` until at least one enrollment is graded
    pub average_grade: Option<Decimal>,
}

impl Registrar {
    /// Active students matching `params`, each with its enrollment count.
    pub async fn list_students(&self, params: &ListParams) -> Result<Page<StudentRow>> {
        debug!("Listing students: {:?}", params);
        StudentRepository::list(self.conn(), params).await
    }

    /// Look up a student, active or not.
    ///
    /// # Errors
    /// Returns [`RecordsError::NotFound`] if no student has this UUID
    pub async fn get_student(&self, uuid: &Uuid) -> Result<student::Model> {
        StudentRepository::get_by_id(self.conn(), uuid)
            .await?
            .ok_or_else(|| RecordsError::not_found("Student", *uuid))
    }

    /// The student's record, read in one transaction so the counts and the
    /// average agree with the enrollment list.
    pub async fn student_detail(&self, uuid: &Uuid) -> Result<StudentDetail> {
        let txn = self.conn().begin().await?;

        let student = StudentRepository::get_by_id(&txn, uuid)
            .await?
            .ok_or_else(|| RecordsError::not_found("Student", *uuid))?;
        let program = match student.program_uuid {
            Some(program_uuid) => ProgramRepository::get_by_id(&txn, &program_uuid).await?,
            None => None,
        };

        let rows = EnrollmentRepository::get_for_student(&txn, uuid).await?;
        let program_uuids: Vec<Uuid> = rows
            .iter()
            .filter_map(|(_, course)| course.as_ref().map(|c| c.program_uuid))
            .collect();
        let programs = ProgramRepository::get_many(&txn, &program_uuids).await?;
        let enrollments = rows
            .into_iter()
            .map(|(enrollment, course)| StudentEnrollment {
                program: course.as_ref().and_then(|c| programs.get(&c.program_uuid).cloned()),
                enrollment,
                course,
            })
            .collect();

        let stats = EnrollmentRepository::outcome_stats_for_student(&txn, uuid).await?;
        let average_grade = EnrollmentRepository::average_grade_for_student(&txn, uuid).await?;
        txn.commit().await?;

        Ok(StudentDetail {
            student,
            program,
            enrollments,
            stats,
            average_grade,
        })
    }

    /// Creates a student. Identification number and email must both be
    /// unused.
    ///
    /// # Errors
    /// Returns [`RecordsError::Validation`], [`RecordsError::UniquenessConflict`]
    /// naming the taken field, or [`RecordsError::ReferentialViolation`] if
    /// the primary program does not exist
    pub async fn create_student(&self, args: CreateStudentArgs) -> Result<student::Model> {
        let args = args.validated()?;
        let write = self.begin_write().await?;

        let result = async {
            let txn = write.txn();
            if let Some(program_uuid) = args.program_uuid {
                if ProgramRepository::get_by_id(txn, &program_uuid).await?.is_none() {
                    return Err(RecordsError::ReferentialViolation {
                        entity: "Program",
                        uuid: program_uuid,
                    });
                }
            }
            if StudentRepository::get_by_identification_number(txn, &args.identification_number)
                .await?
                .is_some()
            {
                return Err(RecordsError::conflict("Student", "identification_number"));
            }
            if StudentRepository::get_by_email(txn, &args.email).await?.is_some() {
                return Err(RecordsError::conflict("Student", "email"));
            }

            let model = student::ActiveModel {
                uuid: ActiveValue::Set(Uuid::new_v4()),
                identification_number: ActiveValue::Set(args.identification_number),
                first_names: ActiveValue::Set(args.first_names),
                last_names: ActiveValue::Set(args.last_names),
                email: ActiveValue::Set(args.email),
                phone: ActiveValue::Set(args.phone),
                birth_date: ActiveValue::Set(args.birth_date),
                admission_date: ActiveValue::Set(args.admission_date),
                is_active: ActiveValue::Set(true),
                program_uuid: ActiveValue::Set(args.program_uuid),
            };
            StudentRepository::create(txn, model).await
        }
        .await;
        let student = write.finish(result).await?;

        info!(
            "Created student {} {} ({})",
            student.identification_number,
            student.full_name(),
            student.uuid
        );
        Ok(student)
    }

    /// Updates the given fields of a student.
    pub async fn update_student(&self, uuid: &Uuid, args: UpdateStudentArgs) -> Result<student::Model> {
        let args = args.validated()?;
        let write = self.begin_write().await?;

        let result = async {
            let txn = write.txn();
            let existing = StudentRepository::get_by_id(txn, uuid)
                .await?
                .ok_or_else(|| RecordsError::not_found("Student", *uuid))?;

            if let Some(Some(program_uuid)) = args.program_uuid {
                if ProgramRepository::get_by_id(txn, &program_uuid).await?.is_none() {
                    return Err(RecordsError::ReferentialViolation {
                        entity: "Program",
                        uuid: program_uuid,
                    });
                }
            }
            if let Some(number) = &args.identification_number {
                if let Some(other) = StudentRepository::get_by_identification_number(txn, number).await? {
                    if other.uuid != existing.uuid {
                        return Err(RecordsError::conflict("Student", "identification_number"));
                    }
                }
            }
            if let Some(email) = &args.email {
                if let Some(other) = StudentRepository::get_by_email(txn, email).await? {
                    if other.uuid != existing.uuid {
                        return Err(RecordsError::conflict("Student", "email"));
                    }
                }
            }

            let mut model = existing.into_active_model();
            if let Some(number) = args.identification_number {
                model.identification_number = ActiveValue::Set(number);
            }
            if let Some(first_names) = args.first_names {
                model.first_names = ActiveValue::Set(first_names);
            }
            if let Some(last_names) = args.last_names {
                model.last_names = ActiveValue::Set(last_names);
            }
            if let Some(email) = args.email {
                model.email = ActiveValue::Set(email);
            }
            if let Some(phone) = args.phone {
                model.phone = ActiveValue::Set(phone);
            }
            if let Some(birth_date) = args.birth_date {
                model.birth_date = ActiveValue::Set(birth_date);
            }
            if let Some(admission_date) = args.admission_date {
                model.admission_date = ActiveValue::Set(admission_date);
            }
            if let Some(program_uuid) = args.program_uuid {
                model.program_uuid = ActiveValue::Set(program_uuid);
            }
            if let Some(is_active) = args.is_active {
                model.is_active = ActiveValue::Set(is_active);
            }

            StudentRepository::update(txn, model).await
        }
        .await;
        let student = write.finish(result).await?;

        info!("Updated student {} ({})", student.full_name(), student.uuid);
        Ok(student)
    }

    /// Soft delete: the student disappears from listings but keeps its rows.
    pub async fn deactivate_student(&self, uuid: &Uuid) -> Result<student::Model> {
        self.update_student(
            uuid,
            UpdateStudentArgs {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
    }

    /// Hard delete of a student and their enrollments. Returns the number of
    /// enrollments removed.
    pub async fn delete_student(&self, uuid: &Uuid) -> Result<u64> {
        let write = self.begin_write().await?;

        let result = async {
            let txn = write.txn();
            let student = StudentRepository::get_by_id(txn, uuid)
                .await?
                .ok_or_else(|| RecordsError::not_found("Student", *uuid))?;

            let enrollments_deleted = EnrollmentRepository::delete_for_student(txn, uuid).await?;
            StudentRepository::delete(txn, uuid).await?;
            Ok::<_, RecordsError>((student, enrollments_deleted))
        }
        .await;
        let (student, enrollments_deleted) = write.finish(result).await?;

        info!(
            "Deleted student {} with {} enrollments",
            student.identification_number, enrollments_deleted
        );
        Ok(enrollments_deleted)
    }
}
