//! Error taxonomy for record operations.
//!
//! Every variant except [`RecordsError::Database`] is a deterministic
//! validation failure meant to be shown to the user; none of them are worth
//! retrying.

use sea_orm::{DbErr, SqlErr};
use uuid::Uuid;

/// Result alias used by repositories and the registrar service.
pub type Result<T> = std::result::Result<T, RecordsError>;

#[derive(Debug, thiserror::Error)]
pub enum RecordsError {
    #[error("{entity} not found: {uuid}")]
    NotFound { entity: &'static str, uuid: Uuid },

    #[error("{entity} with this {field} already exists")]
    UniquenessConflict { entity: &'static str, field: String },

    #[error("Student is already enrolled in this course")]
    DuplicateEnrollment,

    #[error("Invalid grade '{0}': must be between 0.0 and 5.0 with at most one decimal")]
    InvalidGrade(String),

    #[error("Referenced {entity} does not exist: {uuid}")]
    ReferentialViolation { entity: &'static str, uuid: Uuid },

    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("Database error: {0}")]
    Database(DbErr),
}

impl RecordsError {
    pub fn not_found(entity: &'static str, uuid: Uuid) -> Self {
        Self::NotFound { entity, uuid }
    }

    pub fn conflict(entity: &'static str, field: impl Into<String>) -> Self {
        Self::UniquenessConflict {
            entity,
            field: field.into(),
        }
    }

    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// True for failures caused by the caller's input rather than storage.
    pub fn is_validation(&self) -> bool {
        !matches!(self, Self::Database(_))
    }
}

impl From<DbErr> for RecordsError {
    /// Unique constraint failures surface as conflicts so a writer that lost
    /// a race gets the same error as one caught by the pre-check.
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(message)) => from_unique_violation(&message),
            _ => Self::Database(err),
        }
    }
}

/// SQLite reports `UNIQUE constraint failed: table.col[, table.col]`.
fn from_unique_violation(message: &str) -> RecordsError {
    let columns = message.rsplit(':').next().unwrap_or_default();
    let mut parts = columns.split(',').map(str::trim);
    let first = parts.next().unwrap_or_default();
    let (table, field) = first.split_once('.').unwrap_or(("", first));

    if table == "enrollments" {
        return RecordsError::DuplicateEnrollment;
    }

    let entity = match table {
        "programs" => "Program",
        "courses" => "Course",
        "students" => "Student",
        _ => "Record",
    };
    RecordsError::conflict(entity, field)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_violation_names_field() {
        match from_unique_violation("UNIQUE constraint failed: programs.code") {
            RecordsError::UniquenessConflict { entity, field } => {
                assert_eq!(entity, "Program");
                assert_eq!(field, "code");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unique_violation_on_enrollment_pair() {
        let err = from_unique_violation(
            "UNIQUE constraint failed: enrollments.student_uuid, enrollments.course_uuid",
        );
        assert!(matches!(err, RecordsError::DuplicateEnrollment));
    }

    #[test]
    fn test_is_validation() {
        assert!(RecordsError::DuplicateEnrollment.is_validation());
        assert!(!RecordsError::Database(DbErr::Custom("boom".into())).is_validation());
    }
}
