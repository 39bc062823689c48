//! A student taking a course in a labelled term.
//!
//! The `(student_uuid, course_uuid)` pair is unique; the index is created by
//! [`crate::storage::Storage`] since it spans two columns.

use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::utils::grade::Grade;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "enrollments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub uuid: Uuid,
    pub student_uuid: Uuid,
    pub course_uuid: Uuid,
    pub enrolled_at: DateTimeUtc,
    pub semester_taken: String,
    /// Final grade in tenths of a point (45 is 4.5).
    pub final_grade_tenths: Option<i32>,
    pub passed: bool,
}

impl Model {
    /// The recorded final grade, if any.
    pub fn final_grade(&self) -> Option<Grade> {
        self.final_grade_tenths.and_then(|tenths| Grade::from_tenths(tenths).ok())
    }

    /// The recorded final grade as a decimal, if any.
    pub fn final_grade_decimal(&self) -> Option<Decimal> {
        self.final_grade().map(Grade::to_decimal)
    }

    /// Not passed with a grade on record.
    pub fn is_failed(&self) -> bool {
        !self.passed && self.final_grade_tenths.is_some()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::student::Entity",
        from = "Column::StudentUuid",
        to = "super::student::Column::Uuid",
        on_delete = "Cascade"
    )]
    Student,
    #[sea_orm(
        belongs_to = "super::course::Entity",
        from = "Column::CourseUuid",
        to = "super::course::Column::Uuid",
        on_delete = "Cascade"
    )]
    Course,
}

impl Related<super::student::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl Related<super::course::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    fn enrollment(final_grade_tenths: Option<i32>, passed: bool) -> Model {
        Model {
            uuid: Uuid::new_v4(),
            student_uuid: Uuid::new_v4(),
            course_uuid: Uuid::new_v4(),
            enrolled_at: chrono::Utc::now(),
            semester_taken: "2024-1".to_string(),
            final_grade_tenths,
            passed,
        }
    }

    #[test]
    fn test_is_failed_needs_a_grade() {
        assert!(enrollment(Some(21), false).is_failed());
        assert!(!enrollment(None, false).is_failed());
        assert!(!enrollment(Some(45), true).is_failed());
    }

    #[test]
    fn test_final_grade_decimal() {
        assert_eq!(enrollment(Some(32), true).final_grade_decimal(), Some(Decimal::new(32, 1)));
        assert_eq!(enrollment(None, false).final_grade_decimal(), None);
    }
}
