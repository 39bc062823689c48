//! Enrollment repository for database operations.

use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, JoinType, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait,
};
use serde::Serialize;
use uuid::Uuid;

use super::contains;
use super::course::CourseRepository;
use super::pagination::{fetch_page, ListParams, Page};
use super::student::StudentRepository;
use crate::entities::{course, enrollment, student};
use crate::error::Result;
use crate::utils::grade::average_of_tenths;

/// An enrollment with the student and course it joins.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrollmentRow {
    pub enrollment: enrollment::Model,
    pub student: Option<student::Model>,
    pub course: Option<course::Model>,
}

/// Pass/fail breakdown over a set of enrollments.
///
/// An enrollment that is not passed and has no grade is in progress, not
/// failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeStats {
    pub total: u64,
    pub passed: u64,
    pub failed: u64,
    pub in_progress: u64,
}

/// Repository for enrollment-related database operations.
pub struct EnrollmentRepository;

impl EnrollmentRepository {
    pub async fn get_by_id<C>(conn: &C, uuid: &Uuid) -> Result<Option<enrollment::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(enrollment::Entity::find_by_id(*uuid).one(conn).await?)
    }

    /// Get the enrollment of a student in a course, if any.
    pub async fn get_by_pair<C>(conn: &C, student_uuid: &Uuid, course_uuid: &Uuid) -> Result<Option<enrollment::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(enrollment::Entity::find()
            .filter(enrollment::Column::StudentUuid.eq(*student_uuid))
            .filter(enrollment::Column::CourseUuid.eq(*course_uuid))
            .one(conn)
            .await?)
    }

    /// Enrollments filtered by the course's program and the exact semester
    /// label, matching the search term on student names, identification
    /// number, course name or course code. Most recent first.
    pub async fn list<C>(conn: &C, params: &ListParams) -> Result<Page<EnrollmentRow>>
    where
        C: ConnectionTrait,
    {
        let mut select = enrollment::Entity::find()
            .join(JoinType::InnerJoin, enrollment::Relation::Student.def())
            .join(JoinType::InnerJoin, enrollment::Relation::Course.def());

        if let Some(program_uuid) = params.program {
            select = select.filter(course::Column::ProgramUuid.eq(program_uuid));
        }

        if let Some(semester) = params.semester_label() {
            select = select.filter(enrollment::Column::SemesterTaken.eq(semester));
        }

        if let Some(term) = params.search_term() {
            select = select.filter(
                Condition::any()
                    .add(contains(student::Column::FirstNames, term))
                    .add(contains(student::Column::LastNames, term))
                    .add(contains(student::Column::IdentificationNumber, term))
                    .add(contains(course::Column::Name, term))
                    .add(contains(course::Column::Code, term)),
            );
        }

        let select = select
            .order_by_desc(enrollment::Column::EnrolledAt)
            .order_by_asc(enrollment::Column::Uuid);

        let mut page = fetch_page(conn, select, params).await?;
        let enrollments = std::mem::take(&mut page.items);
        let rows = Self::attach_parents(conn, enrollments).await?;
        Ok(page.map_items(rows))
    }

    /// Load the student and course of each enrollment in two batched queries.
    pub async fn attach_parents<C>(conn: &C, enrollments: Vec<enrollment::Model>) -> Result<Vec<EnrollmentRow>>
    where
        C: ConnectionTrait,
    {
        let student_uuids: Vec<Uuid> = enrollments.iter().map(|e| e.student_uuid).collect();
        let course_uuids: Vec<Uuid> = enrollments.iter().map(|e| e.course_uuid).collect();
        let students = StudentRepository::get_many(conn, &student_uuids).await?;
        let courses = CourseRepository::get_many(conn, &course_uuids).await?;

        Ok(enrollments
            .into_iter()
            .map(|enrollment| EnrollmentRow {
                student: students.get(&enrollment.student_uuid).cloned(),
                course: courses.get(&enrollment.course_uuid).cloned(),
                enrollment,
            })
            .collect())
    }

    /// A course's enrollments with their students, most recent first.
    pub async fn get_for_course<C>(
        conn: &C,
        course_uuid: &Uuid,
    ) -> Result<Vec<(enrollment::Model, Option<student::Model>)>>
    where
        C: ConnectionTrait,
    {
        Ok(enrollment::Entity::find()
            .find_also_related(student::Entity)
            .filter(enrollment::Column::CourseUuid.eq(*course_uuid))
            .order_by_desc(enrollment::Column::EnrolledAt)
            .order_by_asc(enrollment::Column::Uuid)
            .all(conn)
            .await?)
    }

    /// A student's enrollments with their courses, most recent first.
    pub async fn get_for_student<C>(
        conn: &C,
        student_uuid: &Uuid,
    ) -> Result<Vec<(enrollment::Model, Option<course::Model>)>>
    where
        C: ConnectionTrait,
    {
        Ok(enrollment::Entity::find()
            .find_also_related(course::Entity)
            .filter(enrollment::Column::StudentUuid.eq(*student_uuid))
            .order_by_desc(enrollment::Column::EnrolledAt)
            .order_by_asc(enrollment::Column::Uuid)
            .all(conn)
            .await?)
    }

    /// The most recent enrollments across all students.
    pub async fn get_recent<C>(conn: &C, limit: u64) -> Result<Vec<EnrollmentRow>>
    where
        C: ConnectionTrait,
    {
        let enrollments = enrollment::Entity::find()
            .order_by_desc(enrollment::Column::EnrolledAt)
            .order_by_asc(enrollment::Column::Uuid)
            .limit(limit)
            .all(conn)
            .await?;
        Self::attach_parents(conn, enrollments).await
    }

    pub async fn count_all<C>(conn: &C) -> Result<u64>
    where
        C: ConnectionTrait,
    {
        Ok(enrollment::Entity::find().count(conn).await?)
    }

    pub async fn outcome_stats_for_course<C>(conn: &C, course_uuid: &Uuid) -> Result<OutcomeStats>
    where
        C: ConnectionTrait,
    {
        Self::outcome_stats(conn, Condition::all().add(enrollment::Column::CourseUuid.eq(*course_uuid))).await
    }

    pub async fn outcome_stats_for_student<C>(conn: &C, student_uuid: &Uuid) -> Result<OutcomeStats>
    where
        C: ConnectionTrait,
    {
        Self::outcome_stats(conn, Condition::all().add(enrollment::Column::StudentUuid.eq(*student_uuid))).await
    }

    async fn outcome_stats<C>(conn: &C, scope: Condition) -> Result<OutcomeStats>
    where
        C: ConnectionTrait,
    {
        let scoped = || enrollment::Entity::find().filter(scope.clone());

        let total = scoped().count(conn).await?;
        let passed = scoped()
            .filter(enrollment::Column::Passed.eq(true))
            .count(conn)
            .await?;
        let failed = scoped()
            .filter(enrollment::Column::Passed.eq(false))
            .filter(enrollment::Column::FinalGradeTenths.is_not_null())
            .count(conn)
            .await?;
        let in_progress = scoped()
            .filter(enrollment::Column::Passed.eq(false))
            .filter(enrollment::Column::FinalGradeTenths.is_null())
            .count(conn)
            .await?;

        Ok(OutcomeStats {
            total,
            passed,
            failed,
            in_progress,
        })
    }

    /// Mean final grade over a student's graded enrollments.
    pub async fn average_grade_for_student<C>(conn: &C, student_uuid: &Uuid) -> Result<Option<Decimal>>
    where
        C: ConnectionTrait,
    {
        let aggregate: Option<(i64, Option<i64>)> = enrollment::Entity::find()
            .select_only()
            .column_as(Expr::col(enrollment::Column::FinalGradeTenths).count(), "graded")
            .column_as(Expr::col(enrollment::Column::FinalGradeTenths).sum(), "sum_tenths")
            .filter(enrollment::Column::StudentUuid.eq(*student_uuid))
            .filter(enrollment::Column::FinalGradeTenths.is_not_null())
            .into_tuple()
            .one(conn)
            .await?;

        Ok(aggregate.and_then(|(graded, sum)| {
            average_of_tenths(sum.unwrap_or(0), u64::try_from(graded).unwrap_or_default())
        }))
    }

    /// Distinct semester labels across all enrollments, newest first.
    pub async fn get_semester_labels<C>(conn: &C) -> Result<Vec<String>>
    where
        C: ConnectionTrait,
    {
        Ok(enrollment::Entity::find()
            .select_only()
            .column(enrollment::Column::SemesterTaken)
            .distinct()
            .order_by_desc(enrollment::Column::SemesterTaken)
            .into_tuple()
            .all(conn)
            .await?)
    }

    /// Insert a new enrollment.
    pub async fn create<C>(conn: &C, enrollment: enrollment::ActiveModel) -> Result<enrollment::Model>
    where
        C: ConnectionTrait,
    {
        Ok(enrollment.insert(conn).await?)
    }

    /// Update an enrollment in the database.
    pub async fn update<C>(conn: &C, enrollment: enrollment::ActiveModel) -> Result<enrollment::Model>
    where
        C: ConnectionTrait,
    {
        Ok(enrollment.update(conn).await?)
    }

    pub async fn delete<C>(conn: &C, uuid: &Uuid) -> Result<u64>
    where
        C: ConnectionTrait,
    {
        Ok(enrollment::Entity::delete_by_id(*uuid).exec(conn).await?.rows_affected)
    }

    pub async fn delete_for_student<C>(conn: &C, student_uuid: &Uuid) -> Result<u64>
    where
        C: ConnectionTrait,
    {
        Ok(enrollment::Entity::delete_many()
            .filter(enrollment::Column::StudentUuid.eq(*student_uuid))
            .exec(conn)
            .await?
            .rows_affected)
    }

    /// Delete every enrollment in any of the given courses.
    pub async fn delete_for_courses<C>(conn: &C, course_uuids: &[Uuid]) -> Result<u64>
    where
        C: ConnectionTrait,
    {
        if course_uuids.is_empty() {
            return Ok(0);
        }
        Ok(enrollment::Entity::delete_many()
            .filter(enrollment::Column::CourseUuid.is_in(course_uuids.iter().copied()))
            .exec(conn)
            .await?
            .rows_affected)
    }
}
