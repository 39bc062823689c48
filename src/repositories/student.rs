//! Student repository for database operations.

use std::collections::HashMap;

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use serde::Serialize;
use uuid::Uuid;

use super::pagination::{fetch_page, ListParams, Page};
use super::{contains, count_by_parent};
use crate::entities::{enrollment, program, student};
use crate::error::Result;

/// A student listing row with the primary program and enrollment count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentRow {
    pub student: student::Model,
    pub program: Option<program::Model>,
    pub enrollment_count: u64,
}

/// Repository for student-related database operations.
pub struct StudentRepository;

impl StudentRepository {
    /// Get a single student by UUID, active or not.
    pub async fn get_by_id<C>(conn: &C, uuid: &Uuid) -> Result<Option<student::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(student::Entity::find_by_id(*uuid).one(conn).await?)
    }

    pub async fn get_by_identification_number<C>(conn: &C, number: &str) -> Result<Option<student::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(student::Entity::find()
            .filter(student::Column::IdentificationNumber.eq(number))
            .one(conn)
            .await?)
    }

    pub async fn get_by_email<C>(conn: &C, email: &str) -> Result<Option<student::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(student::Entity::find()
            .filter(student::Column::Email.eq(email))
            .one(conn)
            .await?)
    }

    /// Get students by UUID, keyed by UUID.
    pub async fn get_many<C>(conn: &C, uuids: &[Uuid]) -> Result<HashMap<Uuid, student::Model>>
    where
        C: ConnectionTrait,
    {
        if uuids.is_empty() {
            return Ok(HashMap::new());
        }
        Ok(student::Entity::find()
            .filter(student::Column::Uuid.is_in(uuids.iter().copied()))
            .all(conn)
            .await?
            .into_iter()
            .map(|s| (s.uuid, s))
            .collect())
    }

    /// Active students, optionally of one primary program, matching the
    /// search term on names, identification number or email.
    ///
    /// Ordered by last names, then first names.
    pub async fn list<C>(conn: &C, params: &ListParams) -> Result<Page<StudentRow>>
    where
        C: ConnectionTrait,
    {
        let mut select = student::Entity::find()
            .find_also_related(program::Entity)
            .filter(student::Column::IsActive.eq(true));

        if let Some(program_uuid) = params.program {
            select = select.filter(student::Column::ProgramUuid.eq(program_uuid));
        }

        if let Some(term) = params.search_term() {
            select = select.filter(
                Condition::any()
                    .add(contains(student::Column::FirstNames, term))
                    .add(contains(student::Column::LastNames, term))
                    .add(contains(student::Column::IdentificationNumber, term))
                    .add(contains(student::Column::Email, term)),
            );
        }

        let select = select
            .order_by_asc(student::Column::LastNames)
            .order_by_asc(student::Column::FirstNames)
            .order_by_asc(student::Column::Uuid);

        let mut page = fetch_page(conn, select, params).await?;
        let students = std::mem::take(&mut page.items);
        let uuids: Vec<Uuid> = students.iter().map(|(s, _)| s.uuid).collect();
        let counts = count_by_parent::<_, enrollment::Entity>(conn, enrollment::Column::StudentUuid, &uuids).await?;

        let rows = students
            .into_iter()
            .map(|(student, program)| StudentRow {
                enrollment_count: counts.get(&student.uuid).copied().unwrap_or(0),
                student,
                program,
            })
            .collect();
        Ok(page.map_items(rows))
    }

    /// Active students of a program ordered by last and first names.
    pub async fn get_active_for_program<C>(conn: &C, program_uuid: &Uuid, limit: u64) -> Result<Vec<student::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(student::Entity::find()
            .filter(student::Column::ProgramUuid.eq(*program_uuid))
            .filter(student::Column::IsActive.eq(true))
            .order_by_asc(student::Column::LastNames)
            .order_by_asc(student::Column::FirstNames)
            .order_by_asc(student::Column::Uuid)
            .limit(limit)
            .all(conn)
            .await?)
    }

    pub async fn count_active_for_program<C>(conn: &C, program_uuid: &Uuid) -> Result<u64>
    where
        C: ConnectionTrait,
    {
        Ok(student::Entity::find()
            .filter(student::Column::ProgramUuid.eq(*program_uuid))
            .filter(student::Column::IsActive.eq(true))
            .count(conn)
            .await?)
    }

    pub async fn count_active<C>(conn: &C) -> Result<u64>
    where
        C: ConnectionTrait,
    {
        Ok(student::Entity::find()
            .filter(student::Column::IsActive.eq(true))
            .count(conn)
            .await?)
    }

    /// Most recently admitted active students.
    pub async fn get_recently_admitted<C>(conn: &C, limit: u64) -> Result<Vec<student::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(student::Entity::find()
            .filter(student::Column::IsActive.eq(true))
            .order_by_desc(student::Column::AdmissionDate)
            .order_by_asc(student::Column::Uuid)
            .limit(limit)
            .all(conn)
            .await?)
    }

    /// Clear the primary program of every student pointing at it.
    pub async fn clear_program<C>(conn: &C, program_uuid: &Uuid) -> Result<u64>
    where
        C: ConnectionTrait,
    {
        Ok(student::Entity::update_many()
            .col_expr(student::Column::ProgramUuid, Expr::value(Option::<Uuid>::None))
            .filter(student::Column::ProgramUuid.eq(*program_uuid))
            .exec(conn)
            .await?
            .rows_affected)
    }

    /// Insert a new student.
    pub async fn create<C>(conn: &C, student: student::ActiveModel) -> Result<student::Model>
    where
        C: ConnectionTrait,
    {
        Ok(student.insert(conn).await?)
    }

    /// Update a student in the database.
    pub async fn update<C>(conn: &C, student: student::ActiveModel) -> Result<student::Model>
    where
        C: ConnectionTrait,
    {
        Ok(student.update(conn).await?)
    }

    /// Delete a student row. Callers remove its enrollments first.
    pub async fn delete<C>(conn: &C, uuid: &Uuid) -> Result<u64>
    where
        C: ConnectionTrait,
    {
        Ok(student::Entity::delete_by_id(*uuid).exec(conn).await?.rows_affected)
    }
}
