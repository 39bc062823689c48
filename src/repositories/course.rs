//! Course repository for database operations.

use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use serde::Serialize;
use uuid::Uuid;

use super::pagination::{fetch_page, ListParams, Page};
use super::{contains, count_by_parent};
use crate::entities::{course, enrollment, program};
use crate::error::Result;

/// A course listing row with its program and enrollment count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseRow {
    pub course: course::Model,
    pub program: Option<program::Model>,
    pub enrollment_count: u64,
}

/// Repository for course-related database operations.
pub struct CourseRepository;

impl CourseRepository {
    /// Get a single course by UUID, active or not.
    pub async fn get_by_id<C>(conn: &C, uuid: &Uuid) -> Result<Option<course::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(course::Entity::find_by_id(*uuid).one(conn).await?)
    }

    /// Get a single course by its unique code.
    pub async fn get_by_code<C>(conn: &C, code: &str) -> Result<Option<course::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(course::Entity::find()
            .filter(course::Column::Code.eq(code))
            .one(conn)
            .await?)
    }

    /// Get courses by UUID, keyed by UUID.
    pub async fn get_many<C>(conn: &C, uuids: &[Uuid]) -> Result<HashMap<Uuid, course::Model>>
    where
        C: ConnectionTrait,
    {
        if uuids.is_empty() {
            return Ok(HashMap::new());
        }
        Ok(course::Entity::find()
            .filter(course::Column::Uuid.is_in(uuids.iter().copied()))
            .all(conn)
            .await?
            .into_iter()
            .map(|c| (c.uuid, c))
            .collect())
    }

    /// Active courses, optionally for one program, matching the search term
    /// on name, code or description.
    ///
    /// Ordered by program (name, then uuid), semester and name.
    pub async fn list<C>(conn: &C, params: &ListParams) -> Result<Page<CourseRow>>
    where
        C: ConnectionTrait,
    {
        let mut select = course::Entity::find()
            .find_also_related(program::Entity)
            .filter(course::Column::IsActive.eq(true));

        if let Some(program_uuid) = params.program {
            select = select.filter(course::Column::ProgramUuid.eq(program_uuid));
        }

        if let Some(term) = params.search_term() {
            select = select.filter(
                Condition::any()
                    .add(contains(course::Column::Name, term))
                    .add(contains(course::Column::Code, term))
                    .add(contains(course::Column::Description, term)),
            );
        }

        let select = select
            .order_by_asc(program::Column::Name)
            .order_by_asc(course::Column::ProgramUuid)
            .order_by_asc(course::Column::Semester)
            .order_by_asc(course::Column::Name)
            .order_by_asc(course::Column::Uuid);

        let mut page = fetch_page(conn, select, params).await?;
        let courses = std::mem::take(&mut page.items);
        let uuids: Vec<Uuid> = courses.iter().map(|(c, _)| c.uuid).collect();
        let counts = count_by_parent::<_, enrollment::Entity>(conn, enrollment::Column::CourseUuid, &uuids).await?;

        let rows = courses
            .into_iter()
            .map(|(course, program)| CourseRow {
                enrollment_count: counts.get(&course.uuid).copied().unwrap_or(0),
                course,
                program,
            })
            .collect();
        Ok(page.map_items(rows))
    }

    /// Active courses of a program ordered by semester and name.
    pub async fn get_active_for_program<C>(conn: &C, program_uuid: &Uuid) -> Result<Vec<course::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(course::Entity::find()
            .filter(course::Column::ProgramUuid.eq(*program_uuid))
            .filter(course::Column::IsActive.eq(true))
            .order_by_asc(course::Column::Semester)
            .order_by_asc(course::Column::Name)
            .order_by_asc(course::Column::Uuid)
            .all(conn)
            .await?)
    }

    pub async fn count_active_for_program<C>(conn: &C, program_uuid: &Uuid) -> Result<u64>
    where
        C: ConnectionTrait,
    {
        Ok(course::Entity::find()
            .filter(course::Column::ProgramUuid.eq(*program_uuid))
            .filter(course::Column::IsActive.eq(true))
            .count(conn)
            .await?)
    }

    pub async fn count_active<C>(conn: &C) -> Result<u64>
    where
        C: ConnectionTrait,
    {
        Ok(course::Entity::find()
            .filter(course::Column::IsActive.eq(true))
            .count(conn)
            .await?)
    }

    /// UUIDs of every course owned by a program, active or not.
    pub async fn get_uuids_for_program<C>(conn: &C, program_uuid: &Uuid) -> Result<Vec<Uuid>>
    where
        C: ConnectionTrait,
    {
        Ok(course::Entity::find()
            .select_only()
            .column(course::Column::Uuid)
            .filter(course::Column::ProgramUuid.eq(*program_uuid))
            .into_tuple()
            .all(conn)
            .await?)
    }

    /// Insert a new course.
    pub async fn create<C>(conn: &C, course: course::ActiveModel) -> Result<course::Model>
    where
        C: ConnectionTrait,
    {
        Ok(course.insert(conn).await?)
    }

    /// Update a course in the database.
    pub async fn update<C>(conn: &C, course: course::ActiveModel) -> Result<course::Model>
    where
        C: ConnectionTrait,
    {
        Ok(course.update(conn).await?)
    }

    /// Delete a course row. Callers remove its enrollments first.
    pub async fn delete<C>(conn: &C, uuid: &Uuid) -> Result<u64>
    where
        C: ConnectionTrait,
    {
        Ok(course::Entity::delete_by_id(*uuid).exec(conn).await?.rows_affected)
    }

    /// Delete every course owned by a program.
    pub async fn delete_for_program<C>(conn: &C, program_uuid: &Uuid) -> Result<u64>
    where
        C: ConnectionTrait,
    {
        Ok(course::Entity::delete_many()
            .filter(course::Column::ProgramUuid.eq(*program_uuid))
            .exec(conn)
            .await?
            .rows_affected)
    }
}
