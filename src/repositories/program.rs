//! Program repository for database operations.

use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use serde::Serialize;
use uuid::Uuid;

use super::pagination::{fetch_page, ListParams, Page};
use super::{contains, count_by_parent};
use crate::entities::{course, program};
use crate::error::Result;

/// A program listing row with its course count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgramRow {
    pub program: program::Model,
    pub course_count: u64,
}

/// Repository for program-related database operations.
pub struct ProgramRepository;

impl ProgramRepository {
    /// Get a single program by UUID, active or not.
    pub async fn get_by_id<C>(conn: &C, uuid: &Uuid) -> Result<Option<program::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(program::Entity::find_by_id(*uuid).one(conn).await?)
    }

    /// Get a single program by its unique code.
    pub async fn get_by_code<C>(conn: &C, code: &str) -> Result<Option<program::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(program::Entity::find()
            .filter(program::Column::Code.eq(code))
            .one(conn)
            .await?)
    }

    /// Get programs by UUID, keyed by UUID.
    pub async fn get_many<C>(conn: &C, uuids: &[Uuid]) -> Result<HashMap<Uuid, program::Model>>
    where
        C: ConnectionTrait,
    {
        if uuids.is_empty() {
            return Ok(HashMap::new());
        }
        Ok(program::Entity::find()
            .filter(program::Column::Uuid.is_in(uuids.iter().copied()))
            .all(conn)
            .await?
            .into_iter()
            .map(|p| (p.uuid, p))
            .collect())
    }

    /// Active programs whose name, code or description contain the search
    /// term, ordered by name, each with its course count.
    pub async fn list<C>(conn: &C, params: &ListParams) -> Result<Page<ProgramRow>>
    where
        C: ConnectionTrait,
    {
        let mut select = program::Entity::find().filter(program::Column::IsActive.eq(true));

        if let Some(term) = params.search_term() {
            select = select.filter(
                Condition::any()
                    .add(contains(program::Column::Name, term))
                    .add(contains(program::Column::Code, term))
                    .add(contains(program::Column::Description, term)),
            );
        }

        let select = select
            .order_by_asc(program::Column::Name)
            .order_by_asc(program::Column::Uuid);

        let mut page = fetch_page(conn, select, params).await?;
        let programs = std::mem::take(&mut page.items);
        let uuids: Vec<Uuid> = programs.iter().map(|p| p.uuid).collect();
        let counts = count_by_parent::<_, course::Entity>(conn, course::Column::ProgramUuid, &uuids).await?;

        let rows = programs
            .into_iter()
            .map(|program| ProgramRow {
                course_count: counts.get(&program.uuid).copied().unwrap_or(0),
                program,
            })
            .collect();
        Ok(page.map_items(rows))
    }

    /// All active programs ordered by name, for filter options.
    pub async fn get_all_active<C>(conn: &C) -> Result<Vec<program::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(program::Entity::find()
            .filter(program::Column::IsActive.eq(true))
            .order_by_asc(program::Column::Name)
            .order_by_asc(program::Column::Uuid)
            .all(conn)
            .await?)
    }

    /// Most recently created active programs.
    pub async fn get_recent<C>(conn: &C, limit: u64) -> Result<Vec<program::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(program::Entity::find()
            .filter(program::Column::IsActive.eq(true))
            .order_by_desc(program::Column::CreatedAt)
            .order_by_asc(program::Column::Uuid)
            .limit(limit)
            .all(conn)
            .await?)
    }

    pub async fn count_active<C>(conn: &C) -> Result<u64>
    where
        C: ConnectionTrait,
    {
        Ok(program::Entity::find()
            .filter(program::Column::IsActive.eq(true))
            .count(conn)
            .await?)
    }

    /// Insert a new program.
    pub async fn create<C>(conn: &C, program: program::ActiveModel) -> Result<program::Model>
    where
        C: ConnectionTrait,
    {
        Ok(program.insert(conn).await?)
    }

    /// Update a program in the database.
    pub async fn update<C>(conn: &C, program: program::ActiveModel) -> Result<program::Model>
    where
        C: ConnectionTrait,
    {
        Ok(program.update(conn).await?)
    }

    /// Delete a program row. Callers handle courses and students first.
    pub async fn delete<C>(conn: &C, uuid: &Uuid) -> Result<u64>
    where
        C: ConnectionTrait,
    {
        Ok(program::Entity::delete_by_id(*uuid).exec(conn).await?.rows_affected)
    }
}
