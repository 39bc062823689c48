//! Repository layer for database operations.
//!
//! This module provides repository structs that encapsulate database queries
//! and operations, following the Data Mapper pattern recommended by SeaORM.
//! Repositories keep entities as pure data models while providing reusable
//! database access methods. Every function takes any [`ConnectionTrait`], so
//! the same query runs on the pool or inside a transaction.

pub mod course;
pub mod enrollment;
pub mod pagination;
pub mod program;
pub mod student;

pub use course::{CourseRepository, CourseRow};
pub use enrollment::{EnrollmentRepository, EnrollmentRow, OutcomeStats};
pub use pagination::{ListParams, Page};
pub use program::{ProgramRepository, ProgramRow};
pub use student::{StudentRepository, StudentRow};

use std::collections::HashMap;

use sea_orm::sea_query::{Expr, LikeExpr, SimpleExpr};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect};
use uuid::Uuid;

use crate::error::Result;
use crate::utils::search::contains_pattern;

/// Case-insensitive (ASCII) substring match on `column`.
pub(crate) fn contains<Col: ColumnTrait>(column: Col, term: &str) -> SimpleExpr {
    column.like(LikeExpr::new(contains_pattern(term)).escape('\\'))
}

/// Count rows of `E` per value of `parent`, for the given parent uuids.
///
/// Parents with no rows are absent from the map.
pub(crate) async fn count_by_parent<C, E>(conn: &C, parent: E::Column, ids: &[Uuid]) -> Result<HashMap<Uuid, u64>>
where
    C: ConnectionTrait,
    E: EntityTrait,
{
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows: Vec<(Uuid, i64)> = E::find()
        .select_only()
        .column(parent)
        .column_as(Expr::col(parent).count(), "total")
        .filter(parent.is_in(ids.iter().copied()))
        .group_by(parent)
        .into_tuple()
        .all(conn)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(uuid, total)| (uuid, u64::try_from(total).unwrap_or_default()))
        .collect())
}
