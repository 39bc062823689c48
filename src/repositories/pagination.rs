//! Listing parameters and result pages shared by every repository.

use sea_orm::{ConnectionTrait, PaginatorTrait, SelectorTrait};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::MAX_PAGE_SIZE;
use crate::error::{RecordsError, Result};

/// Filters and page selection for a listing.
///
/// `program` and `semester` are ignored by listings that do not support
/// them. Pages are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListParams {
    pub search: Option<String>,
    pub program: Option<Uuid>,
    pub semester: Option<String>,
    pub page: u64,
    pub page_size: u64,
}

impl ListParams {
    pub fn new(page_size: u64) -> Self {
        Self {
            search: None,
            program: None,
            semester: None,
            page: 1,
            page_size,
        }
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn program(mut self, program: Uuid) -> Self {
        self.program = Some(program);
        self
    }

    pub fn semester(mut self, semester: impl Into<String>) -> Self {
        self.semester = Some(semester.into());
        self
    }

    pub fn page(mut self, page: u64) -> Self {
        self.page = page;
        self
    }

    pub fn search_term(&self) -> Option<&str> {
        crate::utils::search::normalize(self.search.as_deref())
    }

    /// Exact semester label, ignoring blank input.
    pub fn semester_label(&self) -> Option<&str> {
        crate::utils::search::normalize(self.semester.as_deref())
    }

    fn validate(&self) -> Result<()> {
        if self.page == 0 {
            return Err(RecordsError::invalid("page", "pages start at 1"));
        }
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(RecordsError::invalid(
                "page_size",
                format!("must be between 1 and {MAX_PAGE_SIZE}"),
            ));
        }
        Ok(())
    }
}

/// One page of a listing plus the total number of matching rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub page: u64,
    pub page_size: u64,
    pub num_pages: u64,
}

impl<T> Page<T> {
    /// Replace the rows, keeping the page bookkeeping.
    pub fn map_items<U>(self, items: Vec<U>) -> Page<U> {
        Page {
            items,
            total_count: self.total_count,
            page: self.page,
            page_size: self.page_size,
            num_pages: self.num_pages,
        }
    }

    pub fn has_next(&self) -> bool {
        self.page < self.num_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

/// Run `select` for the page in `params`. A page past the end is empty but
/// still reports the total count.
pub async fn fetch_page<'db, C, S>(
    conn: &'db C,
    select: S,
    params: &ListParams,
) -> Result<Page<<S::Selector as SelectorTrait>::Item>>
where
    C: ConnectionTrait,
    S: PaginatorTrait<'db, C>,
{
    params.validate()?;

    let paginator = select.paginate(conn, params.page_size);
    let counts = paginator.num_items_and_pages().await?;
    let items = paginator.fetch_page(params.page - 1).await?;

    Ok(Page {
        items,
        total_count: counts.number_of_items,
        page: params.page,
        page_size: params.page_size,
        num_pages: counts.number_of_pages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_builder() {
        let program = Uuid::new_v4();
        let params = ListParams::new(10).search("  calc ").program(program).semester("2024-1").page(3);
        assert_eq!(params.search_term(), Some("calc"));
        assert_eq!(params.program, Some(program));
        assert_eq!(params.semester_label(), Some("2024-1"));
        assert_eq!(params.page, 3);
    }

    #[test]
    fn test_params_validation() {
        assert!(ListParams::new(10).validate().is_ok());
        assert!(ListParams::new(0).validate().is_err());
        assert!(ListParams::new(MAX_PAGE_SIZE + 1).validate().is_err());
        assert!(ListParams::new(10).page(0).validate().is_err());
    }

    #[test]
    fn test_page_navigation() {
        let page = Page {
            items: vec![1, 2],
            total_count: 25,
            page: 2,
            page_size: 10,
            num_pages: 3,
        };
        assert!(page.has_next());
        assert!(page.has_previous());
        let mapped = page.map_items(vec!["a"]);
        assert_eq!(mapped.total_count, 25);
        assert_eq!(mapped.items, vec!["a"]);
    }
}
