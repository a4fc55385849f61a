//! Pagination wrapper shared by every list endpoint

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::{AppError, AppResult};

/// `?page=` query parameter: a 1-based number or `last`
#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl PageQuery {
    pub fn number(n: i64) -> Self {
        Self {
            page: Some(n.to_string()),
        }
    }
}

/// A validated page position within a result set of known size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: i64,
    pub per_page: i64,
    pub num_pages: i64,
}

impl PageWindow {
    /// Resolve the requested page against `total` rows.
    ///
    /// An empty result still has one (empty) first page. Anything that is not
    /// a page number, or points past the last page, is reported as not found.
    pub fn resolve(query: &PageQuery, total: i64, per_page: i64) -> AppResult<Self> {
        let per_page = per_page.max(1);
        let num_pages = if total <= 0 {
            1
        } else {
            (total + per_page - 1) / per_page
        };

        let page = match query.page.as_deref().map(str::trim) {
            None | Some("") => 1,
            Some("last") => num_pages,
            Some(raw) => raw
                .parse::<i64>()
                .map_err(|_| AppError::NotFound(format!("Invalid page ({})", raw)))?,
        };

        if page < 1 || page > num_pages {
            return Err(AppError::NotFound(format!(
                "Invalid page ({}): That page contains no results",
                page
            )));
        }

        Ok(Self {
            page,
            per_page,
            num_pages,
        })
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }

    pub fn wrap<T>(self, items: Vec<T>, total: i64) -> Page<T>
    where
        T: for<'a> ToSchema<'a>,
    {
        Page {
            items,
            total,
            page: self.page,
            per_page: self.per_page,
            num_pages: self.num_pages,
            is_paginated: self.num_pages > 1,
        }
    }
}

/// Paginated response wrapper
#[derive(Debug, Serialize, ToSchema)]
pub struct Page<T>
where
    T: for<'a> ToSchema<'a>,
{
    /// Objects on this page
    pub items: Vec<T>,
    /// Total number of objects across all pages
    pub total: i64,
    /// Current page number (1-based)
    pub page: i64,
    /// Objects per page
    pub per_page: i64,
    /// Number of pages
    pub num_pages: i64,
    /// Whether the list spans more than one page
    pub is_paginated: bool,
}
