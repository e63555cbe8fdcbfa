use serde::Deserialize;

use crate::models::api::PageMeta;
use crate::validation::FieldError;

/// Raw pagination query parameters as they arrive on the wire.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaginationQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Validated pagination parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// The skip/take pair handed to the store when both page and limit are set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: i64,
    pub limit: i64,
}

impl PageParams {
    /// Resolve the store query window. Only a fully specified page+limit
    /// pair produces a window; anything else means an unrestricted listing.
    pub fn window(&self) -> Option<PageWindow> {
        match (self.page, self.limit) {
            (Some(page), Some(limit)) => Some(PageWindow {
                offset: (page - 1) * limit,
                limit,
            }),
            _ => None,
        }
    }

    /// Metadata envelope: requested page/limit echoed verbatim plus the
    /// true total.
    pub fn meta(&self, total: i64) -> PageMeta {
        PageMeta {
            page: self.page,
            limit: self.limit,
            total,
        }
    }
}

/// Validate optional page/limit strings: each, when present, must parse to a
/// positive integer.
pub fn validate_pagination(query: &PaginationQuery) -> Result<PageParams, Vec<FieldError>> {
    let mut errors = Vec::new();

    let page = match query.page.as_deref() {
        None => None,
        Some(raw) => match positive_int(raw) {
            Some(n) => Some(n),
            None => {
                errors.push(FieldError::new("page", "Page must be a positive integer"));
                None
            }
        },
    };

    let limit = match query.limit.as_deref() {
        None => None,
        Some(raw) => match positive_int(raw) {
            Some(n) => Some(n),
            None => {
                errors.push(FieldError::new("limit", "Limit must be a positive integer"));
                None
            }
        },
    };

    if errors.is_empty() {
        Ok(PageParams { page, limit })
    } else {
        Err(errors)
    }
}

fn positive_int(raw: &str) -> Option<i64> {
    raw.parse::<i64>().ok().filter(|n| *n > 0)
}
