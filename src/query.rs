// Filtering and pagination over a collection snapshot

use crate::filter::{Filter, FilterOp};
use crate::record::{IndexValue, Record};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_LIMIT: usize = 10;

/// Query-string keys accepted by the post listing and how each one filters
pub const POST_FILTERS: &[(&str, FilterOp)] = &[("category", FilterOp::Eq), ("author", FilterOp::Contains)];

/// Query-string keys accepted by the user listing
pub const USER_FILTERS: &[(&str, FilterOp)] = &[("role", FilterOp::Eq)];

/// Typed list parameters
#[derive(Debug, Clone, PartialEq)]
pub struct ListParams {
    /// ANDed together; empty means no filtering
    pub filters: Vec<Filter>,
    /// 1-based page number
    pub page: usize,
    /// Page size; no upper bound is enforced
    pub limit: usize,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl ListParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn with_page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Parse raw query-string values
    ///
    /// Keys listed in `allowed` become filters when their value is non-empty;
    /// other keys are ignored. `page` and `limit` must be positive integers,
    /// anything else falls back to the defaults.
    pub fn parse(query: &HashMap<String, String>, allowed: &[(&str, FilterOp)], default_limit: usize) -> Self {
        let filters = allowed
            .iter()
            .filter_map(|(field, op)| {
                query
                    .get(*field)
                    .filter(|value| !value.is_empty())
                    .map(|value| Filter::new(*field, *op, IndexValue::String(value.clone())))
            })
            .collect();

        Self {
            filters,
            page: parse_positive(query.get("page"), DEFAULT_PAGE),
            limit: parse_positive(query.get("limit"), default_limit.max(1)),
        }
    }
}

fn parse_positive(value: Option<&String>, default: usize) -> usize {
    value
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(default)
}

/// Pagination metadata returned alongside a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub pages: usize,
}

/// One page of filtered records
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    /// Number of records that matched the filters, across all pages
    pub total: usize,
    pub pagination: Pagination,
}

/// Filter then paginate `records`, preserving their order
///
/// A page past the end yields an empty `data`. A zero `page` or `limit` is
/// treated as 1.
pub fn query<T: Record>(records: &[T], params: &ListParams) -> Page<T> {
    let page = params.page.max(1);
    let limit = params.limit.max(1);

    let matched: Vec<&T> = if params.filters.is_empty() {
        records.iter().collect()
    } else {
        records
            .iter()
            .filter(|record| {
                let fields = record.indexed_fields();
                params.filters.iter().all(|f| f.matches_fields(&fields))
            })
            .collect()
    };

    let total = matched.len();
    let start = (page - 1).saturating_mul(limit).min(total);
    let end = page.saturating_mul(limit).min(total);
    let data: Vec<T> = matched[start..end].iter().map(|r| (*r).clone()).collect();

    debug!(
        kind = T::kind(),
        filters = params.filters.len(),
        total,
        page,
        limit,
        returned = data.len(),
        "query: done"
    );

    Page {
        data,
        total,
        pagination: Pagination {
            page,
            limit,
            total,
            pages: total.div_ceil(limit),
        },
    }
}
