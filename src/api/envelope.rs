//! Response envelope shared by every JSON endpoint.
//!
//! Success: `{ "success": true, "data": ... }`.
//! Failure: `{ "success": false, "error": "...", "message": "..." }`.
//! Lists add `pagination: { total, page, limit, pages }`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::{IntoParams, ToSchema};

use crate::db::{DbError, ListResult, PageSort, SortOrder};
use crate::service::ServiceError;

/// Default page size when the client does not ask for one.
pub const DEFAULT_LIMIT: usize = 20;
/// Largest page a client may request.
pub const MAX_LIMIT: usize = 100;

/// Standard success envelope.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Failure envelope.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = false)]
    pub success: bool,
    /// Machine-readable error kind
    #[schema(example = "user_not_found_by_id")]
    pub error: String,
    /// Human-readable detail
    #[schema(example = "User not found by id 'a1b2'")]
    pub message: String,
}

/// Page metadata for list responses. `page` is 1-based.
#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Pagination {
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub pages: usize,
}

impl Pagination {
    pub fn new(total: usize, page: usize, limit: usize) -> Self {
        let pages = if limit == 0 { 0 } else { total.div_ceil(limit) };
        Self {
            total,
            page,
            limit,
            pages,
        }
    }
}

/// Paginated variant of the envelope.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub success: bool,
    pub data: Vec<T>,
    pub pagination: Pagination,
}

impl<T> PaginatedResponse<T> {
    /// Build a page from a repository result, converting each item.
    pub fn from_list<U>(result: ListResult<U>, page: usize, limit: usize) -> Self
    where
        T: From<U>,
    {
        Self {
            success: true,
            data: result.items.into_iter().map(T::from).collect(),
            pagination: Pagination::new(result.total, page, limit),
        }
    }
}

/// Page query parameters shared by list endpoints.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct PageParams {
    /// 1-based page number
    #[param(example = 1)]
    pub page: Option<usize>,
    /// Items per page (max 100)
    #[param(example = 20)]
    pub limit: Option<usize>,
    /// Field to sort by
    #[param(example = "created_at")]
    pub sort: Option<String>,
    /// Sort order (asc, desc)
    #[param(example = "desc")]
    pub order: Option<String>,
}

impl PageParams {
    /// Resolve to (page, limit, PageSort) with defaults and clamping applied.
    pub fn resolve(&self) -> (usize, usize, PageSort) {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let sort_order = match self.order.as_deref() {
            Some("desc") => Some(SortOrder::Desc),
            Some("asc") => Some(SortOrder::Asc),
            _ => None,
        };

        (
            page,
            limit,
            PageSort {
                limit: Some(limit),
                offset: Some(page_offset(page, limit)),
                sort_by: self.sort.clone(),
                sort_order,
            },
        )
    }
}

/// Rows to skip for a 1-based page. Saturates at the largest offset SQLite
/// accepts so an absurd page number yields an empty page.
fn page_offset(page: usize, limit: usize) -> usize {
    page.saturating_sub(1)
        .checked_mul(limit)
        .map_or(MAX_SQL_OFFSET, |offset| offset.min(MAX_SQL_OFFSET))
}

const MAX_SQL_OFFSET: usize = i64::MAX as usize;

/// Error half of a handler result, rendered as a failure envelope.
#[derive(Debug)]
pub struct ApiFailure {
    pub status: StatusCode,
    pub kind: &'static str,
    pub message: String,
}

impl ApiFailure {
    pub fn new(status: StatusCode, kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            kind,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "validation", message)
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            success: false,
            error: self.kind.to_string(),
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<ServiceError> for ApiFailure {
    fn from(e: ServiceError) -> Self {
        let message = e.to_string();
        match e {
            ServiceError::UserAlreadyExists { .. } => {
                Self::new(StatusCode::CONFLICT, "user_already_exists", message)
            }
            ServiceError::UserNotFoundById { .. } => {
                Self::new(StatusCode::NOT_FOUND, "user_not_found_by_id", message)
            }
            ServiceError::UserNotFoundByEmail { .. } => {
                Self::new(StatusCode::NOT_FOUND, "user_not_found_by_email", message)
            }
            ServiceError::ProjectNotFound { .. } => {
                Self::new(StatusCode::NOT_FOUND, "project_not_found", message)
            }
            ServiceError::ScriptNotFound { .. } => {
                Self::new(StatusCode::NOT_FOUND, "script_not_found", message)
            }
            ServiceError::Validation { .. } => Self::bad_request(message),
            ServiceError::Storage(DbError::Constraint { .. }) => {
                Self::new(StatusCode::CONFLICT, "constraint_violation", message)
            }
            ServiceError::Storage(db) => {
                error!(error = %db, "Storage failure");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal",
                    "Internal server error",
                )
            }
        }
    }
}

/// Result type returned by handlers.
pub type ApiResult<T> = Result<T, ApiFailure>;

/// Parse a request field into a domain enum, answering 400 on unknown values.
pub fn parse_field<T>(value: &str) -> ApiResult<T>
where
    T: std::str::FromStr<Err = String>,
{
    value.parse().map_err(ApiFailure::bad_request)
}
