//! User account handlers.
//!
//! Accounts are created by the sign-in flow, so these routes do not require
//! a caller identity.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::ToSchema;

use crate::api::{
    ApiJson, ApiQuery, ApiResponse, ApiResult, AppState, ErrorResponse, PageParams,
    PaginatedResponse,
};
use crate::db::{Database, NewUser, UpsertUser, User};

// =============================================================================
// DTOs (Data Transfer Objects)
// =============================================================================

/// User response DTO
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    /// Unique identifier (32-character hex)
    #[schema(example = "5f0c2e8a9b1d4c3e8f7a6b5c4d3e2f1a")]
    pub id: String,
    #[schema(example = "creator@example.com")]
    pub email: String,
    #[schema(example = "Dana")]
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    #[schema(example = "2025-01-01 00:00:00.000")]
    pub created_at: String,
    #[schema(example = "2025-01-01 00:00:00.000")]
    pub updated_at: String,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            name: u.name,
            avatar_url: u.avatar_url,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

/// Create user request DTO
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    #[schema(example = "creator@example.com")]
    pub email: String,
    #[schema(example = "Dana")]
    pub name: Option<String>,
    pub avatar_url: Option<String>,
}

/// Upsert user request DTO. The id comes from the path.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpsertUserRequest {
    #[schema(example = "creator@example.com")]
    pub email: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Register a user
///
/// Fails with 409 when the email is already taken
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid email", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse)
    )
)]
#[instrument(skip(state, req), fields(email = %req.email))]
pub async fn create_user<D: Database>(
    State(state): State<AppState<D>>,
    ApiJson(req): ApiJson<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<UserResponse>>)> {
    let user = state
        .users()
        .register(&NewUser {
            email: req.email,
            name: req.name,
            avatar_url: req.avatar_url,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(UserResponse::from(user))),
    ))
}

/// Get a user by ID
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    tag = "users",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User found", body = ApiResponse<UserResponse>),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_user<D: Database>(
    State(state): State<AppState<D>>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    let user = state.users().get(&id).await?;
    Ok(Json(ApiResponse::ok(user.into())))
}

/// Get a user by email
#[utoipa::path(
    get,
    path = "/api/v1/users/by-email/{email}",
    tag = "users",
    params(("email" = String, Path, description = "Email address")),
    responses(
        (status = 200, description = "User found", body = ApiResponse<UserResponse>),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_user_by_email<D: Database>(
    State(state): State<AppState<D>>,
    Path(email): Path<String>,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    let user = state.users().get_by_email(&email).await?;
    Ok(Json(ApiResponse::ok(user.into())))
}

/// Insert or update a user by ID
///
/// Repeating the same request leaves the row unchanged apart from `updated_at`
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    tag = "users",
    params(("id" = String, Path, description = "User ID")),
    request_body = UpsertUserRequest,
    responses(
        (status = 200, description = "User stored", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid email", body = ErrorResponse),
        (status = 409, description = "Email belongs to another user", body = ErrorResponse)
    )
)]
#[instrument(skip(state, req))]
pub async fn upsert_user<D: Database>(
    State(state): State<AppState<D>>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpsertUserRequest>,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    let user = state
        .users()
        .upsert(&UpsertUser {
            id,
            email: req.email,
            name: req.name,
            avatar_url: req.avatar_url,
        })
        .await?;

    Ok(Json(ApiResponse::ok(user.into())))
}

/// List users
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "users",
    params(PageParams),
    responses(
        (status = 200, description = "Paginated list of users", body = PaginatedResponse<UserResponse>),
        (status = 400, description = "Invalid query", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_users<D: Database>(
    State(state): State<AppState<D>>,
    ApiQuery(params): ApiQuery<PageParams>,
) -> ApiResult<Json<PaginatedResponse<UserResponse>>> {
    let (page, limit, sort) = params.resolve();
    let result = state.users().list(&sort).await?;

    Ok(Json(PaginatedResponse::from_list(result, page, limit)))
}
