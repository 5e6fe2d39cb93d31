//! Project and project step handlers.
//!
//! Every route acts on behalf of the caller named in `x-user-id`; projects
//! owned by someone else answer 404.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::{IntoParams, ToSchema};

use crate::api::envelope::parse_field;
use crate::api::{
    ApiJson, ApiQuery, ApiResponse, ApiResult, AppState, CurrentUser, ErrorResponse, PageParams,
    PaginatedResponse,
};
use crate::db::{
    Database, NewProject, NewProjectStep, Project, ProjectQuery, ProjectStatus, ProjectStep,
    SourceType,
};

// =============================================================================
// DTOs (Data Transfer Objects)
// =============================================================================

/// Project response DTO
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProjectResponse {
    #[schema(example = "5f0c2e8a9b1d4c3e8f7a6b5c4d3e2f1a")]
    pub id: String,
    pub user_id: String,
    #[schema(example = "Weekly tech digest")]
    pub title: String,
    pub description: Option<String>,
    /// draft, completed or deleted
    #[schema(example = "draft")]
    pub status: String,
    /// news, custom, instagram, youtube or audio
    #[schema(example = "news")]
    pub source_type: String,
    pub source_ref: Option<String>,
    #[schema(example = "2025-01-01 00:00:00.000")]
    pub created_at: String,
    #[schema(example = "2025-01-01 00:00:00.000")]
    pub updated_at: String,
}

impl From<Project> for ProjectResponse {
    fn from(p: Project) -> Self {
        Self {
            id: p.id,
            user_id: p.user_id,
            title: p.title,
            description: p.description,
            status: p.status.to_string(),
            source_type: p.source_type.to_string(),
            source_ref: p.source_ref,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

/// Project step response DTO
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProjectStepResponse {
    pub id: String,
    pub project_id: String,
    #[schema(example = 1)]
    pub step_order: i64,
    #[schema(example = "select_source")]
    pub step_type: String,
    #[schema(value_type = Object)]
    pub data: serde_json::Value,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ProjectStep> for ProjectStepResponse {
    fn from(s: ProjectStep) -> Self {
        Self {
            id: s.id,
            project_id: s.project_id,
            step_order: s.step_order,
            step_type: s.step_type,
            data: s.data,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

/// A project together with its steps
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProjectWithStepsResponse {
    pub project: ProjectResponse,
    pub steps: Vec<ProjectStepResponse>,
}

/// Step payload, keyed by its position within the project
#[derive(Debug, Deserialize, ToSchema)]
pub struct StepRequest {
    #[schema(example = 1)]
    pub step_order: i64,
    #[schema(example = "select_source")]
    pub step_type: String,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub data: serde_json::Value,
}

impl From<StepRequest> for NewProjectStep {
    fn from(s: StepRequest) -> Self {
        Self {
            step_order: s.step_order,
            step_type: s.step_type,
            data: s.data,
        }
    }
}

/// Create project request DTO
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProjectRequest {
    #[schema(example = "Weekly tech digest")]
    pub title: String,
    pub description: Option<String>,
    /// news, custom, instagram, youtube or audio
    #[schema(example = "news")]
    pub source_type: String,
    pub source_ref: Option<String>,
    /// Initial steps, stored in the same transaction as the project
    #[serde(default)]
    pub steps: Vec<StepRequest>,
}

/// Status change request DTO
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    /// draft, completed or deleted
    #[schema(example = "completed")]
    pub status: String,
}

/// Acknowledges a soft delete
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeletedResponse {
    pub id: String,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListProjectsQuery {
    /// 1-based page number
    #[param(example = 1)]
    pub page: Option<usize>,
    /// Items per page (max 100)
    #[param(example = 20)]
    pub limit: Option<usize>,
    /// Field to sort by (title, status, created_at, updated_at)
    #[param(example = "created_at")]
    pub sort: Option<String>,
    /// Sort order (asc, desc)
    #[param(example = "desc")]
    pub order: Option<String>,
    /// Only list projects in this status; deleted projects are hidden otherwise
    #[param(example = "draft")]
    pub status: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// List the caller's projects
#[utoipa::path(
    get,
    path = "/api/v1/projects",
    tag = "projects",
    params(ListProjectsQuery),
    responses(
        (status = 200, description = "Paginated list of projects", body = PaginatedResponse<ProjectResponse>),
        (status = 400, description = "Unknown status", body = ErrorResponse),
        (status = 401, description = "Missing caller identity", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_projects<D: Database>(
    State(state): State<AppState<D>>,
    CurrentUser(user_id): CurrentUser,
    ApiQuery(query): ApiQuery<ListProjectsQuery>,
) -> ApiResult<Json<PaginatedResponse<ProjectResponse>>> {
    let status = query
        .status
        .as_deref()
        .map(parse_field::<ProjectStatus>)
        .transpose()?;

    let (page, limit, sort) = PageParams {
        page: query.page,
        limit: query.limit,
        sort: query.sort,
        order: query.order,
    }
    .resolve();

    let result = state
        .projects()
        .list(&user_id, &ProjectQuery { page: sort, status })
        .await?;

    Ok(Json(PaginatedResponse::from_list(result, page, limit)))
}

/// Get one of the caller's projects
#[utoipa::path(
    get,
    path = "/api/v1/projects/{id}",
    tag = "projects",
    params(("id" = String, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project found", body = ApiResponse<ProjectResponse>),
        (status = 404, description = "Project not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_project<D: Database>(
    State(state): State<AppState<D>>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<ProjectResponse>>> {
    let project = state.projects().get(&id, &user_id).await?;
    Ok(Json(ApiResponse::ok(project.into())))
}

/// Create a project, optionally with its initial steps
#[utoipa::path(
    post,
    path = "/api/v1/projects",
    tag = "projects",
    request_body = CreateProjectRequest,
    responses(
        (status = 201, description = "Project created", body = ApiResponse<ProjectWithStepsResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Caller has no user record", body = ErrorResponse)
    )
)]
#[instrument(skip(state, req), fields(title = %req.title))]
pub async fn create_project<D: Database>(
    State(state): State<AppState<D>>,
    CurrentUser(user_id): CurrentUser,
    ApiJson(req): ApiJson<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<ProjectWithStepsResponse>>)> {
    let source_type: SourceType = parse_field(&req.source_type)?;
    let new_project = NewProject {
        user_id,
        title: req.title,
        description: req.description,
        source_type,
        source_ref: req.source_ref,
    };
    let steps: Vec<NewProjectStep> = req.steps.into_iter().map(NewProjectStep::from).collect();

    let (project, steps) = state.projects().create(&new_project, &steps).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(ProjectWithStepsResponse {
            project: project.into(),
            steps: steps.into_iter().map(ProjectStepResponse::from).collect(),
        })),
    ))
}

/// Change a project's status
#[utoipa::path(
    patch,
    path = "/api/v1/projects/{id}/status",
    tag = "projects",
    params(("id" = String, Path, description = "Project ID")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<ProjectResponse>),
        (status = 400, description = "Unknown status", body = ErrorResponse),
        (status = 404, description = "Project not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, req))]
pub async fn update_project_status<D: Database>(
    State(state): State<AppState<D>>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateStatusRequest>,
) -> ApiResult<Json<ApiResponse<ProjectResponse>>> {
    let status: ProjectStatus = parse_field(&req.status)?;
    let project = state.projects().set_status(&id, &user_id, status).await?;
    Ok(Json(ApiResponse::ok(project.into())))
}

/// Soft-delete a project
///
/// The row is kept with status `deleted` and drops out of the default list
#[utoipa::path(
    delete,
    path = "/api/v1/projects/{id}",
    tag = "projects",
    params(("id" = String, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project deleted", body = ApiResponse<DeletedResponse>),
        (status = 404, description = "Project not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_project<D: Database>(
    State(state): State<AppState<D>>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<DeletedResponse>>> {
    state.projects().delete(&id, &user_id).await?;
    Ok(Json(
        ApiResponse::ok(DeletedResponse { id }).with_message("Project deleted"),
    ))
}

/// List a project's steps in order
#[utoipa::path(
    get,
    path = "/api/v1/projects/{id}/steps",
    tag = "projects",
    params(("id" = String, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Steps ordered by position", body = ApiResponse<Vec<ProjectStepResponse>>),
        (status = 404, description = "Project not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_project_steps<D: Database>(
    State(state): State<AppState<D>>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Vec<ProjectStepResponse>>>> {
    let steps = state.projects().steps(&id, &user_id).await?;
    Ok(Json(ApiResponse::ok(
        steps.into_iter().map(ProjectStepResponse::from).collect(),
    )))
}

/// Insert or replace the step at a position
#[utoipa::path(
    put,
    path = "/api/v1/projects/{id}/steps",
    tag = "projects",
    params(("id" = String, Path, description = "Project ID")),
    request_body = StepRequest,
    responses(
        (status = 200, description = "Step stored", body = ApiResponse<ProjectStepResponse>),
        (status = 400, description = "Invalid step", body = ErrorResponse),
        (status = 404, description = "Project not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, req), fields(step_order = req.step_order))]
pub async fn save_project_step<D: Database>(
    State(state): State<AppState<D>>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<StepRequest>,
) -> ApiResult<Json<ApiResponse<ProjectStepResponse>>> {
    let step = state
        .projects()
        .save_step(&id, &user_id, &NewProjectStep::from(req))
        .await?;
    Ok(Json(ApiResponse::ok(step.into())))
}
