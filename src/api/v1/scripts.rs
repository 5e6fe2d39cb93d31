//! Script handlers.

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
    ApiFailure, ApiJson, ApiQuery, ApiResponse, ApiResult, AppState, CurrentUser, ErrorResponse,
    PageParams, PaginatedResponse,
};
use crate::db::{
    Database, NewScript, Script, ScriptAnalysis, ScriptPatch, ScriptQuery, ScriptSource,
    ScriptStatus, ScriptStatusFilter,
};

// =============================================================================
// DTOs (Data Transfer Objects)
// =============================================================================

/// Material a script was generated from
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ScriptSourceDto {
    #[schema(example = "instagram")]
    pub source_type: String,
    #[schema(example = "17895695668004550")]
    pub source_id: String,
}

/// Script response DTO
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ScriptResponse {
    pub id: String,
    pub user_id: String,
    #[schema(example = "Three AI tools you missed")]
    pub title: String,
    pub content: String,
    #[schema(example = "reel")]
    pub format: String,
    /// draft, analyzed, ready or in_production
    #[schema(example = "draft")]
    pub status: String,
    pub source: Option<ScriptSourceDto>,
    /// Versioned analysis document, tagged by `version`
    #[schema(value_type = Option<Object>)]
    pub analysis: Option<serde_json::Value>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Script> for ScriptResponse {
    fn from(s: Script) -> Self {
        Self {
            id: s.id,
            user_id: s.user_id,
            title: s.title,
            content: s.content,
            format: s.format,
            status: s.status.to_string(),
            source: s.source.map(|src| ScriptSourceDto {
                source_type: src.source_type.to_string(),
                source_id: src.source_id,
            }),
            analysis: s.analysis.and_then(|a| serde_json::to_value(a).ok()),
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

/// Create script request DTO
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateScriptRequest {
    #[schema(example = "Three AI tools you missed")]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[schema(example = "reel")]
    pub format: String,
    pub source: Option<ScriptSourceDto>,
}

/// Partial script update. Omitted fields are left unchanged.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateScriptRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub format: Option<String>,
    /// draft, analyzed, ready or in_production
    #[schema(example = "ready")]
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListScriptsQuery {
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
    /// Status filter, or `all`
    #[param(example = "all")]
    pub status: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// List the caller's scripts
#[utoipa::path(
    get,
    path = "/api/v1/scripts",
    tag = "scripts",
    params(ListScriptsQuery),
    responses(
        (status = 200, description = "Paginated list of scripts", body = PaginatedResponse<ScriptResponse>),
        (status = 400, description = "Unknown status", body = ErrorResponse),
        (status = 401, description = "Missing caller identity", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_scripts<D: Database>(
    State(state): State<AppState<D>>,
    CurrentUser(user_id): CurrentUser,
    ApiQuery(query): ApiQuery<ListScriptsQuery>,
) -> ApiResult<Json<PaginatedResponse<ScriptResponse>>> {
    let status = match query.status.as_deref() {
        Some(s) => parse_field::<ScriptStatusFilter>(s)?,
        None => ScriptStatusFilter::All,
    };

    let (page, limit, sort) = PageParams {
        page: query.page,
        limit: query.limit,
        sort: query.sort,
        order: query.order,
    }
    .resolve();

    let result = state
        .scripts()
        .list(&user_id, &ScriptQuery { page: sort, status })
        .await?;

    Ok(Json(PaginatedResponse::from_list(result, page, limit)))
}

/// Get one of the caller's scripts
#[utoipa::path(
    get,
    path = "/api/v1/scripts/{id}",
    tag = "scripts",
    params(("id" = String, Path, description = "Script ID")),
    responses(
        (status = 200, description = "Script found", body = ApiResponse<ScriptResponse>),
        (status = 404, description = "Script not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_script<D: Database>(
    State(state): State<AppState<D>>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<ScriptResponse>>> {
    let script = state.scripts().get(&id, &user_id).await?;
    Ok(Json(ApiResponse::ok(script.into())))
}

/// Create a script in `draft` status
#[utoipa::path(
    post,
    path = "/api/v1/scripts",
    tag = "scripts",
    request_body = CreateScriptRequest,
    responses(
        (status = 201, description = "Script created", body = ApiResponse<ScriptResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Caller has no user record", body = ErrorResponse)
    )
)]
#[instrument(skip(state, req), fields(title = %req.title))]
pub async fn create_script<D: Database>(
    State(state): State<AppState<D>>,
    CurrentUser(user_id): CurrentUser,
    ApiJson(req): ApiJson<CreateScriptRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<ScriptResponse>>)> {
    let source = req
        .source
        .map(|src| -> ApiResult<ScriptSource> {
            Ok(ScriptSource {
                source_type: parse_field(&src.source_type)?,
                source_id: src.source_id,
            })
        })
        .transpose()?;

    let script = state
        .scripts()
        .create(&NewScript {
            user_id,
            title: req.title,
            content: req.content,
            format: req.format,
            source,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(ScriptResponse::from(script))),
    ))
}

/// Update a script's fields
#[utoipa::path(
    patch,
    path = "/api/v1/scripts/{id}",
    tag = "scripts",
    params(("id" = String, Path, description = "Script ID")),
    request_body = UpdateScriptRequest,
    responses(
        (status = 200, description = "Script updated", body = ApiResponse<ScriptResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Script not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, req))]
pub async fn update_script<D: Database>(
    State(state): State<AppState<D>>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateScriptRequest>,
) -> ApiResult<Json<ApiResponse<ScriptResponse>>> {
    let status = req
        .status
        .as_deref()
        .map(parse_field::<ScriptStatus>)
        .transpose()?;

    let patch = ScriptPatch {
        title: req.title,
        content: req.content,
        format: req.format,
        status,
    };

    let script = state.scripts().update(&id, &user_id, &patch).await?;
    Ok(Json(ApiResponse::ok(script.into())))
}

/// Attach an analysis document
///
/// The body must carry a known `version` tag. A draft script moves to `analyzed`.
#[utoipa::path(
    put,
    path = "/api/v1/scripts/{id}/analysis",
    tag = "scripts",
    params(("id" = String, Path, description = "Script ID")),
    request_body(content = Object, description = "Analysis document, e.g. {\"version\": \"1\", \"summary\": \"...\"}"),
    responses(
        (status = 200, description = "Analysis stored", body = ApiResponse<ScriptResponse>),
        (status = 400, description = "Unknown analysis version", body = ErrorResponse),
        (status = 404, description = "Script not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, body))]
pub async fn set_script_analysis<D: Database>(
    State(state): State<AppState<D>>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<serde_json::Value>,
) -> ApiResult<Json<ApiResponse<ScriptResponse>>> {
    let analysis: ScriptAnalysis = serde_json::from_value(body)
        .map_err(|e| ApiFailure::bad_request(format!("Invalid analysis: {}", e)))?;

    let script = state
        .scripts()
        .attach_analysis(&id, &user_id, &analysis)
        .await?;
    Ok(Json(ApiResponse::ok(script.into())))
}
