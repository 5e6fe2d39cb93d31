//! API route configuration.

use axum::Router;
use axum::routing::{delete, get, patch, post, put};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use super::envelope::{ErrorResponse, Pagination};
use super::handlers::{self, HealthResponse};
use super::state::AppState;
use super::v1::{
    self, CreateProjectRequest, CreateScriptRequest, CreateUserRequest, DeletedResponse,
    ProjectResponse, ProjectStepResponse, ProjectWithStepsResponse, ScriptResponse,
    ScriptSourceDto, StepRequest, UpdateScriptRequest, UpdateStatusRequest, UpsertUserRequest,
    UserResponse,
};
use crate::db::Database;

/// Build routes with generic database type.
///
/// This macro reduces boilerplate when registering handlers that are generic
/// over the Database trait. It applies the turbofish operator automatically.
macro_rules! routes {
    ($D:ty => {
        $($method:ident $path:literal => $($handler:ident)::+),* $(,)?
    }) => {{
        let router = Router::new();
        $(
            let router = router.route($path, $method($($handler)::+::<$D>));
        )*
        router
    }};
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Conveyor API",
        version = "0.1.0",
        description = "Content production conveyor: users, projects, project steps and scripts",
        license(name = "GPL-2.0")
    ),
    paths(
        handlers::health,
        v1::create_user,
        v1::get_user,
        v1::get_user_by_email,
        v1::upsert_user,
        v1::list_users,
        v1::list_projects,
        v1::get_project,
        v1::create_project,
        v1::update_project_status,
        v1::delete_project,
        v1::list_project_steps,
        v1::save_project_step,
        v1::list_scripts,
        v1::get_script,
        v1::create_script,
        v1::update_script,
        v1::set_script_analysis,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorResponse,
            Pagination,
            UserResponse,
            CreateUserRequest,
            UpsertUserRequest,
            ProjectResponse,
            ProjectStepResponse,
            ProjectWithStepsResponse,
            CreateProjectRequest,
            UpdateStatusRequest,
            StepRequest,
            DeletedResponse,
            ScriptResponse,
            ScriptSourceDto,
            CreateScriptRequest,
            UpdateScriptRequest,
        )
    ),
    tags(
        (name = "system", description = "System health and status endpoints"),
        (name = "users", description = "User account endpoints"),
        (name = "projects", description = "Project and project step endpoints"),
        (name = "scripts", description = "Script review endpoints")
    )
)]
pub struct ApiDoc;

/// Create the API router with OpenAPI documentation
pub fn create_router<D: Database + 'static>(state: AppState<D>) -> Router {
    let api = ApiDoc::openapi();

    let system_routes = Router::new().route("/health", get(handlers::health));

    let user_routes = routes!(D => {
        get "/users" => v1::list_users,
        post "/users" => v1::create_user,
        get "/users/{id}" => v1::get_user,
        put "/users/{id}" => v1::upsert_user,
        get "/users/by-email/{email}" => v1::get_user_by_email,
    });

    let project_routes = routes!(D => {
        get "/projects" => v1::list_projects,
        post "/projects" => v1::create_project,
        get "/projects/{id}" => v1::get_project,
        delete "/projects/{id}" => v1::delete_project,
        patch "/projects/{id}/status" => v1::update_project_status,
        get "/projects/{id}/steps" => v1::list_project_steps,
        put "/projects/{id}/steps" => v1::save_project_step,
    });

    let script_routes = routes!(D => {
        get "/scripts" => v1::list_scripts,
        post "/scripts" => v1::create_script,
        get "/scripts/{id}" => v1::get_script,
        patch "/scripts/{id}" => v1::update_script,
        put "/scripts/{id}/analysis" => v1::set_script_analysis,
    });

    let v1_routes = user_routes.merge(project_routes).merge(script_routes);

    system_routes
        .nest("/api/v1", v1_routes)
        .merge(Scalar::with_url("/docs", api))
        .with_state(state)
}
