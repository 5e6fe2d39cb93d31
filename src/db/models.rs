//! Domain models for the content pipeline database.
//!
//! These models are storage-agnostic and represent the core entities
//! used throughout the application.

use serde::{Deserialize, Serialize};

// =============================================================================
// Query Types for Pagination and Sorting
// =============================================================================

/// Sort order for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Base pagination and sorting options - composed into entity-specific queries.
#[derive(Debug, Clone, Default)]
pub struct PageSort {
    /// Maximum number of items to return.
    pub limit: Option<usize>,
    /// Number of items to skip.
    pub offset: Option<usize>,
    /// Field to sort by (validated per entity type).
    pub sort_by: Option<String>,
    /// Sort order (ascending or descending).
    pub sort_order: Option<SortOrder>,
}

/// Query for a user's projects - pagination + status filter.
#[derive(Debug, Clone, Default)]
pub struct ProjectQuery {
    pub page: PageSort,
    /// `None` lists every project that is not soft-deleted.
    pub status: Option<ProjectStatus>,
}

/// Query for a user's scripts - pagination + status filter.
#[derive(Debug, Clone, Default)]
pub struct ScriptQuery {
    pub page: PageSort,
    pub status: ScriptStatusFilter,
}

/// Result of a paginated list query.
#[derive(Debug, Clone)]
pub struct ListResult<T> {
    /// The items in this page.
    pub items: Vec<T>,
    /// Total count of all matching items (before pagination).
    pub total: usize,
    /// Limit that was applied.
    pub limit: Option<usize>,
    /// Offset that was applied.
    pub offset: usize,
}

/// Opaque string identifier used for all entities.
pub type Id = String;

// =============================================================================
// Users
// =============================================================================

/// An account that owns projects and scripts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Id,
    pub email: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Fields for inserting a new user. The id is assigned by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
}

/// Fields for an insert-or-update keyed by user id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpsertUser {
    pub id: Id,
    pub email: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
}

// =============================================================================
// Projects
// =============================================================================

/// Lifecycle state of a project. `Deleted` is a soft delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Draft,
    Completed,
    Deleted,
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectStatus::Draft => write!(f, "draft"),
            ProjectStatus::Completed => write!(f, "completed"),
            ProjectStatus::Deleted => write!(f, "deleted"),
        }
    }
}

impl std::str::FromStr for ProjectStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(ProjectStatus::Draft),
            "completed" => Ok(ProjectStatus::Completed),
            "deleted" => Ok(ProjectStatus::Deleted),
            _ => Err(format!("Invalid project status: {}", s)),
        }
    }
}

/// Where the material for a project or script came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    News,
    Custom,
    Instagram,
    Youtube,
    Audio,
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SourceType::News => "news",
            SourceType::Custom => "custom",
            SourceType::Instagram => "instagram",
            SourceType::Youtube => "youtube",
            SourceType::Audio => "audio",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for SourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "news" => Ok(SourceType::News),
            "custom" => Ok(SourceType::Custom),
            "instagram" => Ok(SourceType::Instagram),
            "youtube" => Ok(SourceType::Youtube),
            "audio" => Ok(SourceType::Audio),
            _ => Err(format!("Invalid source type: {}", s)),
        }
    }
}

/// A unit of content production owned by a single user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: Id,
    pub user_id: Id,
    pub title: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub source_type: SourceType,
    /// External reference for the source (Instagram media id, video URL, ...).
    pub source_ref: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Fields for inserting a new project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProject {
    pub user_id: Id,
    pub title: String,
    pub description: Option<String>,
    pub source_type: SourceType,
    pub source_ref: Option<String>,
}

/// One ordered step of a project's pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectStep {
    pub id: Id,
    pub project_id: Id,
    pub step_order: i64,
    pub step_type: String,
    pub data: serde_json::Value,
    pub created_at: String,
    pub updated_at: String,
}

/// Fields for a step keyed by its position within the project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProjectStep {
    pub step_order: i64,
    pub step_type: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

// =============================================================================
// Scripts
// =============================================================================

/// Review state of a generated script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScriptStatus {
    #[default]
    Draft,
    Analyzed,
    Ready,
    InProduction,
}

impl std::fmt::Display for ScriptStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScriptStatus::Draft => write!(f, "draft"),
            ScriptStatus::Analyzed => write!(f, "analyzed"),
            ScriptStatus::Ready => write!(f, "ready"),
            ScriptStatus::InProduction => write!(f, "in_production"),
        }
    }
}

impl std::str::FromStr for ScriptStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(ScriptStatus::Draft),
            "analyzed" => Ok(ScriptStatus::Analyzed),
            "ready" => Ok(ScriptStatus::Ready),
            "in_production" => Ok(ScriptStatus::InProduction),
            _ => Err(format!("Invalid script status: {}", s)),
        }
    }
}

/// Status filter for listing scripts. `All` is never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScriptStatusFilter {
    #[default]
    All,
    Only(ScriptStatus),
}

impl std::str::FromStr for ScriptStatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(ScriptStatusFilter::All),
            other => other.parse().map(ScriptStatusFilter::Only),
        }
    }
}

/// Link from a script back to the material it was generated from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptSource {
    pub source_type: SourceType,
    pub source_id: String,
}

/// Analysis attached to a script, tagged with its document version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "version")]
pub enum ScriptAnalysis {
    #[serde(rename = "1")]
    V1(AnalysisV1),
}

/// First version of the analysis document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisV1 {
    pub summary: Option<String>,
    pub hook: Option<String>,
    pub score: Option<f64>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Fields the analyzer produced that this version does not model.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A generated script under review in the conveyor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    pub id: Id,
    pub user_id: Id,
    pub title: String,
    pub content: String,
    pub format: String,
    pub status: ScriptStatus,
    pub source: Option<ScriptSource>,
    pub analysis: Option<ScriptAnalysis>,
    pub created_at: String,
    pub updated_at: String,
}

/// Fields for inserting a new script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewScript {
    pub user_id: Id,
    pub title: String,
    pub content: String,
    pub format: String,
    pub source: Option<ScriptSource>,
}

/// Partial update of a script. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScriptPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub format: Option<String>,
    pub status: Option<ScriptStatus>,
}
