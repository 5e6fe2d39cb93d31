//! SQLite ScriptRepository implementation.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{debug, instrument};

use super::helpers::{
    build_limit_offset_clause, build_order_clause, map_sqlx_error, parse_column,
    parse_column_json,
};
use crate::db::utils::{current_timestamp, generate_entity_id};
use crate::db::{
    DbError, DbResult, ListResult, NewScript, Script, ScriptAnalysis, ScriptPatch, ScriptQuery,
    ScriptRepository, ScriptSource, ScriptStatus, ScriptStatusFilter,
};

const SCRIPT_COLUMNS: &str = "id, user_id, title, content, format, status, source_type, source_id, analysis, created_at, updated_at";

/// SQLx-backed script repository.
pub struct SqliteScriptRepository<'a> {
    pub(crate) pool: &'a SqlitePool,
}

fn script_from_row(row: &SqliteRow) -> DbResult<Script> {
    let status: String = row.get("status");
    let source_type: Option<String> = row.get("source_type");
    let source_id: Option<String> = row.get("source_id");
    let analysis: Option<String> = row.get("analysis");

    let source = match (source_type, source_id) {
        (Some(source_type), Some(source_id)) => Some(ScriptSource {
            source_type: parse_column("source_type", &source_type)?,
            source_id,
        }),
        _ => None,
    };

    Ok(Script {
        id: row.get("id"),
        user_id: row.get("user_id"),
        title: row.get("title"),
        content: row.get("content"),
        format: row.get("format"),
        status: parse_column("status", &status)?,
        source,
        analysis: analysis
            .as_deref()
            .map(|a| parse_column_json::<ScriptAnalysis>("analysis", a))
            .transpose()?,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

impl<'a> ScriptRepository for SqliteScriptRepository<'a> {
    #[instrument(skip(self))]
    async fn get_by_id(&self, id: &str) -> DbResult<Option<Script>> {
        let row = sqlx::query(&format!("SELECT {} FROM scripts WHERE id = ?", SCRIPT_COLUMNS))
            .bind(id)
            .fetch_optional(self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.as_ref().map(script_from_row).transpose()
    }

    #[instrument(skip(self))]
    async fn get_scoped(&self, id: &str, user_id: &str) -> DbResult<Option<Script>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM scripts WHERE id = ? AND user_id = ?",
            SCRIPT_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(script_from_row).transpose()
    }

    #[instrument(skip(self, script), fields(user_id = %script.user_id))]
    async fn create(&self, script: &NewScript) -> DbResult<Script> {
        let id = generate_entity_id();
        let created_at = current_timestamp();
        let updated_at = created_at.clone();

        let (source_type, source_id) = match &script.source {
            Some(source) => (Some(source.source_type.to_string()), Some(source.source_id.clone())),
            None => (None, None),
        };

        sqlx::query(
            r#"
            INSERT INTO scripts (id, user_id, title, content, format, status, source_type, source_id, analysis, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, NULL, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&script.user_id)
        .bind(&script.title)
        .bind(&script.content)
        .bind(&script.format)
        .bind(ScriptStatus::Draft.to_string())
        .bind(source_type)
        .bind(source_id)
        .bind(&created_at)
        .bind(&updated_at)
        .execute(self.pool)
        .await
        .map_err(map_sqlx_error)?;

        debug!(script_id = %id, "Script created");

        Ok(Script {
            id,
            user_id: script.user_id.clone(),
            title: script.title.clone(),
            content: script.content.clone(),
            format: script.format.clone(),
            status: ScriptStatus::Draft,
            source: script.source.clone(),
            analysis: None,
            created_at,
            updated_at,
        })
    }

    #[instrument(skip(self, patch))]
    async fn update(&self, id: &str, user_id: &str, patch: &ScriptPatch) -> DbResult<Option<Script>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE scripts SET
                title = COALESCE(?, title),
                content = COALESCE(?, content),
                format = COALESCE(?, format),
                status = COALESCE(?, status),
                updated_at = MAX(updated_at, ?)
            WHERE id = ? AND user_id = ?
            RETURNING {}
            "#,
            SCRIPT_COLUMNS
        ))
        .bind(&patch.title)
        .bind(&patch.content)
        .bind(&patch.format)
        .bind(patch.status.map(|s| s.to_string()))
        .bind(current_timestamp())
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(script_from_row).transpose()
    }

    #[instrument(skip(self, analysis))]
    async fn set_analysis(
        &self,
        id: &str,
        user_id: &str,
        analysis: &ScriptAnalysis,
    ) -> DbResult<Option<Script>> {
        let analysis_json = serde_json::to_string(analysis).map_err(|e| DbError::InvalidData {
            message: e.to_string(),
            help: "Analysis must serialize to a JSON document".to_string(),
        })?;

        let row = sqlx::query(&format!(
            r#"
            UPDATE scripts SET
                analysis = ?,
                status = CASE WHEN status = 'draft' THEN 'analyzed' ELSE status END,
                updated_at = MAX(updated_at, ?)
            WHERE id = ? AND user_id = ?
            RETURNING {}
            "#,
            SCRIPT_COLUMNS
        ))
        .bind(analysis_json)
        .bind(current_timestamp())
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(script_from_row).transpose()
    }

    #[instrument(skip(self))]
    async fn list_for_user(&self, user_id: &str, query: &ScriptQuery) -> DbResult<ListResult<Script>> {
        let allowed_fields = ["title", "status", "created_at", "updated_at"];
        let order_clause = build_order_clause(&query.page, &allowed_fields, "created_at");
        let limit_clause = build_limit_offset_clause(&query.page);

        let status = match query.status {
            ScriptStatusFilter::All => None,
            ScriptStatusFilter::Only(status) => Some(status.to_string()),
        };
        let status_condition = if status.is_some() { "AND status = ?" } else { "" };

        let list_sql = format!(
            "SELECT {} FROM scripts WHERE user_id = ? {} {} {}",
            SCRIPT_COLUMNS, status_condition, order_clause, limit_clause
        );
        let mut list_query = sqlx::query(&list_sql).bind(user_id);
        if let Some(status) = &status {
            list_query = list_query.bind(status);
        }

        let rows = list_query
            .fetch_all(self.pool)
            .await
            .map_err(map_sqlx_error)?;

        let count_sql = format!(
            "SELECT COUNT(*) FROM scripts WHERE user_id = ? {}",
            status_condition
        );
        let mut count_query = sqlx::query_scalar(&count_sql).bind(user_id);
        if let Some(status) = &status {
            count_query = count_query.bind(status);
        }

        let total: i64 = count_query
            .fetch_one(self.pool)
            .await
            .map_err(map_sqlx_error)?;

        let items = rows
            .iter()
            .map(script_from_row)
            .collect::<DbResult<Vec<_>>>()?;

        Ok(ListResult {
            items,
            total: total as usize,
            limit: query.page.limit,
            offset: query.page.offset.unwrap_or(0),
        })
    }
}
