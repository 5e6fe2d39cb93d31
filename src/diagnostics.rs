//! Read-only consistency report on scripts and their owners.
//!
//! Runs two joins against the store: every script with the user it points
//! at, and every user with how many scripts they own. Scripts whose owner
//! row is missing show up with no email.

use sqlx::{Row, SqlitePool};
use tracing::instrument;

use crate::db::DbResult;
use crate::db::sqlite::map_sqlx_error;

/// One script joined with its owning user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptOwnerRow {
    pub script_id: String,
    pub title: String,
    pub status: String,
    pub user_id: String,
    /// `None` when the referenced user does not exist.
    pub email: Option<String>,
}

/// Script totals per user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserScriptCount {
    pub user_id: String,
    pub email: String,
    pub scripts: i64,
}

/// The full report printed by `check-script-user`.
#[derive(Debug, Clone, Default)]
pub struct ScriptUserReport {
    pub script_owners: Vec<ScriptOwnerRow>,
    pub scripts_per_user: Vec<UserScriptCount>,
}

impl ScriptUserReport {
    /// Scripts whose owner row is missing.
    pub fn orphaned(&self) -> impl Iterator<Item = &ScriptOwnerRow> {
        self.script_owners.iter().filter(|r| r.email.is_none())
    }
}

/// Collect the report, optionally narrowed to a single script.
#[instrument(skip(pool))]
pub async fn check_script_user(
    pool: &SqlitePool,
    script_id: Option<&str>,
) -> DbResult<ScriptUserReport> {
    let filter = if script_id.is_some() {
        "WHERE s.id = ?"
    } else {
        ""
    };
    let owners_sql = format!(
        r#"
        SELECT s.id AS script_id, s.title, s.status, s.user_id, u.email
        FROM scripts s
        LEFT JOIN users u ON u.id = s.user_id
        {}
        ORDER BY s.created_at, s.id
        "#,
        filter
    );

    let mut owners_query = sqlx::query(&owners_sql);
    if let Some(id) = script_id {
        owners_query = owners_query.bind(id);
    }

    let script_owners = owners_query
        .fetch_all(pool)
        .await
        .map_err(map_sqlx_error)?
        .into_iter()
        .map(|row| ScriptOwnerRow {
            script_id: row.get("script_id"),
            title: row.get("title"),
            status: row.get("status"),
            user_id: row.get("user_id"),
            email: row.get("email"),
        })
        .collect();

    let scripts_per_user = sqlx::query(
        r#"
        SELECT u.id AS user_id, u.email, COUNT(s.id) AS scripts
        FROM users u
        LEFT JOIN scripts s ON s.user_id = u.id
        GROUP BY u.id, u.email
        ORDER BY scripts DESC, u.email
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(map_sqlx_error)?
    .into_iter()
    .map(|row| UserScriptCount {
        user_id: row.get("user_id"),
        email: row.get("email"),
        scripts: row.get("scripts"),
    })
    .collect();

    Ok(ScriptUserReport {
        script_owners,
        scripts_per_user,
    })
}
