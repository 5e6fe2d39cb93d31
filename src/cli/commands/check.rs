//! `check-script-user`: print how scripts line up with their owners.

use std::path::Path;

use tabled::{Table, Tabled};

use crate::cli::error::{CliError, CliResult};
use crate::cli::utils::{apply_table_style, truncate_with_ellipsis};
use crate::db::SqliteDatabase;
use crate::diagnostics::{ScriptOwnerRow, ScriptUserReport, UserScriptCount, check_script_user};

#[derive(Tabled)]
struct ScriptOwnerDisplay {
    #[tabled(rename = "Script")]
    script_id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "User")]
    user_id: String,
    #[tabled(rename = "Email")]
    email: String,
}

impl From<&ScriptOwnerRow> for ScriptOwnerDisplay {
    fn from(row: &ScriptOwnerRow) -> Self {
        Self {
            script_id: row.script_id.clone(),
            title: truncate_with_ellipsis(&row.title, 40),
            status: row.status.clone(),
            user_id: row.user_id.clone(),
            email: row
                .email
                .clone()
                .unwrap_or_else(|| "(missing user)".to_string()),
        }
    }
}

#[derive(Tabled)]
struct UserScriptCountDisplay {
    #[tabled(rename = "User")]
    user_id: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Scripts")]
    scripts: i64,
}

impl From<&UserScriptCount> for UserScriptCountDisplay {
    fn from(row: &UserScriptCount) -> Self {
        Self {
            user_id: row.user_id.clone(),
            email: row.email.clone(),
            scripts: row.scripts,
        }
    }
}

/// Render the report as two tables plus a one-line summary.
pub fn render_report(report: &ScriptUserReport) -> String {
    let mut output = String::new();

    output.push_str("Scripts and owners\n");
    if report.script_owners.is_empty() {
        output.push_str("No scripts found.\n");
    } else {
        let rows: Vec<ScriptOwnerDisplay> = report
            .script_owners
            .iter()
            .map(ScriptOwnerDisplay::from)
            .collect();
        let mut table = Table::new(rows);
        apply_table_style(&mut table);
        output.push_str(&table.to_string());
        output.push('\n');
    }

    output.push_str("\nScripts per user\n");
    if report.scripts_per_user.is_empty() {
        output.push_str("No users found.\n");
    } else {
        let rows: Vec<UserScriptCountDisplay> = report
            .scripts_per_user
            .iter()
            .map(UserScriptCountDisplay::from)
            .collect();
        let mut table = Table::new(rows);
        apply_table_style(&mut table);
        output.push_str(&table.to_string());
        output.push('\n');
    }

    let orphaned = report.orphaned().count();
    output.push_str(&format!(
        "\n{} script(s), {} without a matching user\n",
        report.script_owners.len(),
        orphaned
    ));

    output
}

/// Open an existing database and build the printed report.
///
/// The file must already exist; this command never creates a database.
pub async fn check_script_user_command(
    db_path: &Path,
    script_id: Option<&str>,
) -> CliResult<String> {
    if !db_path.exists() {
        return Err(CliError::DatabaseMissing {
            path: db_path.display().to_string(),
        });
    }

    let db = SqliteDatabase::open(db_path).await?;
    let report = check_script_user(db.pool(), script_id).await?;
    db.close().await;

    Ok(render_report(&report))
}
