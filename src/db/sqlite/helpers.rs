//! Shared helper functions for SQLite repositories.

use std::str::FromStr;

use crate::db::{DbError, PageSort, SortOrder};

/// Map a sqlx error onto the storage error taxonomy.
///
/// Uniqueness failures become `Constraint` so callers can tell a duplicate
/// apart from a broken store.
pub fn map_sqlx_error(e: sqlx::Error) -> DbError {
    if let Some(db_err) = e.as_database_error()
        && db_err.is_unique_violation()
    {
        return DbError::Constraint {
            message: db_err.message().to_string(),
        };
    }
    DbError::Database {
        message: e.to_string(),
    }
}

/// Parse a TEXT column into a domain enum.
pub fn parse_column<T>(column: &str, value: &str) -> Result<T, DbError>
where
    T: FromStr<Err = String>,
{
    value.parse().map_err(|message| DbError::InvalidData {
        message,
        help: format!("Column '{}' holds a value this build does not know", column),
    })
}

/// Parse a JSON TEXT column.
pub fn parse_column_json<T>(column: &str, value: &str) -> Result<T, DbError>
where
    T: serde::de::DeserializeOwned,
{
    serde_json::from_str(value).map_err(|e| DbError::InvalidData {
        message: format!("Column '{}' is not valid JSON: {}", column, e),
        help: "Rewrite the column with a document this build can read".to_string(),
    })
}

/// Validate and map a sort field to the actual column name.
/// Returns None for invalid fields (falls back to default).
pub fn validate_sort_field(field: &str, allowed: &[&str]) -> Option<&'static str> {
    for &allowed_field in allowed {
        if field == allowed_field {
            // Return static str to avoid lifetime issues
            return match field {
                "title" => Some("title"),
                "email" => Some("email"),
                "status" => Some("status"),
                "created_at" => Some("created_at"),
                "updated_at" => Some("updated_at"),
                _ => None,
            };
        }
    }
    None
}

/// Build ORDER BY clause from PageSort parameters.
pub fn build_order_clause(page: &PageSort, allowed_fields: &[&str], default_field: &str) -> String {
    let sort_field = page
        .sort_by
        .as_deref()
        .and_then(|f| validate_sort_field(f, allowed_fields))
        .unwrap_or(default_field);

    let order = match page.sort_order.unwrap_or(SortOrder::Asc) {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    };

    // id breaks ties between rows created within the same millisecond
    format!("ORDER BY {} {}, id {}", sort_field, order, order)
}

/// Build LIMIT/OFFSET clause from PageSort parameters.
/// Note: SQL requires LIMIT when using OFFSET. If offset is provided without limit,
/// we use LIMIT -1 (SQLite's "no limit" value).
/// Values above `i64::MAX` are clamped, SQLite rejects them otherwise.
pub fn build_limit_offset_clause(page: &PageSort) -> String {
    let mut clause = String::new();

    let offset = page.offset.filter(|o| *o > 0).map(sql_integer);

    if let Some(limit) = page.limit {
        clause.push_str(&format!(" LIMIT {}", sql_integer(limit)));
    } else if offset.is_some() {
        clause.push_str(" LIMIT -1");
    }

    if let Some(offset) = offset {
        clause.push_str(&format!(" OFFSET {}", offset));
    }

    clause
}

fn sql_integer(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
