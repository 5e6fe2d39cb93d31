//! SQLite UserRepository implementation.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{debug, instrument};

use super::helpers::{build_limit_offset_clause, build_order_clause, map_sqlx_error};
use crate::db::utils::{current_timestamp, generate_entity_id};
use crate::db::{DbResult, ListResult, NewUser, PageSort, UpsertUser, User, UserRepository};

const USER_COLUMNS: &str = "id, email, name, avatar_url, created_at, updated_at";

/// SQLx-backed user repository.
pub struct SqliteUserRepository<'a> {
    pub(crate) pool: &'a SqlitePool,
}

fn user_from_row(row: &SqliteRow) -> User {
    User {
        id: row.get("id"),
        email: row.get("email"),
        name: row.get("name"),
        avatar_url: row.get("avatar_url"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl<'a> UserRepository for SqliteUserRepository<'a> {
    #[instrument(skip(self))]
    async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
            .bind(id)
            .fetch_optional(self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.as_ref().map(user_from_row))
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM users WHERE email = ?",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.as_ref().map(user_from_row))
    }

    #[instrument(skip(self, user), fields(email = %user.email))]
    async fn create(&self, user: &NewUser) -> DbResult<User> {
        let id = generate_entity_id();
        // Always generate current timestamps - never use input timestamps
        let created_at = current_timestamp();
        let updated_at = created_at.clone();

        sqlx::query(
            "INSERT INTO users (id, email, name, avatar_url, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.avatar_url)
        .bind(&created_at)
        .bind(&updated_at)
        .execute(self.pool)
        .await
        .map_err(map_sqlx_error)?;

        debug!(user_id = %id, "User created");

        Ok(User {
            id,
            email: user.email.clone(),
            name: user.name.clone(),
            avatar_url: user.avatar_url.clone(),
            created_at,
            updated_at,
        })
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn upsert(&self, user: &UpsertUser) -> DbResult<User> {
        let now = current_timestamp();

        // MAX keeps updated_at from moving backwards if the clock does.
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO users (id, email, name, avatar_url, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                email = excluded.email,
                name = excluded.name,
                avatar_url = excluded.avatar_url,
                updated_at = MAX(users.updated_at, excluded.updated_at)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.avatar_url)
        .bind(&now)
        .bind(&now)
        .fetch_one(self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(user_from_row(&row))
    }

    #[instrument(skip(self))]
    async fn list(&self, page: &PageSort) -> DbResult<ListResult<User>> {
        let order_clause = build_order_clause(page, &["email", "created_at", "updated_at"], "created_at");
        let limit_clause = build_limit_offset_clause(page);

        let rows = sqlx::query(&format!(
            "SELECT {} FROM users {} {}",
            USER_COLUMNS, order_clause, limit_clause
        ))
        .fetch_all(self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(ListResult {
            items: rows.iter().map(user_from_row).collect(),
            total: total as usize,
            limit: page.limit,
            offset: page.offset.unwrap_or(0),
        })
    }
}
