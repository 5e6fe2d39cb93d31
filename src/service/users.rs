//! User registration and lookup.

use std::sync::Arc;

use tracing::{info, instrument};

use super::{ServiceError, ServiceResult};
use crate::db::{
    Database, DbError, ListResult, NewUser, PageSort, UpsertUser, User, UserRepository,
};

/// Domain operations on users.
pub struct UserService<D: Database> {
    db: Arc<D>,
}

impl<D: Database> Clone for UserService<D> {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
        }
    }
}

fn validate_email(email: &str) -> ServiceResult<()> {
    let trimmed = email.trim();
    let valid = trimmed.len() == email.len()
        && trimmed
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));

    if valid {
        Ok(())
    } else {
        Err(ServiceError::Validation {
            message: format!("'{}' is not a valid email address", email),
        })
    }
}

impl<D: Database> UserService<D> {
    pub fn new(db: Arc<D>) -> Self {
        Self { db }
    }

    /// Create a user, refusing duplicate emails.
    #[instrument(skip(self, user), fields(email = %user.email))]
    pub async fn register(&self, user: &NewUser) -> ServiceResult<User> {
        validate_email(&user.email)?;

        let users = self.db.users();
        if users.find_by_email(&user.email).await?.is_some() {
            return Err(ServiceError::UserAlreadyExists {
                email: user.email.clone(),
            });
        }

        // A concurrent insert can still win the race; the unique index decides.
        let created = users.create(user).await.map_err(|e| match e {
            DbError::Constraint { .. } => ServiceError::UserAlreadyExists {
                email: user.email.clone(),
            },
            other => ServiceError::Storage(other),
        })?;

        info!(user_id = %created.id, "User registered");
        Ok(created)
    }

    /// Fetch a user that must exist.
    pub async fn get(&self, id: &str) -> ServiceResult<User> {
        self.db
            .users()
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::UserNotFoundById { id: id.to_string() })
    }

    /// Fetch a user by email that must exist.
    pub async fn get_by_email(&self, email: &str) -> ServiceResult<User> {
        self.db
            .users()
            .find_by_email(email)
            .await?
            .ok_or_else(|| ServiceError::UserNotFoundByEmail {
                email: email.to_string(),
            })
    }

    /// Insert or update a user keyed by id.
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn upsert(&self, user: &UpsertUser) -> ServiceResult<User> {
        validate_email(&user.email)?;
        if user.id.trim().is_empty() {
            return Err(ServiceError::Validation {
                message: "User id cannot be empty".to_string(),
            });
        }

        self.db.users().upsert(user).await.map_err(|e| match e {
            DbError::Constraint { .. } => ServiceError::UserAlreadyExists {
                email: user.email.clone(),
            },
            other => ServiceError::Storage(other),
        })
    }

    pub async fn list(&self, page: &PageSort) -> ServiceResult<ListResult<User>> {
        Ok(self.db.users().list(page).await?)
    }
}
