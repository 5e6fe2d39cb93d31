//! Script review operations for the conveyor.

use std::sync::Arc;

use tracing::instrument;

use super::{ServiceError, ServiceResult};
use crate::db::{
    Database, ListResult, NewScript, Script, ScriptAnalysis, ScriptPatch, ScriptQuery,
    ScriptRepository, UserRepository,
};

/// Domain operations on generated scripts, scoped to their owner.
pub struct ScriptService<D: Database> {
    db: Arc<D>,
}

impl<D: Database> Clone for ScriptService<D> {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
        }
    }
}

impl<D: Database> ScriptService<D> {
    pub fn new(db: Arc<D>) -> Self {
        Self { db }
    }

    pub async fn get(&self, id: &str, user_id: &str) -> ServiceResult<Script> {
        self.db
            .scripts()
            .get_scoped(id, user_id)
            .await?
            .ok_or_else(|| ServiceError::ScriptNotFound { id: id.to_string() })
    }

    #[instrument(skip(self, script), fields(user_id = %script.user_id))]
    pub async fn create(&self, script: &NewScript) -> ServiceResult<Script> {
        if script.title.trim().is_empty() {
            return Err(ServiceError::Validation {
                message: "Script title cannot be empty".to_string(),
            });
        }
        if let Some(source) = &script.source
            && source.source_id.trim().is_empty()
        {
            return Err(ServiceError::Validation {
                message: "Script source needs a source id".to_string(),
            });
        }

        if self.db.users().get_by_id(&script.user_id).await?.is_none() {
            return Err(ServiceError::UserNotFoundById {
                id: script.user_id.clone(),
            });
        }

        Ok(self.db.scripts().create(script).await?)
    }

    pub async fn update(
        &self,
        id: &str,
        user_id: &str,
        patch: &ScriptPatch,
    ) -> ServiceResult<Script> {
        if patch.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(ServiceError::Validation {
                message: "Script title cannot be empty".to_string(),
            });
        }

        self.db
            .scripts()
            .update(id, user_id, patch)
            .await?
            .ok_or_else(|| ServiceError::ScriptNotFound { id: id.to_string() })
    }

    #[instrument(skip(self, analysis))]
    pub async fn attach_analysis(
        &self,
        id: &str,
        user_id: &str,
        analysis: &ScriptAnalysis,
    ) -> ServiceResult<Script> {
        self.db
            .scripts()
            .set_analysis(id, user_id, analysis)
            .await?
            .ok_or_else(|| ServiceError::ScriptNotFound { id: id.to_string() })
    }

    pub async fn list(&self, user_id: &str, query: &ScriptQuery) -> ServiceResult<ListResult<Script>> {
        Ok(self.db.scripts().list_for_user(user_id, query).await?)
    }
}
