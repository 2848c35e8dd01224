use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{ApplicationDraft, ApplicationStore, DraftStore, StoreError};
use crate::workflows::state::{ApplicationPatch, ConcessionApplication};
use crate::workflows::types::{ApplicationId, ApplicationStatus, UserId};

/// Process-local store. Newest records sit at the front.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    applications: RwLock<Vec<ConcessionApplication>>,
    drafts: RwLock<HashMap<UserId, ApplicationDraft>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.applications.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.applications.read().await.is_empty()
    }
}

#[async_trait]
impl ApplicationStore for InMemoryStore {
    async fn create(&self, application: &ConcessionApplication) -> Result<(), StoreError> {
        let mut applications = self.applications.write().await;
        if applications.iter().any(|a| a.id() == application.id()) {
            return Err(StoreError::Duplicate(application.id().clone()));
        }
        applications.insert(0, application.clone());
        Ok(())
    }

    async fn get_by_id(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<ConcessionApplication>, StoreError> {
        let applications = self.applications.read().await;
        Ok(applications.iter().find(|a| a.id() == id).cloned())
    }

    async fn list_by_owner(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ConcessionApplication>, StoreError> {
        let applications = self.applications.read().await;
        Ok(applications
            .iter()
            .filter(|a| a.user_id() == user_id)
            .cloned()
            .collect())
    }

    async fn list_by_status(
        &self,
        status: ApplicationStatus,
    ) -> Result<Vec<ConcessionApplication>, StoreError> {
        let applications = self.applications.read().await;
        Ok(applications
            .iter()
            .filter(|a| a.status() == status)
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<ConcessionApplication>, StoreError> {
        Ok(self.applications.read().await.clone())
    }

    async fn update(
        &self,
        id: &ApplicationId,
        patch: ApplicationPatch,
    ) -> Result<Option<ConcessionApplication>, StoreError> {
        let mut applications = self.applications.write().await;
        match applications.iter_mut().find(|a| a.id() == id) {
            Some(application) => {
                application.apply_patch(patch);
                Ok(Some(application.clone()))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl DraftStore for InMemoryStore {
    async fn save_draft(
        &self,
        user_id: &UserId,
        draft: &ApplicationDraft,
    ) -> Result<(), StoreError> {
        self.drafts
            .write()
            .await
            .insert(user_id.clone(), draft.clone());
        Ok(())
    }

    async fn get_draft(&self, user_id: &UserId) -> Result<Option<ApplicationDraft>, StoreError> {
        Ok(self.drafts.read().await.get(user_id).cloned())
    }

    async fn clear_draft(&self, user_id: &UserId) -> Result<(), StoreError> {
        self.drafts.write().await.remove(user_id);
        Ok(())
    }
}
