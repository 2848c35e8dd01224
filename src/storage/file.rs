use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{ApplicationDraft, ApplicationStore, DraftStore, StoreError};
use crate::workflows::state::{ApplicationPatch, ConcessionApplication};
use crate::workflows::types::{ApplicationId, ApplicationStatus, UserId};

pub const APPLICATIONS_FILE: &str = "applications.json";
pub const DRAFTS_FILE: &str = "drafts.json";
const LOCK_FILE: &str = ".store.lock";

type DraftMap = BTreeMap<UserId, ApplicationDraft>;

/// JSON files in a data directory, one array of applications plus a draft map.
///
/// Every operation holds an advisory lock on a sibling lock file; writes go to
/// a temp file that is renamed over the previous one, so a record is either fully
/// written or left as it was. Separate processes still race last-write-wins.
#[derive(Debug)]
pub struct JsonFileStore {
    data_dir: PathBuf,
    in_process: Mutex<()>,
}

impl JsonFileStore {
    pub async fn open(data_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let data_dir = data_dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&data_dir).await?;
        info!(data_dir = %data_dir.display(), "Opened JSON file store");
        Ok(Self {
            data_dir,
            in_process: Mutex::new(()),
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn applications_path(&self) -> PathBuf {
        self.data_dir.join(APPLICATIONS_FILE)
    }

    pub fn drafts_path(&self) -> PathBuf {
        self.data_dir.join(DRAFTS_FILE)
    }

    async fn with_lock<T, F>(&self, exclusive: bool, operation: F) -> Result<T, StoreError>
    where
        F: FnOnce() -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let _in_process = self.in_process.lock().await;
        let lock_path = self.data_dir.join(LOCK_FILE);

        tokio::task::spawn_blocking(move || {
            let file = OpenOptions::new()
                .create(true)
                .truncate(false)
                .write(true)
                .open(&lock_path)?;
            let mut lock = fd_lock::RwLock::new(file);
            if exclusive {
                let _guard = lock.write().map_err(|e| StoreError::Lock {
                    reason: e.to_string(),
                })?;
                operation()
            } else {
                let _guard = lock.read().map_err(|e| StoreError::Lock {
                    reason: e.to_string(),
                })?;
                operation()
            }
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }

    async fn read_applications(&self) -> Result<Vec<ConcessionApplication>, StoreError> {
        let path = self.applications_path();
        self.with_lock(false, move || load_json(&path)).await
    }
}

fn load_json<T: DeserializeOwned + Default>(path: &Path) -> Result<T, StoreError> {
    match std::fs::read(path) {
        Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(T::default()),
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(T::default()),
        Err(e) => Err(e.into()),
    }
}

fn write_atomically<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let tmp = path.with_extension("json.tmp");
    {
        let mut file = File::create(&tmp)?;
        serde_json::to_writer_pretty(&mut file, value)?;
        file.write_all(b"\n")?;
        file.sync_all()?;
    }
    std::fs::rename(&tmp, path)?;
    debug!(path = %path.display(), "Wrote store file");
    Ok(())
}

#[async_trait]
impl ApplicationStore for JsonFileStore {
    async fn create(&self, application: &ConcessionApplication) -> Result<(), StoreError> {
        let path = self.applications_path();
        let application = application.clone();
        self.with_lock(true, move || {
            let mut applications: Vec<ConcessionApplication> = load_json(&path)?;
            if applications.iter().any(|a| a.id() == application.id()) {
                return Err(StoreError::Duplicate(application.id().clone()));
            }
            applications.insert(0, application);
            write_atomically(&path, &applications)
        })
        .await
    }

    async fn get_by_id(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<ConcessionApplication>, StoreError> {
        let applications = self.read_applications().await?;
        Ok(applications.into_iter().find(|a| a.id() == id))
    }

    async fn list_by_owner(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ConcessionApplication>, StoreError> {
        let applications = self.read_applications().await?;
        Ok(applications
            .into_iter()
            .filter(|a| a.user_id() == user_id)
            .collect())
    }

    async fn list_by_status(
        &self,
        status: ApplicationStatus,
    ) -> Result<Vec<ConcessionApplication>, StoreError> {
        let applications = self.read_applications().await?;
        Ok(applications
            .into_iter()
            .filter(|a| a.status() == status)
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<ConcessionApplication>, StoreError> {
        self.read_applications().await
    }

    async fn update(
        &self,
        id: &ApplicationId,
        patch: ApplicationPatch,
    ) -> Result<Option<ConcessionApplication>, StoreError> {
        let path = self.applications_path();
        let id = id.clone();
        self.with_lock(true, move || {
            let mut applications: Vec<ConcessionApplication> = load_json(&path)?;
            let Some(application) = applications.iter_mut().find(|a| a.id() == &id) else {
                return Ok(None);
            };
            application.apply_patch(patch);
            let updated = application.clone();
            write_atomically(&path, &applications)?;
            Ok(Some(updated))
        })
        .await
    }
}

#[async_trait]
impl DraftStore for JsonFileStore {
    async fn save_draft(
        &self,
        user_id: &UserId,
        draft: &ApplicationDraft,
    ) -> Result<(), StoreError> {
        let path = self.drafts_path();
        let user_id = user_id.clone();
        let draft = draft.clone();
        self.with_lock(true, move || {
            let mut drafts: DraftMap = load_json(&path)?;
            drafts.insert(user_id, draft);
            write_atomically(&path, &drafts)
        })
        .await
    }

    async fn get_draft(&self, user_id: &UserId) -> Result<Option<ApplicationDraft>, StoreError> {
        let path = self.drafts_path();
        let user_id = user_id.clone();
        self.with_lock(false, move || {
            let mut drafts: DraftMap = load_json(&path)?;
            Ok(drafts.remove(&user_id))
        })
        .await
    }

    async fn clear_draft(&self, user_id: &UserId) -> Result<(), StoreError> {
        let path = self.drafts_path();
        let user_id = user_id.clone();
        self.with_lock(true, move || {
            let mut drafts: DraftMap = load_json(&path)?;
            if drafts.remove(&user_id).is_some() {
                write_atomically(&path, &drafts)?;
            }
            Ok(())
        })
        .await
    }
}
