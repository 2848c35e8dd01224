// Who is acting: the identity collaborator the workflow consumes
//
// No credentials are checked here. A session is whatever the last `login`
// wrote, which is enough for a single-device client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::workflows::types::{Actor, Role, StudentProfile};

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("not logged in; run `concession login` first")]
    NotLoggedIn,

    #[error("session file is unreadable: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Produces the actor behind the current request
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn current_actor(&self) -> Result<Actor, IdentityError>;
}

/// Always the same actor; useful for scripts and tests
#[derive(Debug, Clone)]
pub struct StaticIdentity {
    actor: Actor,
}

impl StaticIdentity {
    pub fn new(actor: Actor) -> Self {
        Self { actor }
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn current_actor(&self) -> Result<Actor, IdentityError> {
        Ok(self.actor.clone())
    }
}

/// A logged-in actor plus the profile students submit with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub actor: Actor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<StudentProfile>,
}

impl Session {
    /// Profile snapshot for submissions; empty for admins or when never filled in
    pub fn profile_or_default(&self) -> StudentProfile {
        self.profile.clone().unwrap_or_default()
    }
}

/// Login session persisted as a JSON file
#[derive(Debug, Clone)]
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn login(
        &self,
        actor: Actor,
        profile: Option<StudentProfile>,
    ) -> Result<Session, IdentityError> {
        // Profiles only mean something for students
        let profile = profile.filter(|_| actor.role == Role::Student);
        let session = Session { actor, profile };

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let body = serde_json::to_vec_pretty(&session)?;
        tokio::fs::write(&self.path, body).await?;

        info!(
            actor.id = %session.actor.id,
            actor.role = %session.actor.role,
            "Logged in"
        );
        Ok(session)
    }

    /// Remove the session. Logging out twice is not an error.
    pub async fn logout(&self) -> Result<(), IdentityError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                info!("Logged out");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No session to remove");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn current_session(&self) -> Result<Option<Session>, IdentityError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn require_session(&self) -> Result<Session, IdentityError> {
        self.current_session().await?.ok_or(IdentityError::NotLoggedIn)
    }
}

#[async_trait]
impl IdentityProvider for SessionFile {
    async fn current_actor(&self) -> Result<Actor, IdentityError> {
        Ok(self.require_session().await?.actor)
    }
}
