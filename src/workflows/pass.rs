// Pass credential issuing on final approval

use chrono::{DateTime, Utc};
use rand::distr::Alphanumeric;
use rand::Rng;

use super::state::PassToken;
use super::types::ApplicationId;

/// Produces the opaque credential attached to a railway-approved application
pub trait PassIssuer: Send + Sync {
    fn issue(&self, application_id: &ApplicationId, issued_at: DateTime<Utc>) -> PassToken;
}

/// Issues `<prefix>-<yyyymmdd>-<10 random alphanumerics>` tokens
#[derive(Debug, Clone)]
pub struct RandomPassIssuer {
    prefix: String,
}

impl RandomPassIssuer {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for RandomPassIssuer {
    fn default() -> Self {
        Self::new("RCP")
    }
}

impl PassIssuer for RandomPassIssuer {
    fn issue(&self, _application_id: &ApplicationId, issued_at: DateTime<Utc>) -> PassToken {
        let serial: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(10)
            .map(|b| char::from(b).to_ascii_uppercase())
            .collect();
        PassToken::new(format!(
            "{}-{}-{}",
            self.prefix,
            issued_at.format("%Y%m%d"),
            serial
        ))
    }
}
