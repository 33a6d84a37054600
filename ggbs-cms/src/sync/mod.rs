//! Content synchronization
//!
//! Reconciles three sources of site content: the local cache, the remote
//! store, and the compiled defaults. Everything the resolvers need is carried
//! by an explicit [`SyncContext`] built once at startup and cloned into each
//! component; nothing here reads global state.
//!
//! Error policy:
//! - Reads never fail; they always resolve to a usable configuration.
//! - Configuration writes report failure so the admin knows whether a save
//!   reached the remote store.
//! - Uploads never fail; they degrade to an ephemeral preview.

use crate::cache::LocalCache;
use crate::remote::{RemoteError, RemoteStore};
use ggbs_common::{ConnectionCredentials, MediaSlot, SiteConfiguration};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub mod config_resolver;
pub mod fallback;
pub mod leads;
pub mod upload;

pub use config_resolver::{ConfigResolver, ConnectionStatus};
pub use leads::{LeadDesk, LeadOutcome};
pub use upload::{UploadResolver, UploadedMedia};

/// Default bound on any single remote call
pub const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(5);

/// Caller-facing failures of the synchronization layer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// No usable credentials; the remote store was not contacted
    #[error("Remote store is not configured; changes were saved locally only")]
    NotConfigured,

    /// Network failure, timeout, or an unaddressable endpoint
    #[error("Remote store unavailable: {0}")]
    RemoteUnavailable(String),

    /// The remote store answered but refused the operation
    #[error("Remote store rejected the change: {0}")]
    RemoteRejected(String),

    /// A slot still points at an ephemeral preview
    #[error("'{0}' points at a temporary preview; upload the file again once the remote store is reachable")]
    EphemeralReference(MediaSlot),

    /// The local cache could not be written
    #[error("Local cache write failed: {0}")]
    LocalCache(String),
}

impl From<RemoteError> for SyncError {
    fn from(e: RemoteError) -> Self {
        match e {
            RemoteError::Unavailable(msg) => SyncError::RemoteUnavailable(msg),
            RemoteError::MissingTable(table) => SyncError::RemoteRejected(format!(
                "table '{}' is missing; create it in the remote database",
                table
            )),
            RemoteError::MissingBucket(bucket) => SyncError::RemoteRejected(format!(
                "bucket '{}' is missing; create a public bucket with that name",
                bucket
            )),
            other => SyncError::RemoteRejected(other.to_string()),
        }
    }
}

/// Where the active credentials came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialSource {
    /// Entered by the admin and stored in the local cache
    LocalCache,
    /// Supplied by environment or TOML at startup
    Bootstrap,
}

/// Shared dependencies of the resolvers
#[derive(Clone)]
pub struct SyncContext {
    pub cache: LocalCache,
    remote: Arc<dyn RemoteStore>,
    bootstrap_credentials: Option<ConnectionCredentials>,
    defaults: SiteConfiguration,
    remote_timeout: Duration,
}

impl SyncContext {
    pub fn new(cache: LocalCache, remote: Arc<dyn RemoteStore>) -> Self {
        Self {
            cache,
            remote,
            bootstrap_credentials: None,
            defaults: SiteConfiguration::compiled_defaults(),
            remote_timeout: DEFAULT_REMOTE_TIMEOUT,
        }
    }

    /// Credentials to fall back on when the cache holds no usable pair
    pub fn with_bootstrap_credentials(mut self, credentials: Option<ConnectionCredentials>) -> Self {
        self.bootstrap_credentials = credentials.filter(ConnectionCredentials::is_usable);
        self
    }

    pub fn with_remote_timeout(mut self, timeout: Duration) -> Self {
        self.remote_timeout = timeout;
        self
    }

    pub fn defaults(&self) -> &SiteConfiguration {
        &self.defaults
    }

    pub fn remote(&self) -> &dyn RemoteStore {
        self.remote.as_ref()
    }

    /// Credentials for the next remote call, read fresh every time
    ///
    /// A usable cached pair overrides the bootstrap pair. Halves are never
    /// mixed: a cached pair with one blank half is skipped entirely.
    pub async fn active_credentials(&self) -> Option<(ConnectionCredentials, CredentialSource)> {
        if let Some(cached) = self.cache.load_credentials().await {
            if cached.is_usable() {
                return Some((cached, CredentialSource::LocalCache));
            }
        }

        self.bootstrap_credentials
            .clone()
            .map(|creds| (creds, CredentialSource::Bootstrap))
    }

    /// Run one remote call under the configured timeout
    ///
    /// Expiry is reported exactly like a network failure.
    pub async fn bounded<T, F>(&self, call: F) -> Result<T, RemoteError>
    where
        F: Future<Output = Result<T, RemoteError>>,
    {
        match tokio::time::timeout(self.remote_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(RemoteError::Unavailable(format!(
                "no response within {} ms",
                self.remote_timeout.as_millis()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_table_names_the_precondition() {
        let err = SyncError::from(RemoteError::MissingTable("site_settings".to_string()));
        match err {
            SyncError::RemoteRejected(msg) => assert!(msg.contains("site_settings")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_unavailable_stays_unavailable() {
        let err = SyncError::from(RemoteError::Unavailable("connection refused".to_string()));
        assert_eq!(err, SyncError::RemoteUnavailable("connection refused".to_string()));
    }

    #[test]
    fn test_rejected_message_passes_through() {
        let err = SyncError::from(RemoteError::Rejected {
            status: 400,
            message: "bad payload".to_string(),
        });
        match err {
            SyncError::RemoteRejected(msg) => assert!(msg.contains("bad payload")),
            other => panic!("unexpected {:?}", other),
        }
    }
}
