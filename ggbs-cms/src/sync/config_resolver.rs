//! Config Resolver
//!
//! Produces the single authoritative [`SiteConfiguration`] for the public
//! site and carries admin edits back out to the cache and remote store.
//!
//! Concurrent saves are not serialized: the last upsert to reach the remote
//! store wins.

use super::fallback::resolve_layers;
use super::{CredentialSource, SyncContext, SyncError};
use crate::preview::is_preview_url;
use ggbs_common::{
    ConnectionCredentials, MediaSlot, MediaSource, PartialSiteConfiguration, SiteConfiguration,
    SiteSettingsRow,
};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Connection state shown in the admin panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionStatus {
    pub connected: bool,
    pub source: Option<CredentialSource>,
    pub endpoint: Option<String>,
    pub token: Option<String>,
}

#[derive(Clone)]
pub struct ConfigResolver {
    ctx: SyncContext,
}

impl ConfigResolver {
    pub fn new(ctx: SyncContext) -> Self {
        Self { ctx }
    }

    /// Current configuration, every slot non-empty
    ///
    /// Remote → cache → default per slot when the remote row is readable;
    /// cache → default otherwise. Remote failures are logged and swallowed.
    /// Never writes the cache.
    pub async fn resolve_configuration(&self) -> SiteConfiguration {
        let cached = self.ctx.cache.load_content().await;

        let Some((credentials, source)) = self.ctx.active_credentials().await else {
            debug!("No remote credentials; resolving from local cache");
            return self.resolve_local(cached.as_ref());
        };

        let fetched = self
            .ctx
            .bounded(self.ctx.remote().fetch_site_settings(&credentials))
            .await;

        match fetched {
            Ok(Some(row)) => {
                debug!(?source, "Resolved configuration from remote row");
                let mut layers: Vec<&dyn MediaSource> = Vec::with_capacity(2);
                layers.push(&row);
                if let Some(cached) = cached.as_ref() {
                    layers.push(cached);
                }
                resolve_layers(&layers, self.ctx.defaults())
            }
            Ok(None) => {
                warn!("Remote site_settings row missing; using local cache");
                self.resolve_local(cached.as_ref())
            }
            Err(e) => {
                warn!("Remote configuration read failed: {}; using local cache", e);
                self.resolve_local(cached.as_ref())
            }
        }
    }

    fn resolve_local(&self, cached: Option<&PartialSiteConfiguration>) -> SiteConfiguration {
        match cached {
            Some(cached) => resolve_layers(&[cached], self.ctx.defaults()),
            None => self.ctx.defaults().clone(),
        }
    }

    /// Save `content` locally, then globally
    ///
    /// The local write always happens first and its failure never fails the
    /// call. Without credentials the result is [`SyncError::NotConfigured`]
    /// even though the cache now holds `content`. Slots pointing at ephemeral
    /// previews are refused before anything is written.
    pub async fn persist_configuration(&self, content: &SiteConfiguration) -> Result<(), SyncError> {
        if let Some(slot) = MediaSlot::ALL
            .into_iter()
            .find(|slot| is_preview_url(content.slot(*slot)))
        {
            return Err(SyncError::EphemeralReference(slot));
        }

        if let Err(e) = self.ctx.cache.store_content(content).await {
            warn!("Local cache write failed (continuing with remote save): {}", e);
        }

        let Some((credentials, source)) = self.ctx.active_credentials().await else {
            warn!("Configuration saved locally only: remote store not configured");
            return Err(SyncError::NotConfigured);
        };

        let row = SiteSettingsRow::from(content);
        self.ctx
            .bounded(self.ctx.remote().upsert_site_settings(&credentials, &row))
            .await
            .map_err(|e| {
                warn!("Configuration saved locally only: {}", e);
                SyncError::from(e)
            })?;

        info!(?source, "Configuration saved to remote store");
        Ok(())
    }

    /// Replace the cached credential pair
    ///
    /// Both halves are trimmed and written together. Returns whether the
    /// stored pair is usable. Cached configuration is not reloaded.
    pub async fn set_credentials(&self, endpoint: &str, token: &str) -> Result<bool, SyncError> {
        let credentials = ConnectionCredentials::new(endpoint, token);

        self.ctx
            .cache
            .store_credentials(&credentials)
            .await
            .map_err(|e| SyncError::LocalCache(e.to_string()))?;

        let usable = credentials.is_usable();
        if usable {
            info!(endpoint = %credentials.endpoint, "Remote credentials updated");
        } else {
            warn!("Remote credentials cleared or incomplete; local cache pair unusable");
        }
        Ok(usable)
    }

    /// Connection state for the admin panel
    pub async fn connection_status(&self) -> ConnectionStatus {
        match self.ctx.active_credentials().await {
            Some((credentials, source)) => ConnectionStatus {
                connected: true,
                source: Some(source),
                token: Some(credentials.masked_token()),
                endpoint: Some(credentials.endpoint),
            },
            None => ConnectionStatus {
                connected: false,
                source: None,
                endpoint: None,
                token: None,
            },
        }
    }
}
