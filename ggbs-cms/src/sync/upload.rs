//! Upload Resolver
//!
//! Uploads never fail from the caller's point of view. Without credentials,
//! or when the object store refuses or cannot be reached, the file is kept as
//! an ephemeral preview instead and [`UploadedMedia::durable`] is `false`.

use super::{SyncContext, SyncError};
use crate::preview::{PreviewObject, PreviewStore};
use crate::remote::MEDIA_BUCKET;
use axum::body::Bytes;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Serialize;
use tracing::{info, warn};

const RANDOM_SUFFIX_LEN: usize = 7;

/// Result of an upload attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadedMedia {
    /// Public URL when durable, preview reference otherwise. Never empty.
    pub url: String,
    /// Whether the object reached the remote bucket
    pub durable: bool,
}

#[derive(Clone)]
pub struct UploadResolver {
    ctx: SyncContext,
    previews: PreviewStore,
}

impl UploadResolver {
    pub fn new(ctx: SyncContext, previews: PreviewStore) -> Self {
        Self { ctx, previews }
    }

    /// Upload `body`, falling back to a local preview on any failure
    pub async fn resolve_upload(&self, filename: &str, content_type: &str, body: Bytes) -> UploadedMedia {
        let Some((credentials, _)) = self.ctx.active_credentials().await else {
            warn!(filename, "Upload kept as local preview: remote store not configured");
            return self.degrade(filename, content_type, body, SyncError::NotConfigured).await;
        };

        let key = storage_key(filename, chrono::Utc::now().timestamp_millis(), &mut rand::thread_rng());
        let uploaded = self
            .ctx
            .bounded(
                self.ctx
                    .remote()
                    .upload_object(&credentials, &key, content_type, body.clone()),
            )
            .await;

        match uploaded {
            Ok(url) => {
                info!(bucket = MEDIA_BUCKET, key = %key, "Uploaded media");
                UploadedMedia { url, durable: true }
            }
            Err(e) => {
                warn!(filename, key = %key, "Upload kept as local preview: {}", e);
                self.degrade(filename, content_type, body, SyncError::from(e)).await
            }
        }
    }

    async fn degrade(&self, filename: &str, content_type: &str, body: Bytes, reason: SyncError) -> UploadedMedia {
        let url = self
            .previews
            .insert(PreviewObject {
                filename: filename.to_string(),
                content_type: content_type.to_string(),
                body,
            })
            .await;

        tracing::debug!(%url, %reason, "Upload degraded to ephemeral preview");
        UploadedMedia { url, durable: false }
    }
}

/// Collision-resistant object key: `{unix_millis}_{random}.{ext}`
///
/// The extension comes from `filename`, lowercased and restricted to ASCII
/// alphanumerics; it is omitted when nothing usable remains.
pub fn storage_key<R: Rng>(filename: &str, unix_millis: i64, rng: &mut R) -> String {
    let suffix: String = rng
        .sample_iter(&Alphanumeric)
        .take(RANDOM_SUFFIX_LEN)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();

    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| {
            ext.chars()
                .filter(char::is_ascii_alphanumeric)
                .map(|c| c.to_ascii_lowercase())
                .collect::<String>()
        })
        .filter(|ext| !ext.is_empty());

    match extension {
        Some(ext) => format!("{}_{}.{}", unix_millis, suffix, ext),
        None => format!("{}_{}", unix_millis, suffix),
    }
}
