//! Remote Config Store and Remote Object Store
//!
//! [`RemoteStore`] is the seam between the resolvers and the hosted backend.
//! Every call receives the credentials to use, read fresh by the caller, so
//! a credential change takes effect on the next call without rebuilding
//! anything.

use async_trait::async_trait;
use axum::body::Bytes;
use ggbs_common::{ConnectionCredentials, LeadRecord, NewLead, SiteSettingsRow};
use thiserror::Error;

pub mod supabase;

pub use supabase::SupabaseStore;

/// Singleton configuration table
pub const SITE_SETTINGS_TABLE: &str = "site_settings";
/// Append-only lead table
pub const INVESTORS_TABLE: &str = "investors";
/// Public media bucket (must already exist)
pub const MEDIA_BUCKET: &str = "media";

/// Failures reported by remote store adapters
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// Network failure, timeout, or an endpoint that cannot be addressed
    #[error("Remote store unreachable: {0}")]
    Unavailable(String),

    #[error("Table '{0}' does not exist in the remote database")]
    MissingTable(String),

    #[error("Storage bucket '{0}' does not exist")]
    MissingBucket(String),

    #[error("Permission denied by remote store: {0}")]
    PermissionDenied(String),

    #[error("Remote store rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Malformed response from remote store: {0}")]
    Malformed(String),
}

/// Hosted relational table + object bucket
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Read the singleton settings row. `Ok(None)` when the row is missing.
    async fn fetch_site_settings(
        &self,
        credentials: &ConnectionCredentials,
    ) -> Result<Option<SiteSettingsRow>, RemoteError>;

    /// Insert or replace the singleton settings row (conflict on primary key)
    async fn upsert_site_settings(
        &self,
        credentials: &ConnectionCredentials,
        row: &SiteSettingsRow,
    ) -> Result<(), RemoteError>;

    /// Store `body` under `key` in the media bucket and return its public URL
    async fn upload_object(
        &self,
        credentials: &ConnectionCredentials,
        key: &str,
        content_type: &str,
        body: Bytes,
    ) -> Result<String, RemoteError>;

    /// Append a lead record
    async fn insert_lead(
        &self,
        credentials: &ConnectionCredentials,
        lead: &NewLead,
    ) -> Result<(), RemoteError>;

    /// All lead records, newest first
    async fn list_leads(
        &self,
        credentials: &ConnectionCredentials,
    ) -> Result<Vec<LeadRecord>, RemoteError>;
}
