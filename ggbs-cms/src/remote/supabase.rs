//! Supabase adapter (PostgREST + Storage over HTTP)
//!
//! Endpoints used:
//! - `GET  /rest/v1/site_settings?id=eq.1&select=*`
//! - `POST /rest/v1/site_settings` (upsert, merge duplicates)
//! - `POST /rest/v1/investors`
//! - `GET  /rest/v1/investors?select=*&order=created_at.desc`
//! - `POST /storage/v1/object/media/{key}`
//!
//! Public object URLs follow `/storage/v1/object/public/media/{key}`.

use super::{RemoteError, RemoteStore, INVESTORS_TABLE, MEDIA_BUCKET, SITE_SETTINGS_TABLE};
use async_trait::async_trait;
use axum::body::Bytes;
use ggbs_common::content::SITE_SETTINGS_ID;
use ggbs_common::{ConnectionCredentials, LeadRecord, NewLead, SiteSettingsRow};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = concat!("ggbs-cms/", env!("CARGO_PKG_VERSION"));

/// What a failed request was addressing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Table(&'static str),
    Bucket(&'static str),
}

/// HTTP client for a Supabase project
///
/// Holds no credentials; they are supplied per call.
pub struct SupabaseStore {
    http_client: reqwest::Client,
}

impl SupabaseStore {
    /// `timeout` bounds every request, connect included
    pub fn new(timeout: Duration) -> Result<Self, RemoteError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| RemoteError::Unavailable(e.to_string()))?;

        Ok(Self { http_client })
    }

    fn rest_url(credentials: &ConnectionCredentials, table: &str) -> String {
        format!("{}/rest/v1/{}", credentials.endpoint, table)
    }

    fn object_url(credentials: &ConnectionCredentials, key: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            credentials.endpoint, MEDIA_BUCKET, key
        )
    }

    /// Public URL of an object in the media bucket
    pub fn public_url(credentials: &ConnectionCredentials, key: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            credentials.endpoint, MEDIA_BUCKET, key
        )
    }

    fn authorized(
        builder: reqwest::RequestBuilder,
        credentials: &ConnectionCredentials,
    ) -> reqwest::RequestBuilder {
        builder
            .header("apikey", &credentials.token)
            .bearer_auth(&credentials.token)
    }

    async fn send(
        &self,
        builder: reqwest::RequestBuilder,
        target: Target,
    ) -> Result<reqwest::Response, RemoteError> {
        let response = builder.send().await.map_err(transport_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(classify_failure(status.as_u16(), &body, target))
    }
}

#[async_trait]
impl RemoteStore for SupabaseStore {
    async fn fetch_site_settings(
        &self,
        credentials: &ConnectionCredentials,
    ) -> Result<Option<SiteSettingsRow>, RemoteError> {
        let id_filter = format!("eq.{}", SITE_SETTINGS_ID);
        let request = self
            .http_client
            .get(Self::rest_url(credentials, SITE_SETTINGS_TABLE))
            .query(&[("id", id_filter.as_str()), ("select", "*")]);

        debug!(table = SITE_SETTINGS_TABLE, "Fetching site settings row");
        let response = self
            .send(Self::authorized(request, credentials), Target::Table(SITE_SETTINGS_TABLE))
            .await?;

        let rows: Vec<SiteSettingsRow> = response
            .json()
            .await
            .map_err(|e| RemoteError::Malformed(e.to_string()))?;

        Ok(rows.into_iter().next())
    }

    async fn upsert_site_settings(
        &self,
        credentials: &ConnectionCredentials,
        row: &SiteSettingsRow,
    ) -> Result<(), RemoteError> {
        let request = self
            .http_client
            .post(Self::rest_url(credentials, SITE_SETTINGS_TABLE))
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&[row]);

        debug!(table = SITE_SETTINGS_TABLE, "Upserting site settings row");
        self.send(Self::authorized(request, credentials), Target::Table(SITE_SETTINGS_TABLE))
            .await?;
        Ok(())
    }

    async fn upload_object(
        &self,
        credentials: &ConnectionCredentials,
        key: &str,
        content_type: &str,
        body: Bytes,
    ) -> Result<String, RemoteError> {
        let request = self
            .http_client
            .post(Self::object_url(credentials, key))
            .header("x-upsert", "true")
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(body);

        debug!(bucket = MEDIA_BUCKET, key, "Uploading object");
        self.send(Self::authorized(request, credentials), Target::Bucket(MEDIA_BUCKET))
            .await?;

        Ok(Self::public_url(credentials, key))
    }

    async fn insert_lead(
        &self,
        credentials: &ConnectionCredentials,
        lead: &NewLead,
    ) -> Result<(), RemoteError> {
        let request = self
            .http_client
            .post(Self::rest_url(credentials, INVESTORS_TABLE))
            .header("Prefer", "return=minimal")
            .json(&[lead]);

        debug!(table = INVESTORS_TABLE, "Inserting lead");
        self.send(Self::authorized(request, credentials), Target::Table(INVESTORS_TABLE))
            .await?;
        Ok(())
    }

    async fn list_leads(
        &self,
        credentials: &ConnectionCredentials,
    ) -> Result<Vec<LeadRecord>, RemoteError> {
        let request = self
            .http_client
            .get(Self::rest_url(credentials, INVESTORS_TABLE))
            .query(&[("select", "*"), ("order", "created_at.desc")]);

        let response = self
            .send(Self::authorized(request, credentials), Target::Table(INVESTORS_TABLE))
            .await?;

        response
            .json()
            .await
            .map_err(|e| RemoteError::Malformed(e.to_string()))
    }
}

fn transport_error(e: reqwest::Error) -> RemoteError {
    if e.is_timeout() {
        RemoteError::Unavailable(format!("request timed out: {}", e))
    } else if e.is_builder() {
        RemoteError::Unavailable(format!("invalid endpoint: {}", e))
    } else {
        RemoteError::Unavailable(e.to_string())
    }
}

/// Error body shapes returned by PostgREST and Storage
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Map a non-success response onto the adapter error taxonomy
pub fn classify_failure(status: u16, body: &str, target: Target) -> RemoteError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = parsed
        .message
        .clone()
        .or_else(|| parsed.error.clone())
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                format!("HTTP {}", status)
            } else {
                trimmed.to_string()
            }
        });
    let lowered = format!(
        "{} {}",
        message.to_lowercase(),
        parsed.error.as_deref().unwrap_or_default().to_lowercase()
    );

    match target {
        Target::Table(table) => {
            let code = parsed.code.as_deref().unwrap_or_default();
            if code == "42P01"
                || code == "PGRST205"
                || lowered.contains("could not find the table")
                || (lowered.contains("relation") && lowered.contains("does not exist"))
            {
                return RemoteError::MissingTable(table.to_string());
            }
        }
        Target::Bucket(bucket) => {
            if lowered.contains("bucket not found")
                || (lowered.contains("bucket") && lowered.contains("not found"))
            {
                return RemoteError::MissingBucket(bucket.to_string());
            }
        }
    }

    if status == 401 || status == 403 || lowered.contains("row-level security") {
        return RemoteError::PermissionDenied(message);
    }

    RemoteError::Rejected { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_table_by_postgres_code() {
        let body = r#"{"code":"42P01","details":null,"hint":null,"message":"relation \"public.site_settings\" does not exist"}"#;
        assert_eq!(
            classify_failure(404, body, Target::Table(SITE_SETTINGS_TABLE)),
            RemoteError::MissingTable("site_settings".to_string())
        );
    }

    #[test]
    fn test_missing_table_by_schema_cache_message() {
        let body = r#"{"code":"PGRST205","message":"Could not find the table 'public.investors' in the schema cache"}"#;
        assert_eq!(
            classify_failure(404, body, Target::Table(INVESTORS_TABLE)),
            RemoteError::MissingTable("investors".to_string())
        );
    }

    #[test]
    fn test_missing_bucket() {
        let body = r#"{"statusCode":"404","error":"Bucket not found","message":"Bucket not found"}"#;
        assert_eq!(
            classify_failure(400, body, Target::Bucket(MEDIA_BUCKET)),
            RemoteError::MissingBucket("media".to_string())
        );
    }

    #[test]
    fn test_permission_denied() {
        let body = r#"{"message":"Invalid API key"}"#;
        assert_eq!(
            classify_failure(401, body, Target::Table(SITE_SETTINGS_TABLE)),
            RemoteError::PermissionDenied("Invalid API key".to_string())
        );

        let rls = r#"{"statusCode":"403","error":"Unauthorized","message":"new row violates row-level security policy"}"#;
        assert!(matches!(
            classify_failure(400, rls, Target::Bucket(MEDIA_BUCKET)),
            RemoteError::PermissionDenied(_)
        ));
    }

    #[test]
    fn test_unrecognized_message_passes_through() {
        let body = r#"{"code":"22P02","message":"invalid input syntax for type bigint"}"#;
        assert_eq!(
            classify_failure(400, body, Target::Table(SITE_SETTINGS_TABLE)),
            RemoteError::Rejected {
                status: 400,
                message: "invalid input syntax for type bigint".to_string()
            }
        );
    }

    #[test]
    fn test_non_json_body() {
        assert_eq!(
            classify_failure(502, "", Target::Table(SITE_SETTINGS_TABLE)),
            RemoteError::Rejected {
                status: 502,
                message: "HTTP 502".to_string()
            }
        );
        assert_eq!(
            classify_failure(500, "upstream exploded\n", Target::Table(SITE_SETTINGS_TABLE)),
            RemoteError::Rejected {
                status: 500,
                message: "upstream exploded".to_string()
            }
        );
    }

    #[test]
    fn test_public_url_shape() {
        let creds = ConnectionCredentials::new("https://abc.supabase.co/", "k");
        assert_eq!(
            SupabaseStore::public_url(&creds, "1700000000000_abc1234.png"),
            "https://abc.supabase.co/storage/v1/object/public/media/1700000000000_abc1234.png"
        );
    }

    #[test]
    fn test_client_creation() {
        assert!(SupabaseStore::new(Duration::from_secs(5)).is_ok());
    }
}
