//! Shared test fixtures: in-memory local cache and a scripted remote store

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Bytes;
use chrono::Utc;
use ggbs_cms::cache::LocalCache;
use ggbs_cms::remote::{RemoteError, RemoteStore};
use ggbs_cms::sync::SyncContext;
use ggbs_common::{ConnectionCredentials, LeadRecord, NewLead, SiteSettingsRow};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

pub const TEST_ENDPOINT: &str = "https://abc.supabase.co";
pub const TEST_TOKEN: &str = "anon-key-1234";

pub fn test_credentials() -> ConnectionCredentials {
    ConnectionCredentials::new(TEST_ENDPOINT, TEST_TOKEN)
}

/// Remote store double with scripted failures and call accounting
#[derive(Default)]
pub struct MockRemote {
    row: Mutex<Option<SiteSettingsRow>>,
    failure: Mutex<Option<RemoteError>>,
    delay: Mutex<Option<Duration>>,
    leads: Mutex<Vec<LeadRecord>>,
    uploaded_keys: Mutex<Vec<String>>,
    used_credentials: Mutex<Vec<ConnectionCredentials>>,
    calls: AtomicUsize,
    upserts: AtomicUsize,
}

impl MockRemote {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_row(row: SiteSettingsRow) -> Arc<Self> {
        let remote = Self::default();
        *remote.row.lock().unwrap() = Some(row);
        Arc::new(remote)
    }

    /// Every subsequent call fails with `error`
    pub fn fail_with(&self, error: RemoteError) {
        *self.failure.lock().unwrap() = Some(error);
    }

    pub fn recover(&self) {
        *self.failure.lock().unwrap() = None;
    }

    /// Every subsequent call sleeps before answering
    pub fn delay_by(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn row(&self) -> Option<SiteSettingsRow> {
        self.row.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn upserts(&self) -> usize {
        self.upserts.load(Ordering::SeqCst)
    }

    pub fn uploaded_keys(&self) -> Vec<String> {
        self.uploaded_keys.lock().unwrap().clone()
    }

    pub fn last_credentials(&self) -> Option<ConnectionCredentials> {
        self.used_credentials.lock().unwrap().last().cloned()
    }

    pub fn stored_leads(&self) -> Vec<LeadRecord> {
        self.leads.lock().unwrap().clone()
    }

    pub fn push_lead(&self, lead: LeadRecord) {
        self.leads.lock().unwrap().push(lead);
    }

    async fn enter(&self, credentials: &ConnectionCredentials) -> Result<(), RemoteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.used_credentials
            .lock()
            .unwrap()
            .push(credentials.clone());

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match self.failure.lock().unwrap().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RemoteStore for MockRemote {
    async fn fetch_site_settings(
        &self,
        credentials: &ConnectionCredentials,
    ) -> Result<Option<SiteSettingsRow>, RemoteError> {
        self.enter(credentials).await?;
        Ok(self.row())
    }

    async fn upsert_site_settings(
        &self,
        credentials: &ConnectionCredentials,
        row: &SiteSettingsRow,
    ) -> Result<(), RemoteError> {
        self.enter(credentials).await?;
        self.upserts.fetch_add(1, Ordering::SeqCst);
        *self.row.lock().unwrap() = Some(row.clone());
        Ok(())
    }

    async fn upload_object(
        &self,
        credentials: &ConnectionCredentials,
        key: &str,
        _content_type: &str,
        _body: Bytes,
    ) -> Result<String, RemoteError> {
        self.enter(credentials).await?;
        self.uploaded_keys.lock().unwrap().push(key.to_string());
        Ok(format!(
            "{}/storage/v1/object/public/media/{}",
            credentials.endpoint, key
        ))
    }

    async fn insert_lead(
        &self,
        credentials: &ConnectionCredentials,
        lead: &NewLead,
    ) -> Result<(), RemoteError> {
        self.enter(credentials).await?;
        self.push_lead(LeadRecord {
            id: Uuid::new_v4(),
            name: lead.name.clone(),
            email: lead.email.clone(),
            phone: lead.phone.clone(),
            message: lead.message.clone(),
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn list_leads(
        &self,
        credentials: &ConnectionCredentials,
    ) -> Result<Vec<LeadRecord>, RemoteError> {
        self.enter(credentials).await?;
        Ok(self.stored_leads())
    }
}

pub async fn memory_cache() -> LocalCache {
    let pool = ggbs_common::db::init_memory_database()
        .await
        .expect("in-memory database");
    LocalCache::new(pool)
}

/// Context over a fresh cache; `cached_credentials` are stored before returning
pub async fn context(
    remote: Arc<MockRemote>,
    cached_credentials: Option<ConnectionCredentials>,
) -> SyncContext {
    let cache = memory_cache().await;
    if let Some(credentials) = cached_credentials {
        cache
            .store_credentials(&credentials)
            .await
            .expect("store credentials");
    }
    SyncContext::new(cache, remote)
}
