//! Ephemeral upload previews
//!
//! When an upload cannot reach the object store, the bytes are kept in
//! memory and served from `/preview/{id}` so the admin can still see the
//! file. References are valid for the life of the process at most and are
//! evicted oldest-first once either the object count or the total byte
//! budget is exceeded. A single object larger than the budget is kept alone.
//! References must never be persisted as site content.

use axum::body::Bytes;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Path prefix of every preview reference
pub const PREVIEW_PREFIX: &str = "/preview/";

pub const DEFAULT_PREVIEW_MAX_BYTES: usize = 256 * 1024 * 1024;

/// A file held for preview
#[derive(Debug, Clone)]
pub struct PreviewObject {
    pub filename: String,
    pub content_type: String,
    pub body: Bytes,
}

#[derive(Default)]
struct Inner {
    objects: HashMap<Uuid, PreviewObject>,
    order: VecDeque<Uuid>,
    total_bytes: usize,
}

/// Process-local preview store
#[derive(Clone)]
pub struct PreviewStore {
    inner: Arc<RwLock<Inner>>,
    capacity: usize,
    max_bytes: usize,
}

impl PreviewStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner::default())),
            capacity: capacity.max(1),
            max_bytes: DEFAULT_PREVIEW_MAX_BYTES,
        }
    }

    /// Cap the total bytes held across all previews
    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Keep `object` and return its reference URL
    pub async fn insert(&self, object: PreviewObject) -> String {
        let id = Uuid::new_v4();
        let mut inner = self.inner.write().await;

        let incoming = object.body.len();

        while inner.order.len() >= self.capacity
            || (!inner.order.is_empty() && inner.total_bytes + incoming > self.max_bytes)
        {
            let Some(evicted) = inner.order.pop_front() else {
                break;
            };
            if let Some(old) = inner.objects.remove(&evicted) {
                inner.total_bytes -= old.body.len();
            }
            debug!(%evicted, "Evicted preview");
        }

        inner.total_bytes += incoming;
        inner.objects.insert(id, object);
        inner.order.push_back(id);

        preview_url(id)
    }

    pub async fn get(&self, id: Uuid) -> Option<PreviewObject> {
        self.inner.read().await.objects.get(&id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.objects.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Bytes currently held
    pub async fn total_bytes(&self) -> usize {
        self.inner.read().await.total_bytes
    }
}

pub fn preview_url(id: Uuid) -> String {
    format!("{}{}", PREVIEW_PREFIX, id)
}

/// Whether `url` is an ephemeral preview reference
pub fn is_preview_url(url: &str) -> bool {
    url.trim().starts_with(PREVIEW_PREFIX)
}
