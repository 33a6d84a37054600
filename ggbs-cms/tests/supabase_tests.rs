//! Supabase adapter tests against an in-process fake of the PostgREST and
//! Storage endpoints

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use ggbs_cms::remote::{RemoteError, RemoteStore, SupabaseStore};
use ggbs_common::{ConnectionCredentials, NewLead, SiteSettingsRow};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const TOKEN: &str = "anon-key-1234";

#[derive(Default)]
struct FakeBackend {
    row: Mutex<Option<Value>>,
    leads: Mutex<Vec<Value>>,
    objects: Mutex<HashMap<String, (String, Vec<u8>)>>,
    prefer_headers: Mutex<Vec<String>>,
}

type Shared = Arc<FakeBackend>;

fn authorized(headers: &HeaderMap) -> bool {
    let apikey = headers.get("apikey").and_then(|v| v.to_str().ok());
    let bearer = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    apikey == Some(TOKEN) && bearer == Some(TOKEN)
}

fn unauthorized() -> axum::response::Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"message": "Invalid API key"})),
    )
        .into_response()
}

fn record_prefer(backend: &FakeBackend, headers: &HeaderMap) {
    if let Some(prefer) = headers.get("prefer").and_then(|v| v.to_str().ok()) {
        backend.prefer_headers.lock().unwrap().push(prefer.to_string());
    }
}

async fn get_settings(
    State(backend): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> axum::response::Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    assert_eq!(query.get("id").map(String::as_str), Some("eq.1"));
    let rows: Vec<Value> = backend.row.lock().unwrap().clone().into_iter().collect();
    Json(rows).into_response()
}

async fn upsert_settings(
    State(backend): State<Shared>,
    headers: HeaderMap,
    Json(rows): Json<Vec<Value>>,
) -> axum::response::Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    record_prefer(&backend, &headers);
    *backend.row.lock().unwrap() = rows.into_iter().next();
    StatusCode::CREATED.into_response()
}

async fn insert_lead(
    State(backend): State<Shared>,
    headers: HeaderMap,
    Json(rows): Json<Vec<Value>>,
) -> axum::response::Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut leads = backend.leads.lock().unwrap();
    for mut row in rows {
        row["id"] = json!(uuid::Uuid::new_v4());
        row["created_at"] = json!(format!("2024-05-0{}T12:00:00+00:00", leads.len() + 1));
        leads.push(row);
    }
    StatusCode::CREATED.into_response()
}

async fn list_leads(
    State(backend): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> axum::response::Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    assert_eq!(query.get("order").map(String::as_str), Some("created_at.desc"));
    let mut leads = backend.leads.lock().unwrap().clone();
    leads.reverse();
    Json(leads).into_response()
}

async fn upload_object(
    State(backend): State<Shared>,
    Path(key): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> axum::response::Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let content_type = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    backend
        .objects
        .lock()
        .unwrap()
        .insert(key.clone(), (content_type, body.to_vec()));
    Json(json!({"Key": format!("media/{}", key)})).into_response()
}

async fn missing_table() -> axum::response::Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "code": "PGRST205",
            "message": "Could not find the table 'public.site_settings' in the schema cache"
        })),
    )
        .into_response()
}

async fn missing_bucket() -> axum::response::Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"statusCode": "404", "error": "Bucket not found", "message": "Bucket not found"})),
    )
        .into_response()
}

async fn slow() -> axum::response::Response {
    tokio::time::sleep(Duration::from_secs(5)).await;
    Json(json!([])).into_response()
}

/// Serve `router` on an ephemeral port, return its base URL
async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn healthy_backend() -> (Shared, ConnectionCredentials) {
    let backend: Shared = Arc::new(FakeBackend::default());
    let router = Router::new()
        .route(
            "/rest/v1/site_settings",
            get(get_settings).post(upsert_settings),
        )
        .route("/rest/v1/investors", get(list_leads).post(insert_lead))
        .route("/storage/v1/object/media/:key", post(upload_object))
        .with_state(backend.clone());

    let endpoint = serve(router).await;
    (backend, ConnectionCredentials::new(endpoint, TOKEN))
}

fn store() -> SupabaseStore {
    SupabaseStore::new(Duration::from_secs(2)).unwrap()
}

#[tokio::test]
async fn test_fetch_missing_row_is_none() {
    let (_backend, creds) = healthy_backend().await;

    let row = store().fetch_site_settings(&creds).await.unwrap();

    assert!(row.is_none());
}

#[tokio::test]
async fn test_upsert_then_fetch() {
    let (backend, creds) = healthy_backend().await;
    let store = store();

    let row = SiteSettingsRow {
        id: 1,
        hero_video_url: Some("remote.mp4".to_string()),
        ..SiteSettingsRow::default()
    };
    store.upsert_site_settings(&creds, &row).await.unwrap();

    let prefer = backend.prefer_headers.lock().unwrap().clone();
    assert_eq!(prefer.len(), 1);
    assert!(prefer[0].contains("resolution=merge-duplicates"));

    let fetched = store.fetch_site_settings(&creds).await.unwrap().unwrap();
    assert_eq!(fetched.id, 1);
    assert_eq!(fetched.hero_video_url.as_deref(), Some("remote.mp4"));
    assert_eq!(fetched.gloves_image_url, None);
}

#[tokio::test]
async fn test_upload_returns_public_url() {
    let (backend, creds) = healthy_backend().await;

    let url = store()
        .upload_object(&creds, "1700000000000_abc1234.png", "image/png", Bytes::from_static(b"png"))
        .await
        .unwrap();

    assert_eq!(
        url,
        format!(
            "{}/storage/v1/object/public/media/1700000000000_abc1234.png",
            creds.endpoint
        )
    );
    let objects = backend.objects.lock().unwrap();
    let (content_type, body) = objects.get("1700000000000_abc1234.png").unwrap();
    assert_eq!(content_type, "image/png");
    assert_eq!(body.as_slice(), b"png");
}

#[tokio::test]
async fn test_leads_round_trip_newest_first() {
    let (_backend, creds) = healthy_backend().await;
    let store = store();

    for name in ["First", "Second"] {
        let lead = NewLead {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            phone: "555".to_string(),
            message: String::new(),
        };
        store.insert_lead(&creds, &lead).await.unwrap();
    }

    let leads = store.list_leads(&creds).await.unwrap();
    let names: Vec<&str> = leads.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, vec!["Second", "First"]);
}

#[tokio::test]
async fn test_wrong_token_is_permission_denied() {
    let (_backend, creds) = healthy_backend().await;
    let wrong = ConnectionCredentials::new(&creds.endpoint, "wrong-key");

    let err = store().fetch_site_settings(&wrong).await.unwrap_err();

    assert_eq!(err, RemoteError::PermissionDenied("Invalid API key".to_string()));
}

#[tokio::test]
async fn test_missing_table_and_bucket_classified() {
    let router = Router::new()
        .route("/rest/v1/site_settings", get(missing_table).post(missing_table))
        .route("/storage/v1/object/media/:key", post(missing_bucket));
    let creds = ConnectionCredentials::new(serve(router).await, TOKEN);
    let store = store();

    assert_eq!(
        store.fetch_site_settings(&creds).await.unwrap_err(),
        RemoteError::MissingTable("site_settings".to_string())
    );
    assert_eq!(
        store
            .upsert_site_settings(&creds, &SiteSettingsRow::default())
            .await
            .unwrap_err(),
        RemoteError::MissingTable("site_settings".to_string())
    );
    assert_eq!(
        store
            .upload_object(&creds, "k.png", "image/png", Bytes::from_static(b"x"))
            .await
            .unwrap_err(),
        RemoteError::MissingBucket("media".to_string())
    );
}

#[tokio::test]
async fn test_slow_endpoint_times_out_as_unavailable() {
    let router = Router::new().route("/rest/v1/site_settings", get(slow));
    let creds = ConnectionCredentials::new(serve(router).await, TOKEN);
    let store = SupabaseStore::new(Duration::from_millis(100)).unwrap();

    let err = store.fetch_site_settings(&creds).await.unwrap_err();

    assert!(matches!(err, RemoteError::Unavailable(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_unreachable_and_malformed_endpoints_unavailable() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let closed = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    for endpoint in [closed.as_str(), "not a url"] {
        let creds = ConnectionCredentials::new(endpoint, TOKEN);
        let err = store().fetch_site_settings(&creds).await.unwrap_err();
        assert!(matches!(err, RemoteError::Unavailable(_)), "{}: {:?}", endpoint, err);
    }
}
