//! `FirebaseStore` against a small in-process imitation of the Realtime
//! Database REST API: `.json` paths, `?auth=`, `X-Firebase-ETag` reads and
//! `if-match` conditional writes that fail with 412.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, Method, StatusCode, header::ETAG},
    response::{IntoResponse, Response},
    routing::any,
};
use portfolio_metrics::allowlist::{MetricTarget, Namespace};
use portfolio_metrics::error::StoreError;
use portfolio_metrics::store::{CounterStore, FirebaseStore};
use serde_json::{Map, Value, json};
use tokio::net::TcpListener;

const TOKEN: &str = "test-secret";

#[derive(Default)]
struct FakeDb {
    values: Mutex<HashMap<String, (Value, u64)>>, // path -> (value, version)
    forced_conflicts: AtomicU32,
    puts: AtomicU32,
}

impl FakeDb {
    fn seed(&self, path: &str, value: Value) {
        self.values.lock().unwrap().insert(path.to_string(), (value, 1));
    }

    fn value(&self, path: &str) -> Option<Value> {
        self.values.lock().unwrap().get(path).map(|(v, _)| v.clone())
    }

    // exact node, or the object made of its direct children
    fn read(&self, path: &str) -> (Value, u64) {
        let values = self.values.lock().unwrap();
        if let Some((value, version)) = values.get(path) {
            return (value.clone(), *version);
        }

        let prefix = format!("{path}/");
        let children: Map<String, Value> = values
            .iter()
            .filter_map(|(k, (v, _))| k.strip_prefix(&prefix).map(|f| (f.to_string(), v.clone())))
            .collect();
        if children.is_empty() {
            (Value::Null, 0)
        } else {
            (Value::Object(children), 0)
        }
    }
}

async fn rtdb(
    State(db): State<Arc<FakeDb>>,
    method: Method,
    Path(path): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if query.get("auth").map(String::as_str) != Some(TOKEN) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"error": "Permission denied"}))).into_response();
    }
    let Some(path) = path.strip_suffix(".json") else {
        return StatusCode::BAD_REQUEST.into_response();
    };

    match method {
        Method::GET => {
            let (value, version) = db.read(path);
            if headers.contains_key("x-firebase-etag") {
                ([(ETAG, format!("v{version}"))], Json(value)).into_response()
            } else {
                Json(value).into_response()
            }
        }
        Method::PUT => {
            db.puts.fetch_add(1, Ordering::SeqCst);
            let Ok(new_value) = serde_json::from_slice::<Value>(&body) else {
                return StatusCode::BAD_REQUEST.into_response();
            };

            let mut values = db.values.lock().unwrap();
            let (current, version) = values
                .get(path)
                .cloned()
                .unwrap_or((Value::Null, 0));

            let forced = db
                .forced_conflicts
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            let stale = headers
                .get("if-match")
                .and_then(|v| v.to_str().ok())
                .is_some_and(|etag| etag != format!("v{version}"));

            if forced || stale {
                return (
                    StatusCode::PRECONDITION_FAILED,
                    [(ETAG, format!("v{version}"))],
                    Json(current),
                )
                    .into_response();
            }

            values.insert(path.to_string(), (new_value.clone(), version + 1));
            Json(new_value).into_response()
        }
        _ => StatusCode::METHOD_NOT_ALLOWED.into_response(),
    }
}

async fn spawn_fake() -> (Arc<FakeDb>, String) {
    let db = Arc::new(FakeDb::default());
    let app = Router::new()
        .route("/{*path}", any(rtdb))
        .with_state(db.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (db, format!("http://{addr}"))
}

fn store_for(url: &str, token: &str) -> FirebaseStore {
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    FirebaseStore::new(client, url, Some(token.to_string())).unwrap()
}

#[tokio::test]
async fn reads_namespace_objects() {
    let (db, url) = spawn_fake().await;
    db.seed("sources/linkedin", json!(3));
    db.seed("sources/resume", json!("8"));
    let store = store_for(&url, TOKEN);

    let sources = store.read_namespace(Namespace::Sources).await.unwrap();
    assert_eq!(sources, json!({"linkedin": 3, "resume": "8"}));

    let paths = store.read_namespace(Namespace::Paths).await.unwrap();
    assert_eq!(paths, Value::Null);
}

#[tokio::test]
async fn increment_creates_and_bumps_counter() {
    let (db, url) = spawn_fake().await;
    let store = store_for(&url, TOKEN);
    let target = MetricTarget::parse("paths", "immersive").unwrap();

    assert_eq!(store.increment(&target).await.unwrap(), 1);
    assert_eq!(store.increment(&target).await.unwrap(), 2);
    assert_eq!(db.value("paths/immersive"), Some(json!(2)));
}

#[tokio::test]
async fn increment_retries_after_conflict() {
    let (db, url) = spawn_fake().await;
    db.seed("sources/resume", json!(41));
    db.forced_conflicts.store(3, Ordering::SeqCst);
    let store = store_for(&url, TOKEN);
    let target = MetricTarget::parse("sources", "resume").unwrap();

    assert_eq!(store.increment(&target).await.unwrap(), 42);
    assert_eq!(db.puts.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn increment_gives_up_after_max_attempts() {
    let (db, url) = spawn_fake().await;
    db.forced_conflicts.store(10, Ordering::SeqCst);
    let store = store_for(&url, TOKEN).with_max_attempts(3);
    let target = MetricTarget::parse("paths", "quick").unwrap();

    let err = store.increment(&target).await.unwrap_err();
    assert!(matches!(err, StoreError::Contention { attempts: 3 }));
    assert_eq!(db.value("paths/quick"), None);
}

#[tokio::test]
async fn increment_at_max_fails_without_writing() {
    let (db, url) = spawn_fake().await;
    db.seed("sources/resume", json!(u64::MAX));
    let store = store_for(&url, TOKEN);
    let target = MetricTarget::parse("sources", "resume").unwrap();

    let err = store.increment(&target).await.unwrap_err();
    assert!(matches!(err, StoreError::Overflow { .. }));
    assert_eq!(db.puts.load(Ordering::SeqCst), 0);
    assert_eq!(db.value("sources/resume"), Some(json!(u64::MAX)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_increments_are_not_lost() {
    let (db, url) = spawn_fake().await;
    db.seed("sources/anonymous", json!(100));
    let store = Arc::new(store_for(&url, TOKEN));
    let target = MetricTarget::parse("sources", "anonymous").unwrap();

    let tasks: Vec<_> = (0..20)
        .map(|_| {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.increment(&target).await.unwrap() })
        })
        .collect();

    let mut seen = Vec::new();
    for task in tasks {
        seen.push(task.await.unwrap());
    }
    seen.sort_unstable();

    assert_eq!(seen, (101..=120).collect::<Vec<u64>>());
    assert_eq!(db.value("sources/anonymous"), Some(json!(120)));
}

#[tokio::test]
async fn rejected_auth_surfaces_status() {
    let (_db, url) = spawn_fake().await;
    let store = store_for(&url, "wrong");

    let err = store.read_namespace(Namespace::Paths).await.unwrap_err();
    assert!(matches!(err, StoreError::Status(401)));
}

#[tokio::test]
async fn probe_writes_and_reads_back() {
    let (db, url) = spawn_fake().await;
    let store = store_for(&url, TOKEN);

    let doc = store.probe().await.unwrap();
    assert_eq!(doc["content"], "Hello from Backend!");
    assert_eq!(db.value("test/message"), Some(doc));
}
