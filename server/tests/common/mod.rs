#![allow(dead_code)]

use std::str::FromStr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{NaiveDate, NaiveDateTime};
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tempfile::TempDir;
use tower::ServiceExt;

use events_server::db;
use events_server::geocoding::{GeocodeError, Geocoder, Place, SearchOptions};
use events_server::models::{AddressFields, EventInput};
use events_server::routes::create_routes;
use events_server::storage::AttachmentStore;
use events_server::AppState;

pub const MAX_UPLOAD_BYTES: usize = 1024;

/// What the stand-in geocoder answers to every lookup.
#[derive(Debug, Clone, Copy)]
pub enum Reply {
    Match(f64, f64),
    NoMatch,
    Fail,
}

pub struct StubGeocoder {
    reply: Reply,
    queries: Mutex<Vec<String>>,
}

impl StubGeocoder {
    pub fn new(reply: Reply) -> Self {
        Self {
            reply,
            queries: Mutex::default(),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl Geocoder for StubGeocoder {
    async fn search(&self, query: &str, _options: SearchOptions) -> Result<Vec<Place>, GeocodeError> {
        self.queries.lock().unwrap().push(query.to_string());
        match self.reply {
            Reply::Match(lat, lon) => Ok(vec![Place {
                display_name: query.to_string(),
                lat: lat.to_string(),
                lon: lon.to_string(),
                address: None,
            }]),
            Reply::NoMatch => Ok(Vec::new()),
            Reply::Fail => Err(GeocodeError::Status(503)),
        }
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub pool: SqlitePool,
    pub geocoder: Arc<StubGeocoder>,
    pub uploads: TempDir,
}

impl TestApp {
    pub async fn new(reply: Reply) -> Self {
        let pool = test_pool().await;
        let uploads = tempfile::tempdir().unwrap();
        let geocoder = Arc::new(StubGeocoder::new(reply));
        let attachments = AttachmentStore::new(uploads.path(), MAX_UPLOAD_BYTES);

        let state = AppState::new(
            pool.clone(),
            Arc::clone(&geocoder) as Arc<dyn Geocoder>,
            attachments,
        );
        let router = create_routes(state.clone(), None);

        Self {
            router,
            state,
            pool,
            geocoder,
            uploads,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::delete(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn json(&self, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn multipart(
        &self,
        method: &str,
        uri: &str,
        fields: &[(&str, &str)],
        file: Option<(&str, &[u8])>,
    ) -> (StatusCode, Value) {
        let (content_type, body) = multipart_body(fields, file);
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", content_type)
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }
}

pub async fn test_pool() -> SqlitePool {
    // A single connection keeps the whole test on one in-memory database
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .unwrap();
    db::migrate(&pool).await.unwrap();
    pool
}

pub fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> (String, Vec<u8>) {
    const BOUNDARY: &str = "----events-server-test-boundary";
    let mut body = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}

pub fn at(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

pub fn event_input(title: &str, start: NaiveDateTime, end: NaiveDateTime) -> EventInput {
    EventInput {
        title: title.to_string(),
        description: None,
        start_datetime: start,
        end_datetime: end,
        address: AddressFields::default(),
        category_id: None,
    }
}
