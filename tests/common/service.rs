//! Local discovery service over HTTP.
//!
//! Answers the discovery routes with canned JSON and records every request it
//! sees. Runs on its own thread and runtime so both async gateway tests and
//! blocking binary tests can point at it.

use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Json, Response};
use parking_lot::Mutex;
use serde_json::{Value, json};

#[derive(Debug, Clone)]
pub struct Seen {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub body: Option<Value>,
}

#[derive(Clone, Default)]
pub struct Service {
    pub seen: Arc<Mutex<Vec<Seen>>>,
    pub empty_trigger: bool,
}

impl Service {
    pub fn last(&self) -> Seen {
        self.seen.lock().last().cloned().expect("no request seen")
    }

    pub fn paths(&self) -> Vec<String> {
        self.seen.lock().iter().map(|s| s.path.clone()).collect()
    }

    /// Serve on an ephemeral port and return the base URL
    pub fn start(&self) -> String {
        let service = self.clone();
        let (tx, rx) = std::sync::mpsc::channel();
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("Failed to build service runtime");
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("Failed to bind service");
                tx.send(listener.local_addr().expect("no local address"))
                    .expect("test went away");
                let app = Router::new().fallback(handle).with_state(service);
                axum::serve(listener, app).await.expect("service stopped");
            });
        });
        let addr = rx.recv().expect("service failed to start");
        format!("http://{addr}")
    }
}

pub fn record(id: i64, status: &str) -> Value {
    json!({
        "id": id,
        "status": status,
        "environment": "prod",
        "data_source_type": "azure_blob",
        "storage_location": {"path": format!("/landing/file-{id}.csv")},
        "discovered_at": "2025-03-02T08:00:00Z",
        "owner_team": "finance",
    })
}

async fn handle(State(service): State<Service>, method: Method, uri: Uri, body: Bytes) -> Response {
    service.seen.lock().push(Seen {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        body: serde_json::from_slice(&body).ok(),
    });

    let rest = uri.path().trim_start_matches("/api/discovery");
    let segments: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();

    match (method.as_str(), segments.as_slice()) {
        ("GET", []) => Json(json!({
            "discoveries": [record(1, "pending"), record(2, "approved")],
            "pagination": {"page": 0, "size": 50, "total": 2, "total_pages": 1},
        }))
        .into_response(),
        ("GET", ["stats"]) => Json(json!({
            "total": 2,
            "by_status": {"pending": 1, "approved": 1},
        }))
        .into_response(),
        ("POST", ["trigger"]) if service.empty_trigger => StatusCode::ACCEPTED.into_response(),
        ("POST", ["trigger"]) => (
            StatusCode::ACCEPTED,
            Json(json!({"message": "Discovery started", "status": "running"})),
        )
            .into_response(),
        ("GET", ["404"]) => StatusCode::NOT_FOUND.into_response(),
        ("GET", ["503"]) => StatusCode::SERVICE_UNAVAILABLE.into_response(),
        ("GET", ["77"]) => "definitely not json".into_response(),
        ("GET", [id]) => match id.parse::<i64>() {
            Ok(id) => Json(record(id, "pending")).into_response(),
            Err(_) => StatusCode::BAD_REQUEST.into_response(),
        },
        ("PUT", ["500", _]) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        ("PUT", [id, "approve"]) => {
            let id = id.parse::<i64>().unwrap_or_default();
            let mut approved = record(id, "approved");
            approved["approved_by"] = service
                .last()
                .body
                .and_then(|b| b.get("approved_by").cloned())
                .unwrap_or(Value::Null);
            Json(json!({"message": "Discovery approved", "discovery": approved})).into_response()
        }
        ("PUT", [id, "reject"]) => {
            let id = id.parse::<i64>().unwrap_or_default();
            Json(record(id, "rejected")).into_response()
        }
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}
