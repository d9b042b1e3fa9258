//! PortalClient against a local axum stub of the portal's endpoints.
//!
//! Every test binds its own server on an ephemeral port, so they can run in
//! parallel.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{RawQuery, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Redirect},
    routing::get,
};
use chrono::NaiveDate;
use portal::{
    ExportFilters, ExportFormat, ExportRequest, Filename, FormReceipt, PortalApi, PortalClient,
    PortalError,
};
use pretty_assertions::assert_eq;
use serde_json::json;

type Seen = Arc<Mutex<Vec<Option<String>>>>;

async fn serve(router: Router) -> PortalClient {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    PortalClient::new(&format!("http://{addr}"), Duration::from_secs(5)).unwrap()
}

async fn record_preview(State(seen): State<Seen>, RawQuery(query): RawQuery) -> impl IntoResponse {
    seen.lock().unwrap().push(query);
    Json(json!({
        "opportunities": [
            {"id": 1, "title": "Beach Cleanup", "category": "Environment",
             "date": "2024-06-01", "volunteer_count": 4}
        ],
        "total_count": 1,
        "total_volunteers": 4
    }))
}

async fn record_export(State(seen): State<Seen>, RawQuery(query): RawQuery) -> impl IntoResponse {
    seen.lock().unwrap().push(query);
    ([(header::CONTENT_TYPE, "application/json")], "[]")
}

#[tokio::test]
async fn fetches_categories() {
    let router = Router::new().route(
        "/api/categories/",
        get(|| async {
            Json(json!({"categories": [
                {"id": 1, "name": "Environment", "opportunity_count": 3},
                {"id": 2, "name": "Community", "opportunity_count": 0}
            ]}))
        }),
    );
    let client = serve(router).await;

    let categories = client.categories().await.unwrap();
    assert_eq!(categories.len(), 2);
    assert_eq!(categories[0].name, "Environment");
    assert_eq!(categories[1].opportunity_count, 0);
}

#[tokio::test]
async fn preview_without_filters_sends_no_query() {
    let seen: Seen = Arc::default();
    let router = Router::new()
        .route("/api/export/preview/", get(record_preview))
        .with_state(seen.clone());
    let client = serve(router).await;

    let page = client.export_preview(&ExportFilters::default()).await.unwrap();
    assert_eq!(page.total_volunteers, 4);
    assert_eq!(*seen.lock().unwrap(), vec![None::<String>]);
}

#[tokio::test]
async fn preview_sends_each_filter() {
    let seen: Seen = Arc::default();
    let router = Router::new()
        .route("/api/export/preview/", get(record_preview))
        .with_state(seen.clone());
    let client = serve(router).await;

    let filters = ExportFilters {
        date_from: NaiveDate::from_ymd_opt(2024, 1, 1),
        date_to: NaiveDate::from_ymd_opt(2024, 12, 31),
        categories: [2, 5].into_iter().collect(),
    };
    client.export_preview(&filters).await.unwrap();

    let query = seen.lock().unwrap()[0].clone().unwrap();
    assert_eq!(
        query,
        "date_from=2024-01-01&date_to=2024-12-31&categories%5B%5D=2&categories%5B%5D=5"
    );
}

#[tokio::test]
async fn download_writes_named_file() {
    let seen: Seen = Arc::default();
    let router = Router::new()
        .route("/export/json/", get(record_export))
        .with_state(seen.clone());
    let client = serve(router).await;

    let dir = std::env::temp_dir().join(format!("portal_download_{}", std::process::id()));
    let request = ExportRequest {
        format: ExportFormat::Json,
        filters: ExportFilters::default(),
        filename: Filename::sanitize("My File!@#"),
    };
    let path = client.download_export(&request, &dir).await.unwrap();

    assert_eq!(path, dir.join("My_File___.json"));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
    assert_eq!(
        seen.lock().unwrap()[0].as_deref(),
        Some("filename=My_File___")
    );

    let _ = std::fs::remove_dir_all(dir);
}

#[tokio::test]
async fn error_status_is_reported() {
    let router = Router::new().route(
        "/api/dashboard-stats/",
        get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
    );
    let client = serve(router).await;

    match client.dashboard_stats().await {
        Err(PortalError::Status { status, url }) => {
            assert_eq!(status, 500);
            assert!(url.ends_with("/api/dashboard-stats/"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

async fn signup_page() -> impl IntoResponse {
    (
        [(header::SET_COOKIE, "csrftoken=tok123; Path=/")],
        "<form></form>",
    )
}

async fn signup_post(headers: HeaderMap, body: String) -> axum::response::Response {
    let token_ok = headers
        .get("x-csrftoken")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == "tok123");
    if !token_ok {
        return StatusCode::FORBIDDEN.into_response();
    }
    if body.contains("age=17") {
        // Django re-renders the form with its own errors
        return (StatusCode::OK, "<form>errors</form>").into_response();
    }
    Redirect::to("/volunteers/").into_response()
}

#[tokio::test]
async fn submit_form_round_trips_csrf_token() {
    let router = Router::new().route("/signup/", get(signup_page).post(signup_post));
    let client = serve(router).await;

    let fields = vec![
        ("name".to_string(), "Ada".to_string()),
        ("age".to_string(), "30".to_string()),
    ];
    let receipt = client.submit_form("/signup/", &fields).await.unwrap();
    assert_eq!(
        receipt,
        FormReceipt::Accepted {
            location: Some("/volunteers/".to_string())
        }
    );

    let fields = vec![("age".to_string(), "17".to_string())];
    let receipt = client.submit_form("/signup/", &fields).await.unwrap();
    assert_eq!(receipt, FormReceipt::Rejected);
}

#[tokio::test]
async fn submit_form_without_cookie_fails() {
    let router = Router::new().route("/opportunities/add/", get(|| async { "<form></form>" }));
    let client = serve(router).await;

    let result = client.submit_form("/opportunities/add/", &[]).await;
    assert!(matches!(result, Err(PortalError::MissingCsrfToken(_))));
}
