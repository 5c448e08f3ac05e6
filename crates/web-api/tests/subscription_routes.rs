mod support;

use serde_json::json;
use support::{build_router, send, MemorySubscriptionRepository};

fn payload(service: &str, start: &str, end: Option<&str>) -> serde_json::Value {
    let mut body = json!({
        "service_name": service,
        "price": 400,
        "user_id": "60601fee-2bf1-4721-ae6f-7636e79a0cba",
        "start_date": start,
    });
    if let Some(end) = end {
        body["end_date"] = json!(end);
    }
    body
}

#[tokio::test]
async fn health_reports_ok() {
    let app = build_router(MemorySubscriptionRepository::default());
    let (status, body) = send(&app, "GET", "/api/health", None).await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn subscription_lifecycle_over_http() {
    let repository = MemorySubscriptionRepository::default();
    let app = build_router(repository.clone());

    let (status, created) = send(
        &app,
        "POST",
        "/api/subscriptions",
        Some(payload("Yandex Plus", "07-2025", None)),
    )
    .await;
    assert_eq!(status, 201);
    let id = created["id"].as_str().expect("id").to_string();
    assert_eq!(repository.len(), 1);

    let (status, fetched) = send(&app, "GET", &format!("/api/subscriptions/{id}"), None).await;
    assert_eq!(status, 200);
    assert_eq!(fetched["start_date"], "07-2025");
    assert_eq!(fetched["price"], 400);
    assert!(fetched.get("end_date").is_none());

    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/api/subscriptions/{id}"),
        Some(payload("Yandex Plus Family", "08-2025", Some("12-2025"))),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(updated["id"], id.as_str());
    assert_eq!(updated["service_name"], "Yandex Plus Family");
    assert_eq!(updated["end_date"], "12-2025");

    let (status, _) = send(&app, "DELETE", &format!("/api/subscriptions/{id}"), None).await;
    assert_eq!(status, 204);

    let (status, body) = send(&app, "DELETE", &format!("/api/subscriptions/{id}"), None).await;
    assert_eq!(status, 404);
    assert_eq!(body["code"], "NOT_FOUND");

    let (status, _) = send(&app, "GET", &format!("/api/subscriptions/{id}"), None).await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let app = build_router(MemorySubscriptionRepository::default());
    let (status, body) = send(
        &app,
        "POST",
        "/api/subscriptions",
        Some(json!({ "service_name": "Netflix", "price": "four hundred" })),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn invalid_month_is_rejected_before_storage() {
    let repository = MemorySubscriptionRepository::default();
    let app = build_router(repository.clone());

    let (status, body) = send(
        &app,
        "POST",
        "/api/subscriptions",
        Some(payload("Netflix", "2025-07", None)),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["code"], "INVALID_ARGUMENT");
    assert_eq!(repository.len(), 0);

    let (status, _) = send(&app, "GET", "/api/subscriptions?from=13-2025", None).await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn unknown_or_malformed_id_is_not_found() {
    let app = build_router(MemorySubscriptionRepository::default());

    let (status, _) = send(&app, "GET", "/api/subscriptions/not-a-uuid", None).await;
    assert_eq!(status, 404);

    let (status, _) = send(
        &app,
        "PUT",
        "/api/subscriptions/0b7c0bd4-1f6e-4c0e-9a43-1a3f0b1ec111",
        Some(payload("Netflix", "01-2025", None)),
    )
    .await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn listing_with_upper_bound_excludes_ongoing() {
    let app = build_router(MemorySubscriptionRepository::default());
    for body in [
        payload("inside", "01-2025", Some("12-2025")),
        payload("ongoing", "03-2025", None),
        payload("starts early", "12-2024", Some("06-2025")),
    ] {
        let (status, _) = send(&app, "POST", "/api/subscriptions", Some(body)).await;
        assert_eq!(status, 201);
    }

    let (status, bounded) = send(
        &app,
        "GET",
        "/api/subscriptions?from=01-2025&to=12-2025",
        None,
    )
    .await;
    assert_eq!(status, 200);
    let names: Vec<&str> = bounded
        .as_array()
        .expect("array")
        .iter()
        .map(|item| item["service_name"].as_str().expect("name"))
        .collect();
    assert_eq!(names, vec!["inside"]);

    let (_, from_only) = send(&app, "GET", "/api/subscriptions?from=01-2025", None).await;
    assert_eq!(from_only.as_array().expect("array").len(), 2);

    let (_, everything) = send(&app, "GET", "/api/subscriptions", None).await;
    assert_eq!(everything.as_array().expect("array").len(), 3);
}

#[tokio::test]
async fn responses_carry_request_id() {
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    let app = build_router(MemorySubscriptionRepository::default());
    let response = app
        .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn openapi_document_lists_every_route() {
    let app = build_router(MemorySubscriptionRepository::default());
    let (status, doc) = send(&app, "GET", web_api::OPENAPI_PATH, None).await;
    assert_eq!(status, 200);

    let paths = doc["paths"].as_object().expect("paths");
    assert!(paths.contains_key("/api/health"));
    for method in ["get", "post"] {
        assert!(paths["/api/subscriptions"].get(method).is_some(), "{method}");
    }
    for method in ["get", "put", "delete"] {
        assert!(paths["/api/subscriptions/{id}"].get(method).is_some(), "{method}");
    }
    let schemas = doc["components"]["schemas"].as_object().expect("schemas");
    for name in ["SubscriptionInput", "SubscriptionDto", "ErrorBody"] {
        assert!(schemas.contains_key(name), "{name}");
    }
}

#[tokio::test]
async fn swagger_ui_is_served() {
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    let app = build_router(MemorySubscriptionRepository::default());
    let response = app
        .oneshot(Request::builder().uri("/swagger/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}
