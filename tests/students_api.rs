use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower::ServiceExt;

use student_registry::api::server::create_app;

fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn response_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn create_student(app: &Router, name: &str, email: &str, marks: Value) -> Value {
    let body = json!({
        "name": name,
        "email": email,
        "age": 17,
        "marks": marks,
    });

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/student/create", &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    response_json(response).await
}

#[sqlx::test]
async fn health_reports_healthy(pool: SqlitePool) {
    let app = create_app(pool);

    for uri in ["/", "/health"] {
        let response = app.clone().oneshot(get_request(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response_json(response).await;
        assert_eq!(body["status"], json!("healthy"));
        assert!(body["timestamp"].is_string());
        assert!(body["environment"]["port"].is_number());
    }
}

#[sqlx::test]
async fn create_returns_the_created_record(pool: SqlitePool) {
    let app = create_app(pool.clone());

    let body = create_student(
        &app,
        "Ada Lovelace",
        "ada@example.com",
        json!([
            {"subject": "Math", "score": 85.5},
            {"subject": "Social_Studies", "score": 70}
        ]),
    )
    .await;

    assert_eq!(body["status"], json!("success"));
    let data = &body["data"];
    assert!(!data["id"].as_str().unwrap().is_empty());
    assert_eq!(data["name"], json!("Ada Lovelace"));
    assert_eq!(data["email"], json!("ada@example.com"));
    assert_eq!(data["age"], json!(17));
    assert!(data["createdAt"].is_string());
    assert!(data["updatedAt"].is_string());

    let marks = data["marks"].as_array().unwrap();
    assert_eq!(marks.len(), 2);
    assert_eq!(marks[0]["subject"], json!("Math"));
    assert_eq!(marks[0]["score"], json!(85.5));
    assert_eq!(marks[0]["studentId"], data["id"]);
    assert_eq!(marks[1]["score"], json!(70.0));

    // Scores are persisted in hundredths.
    let stored: i64 = sqlx::query_scalar("SELECT score FROM marks WHERE subject = 'Math'")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(stored, 8550);
}

#[sqlx::test]
async fn create_rejects_invalid_payloads_with_field_errors(pool: SqlitePool) {
    let app = create_app(pool);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/student/create",
            &json!({"name": "", "email": "not-an-email", "age": -1}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response_json(response).await;
    assert_eq!(body["error"], json!("Invalid registration data"));
    let messages: Vec<&str> = body["message"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m.as_str().unwrap())
        .collect();
    assert_eq!(
        messages,
        vec![
            "name Name is required",
            "email Invalid email address",
            "age Age must be a positive number",
        ]
    );
}

#[sqlx::test]
async fn create_rejects_duplicate_emails(pool: SqlitePool) {
    let app = create_app(pool);

    create_student(&app, "Ada", "ada@example.com", json!([])).await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/student/create",
            &json!({"name": "Grace", "email": "ada@example.com", "age": 19}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = response_json(response).await;
    assert_eq!(body["error"], json!("User already exists"));
    assert_eq!(body["details"], json!("Email is already registered"));
}

#[sqlx::test]
async fn malformed_json_bodies_are_intercepted(pool: SqlitePool) {
    let app = create_app(pool);

    let request = Request::builder()
        .method("POST")
        .uri("/api/student/create")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"name\": unquoted}"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response_json(response).await;
    assert_eq!(body["success"], json!(false));
    assert_eq!(
        body["message"],
        json!("Invalid JSON format: check for unquoted strings or trailing commas.")
    );
}

#[sqlx::test]
async fn get_by_id_returns_the_record_or_404(pool: SqlitePool) {
    let app = create_app(pool);

    let created = create_student(
        &app,
        "Ada",
        "ada@example.com",
        json!([{"subject": "Science", "score": 99.99}]),
    )
    .await;
    let id = created["data"]["id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(get_request(&format!("/api/student/getById/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["data"]["marks"][0]["score"], json!(99.99));

    let response = app
        .oneshot(get_request("/api/student/getById/unknown-id"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = response_json(response).await;
    assert_eq!(body["message"], json!("Student not found"));
}

#[sqlx::test]
async fn update_applies_partial_fields_and_replaces_marks(pool: SqlitePool) {
    let app = create_app(pool);

    let created = create_student(
        &app,
        "Ada",
        "ada@example.com",
        json!([
            {"subject": "Math", "score": 50},
            {"subject": "Art", "score": 60}
        ]),
    )
    .await;
    let id = created["data"]["id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/student/update/{}", id),
            &json!({
                "name": "Ada Lovelace",
                "marks": [{"subject": "English", "score": 88.25}]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    let data = &body["data"];
    assert_eq!(data["name"], json!("Ada Lovelace"));
    assert_eq!(data["email"], json!("ada@example.com"));
    assert_eq!(data["age"], json!(17));

    // Full replace, not a merge.
    let marks = data["marks"].as_array().unwrap();
    assert_eq!(marks.len(), 1);
    assert_eq!(marks[0]["subject"], json!("English"));
    assert_eq!(marks[0]["score"], json!(88.25));
}

#[sqlx::test]
async fn update_without_marks_leaves_marks_alone(pool: SqlitePool) {
    let app = create_app(pool);

    let created = create_student(
        &app,
        "Ada",
        "ada@example.com",
        json!([{"subject": "Math", "score": 42.5}]),
    )
    .await;
    let id = created["data"]["id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/student/update/{}", id),
            &json!({"age": 18}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["data"]["age"], json!(18));
    assert_eq!(body["data"]["marks"][0]["score"], json!(42.5));
}

#[sqlx::test]
async fn update_rejects_email_changes(pool: SqlitePool) {
    let app = create_app(pool);

    let created = create_student(&app, "Ada", "ada@example.com", json!([])).await;
    let id = created["data"]["id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/student/update/{}", id),
            &json!({"email": "other@example.com"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response_json(response).await;
    assert_eq!(body["error"], json!("Email cannot be updated"));

    // Stored email is untouched.
    let response = app
        .oneshot(get_request(&format!("/api/student/getById/{}", id)))
        .await
        .unwrap();
    let body = response_json(response).await;
    assert_eq!(body["data"]["email"], json!("ada@example.com"));
}

#[sqlx::test]
async fn update_unknown_id_is_404(pool: SqlitePool) {
    let app = create_app(pool);

    let response = app
        .oneshot(json_request(
            "PUT",
            "/api/student/update/unknown-id",
            &json!({"name": "Nobody"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test]
async fn listing_an_empty_store_is_404(pool: SqlitePool) {
    let app = create_app(pool);

    let response = app.oneshot(get_request("/api/student/getAll")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = response_json(response).await;
    assert_eq!(body["message"], json!("No students found"));
}

#[sqlx::test]
async fn listing_paginates_and_reports_totals(pool: SqlitePool) {
    let app = create_app(pool);

    for i in 0..15 {
        create_student(
            &app,
            &format!("Student {}", i),
            &format!("student{}@example.com", i),
            json!([{"subject": "Math", "score": 75.5}]),
        )
        .await;
    }

    let response = app
        .clone()
        .oneshot(get_request("/api/student/getAll?page=2&limit=10"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["status"], json!("success"));
    assert_eq!(body["data"].as_array().unwrap().len(), 5);
    assert_eq!(body["meta"], json!({"page": 2, "limit": 10, "total": 15}));
    assert_eq!(body["data"][0]["marks"][0]["score"], json!(75.5));

    // No params: unrestricted listing, meta echoes nulls.
    let response = app
        .oneshot(get_request("/api/student/getAll"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 15);
    assert_eq!(body["meta"], json!({"page": null, "limit": null, "total": 15}));
}

#[sqlx::test]
async fn listing_rejects_bad_pagination_params(pool: SqlitePool) {
    let app = create_app(pool);

    let response = app
        .oneshot(get_request("/api/student/getAll?page=abc&limit=0"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response_json(response).await;
    assert_eq!(body["error"], json!("Invalid query parameters"));
    let messages: Vec<&str> = body["message"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m.as_str().unwrap())
        .collect();
    assert_eq!(
        messages,
        vec![
            "page Page must be a positive integer",
            "limit Limit must be a positive integer",
        ]
    );
}

#[sqlx::test]
async fn delete_removes_the_student_and_its_marks(pool: SqlitePool) {
    let app = create_app(pool.clone());

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/student/delete/unknown-id")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let created = create_student(
        &app,
        "Ada",
        "ada@example.com",
        json!([{"subject": "Math", "score": 85.5}]),
    )
    .await;
    let id = created["data"]["id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/student/delete/{}", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["status"], json!("success"));
    assert_eq!(body["message"], json!("Student deleted successfully"));

    let response = app
        .oneshot(get_request(&format!("/api/student/getById/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM marks")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(remaining, 0);
}
