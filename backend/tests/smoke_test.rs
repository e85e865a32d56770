use axum::Router;
use bytes::Bytes;
use chrono::{Months, Utc};
use http::{header, HeaderMap, Method, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;
use users_backend::routes;
use users_backend::test_util::{create_test_app, create_test_state, test_config, user_json};

async fn send_request(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, HeaderMap, Bytes) {
    let mut req_builder = http::Request::builder().method(method).uri(uri);

    if body.is_some() {
        req_builder = req_builder.header("Content-Type", "application/json");
    }

    let req = req_builder
        .body(match body {
            Some(b) => axum::body::Body::from(b.to_string()),
            None => axum::body::Body::empty(),
        })
        .unwrap();

    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, bytes)
}

async fn send_json(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let (status, _, bytes) = send_request(app, method, uri, body).await;
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn create(app: &Router, body: Value) -> i64 {
    let (status, json) = send_json(app, Method::POST, "/users", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "body: {json}");
    json["id"].as_i64().unwrap()
}

fn years_ago(years: u32) -> String {
    let today = Utc::now().date_naive();
    today
        .checked_sub_months(Months::new(12 * years))
        .unwrap()
        .format("%Y-%m-%d")
        .to_string()
}

#[tokio::test]
async fn test_create_user_returns_created_with_location() {
    let app = create_test_app().unwrap();

    let (status, headers, bytes) = send_request(
        &app,
        Method::POST,
        "/users",
        Some(user_json("test@example.com", "1990-01-01")),
    )
    .await;
    let json: Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(headers[header::LOCATION], "/users/1");
    assert_eq!(json["id"], 1);
    assert_eq!(json["email"], "test@example.com");
    assert_eq!(json["firstName"], "John");
    assert_eq!(json["lastName"], "Doe");
    assert_eq!(json["birthDate"], "1990-01-01");
    assert_eq!(json["_links"]["self"]["href"], "/users/1");
    assert_eq!(json["_links"]["users"]["href"], "/users");
}

#[tokio::test]
async fn test_create_ignores_client_id() {
    let app = create_test_app().unwrap();
    let mut body = user_json("test@example.com", "1990-01-01");
    body["id"] = json!(500);

    assert_eq!(create(&app, body).await, 1);
}

#[tokio::test]
async fn test_create_invalid_user_lists_violations() {
    let app = create_test_app().unwrap();

    let (status, json) = send_json(
        &app,
        Method::POST,
        "/users",
        Some(json!({"email": "", "lastName": "Doe", "birthDate": "1990-01-01"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], 400);
    assert_eq!(json["message"], "Arguments are not valid");
    assert_eq!(
        json["invalidParams"],
        json!(["Email can't be empty", "First name can't be empty"])
    );
    assert_eq!(json["instance"], "/users");

    let (_, all) = send_json(&app, Method::GET, "/users", None).await;
    assert!(all.get("_embedded").is_none());
}

#[tokio::test]
async fn test_create_age_boundary() {
    let app = create_test_app().unwrap();

    let (status, json) = send_json(
        &app,
        Method::POST,
        "/users",
        Some(user_json("eighteen@example.com", &years_ago(18))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["invalidParams"], json!(["User age must be greater than 18"]));

    create(&app, user_json("nineteen@example.com", &years_ago(19))).await;
}

#[tokio::test]
async fn test_get_user_and_missing_user() {
    let app = create_test_app().unwrap();
    let id = create(&app, user_json("test@example.com", "1990-01-01")).await;

    let (status, json) = send_json(&app, Method::GET, &format!("/users/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["email"], "test@example.com");

    let (status, json) = send_json(&app, Method::GET, "/users/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "Resource not found");
    assert_eq!(json["detail"], "Could not find user with id 42");
    assert_eq!(json["instance"], "/users/42");
}

#[tokio::test]
async fn test_get_all_users() {
    let app = create_test_app().unwrap();
    create(&app, user_json("a@example.com", "1980-01-01")).await;
    create(&app, user_json("b@example.com", "1985-01-01")).await;

    let (status, json) = send_json(&app, Method::GET, "/users", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["_links"]["self"]["href"], "/users");

    let users = json["_embedded"]["userList"].as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0]["id"], 1);
    assert_eq!(users[1]["_links"]["self"]["href"], "/users/2");
}

#[tokio::test]
async fn test_replace_user_keeps_omitted_optional_fields() {
    let app = create_test_app().unwrap();
    let mut body = user_json("test@example.com", "1990-01-01");
    body["address"] = json!("1 Main St");
    body["phoneNumber"] = json!("555-0100");
    let id = create(&app, body).await;

    let (status, json) = send_json(
        &app,
        Method::PUT,
        &format!("/users/{id}"),
        Some(json!({
            "email": "updated@example.com",
            "firstName": "Updated",
            "lastName": "User",
            "birthDate": "1980-02-02"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["id"], id);
    assert_eq!(json["email"], "updated@example.com");
    assert_eq!(json["firstName"], "Updated");
    assert_eq!(json["lastName"], "User");
    assert_eq!(json["birthDate"], "1980-02-02");
    assert_eq!(json["address"], "1 Main St");
    assert_eq!(json["phoneNumber"], "555-0100");
}

#[tokio::test]
async fn test_replace_with_invalid_user_is_rejected() {
    let app = create_test_app().unwrap();
    let id = create(&app, user_json("test@example.com", "1990-01-01")).await;

    let (status, json) = send_json(
        &app,
        Method::PUT,
        &format!("/users/{id}"),
        Some(user_json("not-an-email", "1990-01-01")),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["invalidParams"], json!(["Email must be in email address format"]));
}

#[tokio::test]
async fn test_patch_single_field() {
    let app = create_test_app().unwrap();
    let id = create(&app, user_json("test@example.com", "1990-01-01")).await;

    let (status, json) = send_json(
        &app,
        Method::PATCH,
        &format!("/users/{id}"),
        Some(json!({"phoneNumber": "1234567890"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["id"], id);
    assert_eq!(json["phoneNumber"], "1234567890");
    assert_eq!(json["email"], "test@example.com");
    assert_eq!(json["firstName"], "John");
    assert_eq!(json["lastName"], "Doe");
    assert_eq!(json["birthDate"], "1990-01-01");
}

#[tokio::test]
async fn test_patch_unknown_field_leaves_user_unchanged() {
    let app = create_test_app().unwrap();
    let id = create(&app, user_json("test@example.com", "1990-01-01")).await;
    let uri = format!("/users/{id}");
    let (_, _, before) = send_request(&app, Method::GET, &uri, None).await;

    let (status, json) = send_json(
        &app,
        Method::PATCH,
        &uri,
        Some(json!({"nickname": "x", "phoneNumber": "1"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Bad user request");
    assert_eq!(json["detail"], "Field 'nickname' is not valid.");

    let (_, _, after) = send_request(&app, Method::GET, &uri, None).await;
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_patch_id_is_rejected() {
    let app = create_test_app().unwrap();
    let id = create(&app, user_json("test@example.com", "1990-01-01")).await;

    let (status, json) =
        send_json(&app, Method::PATCH, &format!("/users/{id}"), Some(json!({"id": 99}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["detail"], "Field 'id' is not valid.");

    let (status, _) = send_json(&app, Method::GET, "/users/99", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_user() {
    let app = create_test_app().unwrap();
    let id = create(&app, user_json("test@example.com", "1990-01-01")).await;
    let uri = format!("/users/{id}");

    let (status, _, body) = send_request(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body, Bytes::from(format!("User {id} deleted successfully")));

    let (status, json) = send_json(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["detail"], format!("Could not find user with id {id}"));
}

#[tokio::test]
async fn test_search_by_birth_date_range() {
    let app = create_test_app().unwrap();
    create(&app, user_json("old@example.com", "1889-01-01")).await;
    create(&app, user_json("edge@example.com", "1990-12-31")).await;
    create(&app, user_json("young@example.com", "1995-05-05")).await;

    let (status, json) = send_json(
        &app,
        Method::GET,
        "/users/search?from=1889-01-01&to=1990-12-31",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["_links"]["self"]["href"], "/users");
    let emails: Vec<_> = json["_embedded"]["userList"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["email"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(emails, vec!["old@example.com", "edge@example.com"]);
}

#[tokio::test]
async fn test_search_up_to_today() {
    let app = create_test_app().unwrap();
    create(&app, user_json("old@example.com", "1889-01-01")).await;
    let today = years_ago(0);

    let (status, json) = send_json(
        &app,
        Method::GET,
        &format!("/users/search?from=1889-01-01&to={today}"),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK, "body: {json}");
    assert_eq!(json["_embedded"]["userList"][0]["email"], "old@example.com");
}

#[tokio::test]
async fn test_search_rejects_inverted_range() {
    let app = create_test_app().unwrap();

    let (status, json) = send_json(
        &app,
        Method::GET,
        "/users/search?from=1990-12-31&to=1889-01-01",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["detail"], "Parameter 'from' must be less than 'to'");
    assert_eq!(json["instance"], "/users/search");
}

#[tokio::test]
async fn test_search_rejects_malformed_dates() {
    let app = create_test_app().unwrap();

    for uri in [
        "/users/search?from=01-01-1990&to=1991-01-01",
        "/users/search?from=1990-01-01",
        "/users/search",
    ] {
        let (status, json) = send_json(&app, Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "uri: {uri}");
        assert_eq!(json["message"], "Bad user request");
    }
}

#[tokio::test]
async fn test_malformed_requests_are_bad_requests() {
    let app = create_test_app().unwrap();

    let (status, json) = send_json(&app, Method::GET, "/users/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Bad user request");

    let req = http::Request::builder()
        .method(Method::POST)
        .uri("/users")
        .header("Content-Type", "application/json")
        .body(axum::body::Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unsupported_method() {
    let app = create_test_app().unwrap();

    let (status, json) = send_json(&app, Method::POST, "/users/1", Some(json!({}))).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(json["message"], "Method not allowed");
    assert_eq!(json["detail"], "Request method 'POST' is not supported");

    let (status, _) = send_json(&app, Method::DELETE, "/users", None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_nonexistent_route_returns_404() {
    let app = create_test_app().unwrap();

    let (status, json) = send_json(&app, Method::GET, "/nonexistent", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["instance"], "/nonexistent");
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app().unwrap();

    let (status, json) = send_json(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["database"], "ok");
}

#[tokio::test]
async fn test_configured_routes_drive_links() {
    let mut config = test_config();
    config.routes.users_path = "/api/people".to_string();
    config.links.base_url = "https://api.example.com".to_string();
    let app = routes::app(create_test_state(config).unwrap());

    let (status, headers, bytes) = send_request(
        &app,
        Method::POST,
        "/api/people",
        Some(user_json("test@example.com", "1990-01-01")),
    )
    .await;
    let json: Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(headers[header::LOCATION], "https://api.example.com/api/people/1");
    assert_eq!(json["_links"]["users"]["href"], "https://api.example.com/api/people");

    let (status, _) = send_json(&app, Method::GET, "/api/people/1", None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send_json(&app, Method::GET, "/users/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
