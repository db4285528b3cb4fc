use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use ebookd::config::Config;
use http_body_util::BodyExt;
use tower::ServiceExt;

const BOUNDARY: &str = "ebookd-test-boundary";

/// Credentials seeded by the startup bootstrap.
const ADMIN_USERNAME: &str = "admin";
const ADMIN_PASSWORD: &str = "admin123";

async fn spawn_app() -> (Router, tempfile::TempDir) {
    let upload_dir = tempfile::tempdir().expect("Failed to create temp upload dir");

    let mut config = Config::default();
    config.storage.database_url = "sqlite::memory:".to_string();
    config.storage.upload_dir = upload_dir.path().to_string_lossy().to_string();
    // A pooled in-memory SQLite database must stay on one connection.
    config.storage.max_db_connections = 1;
    config.storage.min_db_connections = 1;

    let state = ebookd::api::create_app_state_from_config(config)
        .await
        .expect("Failed to create app state");

    (ebookd::api::router(state), upload_dir)
}

async fn request_json(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }

    let request = match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_string(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };

    (status, json)
}

fn multipart_text(body: &mut Vec<u8>, name: &str, value: &str) {
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        )
        .as_bytes(),
    );
}

fn ebook_form(
    title: &str,
    author: &str,
    category: &str,
    file: Option<(&str, &str, &[u8])>,
) -> Vec<u8> {
    let mut body = Vec::new();
    multipart_text(&mut body, "title", title);
    multipart_text(&mut body, "author", author);
    multipart_text(&mut body, "category", category);

    if let Some((filename, content_type, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; \
                 filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

async fn send_multipart(
    app: &Router,
    method: &str,
    uri: &str,
    token: &str,
    body: Vec<u8>,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("Authorization", format!("Bearer {token}"))
        .header(
            "Content-Type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);

    (status, json)
}

async fn register(app: &Router, username: &str, password: &str, email: &str) -> StatusCode {
    let (status, _) = request_json(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(serde_json::json!({
            "username": username,
            "password": password,
            "email": email,
        })),
    )
    .await;
    status
}

async fn login(app: &Router, username: &str, password: &str) -> (String, i64) {
    let (status, body) = request_json(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(serde_json::json!({"username": username, "password": password})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let token = body["token"].as_str().expect("login returns token").to_string();
    let user_id = body["userId"].as_i64().expect("login returns userId");
    (token, user_id)
}

#[tokio::test]
async fn register_rejects_duplicates() {
    let (app, _upload_dir) = spawn_app().await;

    assert_eq!(
        register(&app, "alice", "pw123", "alice@x.com").await,
        StatusCode::CREATED
    );
    // same username
    assert_eq!(
        register(&app, "alice", "other", "alice2@x.com").await,
        StatusCode::BAD_REQUEST
    );
    // same email
    assert_eq!(
        register(&app, "alice2", "other", "alice@x.com").await,
        StatusCode::BAD_REQUEST
    );
}

#[tokio::test]
async fn login_verifies_credentials() {
    let (app, _upload_dir) = spawn_app().await;

    register(&app, "alice", "pw123", "alice@x.com").await;

    let (token, user_id) = login(&app, "alice", "pw123").await;
    assert!(user_id > 0);

    // the token maps back to the same user on a protected endpoint
    let (status, body) = request_json(&app, "GET", "/api/users/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice");
    assert_eq!(body["role"], "USER");
    assert!(body.get("password").is_none());
    assert!(body.get("passwordHash").is_none());

    let (status, _) = request_json(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(serde_json::json!({"username": "alice", "password": "wrong"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn protected_endpoints_require_valid_token() {
    let (app, _upload_dir) = spawn_app().await;

    let (status, _) = request_json(&app, "GET", "/api/ebooks", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) =
        request_json(&app, "GET", "/api/ebooks", Some("not-a-real-token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn non_pdf_upload_is_rejected_and_not_persisted() {
    let (app, _upload_dir) = spawn_app().await;

    register(&app, "alice", "pw123", "alice@x.com").await;
    let (token, _) = login(&app, "alice", "pw123").await;

    let form = ebook_form(
        "T",
        "A",
        "C",
        Some(("notes.txt", mime::TEXT_PLAIN.as_ref(), b"plain text")),
    );
    let (status, body) = send_multipart(&app, "POST", "/api/ebooks", &token, form).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("PDF"));

    let (status, body) = request_json(&app, "GET", "/api/ebooks", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn upload_and_download_roundtrip() {
    let (app, _upload_dir) = spawn_app().await;

    register(&app, "alice", "pw123", "alice@x.com").await;
    let (token, _) = login(&app, "alice", "pw123").await;

    let pdf = b"%PDF-1.4 fake content";
    let form = ebook_form(
        "My Book",
        "A",
        "C",
        Some(("book.pdf", mime::APPLICATION_PDF.as_ref(), pdf)),
    );
    let (status, body) = send_multipart(&app, "POST", "/api/ebooks", &token, form).await;
    assert_eq!(status, StatusCode::CREATED);

    let id = body["id"].as_i64().unwrap();
    let stored_name = body["filePath"].as_str().unwrap();
    // opaque generated name, not the uploaded one
    assert_ne!(stored_name, "book.pdf");
    assert!(stored_name.ends_with(".pdf"));

    let request = Request::builder()
        .uri(format!("/api/ebooks/{id}/download"))
        .header("Authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["Content-Type"].to_str().unwrap(),
        "application/pdf"
    );
    assert_eq!(
        response.headers()["Content-Disposition"].to_str().unwrap(),
        "attachment; filename=\"My Book.pdf\""
    );
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(bytes.as_ref(), pdf);
}

#[tokio::test]
async fn ebook_without_file_returns_404_on_download() {
    let (app, _upload_dir) = spawn_app().await;

    register(&app, "alice", "pw123", "alice@x.com").await;
    let (token, _) = login(&app, "alice", "pw123").await;

    let form = ebook_form("T", "A", "C", None);
    let (status, body) = send_multipart(&app, "POST", "/api/ebooks", &token, form).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_i64().unwrap();

    let (status, _) = request_json(
        &app,
        "GET",
        &format!("/api/ebooks/{id}/download"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn sections_sort_ascending_with_stable_ties() {
    let (app, _upload_dir) = spawn_app().await;

    register(&app, "alice", "pw123", "alice@x.com").await;
    let (token, _) = login(&app, "alice", "pw123").await;

    let form = ebook_form("T", "A", "C", None);
    let (_, body) = send_multipart(&app, "POST", "/api/ebooks", &token, form).await;
    let ebook_id = body["id"].as_i64().unwrap();

    for (title, order) in [("two", 2), ("one-a", 1), ("three", 3), ("one-b", 1)] {
        let (status, _) = request_json(
            &app,
            "POST",
            "/api/sections",
            Some(&token),
            Some(serde_json::json!({
                "title": title,
                "content": "text",
                "sectionOrder": order,
                "ebookId": ebook_id,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = request_json(
        &app,
        "GET",
        &format!("/api/sections/ebook/{ebook_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let titles: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["title"].as_str().unwrap())
        .collect();
    // ties (order 1) keep insertion order via the id tiebreak
    assert_eq!(titles, vec!["one-a", "one-b", "two", "three"]);
}

#[tokio::test]
async fn deleting_an_ebook_cascades_to_sections() {
    let (app, _upload_dir) = spawn_app().await;

    register(&app, "alice", "pw123", "alice@x.com").await;
    let (token, _) = login(&app, "alice", "pw123").await;
    let (admin_token, _) = login(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;

    let form = ebook_form("T", "A", "C", None);
    let (_, body) = send_multipart(&app, "POST", "/api/ebooks", &token, form).await;
    let ebook_id = body["id"].as_i64().unwrap();

    let (status, body) = request_json(
        &app,
        "POST",
        "/api/sections",
        Some(&token),
        Some(serde_json::json!({"title": "ch1", "sectionOrder": 1, "ebookId": ebook_id})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let section_id = body["id"].as_i64().unwrap();

    let (status, _) = request_json(
        &app,
        "DELETE",
        &format!("/api/ebooks/{ebook_id}"),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = request_json(
        &app,
        "GET",
        &format!("/api/sections/{section_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // deleting an ebook that never existed
    let (status, _) = request_json(
        &app,
        "DELETE",
        "/api/ebooks/99999",
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn search_is_case_insensitive_across_fields() {
    let (app, _upload_dir) = spawn_app().await;

    register(&app, "alice", "pw123", "alice@x.com").await;
    let (token, _) = login(&app, "alice", "pw123").await;

    let mut form = Vec::new();
    multipart_text(&mut form, "title", "Rust in Action");
    multipart_text(&mut form, "author", "T. McNamara");
    multipart_text(&mut form, "category", "Programming");
    multipart_text(&mut form, "description", "A great PDF about systems.");
    form.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    let (status, _) = send_multipart(&app, "POST", "/api/ebooks", &token, form).await;
    assert_eq!(status, StatusCode::CREATED);

    for keyword in ["pdf", "RUST", "programming", "mcnamara"] {
        let (status, body) = request_json(
            &app,
            "GET",
            &format!("/api/ebooks/search?keyword={keyword}"),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1, "keyword: {keyword}");
    }

    let (_, body) = request_json(
        &app,
        "GET",
        "/api/ebooks/search?keyword=nomatch",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn overlong_description_is_rejected() {
    let (app, _upload_dir) = spawn_app().await;

    register(&app, "alice", "pw123", "alice@x.com").await;
    let (token, _) = login(&app, "alice", "pw123").await;

    let mut form = Vec::new();
    multipart_text(&mut form, "title", "T");
    multipart_text(&mut form, "author", "A");
    multipart_text(&mut form, "category", "C");
    multipart_text(&mut form, "description", &"x".repeat(1001));
    form.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    let (status, body) = send_multipart(&app, "POST", "/api/ebooks", &token, form).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("1000"));

    let (_, body) = request_json(&app, "GET", "/api/ebooks", Some(&token), None).await;
    assert_eq!(body.as_array().unwrap().len(), 0);

    // exactly at the bound is accepted
    let mut form = Vec::new();
    multipart_text(&mut form, "title", "T");
    multipart_text(&mut form, "author", "A");
    multipart_text(&mut form, "category", "C");
    multipart_text(&mut form, "description", &"x".repeat(1000));
    form.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    let (status, _) = send_multipart(&app, "POST", "/api/ebooks", &token, form).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn search_treats_like_wildcards_literally() {
    let (app, _upload_dir) = spawn_app().await;

    register(&app, "alice", "pw123", "alice@x.com").await;
    let (token, _) = login(&app, "alice", "pw123").await;

    let mut form = Vec::new();
    multipart_text(&mut form, "title", "Plain Title");
    multipart_text(&mut form, "author", "A");
    multipart_text(&mut form, "category", "C");
    multipart_text(&mut form, "description", "100% cotton");
    form.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    let (status, _) = send_multipart(&app, "POST", "/api/ebooks", &token, form).await;
    assert_eq!(status, StatusCode::CREATED);

    // bare wildcards are not substrings of any field
    for keyword in ["%25", "___________"] {
        let (status, body) = request_json(
            &app,
            "GET",
            &format!("/api/ebooks/search?keyword={keyword}"),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 0, "keyword: {keyword}");
    }

    // a literal percent in the data still matches
    let (_, body) = request_json(
        &app,
        "GET",
        "/api/ebooks/search?keyword=100%25",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn updating_to_a_taken_email_is_rejected() {
    let (app, _upload_dir) = spawn_app().await;

    register(&app, "alice", "pw123", "alice@x.com").await;
    register(&app, "bob", "pw456", "bob@x.com").await;
    let (bob_token, bob_id) = login(&app, "bob", "pw456").await;

    let (status, body) = request_json(
        &app,
        "PUT",
        &format!("/api/users/{bob_id}"),
        Some(&bob_token),
        Some(serde_json::json!({"email": "alice@x.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("Email"));

    // keeping your own email is fine
    let (status, _) = request_json(
        &app,
        "PUT",
        &format!("/api/users/{bob_id}"),
        Some(&bob_token),
        Some(serde_json::json!({"email": "bob@x.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn only_the_owner_or_an_admin_may_update_an_ebook() {
    let (app, _upload_dir) = spawn_app().await;

    register(&app, "alice", "pw123", "alice@x.com").await;
    register(&app, "bob", "pw456", "bob@x.com").await;
    let (alice_token, _) = login(&app, "alice", "pw123").await;
    let (bob_token, _) = login(&app, "bob", "pw456").await;

    let form = ebook_form("T", "A", "C", None);
    let (_, body) = send_multipart(&app, "POST", "/api/ebooks", &alice_token, form).await;
    let id = body["id"].as_i64().unwrap();

    let form = ebook_form("Hijacked", "A", "C", None);
    let (status, _) =
        send_multipart(&app, "PUT", &format!("/api/ebooks/{id}"), &bob_token, form).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let form = ebook_form("Updated", "A2", "C2", None);
    let (status, body) =
        send_multipart(&app, "PUT", &format!("/api/ebooks/{id}"), &alice_token, form).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Updated");
    assert_eq!(body["author"], "A2");
    // absent optional fields are cleared on full replace
    assert!(body["description"].is_null());
}

#[tokio::test]
async fn full_lifecycle_with_admin_gated_delete() {
    let (app, _upload_dir) = spawn_app().await;

    // register alice
    assert_eq!(
        register(&app, "alice", "pw123", "alice@x.com").await,
        StatusCode::CREATED
    );

    // login alice
    let (alice_token, alice_id) = login(&app, "alice", "pw123").await;

    // create an ebook
    let form = ebook_form("T", "A", "C", None);
    let (status, body) = send_multipart(&app, "POST", "/api/ebooks", &alice_token, form).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_i64().unwrap();

    // read it back
    let (status, body) = request_json(
        &app,
        "GET",
        &format!("/api/ebooks/{id}"),
        Some(&alice_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "T");
    assert_eq!(body["author"], "A");
    assert_eq!(body["category"], "C");
    assert_eq!(body["userId"].as_i64().unwrap(), alice_id);

    // it shows up under my-ebooks
    let (_, body) = request_json(&app, "GET", "/api/ebooks/my-ebooks", Some(&alice_token), None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    // alice is not an admin, so DELETE is refused
    let (status, _) = request_json(
        &app,
        "DELETE",
        &format!("/api/ebooks/{id}"),
        Some(&alice_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // the bootstrapped admin can log in and delete
    let (admin_token, _) = login(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;
    let (status, body) = request_json(
        &app,
        "DELETE",
        &format!("/api/ebooks/{id}"),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Ebook deleted successfully");

    let (status, _) = request_json(
        &app,
        "GET",
        &format!("/api/ebooks/{id}"),
        Some(&alice_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn bulk_section_delete_is_a_noop_when_empty() {
    let (app, _upload_dir) = spawn_app().await;

    register(&app, "alice", "pw123", "alice@x.com").await;
    let (token, _) = login(&app, "alice", "pw123").await;

    let form = ebook_form("T", "A", "C", None);
    let (_, body) = send_multipart(&app, "POST", "/api/ebooks", &token, form).await;
    let ebook_id = body["id"].as_i64().unwrap();

    // no sections exist yet; still 200
    let (status, _) = request_json(
        &app,
        "DELETE",
        &format!("/api/sections/ebook/{ebook_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    for order in [1, 2] {
        request_json(
            &app,
            "POST",
            "/api/sections",
            Some(&token),
            Some(serde_json::json!({"title": "ch", "sectionOrder": order, "ebookId": ebook_id})),
        )
        .await;
    }

    let (status, _) = request_json(
        &app,
        "DELETE",
        &format!("/api/sections/ebook/{ebook_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = request_json(
        &app,
        "GET",
        &format!("/api/sections/ebook/{ebook_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn users_can_only_modify_their_own_account() {
    let (app, _upload_dir) = spawn_app().await;

    register(&app, "alice", "pw123", "alice@x.com").await;
    register(&app, "bob", "pw456", "bob@x.com").await;
    let (alice_token, alice_id) = login(&app, "alice", "pw123").await;
    let (bob_token, bob_id) = login(&app, "bob", "pw456").await;

    // bob cannot update alice
    let (status, _) = request_json(
        &app,
        "PUT",
        &format!("/api/users/{alice_id}"),
        Some(&bob_token),
        Some(serde_json::json!({"email": "evil@x.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // alice can update herself
    let (status, body) = request_json(
        &app,
        "PUT",
        &format!("/api/users/{alice_id}"),
        Some(&alice_token),
        Some(serde_json::json!({"email": "alice@new.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "alice@new.com");

    // bob can delete himself, after which his token no longer resolves
    let (status, _) = request_json(
        &app,
        "DELETE",
        &format!("/api/users/{bob_id}"),
        Some(&bob_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = request_json(&app, "GET", "/api/users/me", Some(&bob_token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
