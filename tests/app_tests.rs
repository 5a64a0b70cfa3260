use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use http_body_util::BodyExt;
use jokebox::config::Config;
use tower::ServiceExt;

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    // A single connection keeps the in-memory database alive and shared.
    config.general.max_db_connections = 1;
    config.general.min_db_connections = 1;
    config.session.secret = "integration-test-session-secret".to_string();
    config.server.secure_cookies = false;

    let state = jokebox::api::create_app_state(config, None)
        .await
        .expect("Failed to create app state");
    jokebox::api::router(state)
}

fn form_body(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn post_form(uri: &str, pairs: &[(&str, &str)], cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/x-www-form-urlencoded");

    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }

    builder.body(Body::from(form_body(pairs))).unwrap()
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);

    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }

    builder.body(Body::empty()).unwrap()
}

fn session_cookie(response: &Response<axum::body::Body>) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .expect("expected a Set-Cookie header")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

fn location(response: &Response<axum::body::Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .expect("expected a Location header")
        .to_str()
        .unwrap()
}

async fn body_string(response: Response<axum::body::Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8_lossy(&bytes).into_owned()
}

async fn register(app: &Router, username: &str, password: &str) -> String {
    let response = app
        .clone()
        .oneshot(post_form(
            "/login",
            &[
                ("loginType", "register"),
                ("username", username),
                ("password", password),
                ("redirectTo", "/jokes"),
            ],
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    session_cookie(&response)
}

async fn create_joke(app: &Router, cookie: &str, name: &str, content: &str) -> String {
    let response = app
        .clone()
        .oneshot(post_form(
            "/jokes/new",
            &[("name", name), ("content", content)],
            Some(cookie),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    location(&response).to_string()
}

#[tokio::test]
async fn test_register_issues_session_and_redirects() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(post_form(
            "/login",
            &[
                ("loginType", "register"),
                ("username", "kody"),
                ("password", "twixrox"),
                ("redirectTo", "/jokes"),
            ],
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/jokes");

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(set_cookie.starts_with("__session="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Lax"));
    assert!(set_cookie.contains("Path=/"));
    assert!(set_cookie.contains("Max-Age=86400"));
}

#[tokio::test]
async fn test_register_then_login_yields_same_identity() {
    let app = spawn_app().await;
    let cookie = register(&app, "alice", "password1").await;

    let response = app.clone().oneshot(get("/jokes", Some(&cookie))).await.unwrap();
    let body = body_string(response).await;
    assert!(body.contains("Hi, alice"));

    let response = app
        .clone()
        .oneshot(post_form(
            "/login",
            &[
                ("loginType", "login"),
                ("username", "alice"),
                ("password", "password1"),
                ("redirectTo", "/jokes"),
            ],
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    let login_cookie = session_cookie(&response);

    let response = app
        .clone()
        .oneshot(get("/jokes", Some(&login_cookie)))
        .await
        .unwrap();
    let body = body_string(response).await;
    assert!(body.contains("Hi, alice"));
}

#[tokio::test]
async fn test_login_wrong_password_fails() {
    let app = spawn_app().await;
    register(&app, "alice", "password1").await;

    let response = app
        .clone()
        .oneshot(post_form(
            "/login",
            &[
                ("loginType", "login"),
                ("username", "alice"),
                ("password", "wrong-password"),
                ("redirectTo", "/jokes"),
            ],
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_string(response).await;
    assert!(body.contains("Username or Password is incorrect"));
}

#[tokio::test]
async fn test_register_duplicate_username_rejected() {
    let app = spawn_app().await;
    register(&app, "alice", "password1").await;

    let response = app
        .clone()
        .oneshot(post_form(
            "/login",
            &[
                ("loginType", "register"),
                ("username", "alice"),
                ("password", "password2"),
                ("redirectTo", "/jokes"),
            ],
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_string(response).await;
    assert!(body.contains("Username is already in use"));
}

#[tokio::test]
async fn test_field_validation_preserves_input() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(post_form(
            "/login",
            &[
                ("loginType", "register"),
                ("username", "abc"),
                ("password", "twixrox"),
                ("redirectTo", "/jokes"),
            ],
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_string(response).await;
    assert!(body.contains("That username is too short"));
    assert!(body.contains(r#"value="abc""#));
}

#[tokio::test]
async fn test_unknown_login_type_rejected() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(post_form(
            "/login",
            &[
                ("loginType", "sudo"),
                ("username", "alice"),
                ("password", "password1"),
                ("redirectTo", "/jokes"),
            ],
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_string(response).await;
    assert!(body.contains("Invalid Login type"));
}

#[tokio::test]
async fn test_action_without_session_redirects_to_login() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(post_form(
            "/jokes/new",
            &[("name", "Chicken"), ("content", "Why did the chicken...")],
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/login?redirectTo=%2Fjokes%2Fnew");
}

#[tokio::test]
async fn test_new_joke_loader_without_session_is_unauthorized() {
    let app = spawn_app().await;

    let response = app.clone().oneshot(get("/jokes/new", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_string(response).await;
    assert!(body.contains("You must be logged in to create a joke."));
    assert!(body.contains(r#"<a href="/login">"#));
}

#[tokio::test]
async fn test_tampered_session_is_treated_as_logged_out() {
    let app = spawn_app().await;
    let cookie = register(&app, "alice", "password1").await;

    // Extend the token; the signature no longer matches.
    let tampered = format!("{cookie}xx");

    let response = app
        .clone()
        .oneshot(get("/jokes/new", Some(&tampered)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(get("/jokes/new", Some("__session=garbage")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_jokes_index_with_empty_store() {
    let app = spawn_app().await;

    let response = app.clone().oneshot(get("/jokes", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = body_string(response).await;
    assert!(body.contains("There are no jokes to display."));
}

#[tokio::test]
async fn test_joke_validation_errors_re_render_form() {
    let app = spawn_app().await;
    let cookie = register(&app, "alice", "password1").await;

    let response = app
        .clone()
        .oneshot(post_form(
            "/jokes/new",
            &[("name", "Chicken"), ("content", "too short")],
            Some(&cookie),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_string(response).await;
    assert!(body.contains("That joke is too short"));
    assert!(body.contains(r#"value="Chicken""#));
}

#[tokio::test]
async fn test_open_redirect_falls_back_to_jokes() {
    let app = spawn_app().await;

    for evil in ["https://evil.example/", "//evil.example", "/jokes/../admin"] {
        let response = app
            .clone()
            .oneshot(post_form(
                "/login",
                &[
                    ("loginType", "register"),
                    ("username", &format!("user{}", evil.len())),
                    ("password", "password1"),
                    ("redirectTo", evil),
                ],
                None,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/jokes");
    }
}

#[tokio::test]
async fn test_allowed_redirect_is_honored() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(post_form(
            "/login",
            &[
                ("loginType", "register"),
                ("username", "alice"),
                ("password", "password1"),
                ("redirectTo", "/jokes/new"),
            ],
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/jokes/new");
}

#[tokio::test]
async fn test_logout_clears_cookie_and_redirects_home() {
    let app = spawn_app().await;
    let cookie = register(&app, "alice", "password1").await;

    let response = app
        .clone()
        .oneshot(post_form("/logout", &[], Some(&cookie)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/");

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(set_cookie.starts_with("__session="));
    assert!(set_cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_joke_lifecycle_with_ownership() {
    let app = spawn_app().await;
    let alice = register(&app, "alice", "password1").await;

    let joke_path = create_joke(
        &app,
        &alice,
        "Chicken",
        "Why did the chicken cross the road? To get to the other side.",
    )
    .await;
    assert!(joke_path.starts_with("/jokes/"));

    // The joke renders for its author with a delete control
    let response = app
        .clone()
        .oneshot(get(&joke_path, Some(&alice)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("To get to the other side."));
    assert!(body.contains("delete"));

    // Anonymous viewers see the joke without the delete control
    let response = app.clone().oneshot(get(&joke_path, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(!body.contains("delete"));

    // A different user may not delete it, and the joke survives
    let bob = register(&app, "bobby", "password2").await;
    let response = app
        .clone()
        .oneshot(post_form(&joke_path, &[("intent", "delete")], Some(&bob)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.clone().oneshot(get(&joke_path, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Logged out, the delete attempt bounces to login with a return path
    let response = app
        .clone()
        .oneshot(post_form(&joke_path, &[("intent", "delete")], None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    let expected = format!("/login?redirectTo={}", urlencoding::encode(&joke_path));
    assert_eq!(location(&response), expected);

    // The author deletes it and lands back on the list
    let response = app
        .clone()
        .oneshot(post_form(&joke_path, &[("intent", "delete")], Some(&alice)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/jokes");

    let response = app.clone().oneshot(get(&joke_path, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_intent_is_rejected() {
    let app = spawn_app().await;
    let alice = register(&app, "alice", "password1").await;
    let joke_path = create_joke(
        &app,
        &alice,
        "Chicken",
        "Why did the chicken cross the road? To get to the other side.",
    )
    .await;

    let response = app
        .clone()
        .oneshot(post_form(&joke_path, &[("intent", "promote")], Some(&alice)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_deleting_missing_joke_is_not_found() {
    let app = spawn_app().await;
    let alice = register(&app, "alice", "password1").await;

    let response = app
        .clone()
        .oneshot(post_form("/jokes/9999", &[("intent", "delete")], Some(&alice)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_jokes_list_shows_recent_jokes() {
    let app = spawn_app().await;
    let alice = register(&app, "alice", "password1").await;

    create_joke(
        &app,
        &alice,
        "Chicken",
        "Why did the chicken cross the road? To get to the other side.",
    )
    .await;
    create_joke(
        &app,
        &alice,
        "Skeletons",
        "Why don't skeletons ride roller coasters? They don't have the stomach for it.",
    )
    .await;

    let response = app.clone().oneshot(get("/jokes", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_string(response).await;
    assert!(body.contains("Chicken"));
    assert!(body.contains("Skeletons"));
    assert!(body.contains("Here&#39;s a random joke:") || body.contains("Here's a random joke:"));
}

#[tokio::test]
async fn test_store_counts_and_pages_jokes() {
    use jokebox::config::SecurityConfig;
    use jokebox::db::Store;

    let store = Store::with_pool_options("sqlite::memory:", 1, 1)
        .await
        .unwrap();

    assert_eq!(store.count_jokes().await.unwrap(), 0);
    assert!(store.random_joke().await.unwrap().is_none());

    let security = SecurityConfig {
        argon2_memory_cost_kib: 64,
        argon2_time_cost: 1,
        argon2_parallelism: 1,
    };
    let user = store
        .create_user("alice", "password1", &security)
        .await
        .unwrap();

    let first = store
        .create_joke(user.id, "First", "The first joke ever told.")
        .await
        .unwrap();
    let second = store
        .create_joke(user.id, "Second", "The second joke ever told.")
        .await
        .unwrap();

    assert_eq!(store.count_jokes().await.unwrap(), 2);

    // Newest first
    let page = store.list_jokes_page(0, 5).await.unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].id, second.id);
    assert_eq!(page[1].id, first.id);

    let page = store.list_jokes_page(0, 1).await.unwrap();
    assert_eq!(page.len(), 1);

    assert!(store.delete_joke(first.id).await.unwrap());
    assert!(!store.delete_joke(first.id).await.unwrap());
    assert_eq!(store.count_jokes().await.unwrap(), 1);
}

#[tokio::test]
async fn test_missing_joke_is_not_found() {
    let app = spawn_app().await;

    let response = app.clone().oneshot(get("/jokes/424242", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = body_string(response).await;
    assert!(body.contains("What the heck"));
}
