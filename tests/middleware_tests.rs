mod common;

use axum::http::StatusCode;
use common::{
    body_string, create_test_app, extract_set_cookies, has_cleared_cookie, location, page_request,
    test_config, unreachable_url,
};
use pongarcadia::create_app;
use serde_json::json;
use tower::ServiceExt;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn expect_no_backend_calls(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/auth/token/refresh"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/auth/token/verify"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_protected_route_without_cookies_redirects_to_landing() {
    let server = MockServer::start().await;
    expect_no_backend_calls(&server).await;
    let app = create_test_app(&server);

    // Same request twice: the decision depends only on the request.
    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(page_request("/dashboard", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location(&response), Some("/"));
        assert!(extract_set_cookies(&response).is_empty());
    }
}

#[tokio::test]
async fn test_unprotected_route_without_cookies_is_served() {
    let server = MockServer::start().await;
    expect_no_backend_calls(&server).await;
    let app = create_test_app(&server);

    let response = app.oneshot(page_request("/", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("data-page=\"home\""));
}

#[tokio::test]
async fn test_refresh_cookie_on_landing_redirects_to_dashboard() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/token/refresh"))
        .and(header("cookie", "refreshToken=r1"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "accessToken=fresh; HttpOnly; Path=/")
                .set_body_json(json!({ "success": true })),
        )
        .expect(1)
        .mount(&server)
        .await;
    let app = create_test_app(&server);

    let response = app
        .oneshot(page_request("/", Some("refreshToken=r1")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), Some("/dashboard"));
    let cookies = extract_set_cookies(&response);
    assert!(cookies.iter().any(|c| c.starts_with("accessToken=fresh")));
    assert!(!has_cleared_cookie(&cookies, "refreshToken"));
}

#[tokio::test]
async fn test_access_cookie_on_landing_redirects_to_dashboard() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/token/verify"))
        .and(header("authorization", "Bearer a1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/token/refresh"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let app = create_test_app(&server);

    let response = app
        .oneshot(page_request("/", Some("accessToken=a1; refreshToken=r1")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), Some("/dashboard"));
}

#[tokio::test]
async fn test_verified_session_serves_protected_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/token/verify"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;
    let app = create_test_app(&server);

    let response = app
        .oneshot(page_request("/dashboard", Some("accessToken=a1")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("data-page=\"dashboard\""));
}

#[tokio::test]
async fn test_refreshed_session_serves_protected_page_with_new_cookie() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/token/refresh"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "accessToken=fresh; HttpOnly; Path=/"),
        )
        .expect(1)
        .mount(&server)
        .await;
    let app = create_test_app(&server);

    let response = app
        .oneshot(page_request("/dashboard", Some("refreshToken=r1")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let cookies = extract_set_cookies(&response);
    assert!(cookies.iter().any(|c| c.starts_with("accessToken=fresh")));
    assert!(body_string(response).await.contains("data-page=\"dashboard\""));
}

/// Verify endpoint bouncing to a login page that itself answers 200.
async fn mount_login_redirect(server: &MockServer, verb: &str, endpoint: &str) {
    Mock::given(method(verb))
        .and(path(endpoint))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/login"))
        .expect(1)
        .mount(server)
        .await;
    Mock::given(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .expect(0)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_redirecting_verify_is_a_rejection() {
    let server = MockServer::start().await;
    mount_login_redirect(&server, "GET", "/auth/token/verify").await;
    let app = create_test_app(&server);

    let response = app
        .oneshot(page_request("/dashboard", Some("accessToken=expired")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), Some("/"));
    let cookies = extract_set_cookies(&response);
    assert!(has_cleared_cookie(&cookies, "accessToken"));
    assert!(has_cleared_cookie(&cookies, "refreshToken"));
}

#[tokio::test]
async fn test_redirecting_refresh_is_a_rejection() {
    let server = MockServer::start().await;
    mount_login_redirect(&server, "POST", "/auth/token/refresh").await;
    let app = create_test_app(&server);

    let response = app
        .oneshot(page_request("/", Some("refreshToken=stale")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), Some("/"));
    assert!(has_cleared_cookie(&extract_set_cookies(&response), "refreshToken"));
}

#[tokio::test]
async fn test_unreachable_backend_clears_cookies() {
    let config = test_config(&unreachable_url().await);
    let app = create_app(&config).unwrap();

    let response = app
        .oneshot(page_request("/dashboard", Some("accessToken=a1; refreshToken=r1")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), Some("/"));
    let cookies = extract_set_cookies(&response);
    assert!(has_cleared_cookie(&cookies, "accessToken"));
    assert!(has_cleared_cookie(&cookies, "refreshToken"));
}

#[tokio::test]
async fn test_rejected_refresh_clears_cookies() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/token/refresh"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    let app = create_test_app(&server);

    let response = app
        .oneshot(page_request("/friends", Some("refreshToken=stale")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), Some("/"));
    let cookies = extract_set_cookies(&response);
    assert!(has_cleared_cookie(&cookies, "accessToken"));
    assert!(has_cleared_cookie(&cookies, "refreshToken"));
}

#[tokio::test]
async fn test_success_false_body_is_not_a_confirmation() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/token/verify"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": false })))
        .mount(&server)
        .await;
    let app = create_test_app(&server);

    let response = app
        .oneshot(page_request("/dashboard", Some("accessToken=a1")))
        .await
        .unwrap();

    assert_eq!(location(&response), Some("/"));
    assert!(has_cleared_cookie(&extract_set_cookies(&response), "accessToken"));
}

#[tokio::test]
async fn test_rejected_session_on_unprotected_route_redirects_to_landing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/token/verify"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    let app = create_test_app(&server);

    let response = app
        .oneshot(page_request("/auth/callback", Some("accessToken=old")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), Some("/"));
    assert!(has_cleared_cookie(&extract_set_cookies(&response), "refreshToken"));
}

#[tokio::test]
async fn test_bypassed_paths_skip_session_checks() {
    let server = MockServer::start().await;
    expect_no_backend_calls(&server).await;
    let app = create_test_app(&server);

    let response = app
        .oneshot(page_request("/healthz", Some("accessToken=a1")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ok");
}

#[tokio::test]
async fn test_unknown_route_is_protected() {
    let server = MockServer::start().await;
    expect_no_backend_calls(&server).await;
    let app = create_test_app(&server);

    let response = app
        .clone()
        .oneshot(page_request("/no-such-page", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), Some("/"));
}

#[tokio::test]
async fn test_unknown_route_with_session_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/token/verify"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    let app = create_test_app(&server);

    let response = app
        .oneshot(page_request("/no-such-page", Some("accessToken=a1")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
