//! Health check, fallback routing, request parsing and security headers

mod common;

use actix_web::{http::header, test};
use serde_json::Value;

use common::{init_app, register, test_config};
use nl_shared::config::Environment;

#[actix_web::test]
async fn test_health_check() {
    let app = init_app(test_config()).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "healthy");
    assert!(body["version"].is_string());
    assert!(body["timestamp"].is_string());
}

#[actix_web::test]
async fn test_unknown_route_is_json_404() {
    let app = init_app(test_config()).await;

    let req = test::TestRequest::get().uri("/api/v1/does-not-exist").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "not_found");
}

#[actix_web::test]
async fn test_malformed_json_is_bad_request() {
    let app = init_app(test_config()).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{\"email\": ")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "bad_request");
}

#[actix_web::test]
async fn test_malformed_path_id_is_bad_request() {
    let app = init_app(test_config()).await;
    let session = register(&app, "path@example.com").await;

    let req = session
        .request(test::TestRequest::get().uri("/api/v1/health-metrics/not-a-uuid"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn test_security_headers_are_present() {
    let app = init_app(test_config()).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;

    let headers = resp.headers();
    assert_eq!(headers.get(header::X_CONTENT_TYPE_OPTIONS).unwrap(), "nosniff");
    assert_eq!(headers.get(header::X_FRAME_OPTIONS).unwrap(), "DENY");
    assert!(headers.get(header::CONTENT_SECURITY_POLICY).is_some());
    assert!(headers.get("permissions-policy").is_some());
    // No HSTS outside production
    assert!(headers.get(header::STRICT_TRANSPORT_SECURITY).is_none());
}

#[actix_web::test]
async fn test_security_headers_on_rejected_requests() {
    let app = init_app(test_config()).await;

    let req = test::TestRequest::get().uri("/api/v1/auth/me").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
    assert_eq!(resp.headers().get(header::X_FRAME_OPTIONS).unwrap(), "DENY");
}

#[actix_web::test]
async fn test_production_requires_https() {
    let mut config = test_config();
    config.environment = Environment::Production;
    config.auth.jwt.secret = "p".repeat(48);
    config.cors.allowed_origins = vec!["https://app.nutrilog.io".to_string()];
    config.server.trusted_proxies = vec!["10.0.0.1".to_string()];
    let app = init_app(config).await;

    let req = test::TestRequest::get()
        .uri("/health")
        .insert_header((header::HOST, "api.nutrilog.io"))
        .peer_addr("192.0.2.50:40000".parse().unwrap())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 403);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "https_required");

    // Forwarded as https by a trusted proxy
    let req = test::TestRequest::get()
        .uri("/health")
        .insert_header((header::HOST, "api.nutrilog.io"))
        .insert_header(("X-Forwarded-Proto", "https"))
        .peer_addr("10.0.0.1:40000".parse().unwrap())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    assert!(resp.headers().get(header::STRICT_TRANSPORT_SECURITY).is_some());

    // The same header from an untrusted peer does not count
    let req = test::TestRequest::get()
        .uri("/health")
        .insert_header((header::HOST, "api.nutrilog.io"))
        .insert_header(("X-Forwarded-Proto", "https"))
        .peer_addr("192.0.2.50:40000".parse().unwrap())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 403);
}

#[actix_web::test]
async fn test_malformed_origin_is_rejected() {
    let app = init_app(test_config()).await;

    let req = test::TestRequest::get()
        .uri("/health")
        .insert_header((header::ORIGIN, "not-an-origin"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}
