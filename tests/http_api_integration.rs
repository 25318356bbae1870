// Integration tests for the HTTP surface. Each test spins up the real
// route table over in-memory storage; the success path of the LinkedIn
// flow runs against a local mock of the provider's token and userinfo
// endpoints.

mod common;

use std::sync::Arc;

use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App, HttpResponse, HttpServer};
use serde_json::json;

use linkup_server::server::app_state::AppState;
use linkup_server::server::startup::configure_routes;
use linkup_server::storage::memory::MemoryStorage;

use common::{app_state_with_memory, test_config, verified_identity};

/// Stand-in for LinkedIn: serves a canned code exchange and userinfo
/// response on an ephemeral local port
async fn spawn_mock_provider() -> std::net::SocketAddr {
    let server = HttpServer::new(|| {
        App::new()
            .route(
                "/token",
                web::post().to(|| async {
                    HttpResponse::Ok().json(json!({
                        "access_token": "mock-access-token",
                        "expires_in": 3600,
                    }))
                }),
            )
            .route(
                "/userinfo",
                web::get().to(|| async {
                    HttpResponse::Ok().json(json!({
                        "sub": "li-member-1",
                        "email": "ada@example.com",
                        "given_name": "Ada",
                        "family_name": "Lovelace",
                        "picture": "https://media.example.com/ada.jpg",
                    }))
                }),
            )
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .unwrap();

    let addr = server.addrs()[0];
    actix_web::rt::spawn(server.run());
    addr
}

#[actix_web::test]
async fn health_returns_healthy() {
    let state = app_state_with_memory();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "healthy");
    assert!(body["version"].is_string());
}

#[actix_web::test]
async fn readiness_reports_database() {
    let state = app_state_with_memory();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::get().uri("/health/ready").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ready");
    assert_eq!(body["dependencies"]["database"], true);
}

#[actix_web::test]
async fn api_index_lists_endpoints() {
    let state = app_state_with_memory();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::get().uri("/api").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["name"], "Linkup Server");
    assert!(body["endpoints"].is_object());
}

#[actix_web::test]
async fn login_redirects_to_provider() {
    let state = app_state_with_memory();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::get().uri("/auth/linkedin").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);

    let location = resp
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(location.starts_with("https://www.linkedin.com/oauth/v2/authorization"));
    assert!(location.contains("response_type=code"));
    assert!(location.contains("scope=openid%20profile%20email"));
    assert!(location.contains("state="));
}

#[actix_web::test]
async fn callback_success_redirects_with_token() {
    let provider = spawn_mock_provider().await;

    let mut config = test_config();
    config.linkedin.client_id = "test-client".to_string();
    config.linkedin.client_secret = "test-secret".to_string();
    config.linkedin.token_url = format!("http://{}/token", provider);
    config.linkedin.userinfo_url = format!("http://{}/userinfo", provider);
    let frontend = config.server.frontend_url.clone();

    let state = AppState::with_storage(config, Arc::new(MemoryStorage::new()));
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state.clone()))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/auth/linkedin/callback?code=mock-code&state=abc123")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);

    let location = resp
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap();
    let prefix = format!("{}/auth/callback?token=", frontend);
    assert!(
        location.starts_with(&prefix),
        "unexpected redirect: {}",
        location
    );
    assert!(location.ends_with("&success=true"));

    // The token in the redirect is backed by a live session, and the
    // account was registered from the mocked userinfo
    let token = location
        .strip_prefix(&prefix)
        .unwrap()
        .strip_suffix("&success=true")
        .unwrap();
    let header = format!("Bearer {}", token);
    let ctx = state.authority.authenticate(Some(&header)).await.unwrap();
    assert_eq!(ctx.email, "ada@example.com");

    let account = state
        .storage
        .get_account_by_email("ada@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(ctx.account_id, account.id);

    let linked = state
        .storage
        .get_linked_profile(&account.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(linked.provider_id, "li-member-1");
    assert_eq!(linked.first_name, "Ada");
}

#[actix_web::test]
async fn callback_error_redirects_to_frontend() {
    let state = app_state_with_memory();
    let frontend = test_config().server.frontend_url;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/auth/linkedin/callback?error=user_cancelled_authorize")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);

    let location = resp
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap();
    assert_eq!(
        location,
        format!("{}/auth/callback?error=oauth_failed&success=false", frontend)
    );
}

#[actix_web::test]
async fn callback_without_code_redirects_to_frontend() {
    let state = app_state_with_memory();
    let frontend = test_config().server.frontend_url;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/auth/linkedin/callback")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);

    let location = resp
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap();
    assert_eq!(
        location,
        format!("{}/auth/callback?error=oauth_failed&success=false", frontend)
    );
}

#[actix_web::test]
async fn me_without_token_is_unauthorized() {
    let state = app_state_with_memory();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::get().uri("/auth/me").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Access token required");
    assert!(body["message"].is_string());
}

#[actix_web::test]
async fn me_with_garbage_token_is_unauthorized() {
    let state = app_state_with_memory();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/auth/me")
        .insert_header((header::AUTHORIZATION, "Bearer not-a-jwt"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Invalid token");
}

#[actix_web::test]
async fn me_returns_user_payload() {
    let state = app_state_with_memory();
    let (account, token) = state
        .authority
        .complete_login(&verified_identity("ada@example.com"))
        .await
        .unwrap();

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/auth/me")
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);

    let user = &body["user"];
    assert_eq!(user["id"], account.id.as_str());
    assert_eq!(user["email"], "ada@example.com");
    assert_eq!(user["verified"], true);
    assert_eq!(user["subscriptionTier"], "free");
    assert!(user["createdAt"].is_string());

    assert_eq!(user["linkedinProfile"]["firstName"], "Ada");
    assert_eq!(user["linkedinProfile"]["lastName"], "Lovelace");
    assert_eq!(
        user["linkedinProfile"]["headline"],
        "Analytical Engine Programmer"
    );

    assert_eq!(user["datingProfile"]["complete"], false);
    assert_eq!(user["datingProfile"]["visible"], false);
}

#[actix_web::test]
async fn logout_then_me_is_revoked() {
    let state = app_state_with_memory();
    let (_, token) = state
        .authority
        .complete_login(&verified_identity("ada@example.com"))
        .await
        .unwrap();

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/auth/logout")
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Logged out successfully");

    let req = test::TestRequest::get()
        .uri("/auth/me")
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Token has been revoked");
}

#[actix_web::test]
async fn delete_account_then_me_is_session_invalid() {
    let state = app_state_with_memory();
    let (_, token) = state
        .authority
        .complete_login(&verified_identity("ada@example.com"))
        .await
        .unwrap();

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::delete()
        .uri("/auth/account")
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Account deactivated successfully");

    let req = test::TestRequest::get()
        .uri("/auth/me")
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Invalid or expired session");
}
