use actix_web::{web, HttpResponse, Result as ActixResult};
use serde_json::json;

use crate::server::app_state::AppState;

/// HTTP health check endpoint
pub async fn health_check() -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339()
    })))
}

/// HTTP readiness check endpoint, verifies the storage backend answers
pub async fn readiness_check(state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    let storage_ok = state.storage.health_check().await.is_ok();

    let status = if storage_ok { "ready" } else { "degraded" };
    let body = json!({
        "status": status,
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "dependencies": {
            "database": storage_ok
        }
    });

    if storage_ok {
        Ok(HttpResponse::Ok().json(body))
    } else {
        Ok(HttpResponse::ServiceUnavailable().json(body))
    }
}
