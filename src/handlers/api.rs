//! API handlers for service information

use actix_web::{HttpResponse, Result};
use serde_json::json;

/// Service index with the available endpoints
pub async fn api_index() -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(json!({
        "name": "Linkup Server",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Session authority for LinkedIn-verified dating accounts",
        "endpoints": {
            "login": "GET /auth/linkedin",
            "callback": "GET /auth/linkedin/callback",
            "me": "GET /auth/me",
            "logout": "POST /auth/logout",
            "deleteAccount": "DELETE /auth/account",
            "health": "GET /health",
            "readiness": "GET /health/ready"
        }
    })))
}
