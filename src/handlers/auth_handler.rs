use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse, Result as ActixResult};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, info};

use crate::auth::token::generate_state_token;
use crate::auth::AuthError;
use crate::error::AppError;
use crate::models::{Account, AppProfile, AuthContext, LinkedProfile};
use crate::server::app_state::AppState;

/// Query parameters LinkedIn appends to the redirect URI
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Pull the raw Authorization header out of a request
fn auth_header(req: &HttpRequest) -> Option<&str> {
    req.headers().get(header::AUTHORIZATION)?.to_str().ok()
}

/// Redirect helper for the OAuth flow
fn found(location: String) -> HttpResponse {
    HttpResponse::Found()
        .append_header((header::LOCATION, location))
        .finish()
}

/// Send the browser back to the frontend error page
fn failure_redirect(state: &AppState) -> HttpResponse {
    found(format!(
        "{}/auth/callback?error=oauth_failed&success=false",
        state.config.server.frontend_url
    ))
}

/// Begin the login flow by redirecting to the LinkedIn authorization page
pub async fn linkedin_login(state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    let url = state.linkedin.authorize_url(&generate_state_token());
    debug!("Redirecting to LinkedIn authorization page");
    Ok(found(url))
}

/// Complete the login flow: exchange the code, upsert the account, mint a
/// token and hand the browser back to the frontend. Failures redirect to
/// the frontend error page; the browser never sees a JSON error here.
pub async fn linkedin_callback(
    query: web::Query<CallbackQuery>,
    state: web::Data<AppState>,
) -> ActixResult<HttpResponse> {
    if let Some(error) = &query.error {
        info!("LinkedIn callback returned error: {}", error);
        return Ok(failure_redirect(&state));
    }

    let code = match query.code.as_deref() {
        Some(code) if !code.is_empty() => code,
        _ => {
            info!("LinkedIn callback without authorization code");
            return Ok(failure_redirect(&state));
        }
    };

    let identity = match state.linkedin.exchange_code(code).await {
        Ok(identity) => identity,
        Err(e) => {
            error!("LinkedIn code exchange failed: {}", e);
            return Ok(failure_redirect(&state));
        }
    };

    match state.authority.complete_login(&identity).await {
        Ok((account, token)) => {
            info!(account_id = %account.id, "Login completed");
            Ok(found(format!(
                "{}/auth/callback?token={}&success=true",
                state.config.server.frontend_url, token
            )))
        }
        Err(e) => {
            error!("Login completion failed: {}", e);
            Ok(failure_redirect(&state))
        }
    }
}

/// Return the authenticated account together with both profiles
pub async fn me(req: HttpRequest, state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    let ctx = authenticate(&req, &state).await?;

    let account = state
        .storage
        .get_account_by_id(&ctx.account_id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::from(AuthError::SessionInvalid))?;
    let linked = state
        .storage
        .get_linked_profile(&ctx.account_id)
        .await
        .map_err(AppError::from)?;
    let app_profile = state
        .storage
        .get_app_profile(&ctx.account_id)
        .await
        .map_err(AppError::from)?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "user": user_payload(&account, linked.as_ref(), app_profile.as_ref()),
    })))
}

/// Revoke the presented token and deactivate its sessions
pub async fn logout(req: HttpRequest, state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    let ctx = authenticate(&req, &state).await?;
    state.authority.logout(&ctx).await.map_err(AppError::from)?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Logged out successfully",
    })))
}

/// Deactivate the authenticated account and end all of its sessions
pub async fn delete_account(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> ActixResult<HttpResponse> {
    let ctx = authenticate(&req, &state).await?;
    state
        .authority
        .deactivate_account(&ctx)
        .await
        .map_err(AppError::from)?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Account deactivated successfully",
    })))
}

/// Run the full token check chain for a request
async fn authenticate(req: &HttpRequest, state: &AppState) -> Result<AuthContext, AppError> {
    let ctx = state.authority.authenticate(auth_header(req)).await?;
    Ok(ctx)
}

/// Shape the account and profiles the way the frontend expects them
fn user_payload(
    account: &Account,
    linked: Option<&LinkedProfile>,
    app_profile: Option<&AppProfile>,
) -> serde_json::Value {
    let linkedin_profile = linked.map(|p| {
        json!({
            "firstName": p.first_name,
            "lastName": p.last_name,
            "pictureUrl": p.picture_url,
            "headline": p.headline,
            "summary": p.summary,
            "industry": p.industry,
            "location": p.location,
            "publicProfileUrl": p.public_profile_url,
            "syncedAt": p.synced_at.to_rfc3339(),
        })
    });
    let dating_profile = app_profile.map(|p| {
        json!({
            "bio": p.bio,
            "age": p.age,
            "gender": p.gender,
            "interests": p.interests,
            "complete": p.complete,
            "visible": p.visible,
        })
    });

    json!({
        "id": account.id,
        "email": account.email,
        "verified": account.verified,
        "subscriptionTier": account.subscription_tier,
        "createdAt": account.created_at.to_rfc3339(),
        "linkedinProfile": linkedin_profile,
        "datingProfile": dating_profile,
    })
}
