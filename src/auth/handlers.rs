use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, TokenResponse},
        jwt::JwtKeys,
    },
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/auth/login", post(login))
}

fn invalid_credentials() -> (StatusCode, String) {
    (StatusCode::UNAUTHORIZED, "Invalid credentials".into())
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, (StatusCode, String)> {
    let username = payload.username.trim();

    let user = match state.users.check_credentials(username, &payload.password).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            warn!(%username, "login invalid credentials");
            return Err(invalid_credentials());
        }
        Err(e) => {
            error!(error = %e, "check_credentials failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".into()));
        }
    };

    if !user.is_active {
        warn!(user_id = user.id, "login on inactive account");
        return Err(invalid_credentials());
    }

    let keys = JwtKeys::from_ref(&state);
    let access_token = keys.sign_access(user.id).map_err(|e| {
        error!(error = %e, "jwt sign access failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
    })?;

    info!(user_id = user.id, username = %user.username, "user logged in");
    Ok(Json(TokenResponse {
        access_token,
        token_type: "Bearer",
        expires_in: keys.access_ttl.as_secs(),
    }))
}
