use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use super::dto::{CreateUserRequest, LookupQuery, UpdateUserRequest};
use super::error::UserError;
use super::repo_types::User;
use crate::{auth::jwt::AuthUser, state::AppState};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user).get(list_users))
        .route("/users/lookup", get(lookup_user))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
}

pub(crate) fn parse_id(raw: &str) -> Result<i32, UserError> {
    raw.trim()
        .parse::<i32>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| UserError::InvalidId(raw.to_string()))
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn normalize_username(raw: String) -> Result<String, UserError> {
    let username = raw.trim().to_string();
    if username.is_empty() {
        return Err(UserError::Validation("username is required".into()));
    }
    Ok(username)
}

fn check_password(password: &str) -> Result<(), UserError> {
    if password.is_empty() {
        return Err(UserError::Validation("password is required".into()));
    }
    Ok(())
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Json(mut payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), UserError> {
    payload.username = normalize_username(payload.username)?;
    check_password(&payload.password)?;
    if let Some(email) = payload.email.take() {
        let email = email.trim().to_lowercase();
        if !is_valid_email(&email) {
            warn!(%email, "invalid email");
            return Err(UserError::Validation("invalid email".into()));
        }
        payload.email = Some(email);
    }

    let user = state.users.create(payload.into()).await?;
    info!(user_id = user.id, caller, "user created via api");
    Ok((StatusCode::CREATED, Json(user)))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
) -> Result<Json<Vec<User>>, UserError> {
    Ok(Json(state.users.find_all().await?))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<User>, UserError> {
    let id = parse_id(&id)?;
    Ok(Json(state.users.find_one(id).await?))
}

/// GET /users/lookup?username=… or ?email=…
#[instrument(skip(state))]
pub async fn lookup_user(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    Query(q): Query<LookupQuery>,
) -> Result<Json<User>, UserError> {
    let found = match (q.username.as_deref(), q.email.as_deref()) {
        (Some(username), _) => state.users.find_by_username(username.trim()).await?,
        (None, Some(email)) => {
            state
                .users
                .find_by_email(&email.trim().to_lowercase())
                .await?
        }
        (None, None) => {
            return Err(UserError::Validation(
                "username or email is required".into(),
            ))
        }
    };
    found.map(Json).ok_or(UserError::NoMatch)
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
    Json(mut payload): Json<UpdateUserRequest>,
) -> Result<Json<User>, UserError> {
    let id = parse_id(&id)?;
    if let Some(username) = payload.username.take() {
        payload.username = Some(normalize_username(username)?);
    }
    if let Some(password) = &payload.password {
        check_password(password)?;
    }

    let user = state.users.update(id, payload.into()).await?;
    info!(user_id = id, caller, "user updated via api");
    Ok(Json(user))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, UserError> {
    let id = parse_id(&id)?;
    state.users.remove(id).await?;
    info!(user_id = id, caller, "user deleted via api");
    Ok(StatusCode::NO_CONTENT)
}
