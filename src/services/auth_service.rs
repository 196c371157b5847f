//! Account lifecycle: registration, credential and guest login, and token
//! refresh.

use rand::Rng;
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::{
    auth::{self, TokenKind},
    dao::models::{NewPlayer, PlayerEntity},
    dto::auth::{AuthResponse, LoginRequest, RefreshRequest, RegisterRequest},
    error::{AppError, ServiceError},
    state::SharedState,
};

/// Create a credentialed account and issue its first token pair.
pub async fn register(
    state: &SharedState,
    request: RegisterRequest,
) -> Result<AuthResponse, AppError> {
    let store = state.require_data_store().await?;

    let password_hash = hash_password(state, request.password).await?;
    let player = store
        .create_player(NewPlayer {
            username: request.username,
            email: Some(request.email.to_lowercase()),
            password_hash: Some(password_hash),
            is_guest: false,
            starting_skin: state.config().default_skin.clone(),
            now: OffsetDateTime::now_utc(),
        })
        .await
        .map_err(|err| match ServiceError::from(err) {
            ServiceError::Conflict(_) => {
                AppError::Conflict("email is already registered".into())
            }
            other => other.into(),
        })?;

    info!(player = %player.id, "registered new player");
    issue_response(state, player)
}

/// Log in with email and password, or mint an anonymous guest account when
/// `isGuest` is set.
pub async fn login(state: &SharedState, request: LoginRequest) -> Result<AuthResponse, AppError> {
    if request.is_guest {
        return guest_login(state).await;
    }

    let (email, password) = match (request.email, request.password) {
        (Some(email), Some(password)) => (email, password),
        _ => {
            return Err(AppError::BadRequest(
                "email and password are required unless isGuest is set".into(),
            ));
        }
    };

    let store = state.require_data_store().await?;
    let player = store
        .find_player_by_email(email.to_lowercase())
        .await?
        .ok_or_else(|| AppError::Unauthorized("invalid credentials".into()))?;

    // Guest rows carry no hash and can never be logged into directly.
    let hash = player
        .password_hash
        .clone()
        .ok_or_else(|| AppError::Unauthorized("invalid credentials".into()))?;
    if !verify_password(password, hash).await? {
        return Err(AppError::Unauthorized("invalid credentials".into()));
    }

    store
        .record_login(player.id, OffsetDateTime::now_utc())
        .await?;

    info!(player = %player.id, "player logged in");
    issue_response(state, player)
}

/// Create a durable guest account with a generated display name.
async fn guest_login(state: &SharedState) -> Result<AuthResponse, AppError> {
    let store = state.require_data_store().await?;

    let suffix: u16 = rand::rng().random_range(1000..10000);
    let player = store
        .create_player(NewPlayer {
            username: format!("Guest {suffix}"),
            email: None,
            password_hash: None,
            is_guest: true,
            starting_skin: state.config().default_skin.clone(),
            now: OffsetDateTime::now_utc(),
        })
        .await?;

    info!(player = %player.id, "created guest player");
    issue_response(state, player)
}

/// Exchange a valid refresh token for a fresh token pair.
pub async fn refresh(
    state: &SharedState,
    request: RefreshRequest,
) -> Result<crate::dto::auth::RefreshResponse, AppError> {
    let claims = auth::verify(
        &request.refresh_token,
        &state.config().jwt_refresh_secret,
        TokenKind::Refresh,
    )?;

    // The player must still exist; refresh dies with the account.
    let store = state.require_data_store().await?;
    let player = store
        .find_player(claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthorized("unknown player".into()))?;

    let tokens = issue_tokens(state, player.id)?;
    Ok(tokens.into())
}

fn issue_response(state: &SharedState, player: PlayerEntity) -> Result<AuthResponse, AppError> {
    let tokens = issue_tokens(state, player.id)?;
    Ok(AuthResponse::new(player, tokens))
}

fn issue_tokens(state: &SharedState, player_id: Uuid) -> Result<auth::TokenPair, AppError> {
    auth::issue_pair(state.config(), player_id, OffsetDateTime::now_utc())
        .map_err(|err| ServiceError::Internal(format!("token signing failed: {err}")).into())
}

/// Bcrypt is CPU-bound; keep it off the async executor threads.
async fn hash_password(state: &SharedState, password: String) -> Result<String, AppError> {
    let cost = state.config().bcrypt_cost;
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|err| AppError::from(ServiceError::Internal(format!("hash task failed: {err}"))))?
        .map_err(|err| ServiceError::Internal(format!("password hashing failed: {err}")).into())
}

async fn verify_password(password: String, hash: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|err| AppError::from(ServiceError::Internal(format!("hash task failed: {err}"))))?
        .map_err(|err| ServiceError::Internal(format!("password check failed: {err}")).into())
}
