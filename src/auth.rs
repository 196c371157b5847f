//! Token issuing, verification, and the request extractors gating
//! authenticated routes.

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{config::AppConfig, error::AppError, state::SharedState};

/// Discriminates the two token flavors so a refresh token can never be used
/// as an access token or vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Claims carried by both token kinds.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Player id the token was issued for.
    pub sub: Uuid,
    /// Access or refresh.
    pub kind: TokenKind,
    /// Expiry as a unix timestamp.
    pub exp: i64,
}

/// A freshly issued access/refresh token pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub token: String,
    pub refresh_token: String,
}

/// Issue a new access/refresh pair for the player.
pub fn issue_pair(
    config: &AppConfig,
    player_id: Uuid,
    now: OffsetDateTime,
) -> Result<TokenPair, jsonwebtoken::errors::Error> {
    let access = Claims {
        sub: player_id,
        kind: TokenKind::Access,
        exp: (now + config.access_ttl).unix_timestamp(),
    };
    let refresh = Claims {
        sub: player_id,
        kind: TokenKind::Refresh,
        exp: (now + config.refresh_ttl).unix_timestamp(),
    };
    Ok(TokenPair {
        token: encode(
            &Header::default(),
            &access,
            &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
        )?,
        refresh_token: encode(
            &Header::default(),
            &refresh,
            &EncodingKey::from_secret(config.jwt_refresh_secret.as_bytes()),
        )?,
    })
}

/// Decode a token and check it is of the expected kind.
pub fn verify(token: &str, secret: &str, expected: TokenKind) -> Result<Claims, AppError> {
    let validation = Validation::new(Algorithm::HS256);
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|_| AppError::Unauthorized("invalid or expired token".into()))?;
    if data.claims.kind != expected {
        return Err(AppError::Unauthorized("wrong token type".into()));
    }
    Ok(data.claims)
}

/// Extractor for routes that require an authenticated player.
#[derive(Debug, Clone, Copy)]
pub struct AuthPlayer(pub Uuid);

impl FromRequestParts<SharedState> for AuthPlayer {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AppError::Unauthorized("missing bearer token".into()))?;
        let claims = verify(
            bearer.token(),
            &state.config().jwt_secret,
            TokenKind::Access,
        )?;
        Ok(AuthPlayer(claims.sub))
    }
}

/// Extractor for routes where authentication is optional; an absent or
/// invalid token degrades to an anonymous caller instead of rejecting.
#[derive(Debug, Clone, Copy)]
pub struct MaybePlayer(pub Option<Uuid>);

impl FromRequestParts<SharedState> for MaybePlayer {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let header = TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state).await;
        let player = match header {
            Ok(TypedHeader(Authorization(bearer))) => verify(
                bearer.token(),
                &state.config().jwt_secret,
                TokenKind::Access,
            )
            .ok()
            .map(|claims| claims.sub),
            Err(_) => None,
        };
        Ok(MaybePlayer(player))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AppConfig {
        AppConfig::for_tests()
    }

    #[test]
    fn issued_access_token_verifies() {
        let config = config();
        let player = Uuid::new_v4();
        let pair = issue_pair(&config, player, OffsetDateTime::now_utc()).unwrap();
        let claims = verify(&pair.token, &config.jwt_secret, TokenKind::Access).unwrap();
        assert_eq!(claims.sub, player);
    }

    #[test]
    fn refresh_token_is_rejected_as_access() {
        let config = config();
        let pair = issue_pair(&config, Uuid::new_v4(), OffsetDateTime::now_utc()).unwrap();
        // Signed with a different secret and carrying the wrong kind.
        assert!(verify(&pair.refresh_token, &config.jwt_secret, TokenKind::Access).is_err());
        assert!(
            verify(
                &pair.refresh_token,
                &config.jwt_refresh_secret,
                TokenKind::Access
            )
            .is_err()
        );
        assert!(
            verify(
                &pair.refresh_token,
                &config.jwt_refresh_secret,
                TokenKind::Refresh
            )
            .is_ok()
        );
    }

    #[test]
    fn expired_token_is_rejected() {
        let config = config();
        let issued_at = OffsetDateTime::now_utc() - config.access_ttl - time::Duration::hours(2);
        let pair = issue_pair(&config, Uuid::new_v4(), issued_at).unwrap();
        assert!(verify(&pair.token, &config.jwt_secret, TokenKind::Access).is_err());
    }

    #[test]
    fn tampered_token_is_rejected() {
        let config = config();
        let pair = issue_pair(&config, Uuid::new_v4(), OffsetDateTime::now_utc()).unwrap();
        assert!(verify(&pair.token, "some-other-secret", TokenKind::Access).is_err());
    }
}
