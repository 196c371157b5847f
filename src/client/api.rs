//! Typed HTTP client for the backend API.
//!
//! Every call normalizes into [`ApiResult`]; there is no automatic retry.
//! Callers decide whether to surface the failure or fall back to the local
//! cache.

use std::{sync::Mutex, time::Duration};

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use thiserror::Error;

use crate::{
    auth::TokenPair,
    dao::models::{SortField, TimeWindow},
    dto::{
        auth::{AuthResponse, LoginRequest, RefreshRequest, RefreshResponse, RegisterRequest},
        common::ApiMessage,
        game::SyncRequest,
        leaderboard::{
            LeaderboardResponse, RankResponse, SubmitEntryRequest, SubmitEntryResponse,
        },
        player::{ProfileResponse, UpdateProfileRequest},
    },
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Uniform failure shape for every API call.
#[derive(Debug, Error)]
pub enum ApiClientError {
    /// The request did not complete within the fixed timeout.
    #[error("request timed out")]
    Timeout,
    /// Connection or protocol failure before a response arrived.
    #[error("transport failure: {0}")]
    Transport(#[source] reqwest::Error),
    /// The server answered with a non-success status.
    #[error("server returned {status}: {message}")]
    Status { status: StatusCode, message: String },
    /// The response body did not match the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(#[source] reqwest::Error),
    /// No token pair is stored for an authenticated call.
    #[error("not logged in")]
    NotAuthenticated,
}

pub type ApiResult<T> = Result<T, ApiClientError>;

/// Error body shape the backend emits on failures.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Typed client holding the base URL and the current token pair.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Mutex<Option<TokenPair>>,
}

impl ApiClient {
    /// Build a client for the given base URL, e.g. `https://api.example.com`.
    pub fn new(base_url: impl Into<String>) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(ApiClientError::Transport)?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tokens: Mutex::new(None),
        })
    }

    /// Install a token pair, e.g. one restored from the local cache.
    pub fn set_tokens(&self, tokens: TokenPair) {
        *self.tokens.lock().unwrap_or_else(|e| e.into_inner()) = Some(tokens);
    }

    /// Current token pair, if logged in.
    pub fn tokens(&self) -> Option<TokenPair> {
        self.tokens.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Forget the stored tokens. The backend holds no session state, so this
    /// is all a logout needs.
    pub fn logout(&self) {
        *self.tokens.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }

    /// Create an account and store the issued tokens.
    pub async fn register(&self, request: &RegisterRequest) -> ApiResult<AuthResponse> {
        let response: AuthResponse = self
            .execute(self.request(Method::POST, "/api/auth/register").json(request))
            .await?;
        self.set_tokens(TokenPair {
            token: response.data.token.clone(),
            refresh_token: response.data.refresh_token.clone(),
        });
        Ok(response)
    }

    /// Log in with credentials and store the issued tokens.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<AuthResponse> {
        self.do_login(&LoginRequest {
            email: Some(email.to_string()),
            password: Some(password.to_string()),
            is_guest: false,
        })
        .await
    }

    /// Mint a guest account and store the issued tokens.
    pub async fn guest_login(&self) -> ApiResult<AuthResponse> {
        self.do_login(&LoginRequest {
            email: None,
            password: None,
            is_guest: true,
        })
        .await
    }

    async fn do_login(&self, request: &LoginRequest) -> ApiResult<AuthResponse> {
        let response: AuthResponse = self
            .execute(self.request(Method::POST, "/api/auth/login").json(request))
            .await?;
        self.set_tokens(TokenPair {
            token: response.data.token.clone(),
            refresh_token: response.data.refresh_token.clone(),
        });
        Ok(response)
    }

    /// Exchange the stored refresh token for a fresh pair.
    pub async fn refresh(&self) -> ApiResult<RefreshResponse> {
        let refresh_token = self
            .tokens()
            .ok_or(ApiClientError::NotAuthenticated)?
            .refresh_token;
        let response: RefreshResponse = self
            .execute(
                self.request(Method::POST, "/api/auth/refresh")
                    .json(&RefreshRequest { refresh_token }),
            )
            .await?;
        self.set_tokens(TokenPair {
            token: response.data.token.clone(),
            refresh_token: response.data.refresh_token.clone(),
        });
        Ok(response)
    }

    /// Fetch the logged-in player's profile.
    pub async fn profile(&self) -> ApiResult<ProfileResponse> {
        self.execute(self.request(Method::GET, "/api/player/profile"))
            .await
    }

    /// Apply a partial profile update.
    pub async fn update_profile(&self, request: &UpdateProfileRequest) -> ApiResult<ApiMessage> {
        self.execute(self.request(Method::PUT, "/api/player/profile").json(request))
            .await
    }

    /// Push accumulated run progress to the server.
    pub async fn sync(&self, request: &SyncRequest) -> ApiResult<ApiMessage> {
        self.execute(self.request(Method::POST, "/api/game/sync").json(request))
            .await
    }

    /// Submit a run's result to a leaderboard window.
    pub async fn submit_score(
        &self,
        request: &SubmitEntryRequest,
        window: TimeWindow,
    ) -> ApiResult<SubmitEntryResponse> {
        self.execute(
            self.request(Method::POST, "/api/game/leaderboard")
                .query(&[("range", window.tag())])
                .json(request),
        )
        .await
    }

    /// Fetch one page of a leaderboard window.
    pub async fn leaderboard(
        &self,
        window: TimeWindow,
        sort: SortField,
        limit: i64,
        offset: i64,
    ) -> ApiResult<LeaderboardResponse> {
        self.execute(self.request(Method::GET, "/api/leaderboard").query(&[
            ("range", window.tag().to_string()),
            ("sortBy", sort.column().to_string()),
            ("limit", limit.to_string()),
            ("offset", offset.to_string()),
        ]))
        .await
    }

    /// Fetch the logged-in player's best entry and rank in a window.
    pub async fn my_rank(&self, window: TimeWindow, sort: SortField) -> ApiResult<RankResponse> {
        self.execute(self.request(Method::GET, "/api/leaderboard/rank").query(&[
            ("range", window.tag()),
            ("sortBy", sort.column()),
        ]))
        .await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut builder = self
            .http
            .request(method, format!("{}{}", self.base_url, path));
        if let Some(tokens) = self.tokens() {
            builder = builder.bearer_auth(tokens.token);
        }
        builder
    }

    async fn execute<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ApiResult<T> {
        let response = builder.send().await.map_err(|err| {
            if err.is_timeout() {
                ApiClientError::Timeout
            } else {
                ApiClientError::Transport(err)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ApiErrorBody>()
                .await
                .map(|body| body.message)
                .unwrap_or_else(|_| status.to_string());
            return Err(ApiClientError::Status { status, message });
        }

        response.json::<T>().await.map_err(ApiClientError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = ApiClient::new("http://localhost:3000/").unwrap();
        assert_eq!(client.base_url, "http://localhost:3000");
    }

    #[test]
    fn tokens_survive_set_and_logout() {
        let client = ApiClient::new("http://localhost:3000").unwrap();
        assert!(client.tokens().is_none());
        client.set_tokens(TokenPair {
            token: "a".into(),
            refresh_token: "r".into(),
        });
        assert_eq!(client.tokens().unwrap().token, "a");
        client.logout();
        assert!(client.tokens().is_none());
    }
}
