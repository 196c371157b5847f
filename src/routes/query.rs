use axum::{extract::FromRequestParts, http::request::Parts};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// Query-string extractor that turns parse failures into the uniform JSON
/// error body instead of axum's plain-text rejection. An unknown `range` or
/// `sortBy` value answers 400 like any other validation error.
pub struct Query<T>(pub T);

impl<S, T> FromRequestParts<S> for Query<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let axum::extract::Query(value) =
            axum::extract::Query::<T>::from_request_parts(parts, state)
                .await
                .map_err(|err| AppError::BadRequest(err.body_text()))?;
        Ok(Self(value))
    }
}
