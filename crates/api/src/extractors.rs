//! Request extractors.

use axum::{
    extract::{FromRequest, FromRequestParts, Path, Request, rejection::JsonRejection},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use microloan_shared::AppError;
use microloan_shared::types::ApplicationId;

/// JSON body whose rejections render as `VALIDATION_ERROR`.
#[derive(Debug)]
pub struct ValidJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(validation(&rejection)),
        }
    }
}

fn validation(rejection: &JsonRejection) -> ApiError {
    ApiError(AppError::Validation(rejection.body_text()))
}

/// Application id taken from the single path parameter.
#[derive(Debug, Clone, Copy)]
pub struct ApplicationPath(pub ApplicationId);

impl<S> FromRequestParts<S> for ApplicationPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError(AppError::Validation(e.body_text())))?;

        raw.parse::<ApplicationId>()
            .map(Self)
            .map_err(|_| ApiError(AppError::Validation(format!("Invalid application id: {raw}"))))
    }
}
