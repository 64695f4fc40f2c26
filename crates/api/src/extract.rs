//! Request extraction with rejections in the API error envelope.

use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::AppError;

/// JSON body that is deserialized and then checked against its field limits.
///
/// Malformed JSON and limit violations are both rejected as 400 through the
/// standard error envelope.
///
/// ```ignore
/// async fn create(ValidJson(input): ValidJson<CreateForum>) -> AppResult<Json<()>> {
///     // input.name is 1..=36 chars here
///     Ok(Json(()))
/// }
/// ```
pub struct ValidJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(ValidJson(value))
    }
}

/// Typed path parameters.
///
/// Same as [`axum::extract::Path`] but a segment that fails to parse, such as
/// `/threads/abc`, is a 400 in the standard error envelope.
pub struct Path<T>(pub T);

impl<T, S> FromRequestParts<S> for Path<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let axum::extract::Path(value) =
            axum::extract::Path::<T>::from_request_parts(parts, state).await?;
        Ok(Path(value))
    }
}
