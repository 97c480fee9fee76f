// src/middleware/json.rs

use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::Json;
use serde::de::DeserializeOwned;

use crate::common::error::{ApiError, AppError};
use crate::config::AppState;
use crate::middleware::i18n::Locale;

// `Json` whose rejections (bad syntax, missing fields, wrong content type)
// come back in the API's `{"detail": ...}` shape, in the caller's language.
#[derive(Debug, Clone)]
pub struct AppJson<T>(pub T);

impl<T> FromRequest<AppState> for AppJson<T>
where
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let (mut parts, body) = req.into_parts();
        let Ok(locale) = Locale::from_request_parts(&mut parts, state).await;
        let req = Request::from_parts(parts, body);

        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(AppJson(value)),
            Err(rejection) => Err(AppError::MalformedBody {
                status: rejection.status(),
                reason: rejection.body_text(),
            }
                .to_api_error(&locale, &state.i18n)),
        }
    }
}
