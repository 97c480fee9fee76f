// src/middleware/i18n.rs

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

use crate::common::i18n::DEFAULT_LANG;
use crate::config::AppState;

// Language used for error messages, taken from Accept-Language.
#[derive(Debug, Clone)]
pub struct Locale(pub String);

impl Locale {
    /// Picks the first language in `header` (by q-value) that the catalog
    /// supports. "vi-VN" resolves to "vi".
    pub fn negotiate(header: Option<&str>, supports: impl Fn(&str) -> bool) -> Self {
        let lang = header
            .map(accept_language::parse)
            .unwrap_or_default()
            .iter()
            .map(|tag| tag.split('-').next().unwrap_or(tag).to_ascii_lowercase())
            .find(|primary| supports(primary.as_str()))
            .unwrap_or_else(|| DEFAULT_LANG.to_string());

        Locale(lang)
    }
}

impl FromRequestParts<AppState> for Locale {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok());

        Ok(Locale::negotiate(header, |lang| state.i18n.supports(lang)))
    }
}
