use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::common::i18n::I18n;
use crate::middleware::i18n::Locale;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation failed")]
    ValidationError(#[from] validator::ValidationErrors),

    // Body that never reached validation; `status` is the one axum chose.
    #[error("Malformed request body: {reason}")]
    MalformedBody { status: StatusCode, reason: String },

    #[error("Store or product not found")]
    StoreOrProductNotFound,

    #[error("Product {0} is not active")]
    ProductUnavailable(String),

    #[error("Product {0} has no recipe")]
    NoRecipe(String),

    #[error("Insufficient stock of {0}")]
    InsufficientStock(String),

    #[error("Store or ingredient not found")]
    StoreOrIngredientNotFound,

    #[error("Stock would exceed the storable maximum")]
    StockOutOfRange,

    // Storage failure (connectivity, constraint, transaction).
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Operation timed out")]
    Timeout,

    #[error("Internal server error: {0}")]
    InternalServerError(#[from] anyhow::Error),
}

/// The error shape that actually leaves the server, already localized.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::ProductUnavailable(_)
            | AppError::NoRecipe(_)
            | AppError::InsufficientStock(_)
            | AppError::StockOutOfRange => StatusCode::BAD_REQUEST,
            AppError::StoreOrProductNotFound | AppError::StoreOrIngredientNotFound => {
                StatusCode::NOT_FOUND
            }
            AppError::MalformedBody { status, .. } => *status,
            AppError::Timeout => StatusCode::SERVICE_UNAVAILABLE,
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn to_api_error(self, locale: &Locale, i18n: &I18n) -> ApiError {
        let lang = locale.0.as_str();
        let status = self.status();

        let (message, details) = match &self {
            AppError::ValidationError(errors) => {
                let mut details = serde_json::Map::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| match &e.message {
                            Some(m) => m.to_string(),
                            None => e.code.to_string(),
                        })
                        .collect();
                    details.insert(field.to_string(), json!(messages));
                }
                (i18n.get(lang, "request.invalid"), Some(serde_json::Value::Object(details)))
            }
            AppError::MalformedBody { reason, .. } => {
                (i18n.format(lang, "request.malformed", reason), None)
            }
            AppError::StoreOrProductNotFound => (i18n.get(lang, "order.not_found"), None),
            AppError::ProductUnavailable(name) => {
                (i18n.format(lang, "order.product_unavailable", name), None)
            }
            AppError::NoRecipe(name) => (i18n.format(lang, "order.no_recipe", name), None),
            AppError::InsufficientStock(name) => {
                (i18n.format(lang, "order.insufficient_stock", name), None)
            }
            AppError::StoreOrIngredientNotFound => (i18n.get(lang, "inventory.not_found"), None),
            AppError::StockOutOfRange => (i18n.get(lang, "inventory.out_of_range"), None),
            AppError::Timeout => {
                tracing::error!(error = %self, "request timed out");
                (i18n.get(lang, "server.timeout"), None)
            }
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                // Details stay in the log, never in the response.
                tracing::error!(error = %self, "internal server error");
                (i18n.get(lang, "server.error"), None)
            }
        };

        ApiError { status, message, details }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "detail": self.message, "fields": details }),
            None => json!({ "detail": self.message }),
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Line {
        #[validate(range(min = 1, message = "must be at least 1"))]
        quantity: i32,
    }

    fn en() -> Locale {
        Locale("en".to_string())
    }

    #[test]
    fn client_errors_map_to_4xx() {
        assert_eq!(AppError::StoreOrProductNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::NoRecipe("Latte".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::InsufficientStock("Milk".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::StockOutOfRange.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn malformed_body_keeps_its_status_and_reason() {
        let err = AppError::MalformedBody {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            reason: "missing field `store_id`".into(),
        };
        let api = err.to_api_error(&en(), &I18n::new());

        assert_eq!(api.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(api.message, "The request body could not be read: missing field `store_id`");
    }

    #[test]
    fn storage_failures_map_to_5xx() {
        assert_eq!(
            AppError::DatabaseError(sqlx::Error::PoolTimedOut).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(AppError::Timeout.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn insufficient_stock_names_the_ingredient() {
        let api = AppError::InsufficientStock("Milk".into()).to_api_error(&en(), &I18n::new());
        assert_eq!(api.message, "Out of stock: Milk");
    }

    #[test]
    fn database_error_does_not_leak_details() {
        let api = AppError::DatabaseError(sqlx::Error::PoolTimedOut)
            .to_api_error(&en(), &I18n::new());
        assert_eq!(api.message, "An unexpected error occurred");
        assert!(api.details.is_none());
    }

    #[test]
    fn validation_errors_carry_field_details() {
        let errors = Line { quantity: 0 }.validate().unwrap_err();
        let api = AppError::ValidationError(errors).to_api_error(&en(), &I18n::new());

        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(
            api.details.unwrap(),
            json!({ "quantity": ["must be at least 1"] })
        );
    }
}
