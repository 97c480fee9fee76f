// src/handlers/menu.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{common::error::ApiError, config::AppState, middleware::i18n::Locale};

// ---
// Handler: get_menu
// ---
// Products currently on sale.
pub async fn get_menu(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {

    let products = app_state
        .catalog_repo
        .list_active_products(&app_state.db_pool)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n))?;

    Ok((StatusCode::OK, Json(products)))
}
