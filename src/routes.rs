// src/routes.rs

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{config::AppState, handlers};

pub fn router(app_state: AppState) -> Router {
    let cors = cors_layer(&app_state.config.cors_origins);

    // Storefront: menu, orders and the kitchen feed
    let shop_routes = Router::new()
        .route("/menu", get(handlers::menu::get_menu))
        .route("/order", post(handlers::order::create_order))
        .route("/ws/kitchen", get(handlers::kitchen::kitchen_socket));

    // Back office stock management
    let inventory_routes = Router::new()
        .route(
            "/stores/{store_id}/inventory",
            get(handlers::inventory::list_store_inventory),
        )
        .route("/inventory/restock", post(handlers::inventory::restock));

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .merge(shop_routes)
        .merge(inventory_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{lazy_state, seed, state_with_pool, stock_of};
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use rust_decimal::Decimal;
    use sqlx::PgPool;
    use tokio::sync::mpsc::error::TryRecvError;
    use tower::ServiceExt;

    fn app() -> Router {
        router(lazy_state())
    }

    fn post_json(uri: &str, body: &str, lang: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT_LANGUAGE, lang)
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_is_ok() {
        let response = app()
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn zero_quantity_order_is_rejected_before_storage() {
        let response = app()
            .oneshot(post_json("/order", r#"{"store_id":1,"product_id":1,"quantity":0}"#, "en"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["detail"], "One or more fields are invalid");
        assert_eq!(body["fields"]["quantity"][0], "Quantity must be at least 1.");
    }

    #[tokio::test]
    async fn validation_message_follows_accept_language() {
        let response = app()
            .oneshot(post_json("/order", r#"{"store_id":1,"product_id":1,"quantity":-2}"#, "vi-VN"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["detail"], "Một hoặc nhiều trường không hợp lệ");
    }

    #[tokio::test]
    async fn non_positive_restock_is_rejected() {
        let response = app()
            .oneshot(post_json(
                "/inventory/restock",
                r#"{"store_id":1,"ingredient_id":1,"quantity":0}"#,
                "en",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await["fields"]["quantity"][0],
            "Quantity must be greater than zero."
        );
    }

    #[tokio::test]
    async fn restock_finer_than_the_stock_column_is_rejected() {
        let response = app()
            .oneshot(post_json(
                "/inventory/restock",
                r#"{"store_id":1,"ingredient_id":1,"quantity":0.0004}"#,
                "en",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await["fields"]["quantity"][0],
            "Quantity allows at most 3 decimal places."
        );
    }

    #[tokio::test]
    async fn restock_past_the_stock_column_limit_is_rejected() {
        let response = app()
            .oneshot(post_json(
                "/inventory/restock",
                r#"{"store_id":1,"ingredient_id":1,"quantity":1000000000000}"#,
                "en",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await["fields"]["quantity"][0],
            "Quantity is too large."
        );
    }

    #[tokio::test]
    async fn body_missing_a_field_gets_a_json_error() {
        let response = app()
            .oneshot(post_json("/order", r#"{"product_id":1,"quantity":1}"#, "en"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let detail = json_body(response).await["detail"].as_str().unwrap().to_string();
        assert!(detail.starts_with("The request body could not be read"), "{detail}");
        assert!(detail.contains("store_id"), "{detail}");
    }

    #[tokio::test]
    async fn unparsable_body_gets_a_localized_json_error() {
        let response = app()
            .oneshot(post_json("/inventory/restock", "{not json", "vi"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let detail = json_body(response).await["detail"].as_str().unwrap().to_string();
        assert!(detail.starts_with("Không đọc được nội dung yêu cầu"), "{detail}");
    }

    #[sqlx::test]
    #[ignore = "needs a Postgres at DATABASE_URL"]
    async fn only_committed_orders_reach_the_kitchen(pool: PgPool) {
        let f = seed(&pool).await;
        let state = state_with_pool(pool.clone());
        let hub = state.kitchen_hub.clone();
        let (display, mut frames) = hub.open_connection();
        hub.register(display);
        let app = router(state);

        let order = format!(r#"{{"store_id":{},"product_id":{},"quantity":3}}"#, f.store_id, f.latte_id);
        let response = app.clone().oneshot(post_json("/order", &order, "en")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["message"], "Order placed");
        assert_eq!(body["product"], "Latte");

        // Same order again: only 400 ml of milk left.
        let response = app.oneshot(post_json("/order", &order, "en")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["detail"], "Out of stock: Milk");

        let frame: serde_json::Value = serde_json::from_str(&frames.try_recv().unwrap()).unwrap();
        assert_eq!(frame["type"], "NEW_ORDER");
        assert_eq!(frame["product"], "Latte");
        assert_eq!(frame["quantity"], 3);
        assert_eq!(frame["store"], "S1");
        assert!(matches!(frames.try_recv(), Err(TryRecvError::Empty)));
        assert_eq!(stock_of(&pool, f.store_id, f.milk_id).await, Decimal::from(400));
    }
}
