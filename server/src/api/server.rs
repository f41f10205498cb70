//! API server initialization

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use super::middleware::{self, AllowedOrigins};
use super::openapi::{openapi_json, swagger_ui_html};
use super::routes::{self, config, health, products};
use crate::core::CoreApp;
use crate::core::config::AppConfig;
use crate::core::constants::DEFAULT_BODY_LIMIT;
use crate::data::CatalogRepository;

pub struct ApiServer {
    app: CoreApp,
}

impl ApiServer {
    pub fn new(app: CoreApp) -> Self {
        Self { app }
    }

    /// Serve until shutdown is triggered; returns CoreApp for graceful shutdown
    pub async fn start(self) -> Result<CoreApp> {
        let Self { app } = self;
        let shutdown = app.shutdown.clone();

        let addr = SocketAddr::new(
            app.config
                .server
                .host
                .parse()
                .with_context(|| format!("Invalid server host: {}", app.config.server.host))?,
            app.config.server.port,
        );

        let repository: Arc<dyn CatalogRepository> = Arc::new(app.database.clone());
        let router = build_router(repository, &app.config);

        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;
        tracing::debug!(%addr, "API server listening");

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown.wait())
        .await?;

        Ok(app)
    }
}

/// Build the full HTTP router
pub fn build_router(repository: Arc<dyn CatalogRepository>, config: &AppConfig) -> Router {
    let allowed_origins = AllowedOrigins::new(&config.server.host, config.server.port);

    let router = Router::new()
        .route("/", get(routes::welcome))
        .route("/api/health", get(health::health))
        .route("/api/openapi.json", get(openapi_json))
        .route("/api/docs", get(swagger_ui_html))
        .nest(
            "/api/products",
            products::routes(repository, &config.catalog),
        )
        .nest("/api/config", config::routes(config.paypal.clone()))
        .fallback(middleware::handle_404)
        .layer(CompressionLayer::new())
        .layer(middleware::cors(&allowed_origins))
        .layer(DefaultBodyLimit::max(DEFAULT_BODY_LIMIT));

    if config.debug {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::response::Response;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::core::config::{CatalogConfig, PaypalConfig, ServerConfig};
    use crate::data::{NewProduct, SqliteService};

    fn test_config(paypal_client_id: Option<&str>) -> AppConfig {
        AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 5000,
            },
            catalog: CatalogConfig {
                page_size: 2,
                max_page_size: 10,
                top_rated_limit: 2,
            },
            paypal: PaypalConfig {
                client_id: paypal_client_id.map(str::to_string),
            },
            debug: false,
        }
    }

    async fn test_router(paypal_client_id: Option<&str>) -> Router {
        let db = Arc::new(SqliteService::init_in_memory().await.unwrap());
        let products: Vec<NewProduct> = serde_json::from_value(json!([
            { "_id": "p1", "name": "Airpods Wireless", "brand": "Apple", "color": "White",
              "category": ["Electronics"], "price": 89.99, "rating": 4.5 },
            { "_id": "p2", "name": "iPhone 11 Pro", "brand": "Apple", "color": "Black",
              "category": ["Electronics", "Phones"], "price": 599.99, "rating": 4.0 },
            { "_id": "p3", "name": "Cannon EOS 80D", "brand": "Cannon", "color": "Black",
              "category": ["Electronics", "Cameras"], "price": 929.99, "rating": 3.0 },
            { "_id": "p4", "name": "Running Shoes", "brand": "Nike", "color": "Red",
              "category": ["Shoes"], "price": 120, "rating": 5.0 }
        ]))
        .unwrap();
        db.insert_products(&products).await.unwrap();

        build_router(Arc::new(db), &test_config(paypal_client_id))
    }

    async fn get(router: Router, uri: &str) -> Response {
        router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn ids(products: &Value) -> Vec<&str> {
        products
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["_id"].as_str().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_welcome() {
        let response = get(test_router(None).await, "/").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!("Welcome to Storefront"));
    }

    #[tokio::test]
    async fn test_health() {
        let response = get(test_router(None).await, "/api/health").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_list_products_default_page() {
        let response = get(test_router(None).await, "/api/products").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(ids(&body["products"]), vec!["p1", "p2"]);
        assert_eq!(body["page"], 1);
        assert_eq!(body["pages"], 2);
    }

    #[tokio::test]
    async fn test_list_products_with_filters() {
        let response = get(
            test_router(None).await,
            "/api/products?color=black&price%5Bgt%5D=600&limit=10",
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(ids(&body["products"]), vec!["p3"]);
        assert_eq!(body["pages"], 1);
    }

    #[tokio::test]
    async fn test_list_products_keyword_and_sort() {
        let response = get(
            test_router(None).await,
            "/api/products?keyword=o&sort=-price&limit=10",
        )
        .await;
        let body = body_json(response).await;
        assert_eq!(ids(&body["products"]), vec!["p3", "p2", "p4", "p1"]);
    }

    #[tokio::test]
    async fn test_list_products_second_page() {
        let response = get(test_router(None).await, "/api/products?page=2").await;
        let body = body_json(response).await;
        assert_eq!(ids(&body["products"]), vec!["p3", "p4"]);
        assert_eq!(body["page"], 2);
    }

    #[tokio::test]
    async fn test_list_products_unsupported_field() {
        let response = get(test_router(None).await, "/api/products?size=42").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["code"], "UNSUPPORTED_FILTER_FIELD");
        assert_eq!(
            body["message"],
            "The parameter size is not supported for searching."
        );
    }

    #[tokio::test]
    async fn test_list_products_category_operator_is_rejected() {
        let response = get(
            test_router(None).await,
            "/api/products?category%5Bin%5D=Shoes",
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "INVALID_FILTER");
    }

    #[tokio::test]
    async fn test_list_products_invalid_regex() {
        let response = get(test_router(None).await, "/api/products?keyword=%28").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "INVALID_FILTER");
    }

    #[tokio::test]
    async fn test_list_products_price_mixing_value_and_operator() {
        let response = get(
            test_router(None).await,
            "/api/products?price=120&price%5Blte%5D=500",
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "INVALID_FILTER");
    }

    #[tokio::test]
    async fn test_top_products() {
        let response = get(test_router(None).await, "/api/products/top").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(ids(&body_json(response).await), vec!["p4", "p1"]);

        let response = get(test_router(None).await, "/api/products/top?limit=3").await;
        assert_eq!(ids(&body_json(response).await), vec!["p4", "p1", "p2"]);
    }

    #[tokio::test]
    async fn test_top_products_invalid_limit() {
        let response = get(test_router(None).await, "/api/products/top?limit=0").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_get_product() {
        let response = get(test_router(None).await, "/api/products/p2").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["name"], "iPhone 11 Pro");
    }

    #[tokio::test]
    async fn test_get_product_not_found() {
        let response = get(test_router(None).await, "/api/products/nope").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["code"], "PRODUCT_NOT_FOUND");
        assert_eq!(body["message"], "Product not found");
    }

    #[tokio::test]
    async fn test_paypal_client_id() {
        let response = get(test_router(Some("sb-client")).await, "/api/config/paypal").await;
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"sb-client");

        let response = get(test_router(None).await, "/api/config/paypal").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_404() {
        let response = get(test_router(None).await, "/api/orders").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["error"], "not_found");
        assert_eq!(body["message"], "Not Found - /api/orders");
    }

    #[tokio::test]
    async fn test_openapi_json() {
        let response = get(test_router(None).await, "/api/openapi.json").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_json(response).await["paths"]["/api/products"].is_object());
    }
}
