//! Router assembly and shared state.
//!
//! ```text
//! request ──► request_id ──► TraceLayer ──► SessionManagerLayer ──► handler
//!                 │              │
//!                 │              └── span http_request{request_id, method, uri, user_id}
//!                 └── reuses or generates x-request-id, echoes it back
//! ```

use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::{from_fn, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use caja_db::Database;
use time::Duration;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};
use uuid::Uuid;

use crate::routes::{cart, dashboard, health, product, sale};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        AppState { db }
    }
}

pub fn build_router(state: AppState, secure_cookie: bool) -> Router {
    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(secure_cookie)
        .with_expiry(Expiry::OnInactivity(Duration::hours(24)));

    Router::new()
        .route("/health", get(health::health_check))
        .route("/products/search", get(product::search))
        .route("/cart", get(cart::get_cart))
        .route("/cart/add", post(cart::add))
        .route("/cart/update", post(cart::update))
        .route("/cart/remove/:product_id", post(cart::remove))
        .route("/cart/init", post(cart::init))
        .route("/sales", get(sale::list).post(sale::checkout))
        .route("/sales/:id", get(sale::get_sale))
        .route("/sales/:id/status", post(sale::change_status))
        .route("/sales/:id/cancel", post(sale::cancel))
        .route("/sales/:id/edit", post(sale::edit))
        .route("/dashboard", get(dashboard::dashboard))
        .layer(session_layer)
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    user_id = tracing::field::Empty,
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Tags every request and response with an `x-request-id`.
pub async fn request_id_middleware(mut req: Request, next: Next) -> Response {
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    if let Ok(header_value) = HeaderValue::from_str(&request_id) {
        req.headers_mut().insert(REQUEST_ID_HEADER, header_value);
    }

    let mut response = next.run(req).await;

    if let Ok(header_value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, header_value);
    }

    response
}
