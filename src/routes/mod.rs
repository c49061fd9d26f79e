//! Route definitions and router assembly for the Trellis API.

pub mod auth;
pub mod clients;
pub mod dashboard;
pub mod health;
pub mod leads;
pub mod products;
pub mod purchases;

use axum::routing::{delete, get, patch, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::AppState;

/// Assemble the full application router. Shared between the server
/// binary and the integration tests.
pub fn api_router(state: AppState) -> Router {
    let allow_origin = state
        .config
        .frontend_url
        .parse()
        .map(|origin| AllowOrigin::exact(origin))
        .unwrap_or_else(|_| AllowOrigin::any());
    let cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any);

    let auth_routes = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/users", post(auth::create_user))
        .route("/auth/me", get(auth::me));

    let lead_routes = Router::new()
        .route("/leads", get(leads::list).post(leads::create))
        .route(
            "/leads/{id}",
            get(leads::get_by_id)
                .put(leads::update)
                .delete(leads::delete),
        )
        .route("/leads/{id}/status", patch(leads::update_status))
        .route("/leads/{id}/convert", post(leads::convert));

    let client_routes = Router::new()
        .route("/clients", get(clients::list).post(clients::create))
        .route(
            "/clients/{id}",
            get(clients::get_by_id)
                .put(clients::update)
                .delete(clients::delete),
        )
        .route("/clients/{id}/purchases", get(clients::list_purchases));

    let product_routes = Router::new()
        .route("/products", get(products::list).post(products::create))
        .route(
            "/products/{id}",
            get(products::get_by_id)
                .put(products::update)
                .delete(products::delete),
        );

    let purchase_routes = Router::new()
        .route("/purchases", get(purchases::list).post(purchases::create))
        .route("/purchases/{id}", delete(purchases::delete));

    let dashboard_routes = Router::new().route("/dashboard", get(dashboard::show));

    Router::new()
        .route("/health/live", get(health::live))
        .route("/health/ready", get(health::ready))
        .nest("/api/v1", auth_routes)
        .nest("/api/v1", lead_routes)
        .nest("/api/v1", client_routes)
        .nest("/api/v1", product_routes)
        .nest("/api/v1", purchase_routes)
        .nest("/api/v1", dashboard_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
