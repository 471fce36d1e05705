use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{dispatch, handlers, middleware::metrics_middleware, tickets};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/services", get(handlers::list_services))
        // Tickets
        .route(
            "/tickets",
            get(tickets::list_tickets).post(tickets::create_ticket),
        )
        .route(
            "/tickets/{id}",
            get(tickets::get_ticket).put(tickets::update_ticket),
        )
        // Counters and displays
        .route("/dispatch", post(dispatch::call_next))
        .route("/stats/waiting", get(dispatch::waiting_stats))
        .route("/board", get(dispatch::board))
        .route("/counters/{counter}", get(dispatch::counter_summary))
        // Administration
        .route("/reset", post(handlers::reset))
        .with_state(Arc::clone(&state));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        .with_state(state)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        // Kiosks and monitors are browsers on other origins.
        .layer(CorsLayer::permissive())
}
