use crate::{handlers, AppState};
use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health))

        // Search lifecycle
        .route(
            "/search",
            get(handlers::list_searches).post(handlers::submit_search),
        )
        .route("/search/stats", get(handlers::search_stats))
        .route(
            "/search/{id}",
            get(handlers::get_search).delete(handlers::delete_search),
        )

        // Add state
        .with_state(state)

        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
}
