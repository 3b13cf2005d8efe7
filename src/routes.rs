use axum::{
    middleware::from_fn_with_state,
    routing::get,
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/health", get(public::health::health))
        .merge(types_routes())
        // Protected
        .merge(application_routes(state.clone()))
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn types_routes() -> Router<AppState> {
    use public::types;

    Router::new()
        .route("/api/types/worktypes", get(types::work_types))
        .route("/api/types/statuses", get(types::statuses))
}

fn application_routes(state: AppState) -> Router<AppState> {
    use protected::applications;

    Router::new()
        .route(
            "/api/applications",
            get(applications::list).post(applications::create),
        )
        .route(
            "/api/applications/:id",
            get(applications::get)
                .put(applications::update)
                .delete(applications::delete),
        )
        // route_layer so unmatched paths still 404 instead of 401
        .route_layer(from_fn_with_state(state, jwt_auth_middleware))
}
