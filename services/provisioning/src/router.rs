use axum::{
    Router,
    routing::{get, post},
};
use tower::ServiceBuilder;

use campus_core::middleware::{
    cors_layer, propagate_request_id_layer, request_id_layer, trace_layer,
};

use crate::handlers::{
    health::{healthz, readyz},
    user::create_user,
};
use crate::state::AppState;

/// `OPTIONS` on every route is answered by the CORS layer with an empty 200.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Provisioning
        .route("/functions/v1/create-user", post(create_user))
        .route("/users", post(create_user))
        .layer(
            ServiceBuilder::new()
                .layer(request_id_layer())
                .layer(trace_layer())
                .layer(propagate_request_id_layer())
                .layer(cors_layer()),
        )
        .with_state(state)
}
