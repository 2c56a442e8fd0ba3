use std::sync::Arc;

use axum::Router;
use axum::extract::{Request, State};
use axum::handler::HandlerWithoutStateExt;
use axum::middleware::{self, Next};
use axum::response::{Redirect, Response};
use axum::routing::{get, post};
use tower_http::services::ServeDir;

use bproxy_protocol::error::ERROR_INVALID_REQUEST;

use crate::handler::{AppState, handle_complete, handle_messages, method_not_allowed};
use crate::response::{error_response, not_found_response};

const DOCS_URL: &str = "https://docs.anthropic.com/en/api/getting-started";

/// Assembles the service: completion endpoints behind the key gate, the
/// docs redirect, and static file serving for everything else.
pub fn router(state: Arc<AppState>, web_root: &str) -> Router {
    // an empty web root serves the working directory, like http.Dir("")
    let web_root = if web_root.is_empty() { "." } else { web_root };
    let api = Router::new()
        .route(
            "/complete",
            post(handle_complete).fallback(method_not_allowed),
        )
        .route(
            "/messages",
            post(handle_messages).fallback(method_not_allowed),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_api_key,
        ));

    Router::new()
        .nest("/v1", api)
        .route("/swagger", get(redirect_docs))
        .fallback_service(
            ServeDir::new(web_root).not_found_service(handle_not_found.into_service()),
        )
        .with_state(state)
}

async fn require_api_key(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if let Err(err) = state.auth.authenticate(request.headers()) {
        return error_response(ERROR_INVALID_REQUEST, err.message());
    }
    next.run(request).await
}

async fn redirect_docs() -> Redirect {
    Redirect::permanent(DOCS_URL)
}

async fn handle_not_found() -> Response {
    not_found_response()
}
