//! HTTP layer for yatube.
//!
//! - **Endpoints**: listings, post create/edit, comments, follows, auth
//! - **Extractors**: session user, page number, post submissions
//! - **Middleware**: session resolution and application state
//! - **Page cache**: short-lived cache of the anonymous index
//!
//! Built on Axum 0.8. Handlers answer with view documents
//! (`{"template", "context"}`) or `302 Found` redirects.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod page_cache;
pub mod response;

use axum::Router;

pub use endpoints::router;
pub use middleware::AppState;
pub use page_cache::PageCache;

/// Full application router with session resolution, bound to `state`.
pub fn app(state: AppState) -> Router {
    router()
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ))
        .with_state(state)
}
