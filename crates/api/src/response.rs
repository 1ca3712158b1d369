//! Rendered views and redirects.
//!
//! A view is a JSON document naming the template to render and the context
//! to render it with:
//!
//! ```json
//! {"template": "posts/index.html", "context": {"page_obj": {...}}}
//! ```

use std::collections::BTreeMap;

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};
use validator::ValidationErrors;

/// Login page that anonymous users are sent to.
pub const LOGIN_URL: &str = "/auth/login/";

/// A template together with its render context.
#[derive(Debug, Clone, Serialize)]
pub struct View {
    pub template: &'static str,
    pub context: Value,
}

impl View {
    /// Render `template` with `context`.
    #[must_use]
    pub const fn new(template: &'static str, context: Value) -> Self {
        Self { template, context }
    }

    /// Serialize to the response body document.
    #[must_use]
    pub fn to_document(&self) -> Value {
        json!({
            "template": self.template,
            "context": self.context,
        })
    }
}

impl IntoResponse for View {
    fn into_response(self) -> Response {
        Json(self.to_document()).into_response()
    }
}

/// 302 redirect to `location`.
pub fn found(location: impl Into<String>) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.into())]).into_response()
}

/// 302 redirect to the login page, returning to `next` afterwards.
#[must_use]
pub fn login_redirect(next: &str) -> Response {
    found(format!("{LOGIN_URL}?next={}", encode_next(next)))
}

/// Percent-encode a return path for use in a query string. Slashes are
/// left readable.
#[must_use]
pub fn encode_next(next: &str) -> String {
    urlencoding::encode(next).replace("%2F", "/")
}

/// Only same-site absolute paths are followed after login.
#[must_use]
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path,
        _ => "/",
    }
}

/// Flatten field errors into `{field: [message, ...]}` for templates.
#[must_use]
pub fn form_errors(errors: &ValidationErrors) -> BTreeMap<String, Vec<String>> {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, list)| {
            let messages = list
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map_or_else(|| e.code.to_string(), ToString::to_string)
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use validator::ValidationError;

    #[test]
    fn test_login_redirect_keeps_next() {
        let response = login_redirect("/posts/abc/comment/");
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers()[header::LOCATION],
            "/auth/login/?next=/posts/abc/comment/"
        );
    }

    #[test]
    fn test_encode_next_escapes_query() {
        assert_eq!(encode_next("/?page=2"), "/%3Fpage%3D2");
    }

    #[test]
    fn test_safe_next() {
        assert_eq!(safe_next(Some("/create/")), "/create/");
        assert_eq!(safe_next(Some("//evil.example")), "/");
        assert_eq!(safe_next(Some("https://evil.example")), "/");
        assert_eq!(safe_next(None), "/");
    }

    #[test]
    fn test_form_errors_uses_messages() {
        let mut errors = ValidationErrors::new();
        errors.add("text", ValidationError::new("min_length"));

        let flat = form_errors(&errors);
        assert_eq!(flat["text"], vec!["min_length".to_string()]);
    }
}
