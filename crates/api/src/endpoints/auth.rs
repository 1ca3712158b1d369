//! Authentication endpoints: sign up, log in, log out.
//!
//! A successful sign-up or log-in stores the session token in an
//! HTTP-only cookie.

use axum::{
    Form, Router,
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::get,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use serde_json::json;
use yatube_common::AppResult;
use yatube_core::{SignupInput, Submission};

use crate::{
    extractors::MaybeAuthUser,
    middleware::{AppState, SESSION_COOKIE},
    response::{View, form_errors, found, safe_next},
};

const LOGIN_TEMPLATE: &str = "users/login.html";
const SIGNUP_TEMPLATE: &str = "users/signup.html";
const LOGGED_OUT_TEMPLATE: &str = "users/logged_out.html";

#[derive(Debug, Default, Deserialize)]
struct NextQuery {
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoginForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
    next: Option<String>,
}

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

fn login_view(username: &str, next: Option<&str>, failed: bool) -> View {
    let errors = if failed {
        json!({ "__all__": [
            "Please enter a correct username and password. Note that both fields may be case-sensitive."
        ] })
    } else {
        json!({})
    };

    View::new(
        LOGIN_TEMPLATE,
        json!({
            "form": { "username": username, "errors": errors },
            "next": next,
        }),
    )
}

async fn login_form(Query(query): Query<NextQuery>) -> View {
    login_view("", query.next.as_deref(), false)
}

async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    match state.user_service.signin(&form.username, &form.password).await? {
        Some(session) => {
            tracing::info!(user_id = %session.user.id, "User signed in");
            let jar = jar.add(session_cookie(session.token));
            Ok((jar, found(safe_next(form.next.as_deref()))).into_response())
        }
        None => Ok(login_view(&form.username, form.next.as_deref(), true).into_response()),
    }
}

fn signup_view(username: &str, name: Option<&str>, errors: serde_json::Value) -> View {
    View::new(
        SIGNUP_TEMPLATE,
        json!({
            "form": { "username": username, "name": name, "errors": errors },
        }),
    )
}

async fn signup_form() -> View {
    signup_view("", None, json!({}))
}

async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(input): Form<SignupInput>,
) -> AppResult<Response> {
    let username = input.username.clone();
    let name = input.name.clone();

    match state.user_service.signup(input).await? {
        Submission::Saved(session) => {
            let jar = jar.add(session_cookie(session.token));
            Ok((jar, found("/")).into_response())
        }
        Submission::Rejected(errors) => Ok(signup_view(
            &username,
            name.as_deref(),
            json!(form_errors(&errors)),
        )
        .into_response()),
    }
}

/// End the session. Works for anonymous visitors too.
async fn logout(
    State(state): State<AppState>,
    MaybeAuthUser(user): MaybeAuthUser,
    jar: CookieJar,
) -> AppResult<Response> {
    if let Some(user) = user {
        state.user_service.logout(&user.id).await?;
    }

    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    Ok((jar, View::new(LOGGED_OUT_TEMPLATE, json!({}))).into_response())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login/", get(login_form).post(login))
        .route("/signup/", get(signup_form).post(signup))
        .route("/logout/", get(logout).post(logout))
}
