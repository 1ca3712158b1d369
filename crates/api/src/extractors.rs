//! Request extractors.

use std::convert::Infallible;

use axum::{
    extract::{FromRequest, FromRequestParts, Multipart, Query, Request},
    http::{header, request::Parts},
    response::Response,
    Form,
};
use serde::Deserialize;
use yatube_common::{AppError, PageRequest};
use yatube_core::{CommentForm, ImageUpload, PostForm};
use yatube_db::entities::user;

use crate::response::login_redirect;

/// Authenticated user extractor.
///
/// Anonymous requests are redirected to the login page with the original
/// path and query as `next`.
#[derive(Debug, Clone)]
pub struct AuthUser(pub user::Model);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by auth middleware
        parts
            .extensions
            .get::<user::Model>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| {
                let next = parts
                    .uri
                    .path_and_query()
                    .map_or_else(|| parts.uri.path(), |pq| pq.as_str());
                login_redirect(next)
            })
    }
}

/// Optional authenticated user extractor.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<user::Model>);

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<user::Model>().cloned()))
    }
}

#[derive(Debug, Default, Deserialize)]
struct PageQuery {
    page: Option<String>,
}

/// The `page` query parameter. Never rejects: bad values mean page 1.
#[derive(Debug, Clone, Copy)]
pub struct PageParam(pub PageRequest);

impl<S> FromRequestParts<S> for PageParam
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let query = Query::<PageQuery>::try_from_uri(&parts.uri)
            .map(|Query(q)| q)
            .unwrap_or_default();
        Ok(Self(PageRequest::parse(query.page.as_deref())))
    }
}

#[derive(Debug, Default, Deserialize)]
struct PostFields {
    #[serde(default)]
    text: String,
    group: Option<String>,
}

/// A submitted post form, url-encoded or multipart (with an image).
///
/// Any `author` field in the submission is ignored.
#[derive(Debug, Clone)]
pub struct PostSubmission(pub PostForm);

impl<S> FromRequest<S> for PostSubmission
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !is_multipart(&req) {
            let Form(fields) = Form::<PostFields>::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            return Ok(Self(PostForm::new(&fields.text, fields.group.as_deref(), None)));
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        let mut text = String::new();
        let mut group: Option<String> = None;
        let mut image: Option<ImageUpload> = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?
        {
            let name = field.name().unwrap_or("").to_string();

            match name.as_str() {
                "text" => {
                    text = field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?;
                }
                "group" => {
                    group = Some(
                        field
                            .text()
                            .await
                            .map_err(|e| AppError::BadRequest(e.to_string()))?,
                    );
                }
                "image" => {
                    let file_name = field.file_name().unwrap_or("").to_string();
                    let content_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_string();
                    let data = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?
                        .to_vec();

                    // An empty file input still sends a part
                    if !file_name.is_empty() || !data.is_empty() {
                        image = Some(ImageUpload {
                            file_name,
                            content_type,
                            data,
                        });
                    }
                }
                _ => {}
            }
        }

        Ok(Self(PostForm::new(&text, group.as_deref(), image)))
    }
}

/// A submitted comment form.
///
/// Never rejects: a body that is neither url-encoded nor multipart, or
/// that cannot be read, yields an empty form, which the comment service
/// then drops like any other invalid comment.
#[derive(Debug, Clone, Default)]
pub struct CommentSubmission(pub CommentForm);

impl<S> FromRequest<S> for CommentSubmission
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let text = if is_multipart(&req) {
            multipart_text(req, state).await
        } else {
            Form::<CommentForm>::from_request(req, state)
                .await
                .ok()
                .map(|Form(form)| form.text)
        };

        Ok(Self(CommentForm {
            text: text.unwrap_or_default(),
        }))
    }
}

fn is_multipart(req: &Request) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"))
}

/// The `text` part of a multipart body, if it can be read.
async fn multipart_text<S>(req: Request, state: &S) -> Option<String>
where
    S: Send + Sync,
{
    let mut multipart = Multipart::from_request(req, state).await.ok()?;

    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some("text") {
            return field.text().await.ok();
        }
    }

    None
}
