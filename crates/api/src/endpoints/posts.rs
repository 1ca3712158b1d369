//! Post endpoints: index, detail, create, edit and comments.

use axum::{
    Json, Router,
    extract::{Path, State},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use validator::ValidationErrors;
use yatube_common::{AppError, AppResult};
use yatube_core::{PostForm, Submission};
use yatube_db::entities::post;

use super::{post_url, profile_url};
use crate::{
    extractors::{AuthUser, CommentSubmission, MaybeAuthUser, PageParam, PostSubmission},
    middleware::AppState,
    response::{View, form_errors, found},
};

const INDEX_TEMPLATE: &str = "posts/index.html";
const DETAIL_TEMPLATE: &str = "posts/post_detail.html";
const FORM_TEMPLATE: &str = "posts/create_post.html";

/// Latest posts from everyone.
///
/// Anonymous requests are served from the index cache, keyed by page
/// number. Missing or invalid `page` values share the entry of page 1.
async fn index(
    State(state): State<AppState>,
    MaybeAuthUser(user): MaybeAuthUser,
    PageParam(page): PageParam,
) -> AppResult<Response> {
    let anonymous = user.is_none();

    if anonymous && let Some(document) = state.index_cache.get(page.requested()).await {
        return Ok(Json(document).into_response());
    }

    let page_obj = state.post_service.index(page).await?;
    let number = page_obj.number;
    let view = View::new(INDEX_TEMPLATE, json!({ "page_obj": page_obj }));

    // Stored under the resolved number so out-of-range requests reuse the last page's entry.
    if anonymous {
        state.index_cache.insert(number, view.to_document()).await;
    }

    Ok(view.into_response())
}

/// A single post with its comments and an empty comment form.
async fn post_detail(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> AppResult<View> {
    let detail = state.post_service.detail(&post_id).await?;

    Ok(View::new(
        DETAIL_TEMPLATE,
        json!({
            "post": detail.post,
            "author_post_count": detail.author_post_count,
            "comments": detail.comments,
            "form": { "text": "", "errors": {} },
        }),
    ))
}

async fn post_form_view(
    state: &AppState,
    form: &PostForm,
    errors: Option<&ValidationErrors>,
    editing: Option<&post::Model>,
) -> AppResult<View> {
    let groups = state.post_service.groups().await?;
    let errors = errors.map(form_errors).unwrap_or_default();

    let mut context = json!({
        "form": {
            "text": form.text,
            "group": form.group,
            "errors": errors,
        },
        "groups": groups,
        "is_edit": editing.is_some(),
    });

    if let Some(post) = editing {
        context["post"] = json!(post);
        context["post"]["image_url"] = post
            .image
            .as_deref()
            .map_or(Value::Null, |key| Value::String(state.post_service.image_url(key)));
    }

    Ok(View::new(FORM_TEMPLATE, context))
}

/// Empty form for a new post.
async fn create_form(AuthUser(_user): AuthUser, State(state): State<AppState>) -> AppResult<View> {
    post_form_view(&state, &PostForm::default(), None, None).await
}

/// Publish a post as the signed-in user.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    PostSubmission(form): PostSubmission,
) -> AppResult<Response> {
    let echo = PostForm {
        text: form.text.clone(),
        group: form.group.clone(),
        image: None,
    };

    match state.post_service.create(&user, form).await? {
        Submission::Saved(_) => Ok(found(profile_url(&user.username))),
        Submission::Rejected(errors) => Ok(post_form_view(&state, &echo, Some(&errors), None)
            .await?
            .into_response()),
    }
}

/// Edit form, prefilled. Other users are sent to the post page.
async fn edit_form(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> AppResult<Response> {
    let post = match state.post_service.editable(&user.id, &post_id).await {
        Ok(post) => post,
        Err(AppError::Forbidden(_)) => return Ok(found(post_url(&post_id))),
        Err(e) => return Err(e),
    };

    let form = PostForm {
        text: post.text.clone(),
        group: post.group_id.clone(),
        image: None,
    };

    Ok(post_form_view(&state, &form, None, Some(&post))
        .await?
        .into_response())
}

/// Save an edited post. Other users are sent to the post page.
async fn edit(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    PostSubmission(form): PostSubmission,
) -> AppResult<Response> {
    let echo = PostForm {
        text: form.text.clone(),
        group: form.group.clone(),
        image: None,
    };

    match state.post_service.update(&user.id, &post_id, form).await {
        Ok(Submission::Saved(post)) => Ok(found(post_url(&post.id))),
        Ok(Submission::Rejected(errors)) => {
            let post = state.post_service.get(&post_id).await?;
            Ok(post_form_view(&state, &echo, Some(&errors), Some(&post))
                .await?
                .into_response())
        }
        Err(AppError::Forbidden(_)) => Ok(found(post_url(&post_id))),
        Err(e) => Err(e),
    }
}

/// Comment on a post. Returns to the post page whether or not the comment
/// was accepted; only a missing post is an error.
async fn add_comment(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    CommentSubmission(form): CommentSubmission,
) -> AppResult<Response> {
    state
        .comment_service
        .add(&user.id, &post_id, form)
        .await?;

    Ok(found(post_url(&post_id)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/create/", get(create_form).post(create))
        .route("/posts/{post_id}/", get(post_detail))
        .route("/posts/{post_id}/edit/", get(edit_form).post(edit))
        .route("/posts/{post_id}/comment/", post(add_comment))
}
