//! Post service.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use sea_orm::Set;
use serde::Serialize;
use validator::ValidationErrors;
use yatube_common::config::ContentConfig;
use yatube_common::{
    AppError, AppResult, IdGenerator, Page, PageRequest, StorageBackend, generate_storage_key,
};
use yatube_db::{
    entities::{comment, group, post, user},
    repositories::{CommentRepository, GroupRepository, PostRepository, UserRepository},
};

use crate::forms::{ImageUpload, PostForm, Submission, field_error};

/// Storage key prefix for post images.
const IMAGE_PREFIX: &str = "posts";

/// A post with its author and group resolved.
#[derive(Debug, Clone, Serialize)]
pub struct PostCard {
    #[serde(flatten)]
    pub post: post::Model,
    pub author: user::Model,
    pub group: Option<group::Model>,
    pub image_url: Option<String>,
    pub preview: String,
}

/// A comment with its author resolved.
#[derive(Debug, Clone, Serialize)]
pub struct CommentCard {
    #[serde(flatten)]
    pub comment: comment::Model,
    pub author: user::Model,
}

/// A single post with its comments, oldest first.
#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    pub post: PostCard,
    pub author_post_count: u64,
    pub comments: Vec<CommentCard>,
}

/// One page of a group's posts.
#[derive(Debug, Clone, Serialize)]
pub struct GroupPosts {
    pub group: group::Model,
    pub page: Page<PostCard>,
}

/// One page of an author's posts.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorPosts {
    pub author: user::Model,
    pub post_count: u64,
    pub page: Page<PostCard>,
}

/// Post service for business logic.
#[derive(Clone)]
pub struct PostService {
    post_repo: PostRepository,
    user_repo: UserRepository,
    group_repo: GroupRepository,
    comment_repo: CommentRepository,
    storage: Arc<dyn StorageBackend>,
    per_page: u64,
    text_min_len: usize,
    id_gen: IdGenerator,
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    pub fn new(
        post_repo: PostRepository,
        user_repo: UserRepository,
        group_repo: GroupRepository,
        comment_repo: CommentRepository,
        storage: Arc<dyn StorageBackend>,
        content: &ContentConfig,
    ) -> Self {
        Self {
            post_repo,
            user_repo,
            group_repo,
            comment_repo,
            storage,
            per_page: content.posts_per_page,
            text_min_len: content.post_min_len,
            id_gen: IdGenerator::new(),
        }
    }

    // ==================== Listings ====================

    /// Every post, newest first.
    pub async fn index(&self, request: PageRequest) -> AppResult<Page<PostCard>> {
        let page = self.post_repo.page_all(self.per_page, request).await?;
        self.to_cards(page).await
    }

    /// Posts of the group with the given slug.
    pub async fn group_posts(&self, slug: &str, request: PageRequest) -> AppResult<GroupPosts> {
        let group = self.group_repo.get_by_slug(slug).await?;
        let page = self
            .post_repo
            .page_by_group(&group.id, self.per_page, request)
            .await?;

        Ok(GroupPosts {
            page: self.to_cards(page).await?,
            group,
        })
    }

    /// Posts of the user with the given username.
    pub async fn author_posts(&self, username: &str, request: PageRequest) -> AppResult<AuthorPosts> {
        let author = self.user_repo.get_by_username(username).await?;
        let page = self
            .post_repo
            .page_by_author(&author.id, self.per_page, request)
            .await?;

        Ok(AuthorPosts {
            post_count: page.total,
            page: self.to_cards(page).await?,
            author,
        })
    }

    /// Posts by the authors `user_id` follows.
    pub async fn feed(&self, user_id: &str, request: PageRequest) -> AppResult<Page<PostCard>> {
        let page = self
            .post_repo
            .page_followed_by(user_id, self.per_page, request)
            .await?;
        self.to_cards(page).await
    }

    /// Groups a post can be filed under.
    pub async fn groups(&self) -> AppResult<Vec<group::Model>> {
        self.group_repo.find_all().await
    }

    // ==================== Single post ====================

    /// Get a post by ID.
    pub async fn get(&self, post_id: &str) -> AppResult<post::Model> {
        self.post_repo.get_by_id(post_id).await
    }

    /// A post with its comments.
    pub async fn detail(&self, post_id: &str) -> AppResult<PostDetail> {
        let post = self.post_repo.get_by_id(post_id).await?;
        let author_post_count = self.post_repo.count_by_author(&post.author_id).await?;
        let comments = self.comment_repo.find_by_post(&post.id).await?;

        let author_ids: Vec<String> = comments.iter().map(|c| c.author_id.clone()).collect();
        let authors = by_id(self.user_repo.find_by_ids(&author_ids).await?, |u| &u.id);

        let comments = comments
            .into_iter()
            .map(|comment| {
                let author = authors
                    .get(&comment.author_id)
                    .cloned()
                    .ok_or_else(|| AppError::UserNotFound(comment.author_id.clone()))?;
                Ok(CommentCard { comment, author })
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(PostDetail {
            post: self.to_card(post).await?,
            author_post_count,
            comments,
        })
    }

    /// Public URL of a stored image.
    #[must_use]
    pub fn image_url(&self, key: &str) -> String {
        self.storage.public_url(key)
    }

    // ==================== Create / edit ====================

    /// Publish a new post.
    ///
    /// The author is always the signed-in user; `pub_date` is set here and
    /// never changes afterwards.
    pub async fn create(&self, author: &user::Model, form: PostForm) -> AppResult<Submission<post::Model>> {
        let errors = self.check_form(&form).await?;
        if !errors.is_empty() {
            return Ok(Submission::Rejected(errors));
        }

        let image = match &form.image {
            Some(upload) => Some(self.store_image(upload).await?),
            None => None,
        };

        let model = post::ActiveModel {
            id: Set(self.id_gen.generate()),
            text: Set(form.text),
            pub_date: Set(Utc::now().into()),
            author_id: Set(author.id.clone()),
            group_id: Set(form.group),
            image: Set(image.clone()),
        };

        let post = match self.post_repo.create(model).await {
            Ok(post) => post,
            Err(e) => {
                self.discard_image(image.as_deref()).await;
                return Err(e);
            }
        };
        tracing::info!(post_id = %post.id, author_id = %author.id, "Post published");

        Ok(Submission::Saved(post))
    }

    /// Get a post for editing by `user_id`.
    ///
    /// Fails with `Forbidden` unless `user_id` wrote the post.
    pub async fn editable(&self, user_id: &str, post_id: &str) -> AppResult<post::Model> {
        let post = self.post_repo.get_by_id(post_id).await?;
        if post.author_id != user_id {
            return Err(AppError::Forbidden(
                "You can only edit your own posts".to_string(),
            ));
        }
        Ok(post)
    }

    /// Update a post's text, group and image.
    pub async fn update(
        &self,
        user_id: &str,
        post_id: &str,
        form: PostForm,
    ) -> AppResult<Submission<post::Model>> {
        let post = self.editable(user_id, post_id).await?;

        let errors = self.check_form(&form).await?;
        if !errors.is_empty() {
            return Ok(Submission::Rejected(errors));
        }

        let old_image = post.image.clone();
        let mut active: post::ActiveModel = post.into();
        active.text = Set(form.text);
        active.group_id = Set(form.group);

        let stored = match &form.image {
            Some(upload) => Some(self.store_image(upload).await?),
            None => None,
        };
        if let Some(key) = &stored {
            active.image = Set(Some(key.clone()));
        }

        let post = match self.post_repo.update(active).await {
            Ok(post) => post,
            Err(e) => {
                self.discard_image(stored.as_deref()).await;
                return Err(e);
            }
        };
        tracing::info!(post_id = %post.id, "Post updated");

        if stored.is_some() {
            self.discard_image(old_image.as_deref()).await;
        }

        Ok(Submission::Saved(post))
    }

    // ==================== Helpers ====================

    async fn check_form(&self, form: &PostForm) -> AppResult<ValidationErrors> {
        let mut errors = form.check(self.text_min_len);

        if let Some(group_id) = &form.group
            && self.group_repo.find_by_id(group_id).await?.is_none()
        {
            errors.add(
                "group",
                field_error(
                    "invalid_choice",
                    "Select a valid choice. That choice is not one of the available choices.",
                ),
            );
        }

        Ok(errors)
    }

    async fn store_image(&self, upload: &ImageUpload) -> AppResult<String> {
        let key = generate_storage_key(IMAGE_PREFIX, &upload.file_name);
        let stored = self
            .storage
            .upload(&key, &upload.data, &upload.content_type)
            .await?;
        Ok(stored.key)
    }

    /// Remove an image that no post refers to. Failures are only logged.
    async fn discard_image(&self, key: Option<&str>) {
        let Some(key) = key else {
            return;
        };
        if let Err(e) = self.storage.delete(key).await {
            tracing::warn!(error = %e, key = %key, "Failed to delete unused image");
        }
    }

    async fn to_card(&self, post: post::Model) -> AppResult<PostCard> {
        let author = self.user_repo.get_by_id(&post.author_id).await?;
        let group = match &post.group_id {
            Some(id) => self.group_repo.find_by_id(id).await?,
            None => None,
        };
        Ok(self.card(post, author, group))
    }

    async fn to_cards(&self, page: Page<post::Model>) -> AppResult<Page<PostCard>> {
        let author_ids: Vec<String> = page.items.iter().map(|p| p.author_id.clone()).collect();
        let group_ids: Vec<String> = page.items.iter().filter_map(|p| p.group_id.clone()).collect();

        let authors = by_id(self.user_repo.find_by_ids(&author_ids).await?, |u| &u.id);
        let groups = by_id(self.group_repo.find_by_ids(&group_ids).await?, |g| &g.id);

        page.try_map(|post| {
            let author = authors
                .get(&post.author_id)
                .cloned()
                .ok_or_else(|| AppError::UserNotFound(post.author_id.clone()))?;
            let group = post.group_id.as_ref().and_then(|id| groups.get(id).cloned());
            Ok(self.card(post, author, group))
        })
    }

    fn card(&self, post: post::Model, author: user::Model, group: Option<group::Model>) -> PostCard {
        PostCard {
            image_url: post.image.as_deref().map(|key| self.storage.public_url(key)),
            preview: post.preview(),
            post,
            author,
            group,
        }
    }
}

fn by_id<T, F>(items: Vec<T>, key: F) -> HashMap<String, T>
where
    F: Fn(&T) -> &String,
{
    items.into_iter().map(|item| (key(&item).clone(), item)).collect()
}
