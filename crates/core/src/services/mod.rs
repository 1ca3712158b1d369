//! Business logic services.

#![allow(missing_docs)]

pub mod comment;
pub mod following;
pub mod group;
pub mod post;
pub mod user;

pub use comment::CommentService;
pub use following::{FollowCounts, FollowResult, FollowingService};
pub use group::{CreateGroupInput, GroupService};
pub use post::{AuthorPosts, CommentCard, GroupPosts, PostCard, PostDetail, PostService};
pub use user::{Session, UserService};
