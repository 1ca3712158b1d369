//! Repository layer for database access.

mod comment;
mod follow;
mod group;
mod post;
mod user;

pub use comment::CommentRepository;
pub use follow::FollowRepository;
pub use group::GroupRepository;
pub use post::PostRepository;
pub use user::UserRepository;

use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait, Select};
use yatube_common::{AppError, AppResult, Page, PageRequest};

/// Fetch one page of an ordered select.
///
/// Out-of-range page numbers resolve to the nearest valid page, so a page
/// is always returned.
pub(crate) async fn fetch_page<E>(
    db: &DatabaseConnection,
    select: Select<E>,
    per_page: u64,
    request: PageRequest,
) -> AppResult<Page<E::Model>>
where
    E: EntityTrait,
    E::Model: Send + Sync,
{
    let per_page = per_page.max(1);
    let paginator = select.paginate(db, per_page);

    let totals = paginator
        .num_items_and_pages()
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    let number = request.resolve(totals.number_of_pages);

    let items = paginator
        .fetch_page(number - 1)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Page::new(items, number, totals.number_of_items, per_page))
}
