use sqlx::{Pool, Postgres};

mod user;
pub use user::UserExt;

mod recipe;
pub use recipe::RecipeExt;

mod comment;
pub use comment::CommentExt;

mod rating;
pub use rating::RatingExt;

mod vote;
pub use vote::VoteExt;

#[derive(Debug, Clone)]
pub struct DBClient {
    pool: Pool<Postgres>,
}

impl DBClient {
    pub fn new(pool: Pool<Postgres>) -> Self {
        DBClient { pool }
    }
}
