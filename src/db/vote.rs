use super::DBClient;
use crate::models::{CommentVote, VoteType};

/// Comment vote database operations trait
pub trait VoteExt {
    /// Insert-or-update keyed on the (user_id, comment_id) unique
    /// constraint. Re-submitting the same direction is a no-op overwrite.
    async fn upsert_vote(
        &self,
        user_id: i32,
        comment_id: i32,
        vote_type: VoteType,
    ) -> Result<CommentVote, sqlx::Error>;

    /// Delete the caller's vote row. RowNotFound when none exists.
    async fn delete_vote(&self, user_id: i32, comment_id: i32) -> Result<(), sqlx::Error>;

    /// All vote directions for a comment, for read-time tallying.
    async fn get_comment_vote_types(&self, comment_id: i32)
    -> Result<Vec<VoteType>, sqlx::Error>;
}

impl VoteExt for DBClient {
    async fn upsert_vote(
        &self,
        user_id: i32,
        comment_id: i32,
        vote_type: VoteType,
    ) -> Result<CommentVote, sqlx::Error> {
        let vote = sqlx::query_as::<_, CommentVote>(
            r#"
            INSERT INTO comment_votes (vote_type, comment_id, user_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, comment_id)
            DO UPDATE SET vote_type = EXCLUDED.vote_type
            RETURNING *
            "#,
        )
        .bind(vote_type)
        .bind(comment_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(vote)
    }

    async fn delete_vote(&self, user_id: i32, comment_id: i32) -> Result<(), sqlx::Error> {
        let result = sqlx::query("DELETE FROM comment_votes WHERE user_id = $1 AND comment_id = $2")
            .bind(user_id)
            .bind(comment_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }

        Ok(())
    }

    async fn get_comment_vote_types(
        &self,
        comment_id: i32,
    ) -> Result<Vec<VoteType>, sqlx::Error> {
        let types = sqlx::query_scalar::<_, VoteType>(
            "SELECT vote_type FROM comment_votes WHERE comment_id = $1",
        )
        .bind(comment_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(types)
    }
}
