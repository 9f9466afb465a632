use super::DBClient;
use crate::models::Comment;

/// Comment database operations trait
pub trait CommentExt {
    /// Fetch one comment by id, active or not. Handlers need the row before
    /// deciding between NotFound and Forbidden.
    async fn get_comment(&self, comment_id: i32) -> Result<Option<Comment>, sqlx::Error>;

    /// Active comments for a recipe. No published check on the parent
    /// recipe, matching the listing semantics of the reference.
    async fn get_recipe_comments(&self, recipe_id: i32) -> Result<Vec<Comment>, sqlx::Error>;

    async fn create_comment(
        &self,
        author_id: i32,
        recipe_id: i32,
        content: &str,
        parent_id: Option<i32>,
    ) -> Result<Comment, sqlx::Error>;

    /// Full content replacement. Ownership is checked by the caller.
    async fn edit_comment(&self, comment_id: i32, content: &str) -> Result<Comment, sqlx::Error>;

    /// Soft delete: flips is_active to false, the row stays.
    async fn soft_delete_comment(&self, comment_id: i32) -> Result<(), sqlx::Error>;

    /// Count comments authored by one user.
    async fn get_user_comment_count(&self, author_id: i32) -> Result<i64, sqlx::Error>;
}

impl CommentExt for DBClient {
    async fn get_comment(&self, comment_id: i32) -> Result<Option<Comment>, sqlx::Error> {
        let comment = sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE id = $1")
            .bind(comment_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(comment)
    }

    async fn get_recipe_comments(&self, recipe_id: i32) -> Result<Vec<Comment>, sqlx::Error> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT * FROM comments
            WHERE recipe_id = $1 AND is_active = TRUE
            ORDER BY id
            "#,
        )
        .bind(recipe_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }

    async fn create_comment(
        &self,
        author_id: i32,
        recipe_id: i32,
        content: &str,
        parent_id: Option<i32>,
    ) -> Result<Comment, sqlx::Error> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (content, recipe_id, author_id, parent_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(content)
        .bind(recipe_id)
        .bind(author_id)
        .bind(parent_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(comment)
    }

    async fn edit_comment(&self, comment_id: i32, content: &str) -> Result<Comment, sqlx::Error> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            UPDATE comments
            SET content = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING *
            "#,
        )
        .bind(content)
        .bind(comment_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(comment)
    }

    async fn soft_delete_comment(&self, comment_id: i32) -> Result<(), sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE comments
            SET is_active = FALSE, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(comment_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }

        Ok(())
    }

    async fn get_user_comment_count(&self, author_id: i32) -> Result<i64, sqlx::Error> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM comments WHERE author_id = $1")
                .bind(author_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}
