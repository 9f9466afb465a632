use super::DBClient;
use crate::models::Rating;

/// Rating database operations trait
pub trait RatingExt {
    /// Insert-or-update keyed on the (user_id, recipe_id) unique
    /// constraint. Concurrent submissions for the same pair serialize in
    /// Postgres instead of racing a read-then-write; the second writer's
    /// value wins.
    async fn upsert_rating(
        &self,
        user_id: i32,
        recipe_id: i32,
        value: f64,
    ) -> Result<Rating, sqlx::Error>;

    /// A user's own rating for a recipe, if any.
    async fn get_user_rating(
        &self,
        user_id: i32,
        recipe_id: i32,
    ) -> Result<Option<Rating>, sqlx::Error>;

    /// Delete the caller's rating row. RowNotFound when none exists.
    async fn delete_rating(&self, user_id: i32, recipe_id: i32) -> Result<(), sqlx::Error>;

    /// All rating values for a recipe, for read-time aggregation.
    async fn get_recipe_rating_values(&self, recipe_id: i32) -> Result<Vec<f64>, sqlx::Error>;
}

impl RatingExt for DBClient {
    async fn upsert_rating(
        &self,
        user_id: i32,
        recipe_id: i32,
        value: f64,
    ) -> Result<Rating, sqlx::Error> {
        let rating = sqlx::query_as::<_, Rating>(
            r#"
            INSERT INTO ratings (rating, recipe_id, user_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, recipe_id)
            DO UPDATE SET rating = EXCLUDED.rating, updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(value)
        .bind(recipe_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(rating)
    }

    async fn get_user_rating(
        &self,
        user_id: i32,
        recipe_id: i32,
    ) -> Result<Option<Rating>, sqlx::Error> {
        let rating = sqlx::query_as::<_, Rating>(
            "SELECT * FROM ratings WHERE user_id = $1 AND recipe_id = $2",
        )
        .bind(user_id)
        .bind(recipe_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(rating)
    }

    async fn delete_rating(&self, user_id: i32, recipe_id: i32) -> Result<(), sqlx::Error> {
        let result = sqlx::query("DELETE FROM ratings WHERE user_id = $1 AND recipe_id = $2")
            .bind(user_id)
            .bind(recipe_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }

        Ok(())
    }

    async fn get_recipe_rating_values(&self, recipe_id: i32) -> Result<Vec<f64>, sqlx::Error> {
        let values =
            sqlx::query_scalar::<_, f64>("SELECT rating FROM ratings WHERE recipe_id = $1")
                .bind(recipe_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(values)
    }
}
