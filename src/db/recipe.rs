use super::DBClient;
use crate::dtos::{RecipeCreateDto, RecipeUpdateDto};
use crate::models::Recipe;

/// Recipe database operations trait
pub trait RecipeExt {
    /// Fetch one recipe by id, published or not. The published filter only
    /// applies to listings; single-item fetch deliberately skips it.
    async fn get_recipe(&self, recipe_id: i32) -> Result<Option<Recipe>, sqlx::Error>;

    /// List published recipes with offset/limit pagination and an optional
    /// case-sensitive substring match on the title.
    async fn list_recipes(
        &self,
        skip: i64,
        limit: i64,
        search: Option<&str>,
    ) -> Result<Vec<Recipe>, sqlx::Error>;

    async fn create_recipe(
        &self,
        author_id: i32,
        recipe: &RecipeCreateDto,
    ) -> Result<Recipe, sqlx::Error>;

    /// Sparse update: NULL arguments fall through to the stored value via
    /// COALESCE. Ownership is checked by the caller before this runs.
    async fn update_recipe(
        &self,
        recipe_id: i32,
        update: &RecipeUpdateDto,
    ) -> Result<Recipe, sqlx::Error>;

    /// Hard delete. Dependent comments, ratings and votes go with the
    /// recipe via ON DELETE CASCADE.
    async fn delete_recipe(&self, recipe_id: i32) -> Result<(), sqlx::Error>;

    /// Count recipes authored by one user.
    async fn get_user_recipe_count(&self, author_id: i32) -> Result<i64, sqlx::Error>;
}

impl RecipeExt for DBClient {
    async fn get_recipe(&self, recipe_id: i32) -> Result<Option<Recipe>, sqlx::Error> {
        let recipe = sqlx::query_as::<_, Recipe>("SELECT * FROM recipes WHERE id = $1")
            .bind(recipe_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(recipe)
    }

    async fn list_recipes(
        &self,
        skip: i64,
        limit: i64,
        search: Option<&str>,
    ) -> Result<Vec<Recipe>, sqlx::Error> {
        let recipes = sqlx::query_as::<_, Recipe>(
            r#"
            SELECT * FROM recipes
            WHERE is_published = TRUE
              AND ($1::text IS NULL OR title LIKE '%' || $1 || '%')
            ORDER BY id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(search)
        .bind(limit)
        .bind(skip)
        .fetch_all(&self.pool)
        .await?;

        Ok(recipes)
    }

    async fn create_recipe(
        &self,
        author_id: i32,
        recipe: &RecipeCreateDto,
    ) -> Result<Recipe, sqlx::Error> {
        let recipe = sqlx::query_as::<_, Recipe>(
            r#"
            INSERT INTO recipes
                (title, description, ingredients, instructions, prep_time,
                 cook_time, servings, difficulty, image_url, author_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(&recipe.title)
        .bind(&recipe.description)
        .bind(&recipe.ingredients)
        .bind(&recipe.instructions)
        .bind(recipe.prep_time)
        .bind(recipe.cook_time)
        .bind(recipe.servings)
        .bind(&recipe.difficulty)
        .bind(&recipe.image_url)
        .bind(author_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(recipe)
    }

    async fn update_recipe(
        &self,
        recipe_id: i32,
        update: &RecipeUpdateDto,
    ) -> Result<Recipe, sqlx::Error> {
        let recipe = sqlx::query_as::<_, Recipe>(
            r#"
            UPDATE recipes
            SET title        = COALESCE($1, title),
                description  = COALESCE($2, description),
                ingredients  = COALESCE($3, ingredients),
                instructions = COALESCE($4, instructions),
                prep_time    = COALESCE($5, prep_time),
                cook_time    = COALESCE($6, cook_time),
                servings     = COALESCE($7, servings),
                difficulty   = COALESCE($8, difficulty),
                image_url    = COALESCE($9, image_url),
                updated_at   = NOW()
            WHERE id = $10
            RETURNING *
            "#,
        )
        .bind(&update.title)
        .bind(&update.description)
        .bind(&update.ingredients)
        .bind(&update.instructions)
        .bind(update.prep_time)
        .bind(update.cook_time)
        .bind(update.servings)
        .bind(&update.difficulty)
        .bind(&update.image_url)
        .bind(recipe_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(recipe)
    }

    async fn delete_recipe(&self, recipe_id: i32) -> Result<(), sqlx::Error> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(recipe_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }

        Ok(())
    }

    async fn get_user_recipe_count(&self, author_id: i32) -> Result<i64, sqlx::Error> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM recipes WHERE author_id = $1")
                .bind(author_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}
