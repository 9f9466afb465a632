use super::DBClient;
use crate::models::User;

/// User database operations trait
pub trait UserExt {
    /// Get single user by id, username, or email.
    /// Returns Option - Some(user) if found, None if not found.
    async fn get_user(
        &self,
        user_id: Option<i32>,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<User>, sqlx::Error>;

    /// Create new user with an already-hashed password.
    async fn save_user(
        &self,
        username: &str,
        email: &str,
        hashed_password: &str,
        full_name: Option<&str>,
    ) -> Result<User, sqlx::Error>;
}

impl UserExt for DBClient {
    async fn get_user(
        &self,
        user_id: Option<i32>,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<User>, sqlx::Error> {
        let mut user: Option<User> = None;

        if let Some(user_id) = user_id {
            user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        } else if let Some(username) = username {
            user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;
        } else if let Some(email) = email {
            user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;
        }

        Ok(user)
    }

    async fn save_user(
        &self,
        username: &str,
        email: &str,
        hashed_password: &str,
        full_name: Option<&str>,
    ) -> Result<User, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, hashed_password, full_name)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(hashed_password)
        .bind(full_name)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }
}
