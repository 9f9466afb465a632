pub mod auth;
pub mod comment;
pub mod rating;
pub mod recipe;
pub mod users;
