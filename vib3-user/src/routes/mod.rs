pub mod auth;
pub mod health;
pub mod photo;
pub mod profile;
