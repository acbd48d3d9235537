pub mod auth_service;
pub mod photo_service;
pub mod profile_service;
