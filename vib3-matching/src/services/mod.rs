pub mod discovery_service;
pub mod profiles;
pub mod swipe_service;
