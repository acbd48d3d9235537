pub mod access;
pub mod chat_service;
pub mod match_thread_service;
pub mod message_service;
pub mod profiles;
pub mod thread;
