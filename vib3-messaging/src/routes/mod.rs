pub mod chats;
pub mod health;
pub mod match_thread;
pub mod messages;
