pub mod db;
pub mod media;

pub use db::{checkout, create_pool, DbConn, DbPool};
pub use media::{MediaConfig, MediaStore, StoredObject};
