pub mod body;
pub mod reactions;
pub mod roles;
pub mod status;
pub mod visibility;
