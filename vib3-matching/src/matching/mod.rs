pub mod candidates;
pub mod swipe;
