pub mod repository;
pub mod time;
pub mod types;
