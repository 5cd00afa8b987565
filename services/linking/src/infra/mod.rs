pub mod memory;
pub mod scheduler;
