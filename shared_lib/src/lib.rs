pub mod activity_log;
pub mod env_utils;
pub mod structs;
pub mod utils;
