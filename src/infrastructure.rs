pub mod limiter;
pub mod mail;
pub mod sheets;
pub mod utils;
