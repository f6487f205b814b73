pub mod auth;
pub mod google;
