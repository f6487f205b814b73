pub mod contact_me;
pub mod home;
pub mod static_files;
pub mod system;
