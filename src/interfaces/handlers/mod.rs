pub mod auth;
pub mod catalog;
pub mod categories;
pub mod home;
pub mod json_error;
pub mod projects;
pub mod skills;
pub mod static_files;
pub mod system;
pub mod testimonials;
pub mod users;
