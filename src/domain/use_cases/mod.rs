pub mod auth;
pub mod categories;
pub mod dashboard;
pub mod extractors;
pub mod projects;
pub mod skills;
pub mod testimonials;
