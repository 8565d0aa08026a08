pub mod sqlx_repo;
pub mod user;
pub mod token;
pub mod project;
pub mod skill;
pub mod category;
pub mod testimonial;
pub mod dashboard;
