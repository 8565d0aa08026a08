pub mod category;
pub mod dashboard;
pub mod project;
pub mod skill;
pub mod testimonial;
pub mod token;
pub mod user;
pub mod validation;
