use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{entities::validation::validate_not_blank, utils::markdown::strip_html};

const MAX_AUTHOR_LENGTH: u64 = 100;
const MAX_CONTENT_LENGTH: u64 = 2_000;
pub const ANONYMOUS_AUTHOR: &str = "Anonymous";

/// Stored row and the public projection share the same shape.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Testimonial {
    pub testimonial_id: i32,
    pub author_name: String,
    pub content: String,
    pub date_posted: DateTime<Utc>,
    pub project_id: i32,
}

#[derive(Debug, Clone, PartialEq, Validate)]
pub struct TestimonialInsert {
    #[validate(
        length(min = 1, max = MAX_AUTHOR_LENGTH, message = "Author name must be between 1 and 100 characters"),
        custom(function = "validate_not_blank")
    )]
    pub author_name: String,

    #[validate(
        length(min = 1, max = MAX_CONTENT_LENGTH, message = "Content must be between 1 and 2000 characters"),
        custom(function = "validate_not_blank")
    )]
    pub content: String,

    pub date_posted: DateTime<Utc>,
    pub project_id: i32,
}

#[derive(Debug, Clone, PartialEq, Validate)]
pub struct TestimonialUpdate {
    #[validate(
        length(min = 1, max = MAX_AUTHOR_LENGTH, message = "Author name must be between 1 and 100 characters"),
        custom(function = "validate_not_blank")
    )]
    pub author_name: String,

    #[validate(
        length(min = 1, max = MAX_CONTENT_LENGTH, message = "Content must be between 1 and 2000 characters"),
        custom(function = "validate_not_blank")
    )]
    pub content: String,

    /// `None` keeps the stored posting date.
    pub date_posted: Option<DateTime<Utc>>,
    pub project_id: i32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTestimonialRequest {
    #[serde(default)]
    pub author_name: Option<String>,
    pub content: String,
    pub project_id: i32,
}

impl From<NewTestimonialRequest> for TestimonialInsert {
    fn from(request: NewTestimonialRequest) -> Self {
        TestimonialInsert {
            author_name: clean_author(request.author_name.as_deref()),
            content: strip_html(&request.content).trim().to_string(),
            date_posted: Utc::now(),
            project_id: request.project_id,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTestimonialRequest {
    #[serde(default)]
    pub testimonial_id: Option<i32>,
    #[serde(default)]
    pub author_name: Option<String>,
    pub content: String,
    pub project_id: i32,
    #[serde(default)]
    pub date_posted: Option<DateTime<Utc>>,
}

impl UpdateTestimonialRequest {
    pub fn prepare(&self) -> TestimonialUpdate {
        TestimonialUpdate {
            author_name: clean_author(self.author_name.as_deref()),
            content: strip_html(&self.content).trim().to_string(),
            date_posted: self.date_posted,
            project_id: self.project_id,
        }
    }
}

fn clean_author(author: Option<&str>) -> String {
    author
        .map(|name| strip_html(name).trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| ANONYMOUS_AUTHOR.to_string())
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestimonialQuery {
    #[serde(default, alias = "projectid", alias = "project_id")]
    pub project_id: Option<i32>,
}
