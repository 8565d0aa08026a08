use actix_multipart::form::{tempfile::TempFile, MultipartForm};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    entities::{
        category::Category,
        skill::Skill,
        testimonial::Testimonial,
        validation::{normalize_ids, validate_http_url, validate_image_url, validate_not_blank, MAX_IMAGE_URL_LENGTH},
    },
    errors::AppError,
    utils::markdown::safe_markdown_to_html,
};

const MAX_TITLE_LENGTH: u64 = 200;
const MAX_DESCRIPTION_LENGTH: u64 = 10_000;

// ───── Database Models ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Project {
    pub project_id: i32,
    pub title: String,
    pub description: String,
    pub project_url: String,
    pub image_url: Option<String>,
    pub date_created: DateTime<Utc>,
}

/// A skill row joined with the project it is attached to.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProjectSkillRow {
    pub project_id: i32,
    pub skill_id: i32,
    pub name: String,
    pub description: String,
}

/// A category row joined with the project it is attached to.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProjectCategoryRow {
    pub project_id: i32,
    pub category_id: i32,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectInsert {
    pub title: String,
    pub description: String,
    pub project_url: String,
    pub image_url: Option<String>,
    pub date_created: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectUpdate {
    pub title: String,
    pub description: String,
    pub project_url: String,
    pub image_url: Option<String>,
    /// `None` keeps the stored creation date.
    pub date_created: Option<DateTime<Utc>>,
}

// ───── Requests ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewProjectRequest {
    #[validate(
        length(min = 1, max = MAX_TITLE_LENGTH, message = "Title must be between 1 and 200 characters"),
        custom(function = "validate_not_blank")
    )]
    pub title: String,

    #[serde(default)]
    #[validate(length(max = MAX_DESCRIPTION_LENGTH, message = "Description must be at most 10000 characters"))]
    pub description: String,

    #[validate(custom(function = "validate_http_url"))]
    pub project_url: String,

    #[serde(default)]
    #[validate(
        length(max = MAX_IMAGE_URL_LENGTH, message = "Image URL must be at most 500 characters"),
        custom(function = "validate_image_url")
    )]
    pub image_url: Option<String>,

    #[serde(default)]
    pub skill_ids: Vec<i32>,

    #[serde(default)]
    pub category_ids: Vec<i32>,
}

impl NewProjectRequest {
    /// Trims text fields and maps a blank image URL to `None`; run before `validate`.
    pub fn normalized(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self.project_url = self.project_url.trim().to_string();
        self.image_url = clean_image_url(&self.image_url);
        self
    }

    pub fn prepare_for_insert(&self) -> ProjectInsert {
        ProjectInsert {
            title: self.title.trim().to_string(),
            description: self.description.clone(),
            project_url: self.project_url.trim().to_string(),
            image_url: clean_image_url(&self.image_url),
            date_created: Utc::now(),
        }
    }

    pub fn skill_ids(&self) -> Vec<i32> {
        normalize_ids(&self.skill_ids)
    }

    pub fn category_ids(&self) -> Vec<i32> {
        normalize_ids(&self.category_ids)
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    /// Must match the id in the route when present.
    #[serde(default)]
    pub project_id: Option<i32>,

    #[validate(
        length(min = 1, max = MAX_TITLE_LENGTH, message = "Title must be between 1 and 200 characters"),
        custom(function = "validate_not_blank")
    )]
    pub title: String,

    #[serde(default)]
    #[validate(length(max = MAX_DESCRIPTION_LENGTH, message = "Description must be at most 10000 characters"))]
    pub description: String,

    #[validate(custom(function = "validate_http_url"))]
    pub project_url: String,

    #[serde(default)]
    #[validate(
        length(max = MAX_IMAGE_URL_LENGTH, message = "Image URL must be at most 500 characters"),
        custom(function = "validate_image_url")
    )]
    pub image_url: Option<String>,

    #[serde(default)]
    pub date_created: Option<DateTime<Utc>>,

    #[serde(default)]
    pub skill_ids: Vec<i32>,

    #[serde(default)]
    pub category_ids: Vec<i32>,
}

impl UpdateProjectRequest {
    pub fn normalized(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self.project_url = self.project_url.trim().to_string();
        self.image_url = clean_image_url(&self.image_url);
        self
    }

    pub fn prepare_for_update(&self) -> ProjectUpdate {
        ProjectUpdate {
            title: self.title.trim().to_string(),
            description: self.description.clone(),
            project_url: self.project_url.trim().to_string(),
            image_url: clean_image_url(&self.image_url),
            date_created: self.date_created,
        }
    }

    pub fn skill_ids(&self) -> Vec<i32> {
        normalize_ids(&self.skill_ids)
    }

    pub fn category_ids(&self) -> Vec<i32> {
        normalize_ids(&self.category_ids)
    }
}

fn clean_image_url(image_url: &Option<String>) -> Option<String> {
    image_url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(str::to_string)
}

/// Query parameters for `GET /api/ProjectsAPI/filter`.
///
/// Keys may repeat (`?skillId=1&skillId=2`) and are matched case-insensitively.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectFilter {
    pub skill_ids: Vec<i32>,
    pub category_ids: Vec<i32>,
}

impl ProjectFilter {
    pub fn from_query_string(query: &str) -> Result<Self, AppError> {
        let mut filter = ProjectFilter::default();

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            let target = if key.eq_ignore_ascii_case("skillId") || key.eq_ignore_ascii_case("skillIds") {
                &mut filter.skill_ids
            } else if key.eq_ignore_ascii_case("categoryId") || key.eq_ignore_ascii_case("categoryIds") {
                &mut filter.category_ids
            } else {
                continue;
            };

            let value = value.trim();
            if value.is_empty() {
                continue;
            }

            let id = value.parse::<i32>().map_err(|_| {
                AppError::InvalidInput(format!("'{}' is not a valid value for {}", value, key))
            })?;
            target.push(id);
        }

        filter.skill_ids = normalize_ids(&filter.skill_ids);
        filter.category_ids = normalize_ids(&filter.category_ids);
        Ok(filter)
    }

    pub fn is_empty(&self) -> bool {
        self.skill_ids.is_empty() && self.category_ids.is_empty()
    }
}

/// `multipart/form-data` body of the image upload endpoint; the file goes in the `image` field.
#[derive(MultipartForm)]
pub struct ProjectImageUpload {
    pub image: TempFile,
}

// ───── Responses ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResponse {
    pub project_id: i32,
    pub title: String,
    pub description: String,
    pub description_html: String,
    pub project_url: String,
    pub image_url: Option<String>,
    pub date_created: DateTime<Utc>,
    pub skills: Vec<Skill>,
    pub categories: Vec<Category>,
    pub testimonials: Vec<Testimonial>,
}

impl ProjectResponse {
    pub fn from_parts(
        project: Project,
        skills: Vec<Skill>,
        categories: Vec<Category>,
        testimonials: Vec<Testimonial>,
    ) -> Self {
        ProjectResponse {
            project_id: project.project_id,
            description_html: safe_markdown_to_html(&project.description),
            title: project.title,
            description: project.description,
            project_url: project.project_url,
            image_url: project.image_url,
            date_created: project.date_created,
            skills,
            categories,
            testimonials,
        }
    }
}

impl From<ProjectSkillRow> for Skill {
    fn from(row: ProjectSkillRow) -> Self {
        Skill {
            skill_id: row.skill_id,
            name: row.name,
            description: row.description,
        }
    }
}

impl From<ProjectCategoryRow> for Category {
    fn from(row: ProjectCategoryRow) -> Self {
        Category {
            category_id: row.category_id,
            name: row.name,
            description: row.description,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> NewProjectRequest {
        NewProjectRequest {
            title: "Virtual Museum".into(),
            description: "A **3D** portfolio".into(),
            project_url: "https://github.com/someone/museum".into(),
            image_url: Some("/images/projects/museum.png".into()),
            skill_ids: vec![2, 1, 2],
            category_ids: vec![],
        }
    }

    #[test]
    fn valid_request_passes_validation() {
        assert!(valid_request().validate().is_ok());
    }

    #[test]
    fn blank_title_is_rejected() {
        let mut request = valid_request();
        request.title = "   ".into();
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("title"));
    }

    #[test]
    fn overlong_title_is_rejected() {
        let mut request = valid_request();
        request.title = "x".repeat(201);
        assert!(request.validate().is_err());
    }

    #[test]
    fn non_http_project_url_is_rejected() {
        let mut request = valid_request();
        request.project_url = "javascript:alert(1)".into();
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("project_url"));
    }

    #[test]
    fn insert_trims_and_deduplicates() {
        let mut request = valid_request();
        request.title = "  Virtual Museum ".into();
        request.image_url = Some("   ".into());

        let insert = request.prepare_for_insert();
        assert_eq!(insert.title, "Virtual Museum");
        assert_eq!(insert.image_url, None);
        assert_eq!(request.skill_ids(), vec![1, 2]);
    }

    #[test]
    fn surrounding_whitespace_does_not_fail_validation() {
        let mut request = valid_request();
        request.title = format!("{} ", "x".repeat(200));
        request.image_url = Some(" /images/projects/museum.png".into());
        assert!(request.clone().validate().is_err());

        let request = request.normalized();
        assert!(request.validate().is_ok());
        assert_eq!(request.title.len(), 200);
        assert_eq!(request.image_url.as_deref(), Some("/images/projects/museum.png"));
    }

    #[test]
    fn blank_image_url_is_treated_as_absent() {
        let mut request = valid_request();
        request.image_url = Some(String::new());

        let request = request.normalized();
        assert_eq!(request.image_url, None);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn update_request_accepts_camel_case() {
        let json = serde_json::json!({
            "projectId": 4,
            "title": "Museum",
            "projectUrl": "https://example.com",
            "skillIds": [1],
            "categoryIds": [3, 3]
        });
        let request: UpdateProjectRequest = serde_json::from_value(json).unwrap();
        assert_eq!(request.project_id, Some(4));
        assert_eq!(request.category_ids(), vec![3]);
        assert!(request.prepare_for_update().date_created.is_none());
    }

    #[test]
    fn filter_parses_repeated_keys() {
        let filter = ProjectFilter::from_query_string("skillId=1&skillId=2&categoryid=3&page=1").unwrap();
        assert_eq!(filter.skill_ids, vec![1, 2]);
        assert_eq!(filter.category_ids, vec![3]);
    }

    #[test]
    fn filter_rejects_non_numeric_ids() {
        let result = ProjectFilter::from_query_string("skillId=abc");
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn empty_filter() {
        let filter = ProjectFilter::from_query_string("").unwrap();
        assert!(filter.is_empty());
    }

    #[test]
    fn response_renders_sanitized_markdown() {
        let project = Project {
            project_id: 1,
            title: "Museum".into(),
            description: "**bold** <script>alert(1)</script>".into(),
            project_url: "https://example.com".into(),
            image_url: None,
            date_created: Utc::now(),
        };
        let response = ProjectResponse::from_parts(project, vec![], vec![], vec![]);
        assert!(response.description_html.contains("<strong>bold</strong>"));
        assert!(!response.description_html.contains("<script>"));

        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("descriptionHtml").is_some());
        assert!(json.get("projectUrl").is_some());
    }
}
