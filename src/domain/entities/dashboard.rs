use serde::Serialize;

use crate::entities::{category::Category, project::ProjectResponse, skill::Skill};

#[derive(Debug, Clone, Default, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CatalogCounts {
    pub projects: i64,
    pub reviews: i64,
    pub skills: i64,
    pub categories: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub message: String,
    #[serde(flatten)]
    pub counts: CatalogCounts,
}

/// Everything the non-3D list page renders in one payload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessibilityView {
    pub skills: Vec<Skill>,
    pub categories: Vec<Category>,
    pub projects: Vec<ProjectResponse>,
}
