use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::entities::validation::validate_not_blank;

const MAX_NAME_LENGTH: u64 = 100;
const MAX_DESCRIPTION_LENGTH: u64 = 1_000;

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub category_id: i32,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryInsert {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRequest {
    #[serde(default)]
    pub category_id: Option<i32>,

    #[validate(
        length(min = 1, max = MAX_NAME_LENGTH, message = "Name must be between 1 and 100 characters"),
        custom(function = "validate_not_blank")
    )]
    pub name: String,

    #[serde(default)]
    #[validate(length(max = MAX_DESCRIPTION_LENGTH, message = "Description must be at most 1000 characters"))]
    pub description: String,
}

impl CategoryRequest {
    pub fn prepare(&self) -> CategoryInsert {
        CategoryInsert {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
        }
    }
}
