use serde::{Deserialize, Serialize};

use crate::{
    content::{clean_list, optional, required},
    error::ApiError,
    projects::repo_types::{Project, ProjectDraft},
};

/// Create/update body. Unknown fields (`id`, timestamps) are ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub full_description: Option<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub live_url: Option<String>,
    pub github_url: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub order: i32,
}

impl ProjectInput {
    pub fn into_draft(self) -> Result<ProjectDraft, ApiError> {
        let title = required("title", self.title).map_err(ApiError::Validation)?;
        let description = required("description", self.description).map_err(ApiError::Validation)?;
        let category = required("category", self.category).map_err(ApiError::Validation)?;
        Ok(ProjectDraft {
            title,
            description,
            full_description: optional(self.full_description),
            technologies: clean_list(self.technologies),
            images: clean_list(self.images),
            live_url: optional(self.live_url),
            github_url: optional(self.github_url),
            category,
            featured: self.featured,
            order: self.order,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ProjectListResponse {
    pub projects: Vec<Project>,
}

#[derive(Debug, Serialize)]
pub struct ProjectResponse {
    pub project: Project,
}
