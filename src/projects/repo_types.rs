use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::content::ContentEntity;

/// Portfolio project record.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub full_description: Option<String>,
    pub technologies: Vec<String>,
    pub images: Vec<String>, // image URLs, display order
    pub live_url: Option<String>,
    pub github_url: Option<String>,
    pub category: String,
    pub featured: bool,
    #[sqlx(rename = "sort_order")]
    pub order: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Validated editable fields of a project.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectDraft {
    pub title: String,
    pub description: String,
    pub full_description: Option<String>,
    pub technologies: Vec<String>,
    pub images: Vec<String>,
    pub live_url: Option<String>,
    pub github_url: Option<String>,
    pub category: String,
    pub featured: bool,
    pub order: i32,
}

impl ContentEntity for Project {
    type Draft = ProjectDraft;

    fn id(&self) -> Uuid {
        self.id
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    fn from_draft(id: Uuid, d: ProjectDraft, now: OffsetDateTime) -> Self {
        Self {
            id,
            title: d.title,
            description: d.description,
            full_description: d.full_description,
            technologies: d.technologies,
            images: d.images,
            live_url: d.live_url,
            github_url: d.github_url,
            category: d.category,
            featured: d.featured,
            order: d.order,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, d: ProjectDraft, now: OffsetDateTime) {
        self.title = d.title;
        self.description = d.description;
        self.full_description = d.full_description;
        self.technologies = d.technologies;
        self.images = d.images;
        self.live_url = d.live_url;
        self.github_url = d.github_url;
        self.category = d.category;
        self.featured = d.featured;
        self.order = d.order;
        self.updated_at = now;
    }
}
