use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::content::ContentEntity;

pub const MIN_LEVEL: i32 = 1;
pub const MAX_LEVEL: i32 = 100;
pub const DEFAULT_LEVEL: i32 = 50;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub level: i32, // MIN_LEVEL..=MAX_LEVEL
    pub icon: Option<String>,
    #[sqlx(rename = "sort_order")]
    pub order: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkillDraft {
    pub name: String,
    pub category: String,
    pub level: i32,
    pub icon: Option<String>,
    pub order: i32,
}

impl ContentEntity for Skill {
    type Draft = SkillDraft;

    fn id(&self) -> Uuid {
        self.id
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    fn from_draft(id: Uuid, d: SkillDraft, now: OffsetDateTime) -> Self {
        Self {
            id,
            name: d.name,
            category: d.category,
            level: d.level,
            icon: d.icon,
            order: d.order,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, d: SkillDraft, now: OffsetDateTime) {
        self.name = d.name;
        self.category = d.category;
        self.level = d.level;
        self.icon = d.icon;
        self.order = d.order;
        self.updated_at = now;
    }
}
