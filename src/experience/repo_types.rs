use serde::Serialize;
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::content::ContentEntity;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// Work experience entry.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    pub id: Uuid,
    pub company: String,
    pub position: String,
    pub description: String,
    pub technologies: Vec<String>,
    #[serde(with = "iso_date")]
    pub start_date: Date,
    #[serde(with = "iso_date::option")]
    pub end_date: Option<Date>, // always None while `current`
    #[sqlx(rename = "is_current")]
    pub current: bool,
    #[sqlx(rename = "sort_order")]
    pub order: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExperienceDraft {
    pub company: String,
    pub position: String,
    pub description: String,
    pub technologies: Vec<String>,
    pub start_date: Date,
    pub end_date: Option<Date>,
    pub current: bool,
    pub order: i32,
}

impl ContentEntity for Experience {
    type Draft = ExperienceDraft;

    fn id(&self) -> Uuid {
        self.id
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    fn from_draft(id: Uuid, d: ExperienceDraft, now: OffsetDateTime) -> Self {
        Self {
            id,
            company: d.company,
            position: d.position,
            description: d.description,
            technologies: d.technologies,
            start_date: d.start_date,
            end_date: d.end_date,
            current: d.current,
            order: d.order,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, d: ExperienceDraft, now: OffsetDateTime) {
        self.company = d.company;
        self.position = d.position;
        self.description = d.description;
        self.technologies = d.technologies;
        self.start_date = d.start_date;
        self.end_date = d.end_date;
        self.current = d.current;
        self.order = d.order;
        self.updated_at = now;
    }
}
