use anyhow::Context;
use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    content::ContentRepo,
    db::PgStore,
    projects::repo_types::{Project, ProjectDraft},
};

const COLUMNS: &str = "id, title, description, full_description, technologies, images, \
                       live_url, github_url, category, featured, sort_order, created_at, updated_at";

#[async_trait]
impl ContentRepo<Project> for PgStore {
    async fn list(&self) -> anyhow::Result<Vec<Project>> {
        let rows = sqlx::query_as::<_, Project>(&format!(
            "SELECT {COLUMNS} FROM projects ORDER BY sort_order ASC, created_at DESC, id ASC"
        ))
        .fetch_all(&self.db)
        .await
        .context("list projects")?;
        Ok(rows)
    }

    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Project>> {
        let row = sqlx::query_as::<_, Project>(&format!(
            "SELECT {COLUMNS} FROM projects WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("get project")?;
        Ok(row)
    }

    async fn create(&self, d: ProjectDraft) -> anyhow::Result<Project> {
        let row = sqlx::query_as::<_, Project>(&format!(
            r#"
            INSERT INTO projects (id, title, description, full_description, technologies, images,
                                  live_url, github_url, category, featured, sort_order)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&d.title)
        .bind(&d.description)
        .bind(&d.full_description)
        .bind(&d.technologies)
        .bind(&d.images)
        .bind(&d.live_url)
        .bind(&d.github_url)
        .bind(&d.category)
        .bind(d.featured)
        .bind(d.order)
        .fetch_one(&self.db)
        .await
        .context("insert project")?;
        Ok(row)
    }

    async fn update(&self, id: Uuid, d: ProjectDraft) -> anyhow::Result<Option<Project>> {
        let row = sqlx::query_as::<_, Project>(&format!(
            r#"
            UPDATE projects
               SET title = $2, description = $3, full_description = $4, technologies = $5,
                   images = $6, live_url = $7, github_url = $8, category = $9,
                   featured = $10, sort_order = $11, updated_at = now()
             WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&d.title)
        .bind(&d.description)
        .bind(&d.full_description)
        .bind(&d.technologies)
        .bind(&d.images)
        .bind(&d.live_url)
        .bind(&d.github_url)
        .bind(&d.category)
        .bind(d.featured)
        .bind(d.order)
        .fetch_optional(&self.db)
        .await
        .context("update project")?;
        Ok(row)
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .context("delete project")?;
        Ok(res.rows_affected() > 0)
    }
}
