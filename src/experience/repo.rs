use anyhow::Context;
use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    content::ContentRepo,
    db::PgStore,
    experience::repo_types::{Experience, ExperienceDraft},
};

const COLUMNS: &str = "id, company, position, description, technologies, start_date, end_date, \
                       is_current, sort_order, created_at, updated_at";

#[async_trait]
impl ContentRepo<Experience> for PgStore {
    async fn list(&self) -> anyhow::Result<Vec<Experience>> {
        let rows = sqlx::query_as::<_, Experience>(&format!(
            "SELECT {COLUMNS} FROM experiences ORDER BY sort_order ASC, created_at DESC, id ASC"
        ))
        .fetch_all(&self.db)
        .await
        .context("list experience")?;
        Ok(rows)
    }

    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Experience>> {
        let row = sqlx::query_as::<_, Experience>(&format!(
            "SELECT {COLUMNS} FROM experiences WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("get experience")?;
        Ok(row)
    }

    async fn create(&self, d: ExperienceDraft) -> anyhow::Result<Experience> {
        let row = sqlx::query_as::<_, Experience>(&format!(
            r#"
            INSERT INTO experiences (id, company, position, description, technologies,
                                     start_date, end_date, is_current, sort_order)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&d.company)
        .bind(&d.position)
        .bind(&d.description)
        .bind(&d.technologies)
        .bind(d.start_date)
        .bind(d.end_date)
        .bind(d.current)
        .bind(d.order)
        .fetch_one(&self.db)
        .await
        .context("insert experience")?;
        Ok(row)
    }

    async fn update(&self, id: Uuid, d: ExperienceDraft) -> anyhow::Result<Option<Experience>> {
        let row = sqlx::query_as::<_, Experience>(&format!(
            r#"
            UPDATE experiences
               SET company = $2, position = $3, description = $4, technologies = $5,
                   start_date = $6, end_date = $7, is_current = $8, sort_order = $9,
                   updated_at = now()
             WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&d.company)
        .bind(&d.position)
        .bind(&d.description)
        .bind(&d.technologies)
        .bind(d.start_date)
        .bind(d.end_date)
        .bind(d.current)
        .bind(d.order)
        .fetch_optional(&self.db)
        .await
        .context("update experience")?;
        Ok(row)
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM experiences WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .context("delete experience")?;
        Ok(res.rows_affected() > 0)
    }
}
