use anyhow::Context;
use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    content::ContentRepo,
    db::PgStore,
    skills::repo_types::{Skill, SkillDraft},
};

const COLUMNS: &str = "id, name, category, level, icon, sort_order, created_at, updated_at";

#[async_trait]
impl ContentRepo<Skill> for PgStore {
    async fn list(&self) -> anyhow::Result<Vec<Skill>> {
        let rows = sqlx::query_as::<_, Skill>(&format!(
            "SELECT {COLUMNS} FROM skills ORDER BY sort_order ASC, created_at DESC, id ASC"
        ))
        .fetch_all(&self.db)
        .await
        .context("list skills")?;
        Ok(rows)
    }

    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Skill>> {
        let row = sqlx::query_as::<_, Skill>(&format!("SELECT {COLUMNS} FROM skills WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .context("get skill")?;
        Ok(row)
    }

    async fn create(&self, d: SkillDraft) -> anyhow::Result<Skill> {
        let row = sqlx::query_as::<_, Skill>(&format!(
            r#"
            INSERT INTO skills (id, name, category, level, icon, sort_order)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&d.name)
        .bind(&d.category)
        .bind(d.level)
        .bind(&d.icon)
        .bind(d.order)
        .fetch_one(&self.db)
        .await
        .context("insert skill")?;
        Ok(row)
    }

    async fn update(&self, id: Uuid, d: SkillDraft) -> anyhow::Result<Option<Skill>> {
        let row = sqlx::query_as::<_, Skill>(&format!(
            r#"
            UPDATE skills
               SET name = $2, category = $3, level = $4, icon = $5, sort_order = $6,
                   updated_at = now()
             WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&d.name)
        .bind(&d.category)
        .bind(d.level)
        .bind(&d.icon)
        .bind(d.order)
        .fetch_optional(&self.db)
        .await
        .context("update skill")?;
        Ok(row)
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM skills WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .context("delete skill")?;
        Ok(res.rows_affected() > 0)
    }
}
