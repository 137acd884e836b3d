use anyhow::Context;
use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    auth::repo_types::{OtpRecord, Provisioned, Role, User},
    db::PgStore,
};

/// Credential store: email → user with role.
#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;

    /// Returns the user for `email`, creating it with `role` if it does not
    /// exist yet. `role` is ignored for existing users.
    async fn provision(&self, email: &str, role: Role) -> anyhow::Result<Provisioned>;
}

/// Ephemeral OTP store keyed by email.
#[async_trait]
pub trait OtpRepo: Send + Sync {
    /// Most recently created record for `email`, live or not.
    async fn latest_for_email(&self, email: &str) -> anyhow::Result<Option<OtpRecord>>;

    /// Removes every record for `email`, returning how many were removed.
    async fn delete_for_email(&self, email: &str) -> anyhow::Result<u64>;

    /// Stores a code with the caller's `created_at`, so cooldown checks
    /// compare timestamps from one clock.
    async fn insert(
        &self,
        email: &str,
        code: &str,
        created_at: OffsetDateTime,
        expires_at: OffsetDateTime,
    ) -> anyhow::Result<OtpRecord>;

    /// Exact match on the (email, code) pair.
    async fn find(&self, email: &str, code: &str) -> anyhow::Result<Option<OtpRecord>>;

    /// Returns false if the record was already gone.
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    role: String,
    created_at: OffsetDateTime,
}

impl TryFrom<UserRow> for User {
    type Error = anyhow::Error;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: r.id,
            email: r.email,
            role: r.role.parse()?,
            created_at: r.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct OtpRow {
    id: Uuid,
    email: String,
    code: String,
    expires_at: OffsetDateTime,
    created_at: OffsetDateTime,
}

impl From<OtpRow> for OtpRecord {
    fn from(r: OtpRow) -> Self {
        OtpRecord {
            id: r.id,
            email: r.email,
            code: r.code,
            expires_at: r.expires_at,
            created_at: r.created_at,
        }
    }
}

#[async_trait]
impl UserRepo for PgStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, role, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .context("find user by email")?;
        row.map(User::try_from).transpose()
    }

    async fn provision(&self, email: &str, role: Role) -> anyhow::Result<Provisioned> {
        let created = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, email, role)
            VALUES ($1, $2, $3)
            ON CONFLICT (email) DO NOTHING
            RETURNING id, email, role, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(role.as_str())
        .fetch_optional(&self.db)
        .await
        .context("insert user")?;

        if let Some(row) = created {
            return Ok(Provisioned::Created(row.try_into()?));
        }
        let existing = self
            .find_by_email(email)
            .await?
            .with_context(|| format!("user {email} vanished after conflict"))?;
        Ok(Provisioned::Existing(existing))
    }
}

#[async_trait]
impl OtpRepo for PgStore {
    async fn latest_for_email(&self, email: &str) -> anyhow::Result<Option<OtpRecord>> {
        let row = sqlx::query_as::<_, OtpRow>(
            r#"
            SELECT id, email, code, expires_at, created_at
              FROM otps
             WHERE email = $1
             ORDER BY created_at DESC
             LIMIT 1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .context("latest otp for email")?;
        Ok(row.map(Into::into))
    }

    async fn delete_for_email(&self, email: &str) -> anyhow::Result<u64> {
        let res = sqlx::query("DELETE FROM otps WHERE email = $1")
            .bind(email)
            .execute(&self.db)
            .await
            .context("delete otps for email")?;
        Ok(res.rows_affected())
    }

    async fn insert(
        &self,
        email: &str,
        code: &str,
        created_at: OffsetDateTime,
        expires_at: OffsetDateTime,
    ) -> anyhow::Result<OtpRecord> {
        let row = sqlx::query_as::<_, OtpRow>(
            r#"
            INSERT INTO otps (id, email, code, expires_at, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, email, code, expires_at, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(code)
        .bind(expires_at)
        .bind(created_at)
        .fetch_one(&self.db)
        .await
        .context("insert otp")?;
        Ok(row.into())
    }

    async fn find(&self, email: &str, code: &str) -> anyhow::Result<Option<OtpRecord>> {
        let row = sqlx::query_as::<_, OtpRow>(
            r#"
            SELECT id, email, code, expires_at, created_at
              FROM otps
             WHERE email = $1 AND code = $2
             LIMIT 1
            "#,
        )
        .bind(email)
        .bind(code)
        .fetch_optional(&self.db)
        .await
        .context("find otp")?;
        Ok(row.map(Into::into))
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM otps WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .context("delete otp")?;
        Ok(res.rows_affected() > 0)
    }
}
