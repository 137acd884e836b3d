//! In-process store used when no `DATABASE_URL` is configured and by tests.

use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    auth::{
        repo::{OtpRepo, UserRepo},
        repo_types::{OtpRecord, Provisioned, Role, User},
    },
    content::{list_order, ContentEntity, ContentRepo},
};

#[derive(Default)]
pub struct MemoryAuthStore {
    users: RwLock<HashMap<String, User>>,
    otps: RwLock<Vec<OtpRecord>>,
}

impl MemoryAuthStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn otp_count(&self, email: &str) -> usize {
        self.otps.read().await.iter().filter(|r| r.email == email).count()
    }

    /// Inserts a record as-is, bypassing issuance.
    #[cfg(test)]
    pub async fn put_otp(&self, record: OtpRecord) {
        self.otps.write().await.push(record);
    }
}

#[async_trait]
impl UserRepo for MemoryAuthStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        Ok(self.users.read().await.get(email).cloned())
    }

    async fn provision(&self, email: &str, role: Role) -> anyhow::Result<Provisioned> {
        let mut users = self.users.write().await;
        if let Some(existing) = users.get(email) {
            return Ok(Provisioned::Existing(existing.clone()));
        }
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            role,
            created_at: OffsetDateTime::now_utc(),
        };
        users.insert(email.to_string(), user.clone());
        Ok(Provisioned::Created(user))
    }
}

#[async_trait]
impl OtpRepo for MemoryAuthStore {
    async fn latest_for_email(&self, email: &str) -> anyhow::Result<Option<OtpRecord>> {
        Ok(self
            .otps
            .read()
            .await
            .iter()
            .filter(|r| r.email == email)
            .max_by_key(|r| r.created_at)
            .cloned())
    }

    async fn delete_for_email(&self, email: &str) -> anyhow::Result<u64> {
        let mut otps = self.otps.write().await;
        let before = otps.len();
        otps.retain(|r| r.email != email);
        Ok((before - otps.len()) as u64)
    }

    async fn insert(
        &self,
        email: &str,
        code: &str,
        created_at: OffsetDateTime,
        expires_at: OffsetDateTime,
    ) -> anyhow::Result<OtpRecord> {
        let record = OtpRecord {
            id: Uuid::new_v4(),
            email: email.to_string(),
            code: code.to_string(),
            expires_at,
            created_at,
        };
        self.otps.write().await.push(record.clone());
        Ok(record)
    }

    async fn find(&self, email: &str, code: &str) -> anyhow::Result<Option<OtpRecord>> {
        Ok(self
            .otps
            .read()
            .await
            .iter()
            .find(|r| r.email == email && r.code == code)
            .cloned())
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut otps = self.otps.write().await;
        let before = otps.len();
        otps.retain(|r| r.id != id);
        Ok(otps.len() != before)
    }
}

pub struct MemoryContentRepo<E> {
    items: RwLock<Vec<E>>,
}

impl<E> Default for MemoryContentRepo<E> {
    fn default() -> Self {
        Self {
            items: RwLock::new(Vec::new()),
        }
    }
}

impl<E> MemoryContentRepo<E> {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl<E: ContentEntity> ContentRepo<E> for MemoryContentRepo<E> {
    async fn list(&self) -> anyhow::Result<Vec<E>> {
        let mut items = self.items.read().await.clone();
        items.sort_by(list_order);
        Ok(items)
    }

    async fn get(&self, id: Uuid) -> anyhow::Result<Option<E>> {
        Ok(self.items.read().await.iter().find(|e| e.id() == id).cloned())
    }

    async fn create(&self, draft: E::Draft) -> anyhow::Result<E> {
        let entity = E::from_draft(Uuid::new_v4(), draft, OffsetDateTime::now_utc());
        self.items.write().await.push(entity.clone());
        Ok(entity)
    }

    async fn update(&self, id: Uuid, draft: E::Draft) -> anyhow::Result<Option<E>> {
        let mut items = self.items.write().await;
        Ok(items.iter_mut().find(|e| e.id() == id).map(|e| {
            e.apply(draft, OffsetDateTime::now_utc());
            e.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut items = self.items.write().await;
        let before = items.len();
        items.retain(|e| e.id() != id);
        Ok(items.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    #[tokio::test]
    async fn provision_keeps_first_role() {
        let store = MemoryAuthStore::new();
        let first = store.provision("a@x.com", Role::Admin).await.unwrap();
        assert!(first.is_new());
        let again = store.provision("a@x.com", Role::User).await.unwrap();
        assert!(!again.is_new());
        assert_eq!(again.user().id, first.user().id);
        assert_eq!(again.user().role, Role::Admin);
    }

    #[tokio::test]
    async fn otp_delete_reports_absence() {
        let store = MemoryAuthStore::new();
        let now = OffsetDateTime::now_utc();
        let rec = store
            .insert("a@x.com", "111111", now, now + Duration::minutes(10))
            .await
            .unwrap();
        assert!(store.find("a@x.com", "111111").await.unwrap().is_some());
        assert!(store.find("a@x.com", "222222").await.unwrap().is_none());
        assert!(store.find("b@x.com", "111111").await.unwrap().is_none());
        assert!(store.delete(rec.id).await.unwrap());
        assert!(!store.delete(rec.id).await.unwrap());
    }

    #[tokio::test]
    async fn delete_for_email_leaves_other_addresses() {
        let store = MemoryAuthStore::new();
        let now = OffsetDateTime::now_utc();
        let exp = now + Duration::minutes(10);
        store.insert("a@x.com", "1", now, exp).await.unwrap();
        store.insert("a@x.com", "2", now, exp).await.unwrap();
        store.insert("b@x.com", "3", now, exp).await.unwrap();
        assert_eq!(store.delete_for_email("a@x.com").await.unwrap(), 2);
        assert_eq!(store.otp_count("a@x.com").await, 0);
        assert_eq!(store.otp_count("b@x.com").await, 1);
    }
}
