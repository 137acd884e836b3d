//! Shared shape of the three public content collections.

use std::cmp::Ordering;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::ApiError;

/// A record in one of the content collections.
pub trait ContentEntity: Clone + Send + Sync + 'static {
    /// Validated editable fields, as accepted by create and update.
    type Draft: Clone + Send + Sync + 'static;

    fn id(&self) -> Uuid;
    fn order(&self) -> i32;
    fn created_at(&self) -> OffsetDateTime;

    fn from_draft(id: Uuid, draft: Self::Draft, now: OffsetDateTime) -> Self;

    /// Replaces the editable fields, keeping id and creation time.
    fn apply(&mut self, draft: Self::Draft, now: OffsetDateTime);
}

/// Store access for one collection. Lists come back in [`list_order`].
#[async_trait]
pub trait ContentRepo<E: ContentEntity>: Send + Sync {
    async fn list(&self) -> anyhow::Result<Vec<E>>;
    async fn get(&self, id: Uuid) -> anyhow::Result<Option<E>>;
    async fn create(&self, draft: E::Draft) -> anyhow::Result<E>;
    /// `None` when no record has this id.
    async fn update(&self, id: Uuid, draft: E::Draft) -> anyhow::Result<Option<E>>;
    /// `false` when no record has this id.
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
}

/// `order` ascending, then newest first, then id for a total order.
pub fn list_order<E: ContentEntity>(a: &E, b: &E) -> Ordering {
    a.order()
        .cmp(&b.order())
        .then_with(|| b.created_at().cmp(&a.created_at()))
        .then_with(|| a.id().cmp(&b.id()))
}

/// Parses a path id. Anything that is not a UUID cannot name a record.
pub fn parse_id(raw: &str, not_found: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::NotFound(not_found.to_string()))
}

/// Trims a required text field, rejecting it when blank.
pub fn required(field: &str, value: Option<String>) -> Result<String, String> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(format!("{field} is required")),
    }
}

/// Trims an optional text field, mapping blank to `None`.
pub fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Trims list entries and drops blank ones, keeping their order.
pub fn clean_list(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    #[derive(Clone, Debug)]
    struct Item {
        id: Uuid,
        order: i32,
        created_at: OffsetDateTime,
    }

    impl ContentEntity for Item {
        type Draft = i32;
        fn id(&self) -> Uuid {
            self.id
        }
        fn order(&self) -> i32 {
            self.order
        }
        fn created_at(&self) -> OffsetDateTime {
            self.created_at
        }
        fn from_draft(id: Uuid, order: i32, now: OffsetDateTime) -> Self {
            Item { id, order, created_at: now }
        }
        fn apply(&mut self, order: i32, _now: OffsetDateTime) {
            self.order = order;
        }
    }

    #[test]
    fn list_order_sorts_by_order_then_recency() {
        let t0 = OffsetDateTime::now_utc();
        let old_first = Item::from_draft(Uuid::new_v4(), 0, t0);
        let new_first = Item::from_draft(Uuid::new_v4(), 0, t0 + Duration::seconds(5));
        let second = Item::from_draft(Uuid::new_v4(), 1, t0 + Duration::seconds(10));
        let mut items = vec![second.clone(), old_first.clone(), new_first.clone()];
        items.sort_by(list_order);
        let ids: Vec<Uuid> = items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![new_first.id, old_first.id, second.id]);
    }

    #[test]
    fn list_order_is_total_for_identical_keys() {
        let t0 = OffsetDateTime::now_utc();
        let a = Item::from_draft(Uuid::new_v4(), 3, t0);
        let b = Item::from_draft(Uuid::new_v4(), 3, t0);
        assert_ne!(list_order(&a, &b), Ordering::Equal);
        assert_eq!(list_order(&a, &b), list_order(&b, &a).reverse());
    }

    #[test]
    fn parse_id_maps_garbage_to_not_found() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string(), "Skill not found").unwrap(), id);
        let err = parse_id("64b7f0c2e1", "Skill not found").unwrap_err();
        assert!(matches!(err, ApiError::NotFound(m) if m == "Skill not found"));
    }

    #[test]
    fn field_helpers_trim_and_reject_blank() {
        assert_eq!(required("title", Some("  T ".into())).unwrap(), "T");
        assert_eq!(
            required("title", Some("   ".into())).unwrap_err(),
            "title is required"
        );
        assert!(required("title", None).is_err());
        assert_eq!(optional(Some(" ".into())), None);
        assert_eq!(
            clean_list(vec![" rust ".into(), "".into(), "axum".into()]),
            vec!["rust".to_string(), "axum".to_string()]
        );
    }
}
