//! In-memory lookup of generated activities by id.
//!
//! Entries live for the lifetime of the process. A later suggestion with the
//! same id replaces the earlier one.

use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::activity::Activity;

#[derive(Debug, Default)]
pub struct ActivityStore {
    activities: RwLock<HashMap<String, Activity>>,
}

impl ActivityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, activity: Activity) {
        self.activities
            .write()
            .await
            .insert(activity.id.clone(), activity);
    }

    pub async fn insert_all(&self, activities: impl IntoIterator<Item = Activity>) {
        let mut map = self.activities.write().await;
        for activity in activities {
            map.insert(activity.id.clone(), activity);
        }
    }

    pub async fn get(&self, id: &str) -> Option<Activity> {
        self.activities.read().await.get(id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.activities.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.activities.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = ActivityStore::new();
        assert!(store.is_empty().await);

        store.insert_all(fixtures::suggest_response().activities).await;
        assert_eq!(store.len().await, 3);

        let activity = store.get("mock-activity-2").await.unwrap();
        assert_eq!(activity.title, "Balade dans le Jardin du Luxembourg");
        assert!(store.get("unknown").await.is_none());
    }

    #[tokio::test]
    async fn test_same_id_overwrites() {
        let store = ActivityStore::new();
        store.insert(fixtures::activity("act_01", "Louvre")).await;
        store.insert(fixtures::activity("act_01", "Orsay")).await;

        assert_eq!(store.len().await, 1);
        assert_eq!(store.get("act_01").await.unwrap().title, "Orsay");
    }
}
