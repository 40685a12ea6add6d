//! Per-warrior profile cache shared by the adapter and round rendering.

use std::collections::HashMap;
use std::sync::Arc;

use arena_core::{Move, WarriorId};
use tokio::sync::RwLock;

use super::metadata::{WarriorMetadataSource, WarriorProfile};

/// Lazily filled cache of warrior profiles.
///
/// Each warrior is looked up in the metadata source at most once; a failed or
/// empty lookup caches the default profile so rendering never blocks on a
/// broken source twice.
pub struct MoveNameCache {
    source: Arc<dyn WarriorMetadataSource>,
    profiles: RwLock<HashMap<WarriorId, Arc<WarriorProfile>>>,
}

impl MoveNameCache {
    pub fn new(source: Arc<dyn WarriorMetadataSource>) -> Self {
        Self {
            source,
            profiles: RwLock::new(HashMap::new()),
        }
    }

    pub async fn profile(&self, warrior: WarriorId) -> Arc<WarriorProfile> {
        if let Some(profile) = self.profiles.read().await.get(&warrior) {
            return Arc::clone(profile);
        }

        let loaded = match self.source.profile(warrior).await {
            Ok(profile) => profile.unwrap_or_default(),
            Err(err) => {
                tracing::warn!(%warrior, error = %err, "warrior metadata lookup failed");
                WarriorProfile::default()
            }
        };

        let mut profiles = self.profiles.write().await;
        Arc::clone(profiles.entry(warrior).or_insert_with(|| Arc::new(loaded)))
    }

    /// Display name of `mv` for `warrior`, the canonical token when unnamed.
    pub async fn move_name(&self, warrior: WarriorId, mv: Move) -> String {
        self.profile(warrior)
            .await
            .move_name(mv)
            .map_or_else(|| mv.token().to_string(), str::to_string)
    }

    pub async fn warrior_name(&self, warrior: WarriorId) -> String {
        self.profile(warrior)
            .await
            .name
            .clone()
            .unwrap_or_else(|| format!("Warrior {warrior}"))
    }

    /// Drops every cached profile.
    pub async fn clear(&self) {
        self.profiles.write().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::inference::metadata::{JsonMetadataSource, MetadataError};

    struct CountingSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl WarriorMetadataSource for CountingSource {
        async fn profile(
            &self,
            _warrior: WarriorId,
        ) -> Result<Option<WarriorProfile>, MetadataError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(MetadataError::InvalidWarrior("broken".into()))
        }
    }

    #[tokio::test]
    async fn fills_once_and_falls_back_to_tokens() {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
        });
        let cache = MoveNameCache::new(source.clone());

        assert_eq!(cache.move_name(WarriorId(4), Move::Special).await, "special_move");
        assert_eq!(cache.warrior_name(WarriorId(4)).await, "Warrior #4");
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        cache.clear().await;
        cache.profile(WarriorId(4)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn uses_display_names_from_metadata() {
        let source = JsonMetadataSource::from_json(
            r#"{ "7": { "name": "Ash", "moves": { "dodge": "Smoke Step" } } }"#,
        )
        .unwrap();
        let cache = MoveNameCache::new(Arc::new(source));

        assert_eq!(cache.move_name(WarriorId(7), Move::Dodge).await, "Smoke Step");
        assert_eq!(cache.move_name(WarriorId(7), Move::Taunt).await, "taunt");
        assert_eq!(cache.warrior_name(WarriorId(7)).await, "Ash");
    }
}
