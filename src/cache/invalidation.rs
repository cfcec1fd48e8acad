//! Bus-driven cache invalidation and read-through helpers.

use std::{
    collections::BTreeMap,
    sync::{Arc, Weak},
};

use super::{CacheKeys, EphemeralCache};
use crate::core::store::ResourceStore;
use crate::events::{EventBus, EventKind, EventPayload, SubscriptionId};

/// A cache that can drop every key under a prefix.
pub trait PrefixInvalidate: Send + Sync {
    fn invalidate_prefix(&self, prefix: &str) -> usize;
}

impl<V: Clone + Send> PrefixInvalidate for EphemeralCache<V> {
    fn invalidate_prefix(&self, prefix: &str) -> usize {
        self.clear_by_prefix(prefix)
    }
}

/// Clears cache namespaces when the data behind them changes.
///
/// Subscriptions are removed when the invalidator is dropped.
pub struct CacheInvalidator {
    bus: Weak<EventBus>,
    subscriptions: Vec<SubscriptionId>,
}

impl CacheInvalidator {
    /// Namespaces made stale by an event of `kind`.
    pub fn prefixes_for(kind: EventKind) -> &'static [&'static str] {
        match kind {
            EventKind::CatalogFileChanged
            | EventKind::TranslationUpdated
            | EventKind::TranslationDeleted
            | EventKind::TranslationKeyCreated => &[CacheKeys::ARB_PREFIX, CacheKeys::STATS_PREFIX],
            EventKind::PluginConfigChanged => &[CacheKeys::PLUGIN_PREFIX, CacheKeys::DART_PREFIX],
            EventKind::ProjectConfigChanged => &[CacheKeys::PROJECT_PREFIX],
            _ => &[],
        }
    }

    pub fn attach(bus: &Arc<EventBus>, caches: Vec<Arc<dyn PrefixInvalidate>>) -> Self {
        let weak_bus = Arc::downgrade(bus);
        let subscriptions = EventKind::ALL
            .iter()
            .copied()
            .filter(|kind| !Self::prefixes_for(*kind).is_empty())
            .map(|kind| {
                let caches = caches.clone();
                let publisher = weak_bus.clone();
                bus.subscribe_labeled(kind, format!("cache-invalidator:{}", kind), move |_| {
                    let prefixes = Self::prefixes_for(kind);
                    let removed: usize = caches
                        .iter()
                        .flat_map(|cache| prefixes.iter().map(move |p| cache.invalidate_prefix(p)))
                        .sum();
                    tracing::debug!(event = %kind, removed, "cache invalidated");
                    if let Some(bus) = publisher.upgrade() {
                        bus.publish(EventPayload::CacheCleared {
                            prefixes: prefixes.iter().map(|p| p.to_string()).collect(),
                        });
                    }
                    Ok(())
                })
            })
            .collect();

        Self {
            bus: weak_bus,
            subscriptions,
        }
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }
}

impl Drop for CacheInvalidator {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            for id in self.subscriptions.drain(..) {
                bus.unsubscribe(id);
            }
        }
    }
}

/// Every locale's value for `key`, cached until the store changes or the
/// cache's default TTL runs out.
pub fn cached_translations(
    cache: &EphemeralCache<BTreeMap<String, String>>,
    store: &ResourceStore,
    key: &str,
) -> BTreeMap<String, String> {
    let cache_key = format!("{}@{}", CacheKeys::arb_translations(key), store.generation());
    match cache.get_or_compute::<std::convert::Infallible>(
        &cache_key,
        || Ok(store.get_all_translations(key)),
        None,
    ) {
        Ok(translations) => translations,
        Err(never) => match never {},
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, sync::Mutex};

    use tempfile::tempdir;

    use super::*;
    use crate::events::Event;

    #[test]
    fn test_translation_events_clear_arb_and_stats() {
        let bus = Arc::new(EventBus::new());
        let cache: Arc<EphemeralCache<i32>> = Arc::new(EphemeralCache::new());
        cache.set(CacheKeys::arb_translations("hello"), 1, None);
        cache.set(CacheKeys::TRANSLATION_STATS, 2, None);
        cache.set(CacheKeys::PROJECT_CONFIG, 3, None);
        let _invalidator = CacheInvalidator::attach(&bus, vec![cache.clone() as Arc<dyn PrefixInvalidate>]);

        bus.publish(EventPayload::TranslationDeleted {
            key: "hello".into(),
            locale: "en".into(),
        });
        bus.flush();

        assert_eq!(cache.keys(), vec![CacheKeys::PROJECT_CONFIG]);
    }

    #[test]
    fn test_config_events_clear_their_namespace() {
        let bus = Arc::new(EventBus::new());
        let cache: Arc<EphemeralCache<i32>> = Arc::new(EphemeralCache::new());
        cache.set(CacheKeys::PLUGIN_CONFIG, 1, None);
        cache.set(CacheKeys::dart_references("file:///a.dart"), 2, None);
        cache.set(CacheKeys::PROJECT_CONFIG, 3, None);
        cache.set(CacheKeys::ARB_KEYS, 4, None);
        let _invalidator = CacheInvalidator::attach(&bus, vec![cache.clone() as Arc<dyn PrefixInvalidate>]);

        bus.publish(EventPayload::PluginConfigChanged);
        bus.flush();
        assert_eq!(cache.keys(), vec![CacheKeys::ARB_KEYS, CacheKeys::PROJECT_CONFIG]);

        bus.publish(EventPayload::ProjectConfigChanged { root: "/p".into() });
        bus.flush();
        assert_eq!(cache.keys(), vec![CacheKeys::ARB_KEYS]);
    }

    #[test]
    fn test_publishes_cache_cleared() {
        let bus = Arc::new(EventBus::new());
        let cache: Arc<EphemeralCache<i32>> = Arc::new(EphemeralCache::new());
        let _invalidator = CacheInvalidator::attach(&bus, vec![cache as Arc<dyn PrefixInvalidate>]);

        let seen: Arc<Mutex<Vec<Event>>> = Arc::default();
        let sink = Arc::clone(&seen);
        bus.subscribe(EventKind::CacheCleared, move |event| {
            sink.lock().unwrap().push(event.clone());
            Ok(())
        });

        bus.publish(EventPayload::ProjectConfigChanged { root: "/p".into() });
        assert_eq!(bus.flush(), 2);
        let seen = seen.lock().unwrap();
        assert_eq!(
            seen[0].payload,
            EventPayload::CacheCleared {
                prefixes: vec!["project:".into()]
            }
        );
    }

    #[test]
    fn test_drop_unsubscribes() {
        let bus = Arc::new(EventBus::new());
        let cache: Arc<EphemeralCache<i32>> = Arc::new(EphemeralCache::new());
        let invalidator = CacheInvalidator::attach(&bus, vec![cache as Arc<dyn PrefixInvalidate>]);
        assert_eq!(invalidator.subscription_count(), 6);
        assert_eq!(bus.subscriber_count(EventKind::TranslationUpdated), 1);

        drop(invalidator);
        assert_eq!(bus.subscriber_count(EventKind::TranslationUpdated), 0);
    }

    #[test]
    fn test_cached_translations_follow_generation() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("app_en.arb"), r#"{"hello": "Hello"}"#).unwrap();
        let store = ResourceStore::new();
        store.load_all(dir.path(), "app_en.arb");
        let cache = EphemeralCache::new();

        let first = cached_translations(&cache, &store, "hello");
        assert_eq!(first["en"], "Hello");
        assert_eq!(cache.len(), 1);

        store.set_translation("hello", "en", "Hi", None).unwrap();
        let second = cached_translations(&cache, &store, "hello");
        assert_eq!(second["en"], "Hi");
        assert_eq!(cache.len(), 2);
    }
}
