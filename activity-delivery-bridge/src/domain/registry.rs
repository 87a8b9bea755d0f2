use activity_delivery_core::{ActivityId, AttemptGuid, AttemptState};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// One observed (activity, attempt) pair
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptRecord {
    pub activity_id: ActivityId,
    pub attempt_guid: AttemptGuid,
    pub attempt: AttemptState,
}

#[derive(Debug, Default)]
struct RegistryInner {
    current: HashMap<ActivityId, AttemptState>,
    /// Append-only
    log: Vec<AttemptRecord>,
}

/// Latest attempt per mounted activity, plus every attempt ever observed.
///
/// Cloning yields another handle to the same store, so one registry can be
/// injected into every bridge on a page.
#[derive(Debug, Clone)]
pub struct AttemptRegistry {
    inner: Arc<RwLock<RegistryInner>>,
    history_warning: usize,
}

impl Default for AttemptRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl AttemptRegistry {
    pub fn new() -> Self {
        Self::with_history_warning(1000)
    }

    /// Log a warning once the history grows past `threshold` records
    pub fn with_history_warning(threshold: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(RegistryInner::default())),
            history_warning: threshold,
        }
    }

    pub fn set(&self, activity_id: &str, attempt: AttemptState) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.current.insert(activity_id.to_string(), attempt);
    }

    pub fn get(&self, activity_id: &str) -> Option<AttemptState> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.current.get(activity_id).cloned()
    }

    /// Guid of the activity's current attempt
    pub fn current_guid(&self, activity_id: &str) -> Option<AttemptGuid> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner
            .current
            .get(activity_id)
            .map(|a| a.attempt_guid.clone())
    }

    pub fn delete(&self, activity_id: &str) -> Option<AttemptState> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.current.remove(activity_id)
    }

    pub fn contains(&self, activity_id: &str) -> bool {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.current.contains_key(activity_id)
    }

    /// Number of activities with a current attempt
    pub fn len(&self) -> usize {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append to the history log
    pub fn record(&self, activity_id: &str, attempt_guid: &str, attempt: AttemptState) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.log.push(AttemptRecord {
            activity_id: activity_id.to_string(),
            attempt_guid: attempt_guid.to_string(),
            attempt,
        });

        if inner.log.len() == self.history_warning + 1 {
            tracing::warn!(
                "Attempt history exceeded {} records; it is never pruned",
                self.history_warning
            );
        }
    }

    pub fn has_record(&self, activity_id: &str, attempt_guid: &str) -> bool {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner
            .log
            .iter()
            .any(|r| r.activity_id == activity_id && r.attempt_guid == attempt_guid)
    }

    /// History of one activity, oldest first
    pub fn records_for(&self, activity_id: &str) -> Vec<AttemptRecord> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner
            .log
            .iter()
            .filter(|r| r.activity_id == activity_id)
            .cloned()
            .collect()
    }

    pub fn history_len(&self) -> usize {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.log.len()
    }

    /// Whether `attempt_guid` belongs to `activity_id`, now or in the past
    pub fn is_addressed_to(&self, activity_id: &str, attempt_guid: &str) -> bool {
        self.current_guid(activity_id).as_deref() == Some(attempt_guid)
            || self.has_record(activity_id, attempt_guid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_after_set() {
        let registry = AttemptRegistry::new();
        registry.set("a1", AttemptState::new("g1"));

        assert_eq!(registry.get("a1").unwrap().attempt_guid, "g1");
        assert_eq!(registry.current_guid("a1").as_deref(), Some("g1"));
        assert!(registry.get("a2").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_clones_share_the_store() {
        let registry = AttemptRegistry::new();
        let handle = registry.clone();

        handle.set("a1", AttemptState::new("g1"));
        assert!(registry.contains("a1"));

        registry.delete("a1");
        assert!(handle.is_empty());
    }

    #[test]
    fn test_history_survives_delete() {
        let registry = AttemptRegistry::new();
        registry.set("a1", AttemptState::new("g1"));
        registry.record("a1", "g1", AttemptState::new("g1"));
        registry.delete("a1");

        assert!(registry.has_record("a1", "g1"));
        assert!(!registry.has_record("a2", "g1"));
        assert_eq!(registry.records_for("a1").len(), 1);
    }

    #[test]
    fn test_addressing() {
        let registry = AttemptRegistry::new();
        registry.set("a1", AttemptState::new("g2"));
        registry.record("a1", "g1", AttemptState::new("g1"));

        assert!(registry.is_addressed_to("a1", "g2"));
        assert!(registry.is_addressed_to("a1", "g1"));
        assert!(!registry.is_addressed_to("a1", "g3"));
        assert!(!registry.is_addressed_to("a2", "g2"));
    }

    #[test]
    fn test_history_is_append_only() {
        let registry = AttemptRegistry::with_history_warning(2);
        for i in 0..5 {
            let guid = format!("g{}", i);
            registry.record("a1", &guid, AttemptState::new(guid.clone()));
        }

        assert_eq!(registry.history_len(), 5);
        let guids: Vec<_> = registry
            .records_for("a1")
            .into_iter()
            .map(|r| r.attempt_guid)
            .collect();
        assert_eq!(guids, vec!["g0", "g1", "g2", "g3", "g4"]);
    }
}
