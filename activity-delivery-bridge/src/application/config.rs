use activity_delivery_core::NavigationMode;
use serde::{Deserialize, Serialize};

/// Configuration shared by the bridges on a page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BridgeConfig {
    /// Authoring preview; passed through to elements
    pub preview: bool,

    /// Current user, if known
    pub user_id: Option<String>,

    /// Mode reported in CONTEXT_CHANGED when the host does not say
    pub default_mode: NavigationMode,

    /// Attempt history size that triggers a warning
    pub history_warning: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            preview: false,
            user_id: None,
            default_mode: NavigationMode::Viewer,
            history_warning: 1000,
        }
    }
}

impl BridgeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_preview(mut self, preview: bool) -> Self {
        self.preview = preview;
        self
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_default_mode(mut self, mode: NavigationMode) -> Self {
        self.default_mode = mode;
        self
    }

    pub fn with_history_warning(mut self, threshold: usize) -> Self {
        self.history_warning = threshold;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: BridgeConfig =
            serde_json::from_value(json!({"preview": true, "userId": "u7"})).unwrap();

        assert!(config.preview);
        assert_eq!(config.user_id.as_deref(), Some("u7"));
        assert_eq!(config.history_warning, 1000);
        assert_eq!(config.default_mode, NavigationMode::Viewer);
    }

    #[test]
    fn test_builders() {
        let config = BridgeConfig::new()
            .with_user("u1")
            .with_default_mode(NavigationMode::Review)
            .with_history_warning(10);

        assert_eq!(config.user_id.as_deref(), Some("u1"));
        assert_eq!(config.default_mode, NavigationMode::Review);
        assert_eq!(config.history_warning, 10);
    }
}
