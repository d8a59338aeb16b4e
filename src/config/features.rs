//! Feature flags configuration

use serde::Deserialize;

/// Feature flags for enabling/disabling functionality
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureFlags {
    /// Append the intent / pending-action audit to every reply
    #[serde(default = "default_show_audit_trail")]
    pub show_audit_trail: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            show_audit_trail: default_show_audit_trail(),
        }
    }
}

fn default_show_audit_trail() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_flags_defaults() {
        assert!(FeatureFlags::default().show_audit_trail);
    }

    #[test]
    fn test_feature_flags_deserialization() {
        let flags: FeatureFlags = serde_json::from_str(r#"{"show_audit_trail": false}"#).unwrap();
        assert!(!flags.show_audit_trail);

        let flags: FeatureFlags = serde_json::from_str("{}").unwrap();
        assert!(flags.show_audit_trail);
    }
}
