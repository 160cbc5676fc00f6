use serde::Deserialize;
use std::collections::BTreeSet;

/// Role that always bypasses hierarchy visibility.
pub const PRIVILEGED_ROLE: &str = "System Manager";

/// CRM settings consulted before any hierarchy check.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AccessSettings {
    /// `false` restores unrestricted visibility for everyone.
    #[serde(default = "default_engine_enabled")]
    pub engine_enabled: bool,
    /// Roles granted visibility over every record.
    #[serde(default)]
    pub full_access_roles: BTreeSet<String>,
}

fn default_engine_enabled() -> bool {
    true
}

impl Default for AccessSettings {
    fn default() -> Self {
        Self {
            engine_enabled: default_engine_enabled(),
            full_access_roles: BTreeSet::new(),
        }
    }
}

impl AccessSettings {
    pub fn with_full_access_roles<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            full_access_roles: roles.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn disabled() -> Self {
        Self {
            engine_enabled: false,
            ..Self::default()
        }
    }
}
