//! Host application lifecycle model.

use serde::{Deserialize, Serialize};

/// Foreground state reported by the host application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppLifecycleState {
    #[default]
    Active,
    Inactive,
    Background,
}

/// Host platform. Platforms disagree on which state means "leaving".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// `inactive` is the last state an iOS app is guaranteed to observe.
    Ios,
    Android,
    #[default]
    Generic,
}

impl Platform {
    /// Whether `state` means the app is leaving the foreground.
    pub fn is_leaving_foreground(self, state: AppLifecycleState) -> bool {
        match (self, state) {
            (_, AppLifecycleState::Active) => false,
            (Platform::Ios, state) => state == AppLifecycleState::Inactive,
            (Platform::Android, state) => state == AppLifecycleState::Background,
            (Platform::Generic, _) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ios_persists_on_inactive_only() {
        assert!(Platform::Ios.is_leaving_foreground(AppLifecycleState::Inactive));
        assert!(!Platform::Ios.is_leaving_foreground(AppLifecycleState::Background));
        assert!(!Platform::Ios.is_leaving_foreground(AppLifecycleState::Active));
    }

    #[test]
    fn test_android_persists_on_background_only() {
        assert!(Platform::Android.is_leaving_foreground(AppLifecycleState::Background));
        assert!(!Platform::Android.is_leaving_foreground(AppLifecycleState::Inactive));
    }

    #[test]
    fn test_generic_persists_on_any_non_active_state() {
        assert!(Platform::Generic.is_leaving_foreground(AppLifecycleState::Inactive));
        assert!(Platform::Generic.is_leaving_foreground(AppLifecycleState::Background));
        assert!(!Platform::Generic.is_leaving_foreground(AppLifecycleState::Active));
    }
}
