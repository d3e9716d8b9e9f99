//! Locator synthesis for each supported platform.

pub mod android;
pub mod web;

use crate::errors::AutomationError;
use crate::types::UiCandidate;
use crate::Platform;

/// How aggressively to qualify an Android locator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AndroidStrategy {
    /// Strongest single attribute, first match wins.
    #[default]
    Priority,
    /// All attributes conjoined into one XPath predicate.
    Robust,
}

/// Synthesize a locator for `candidate` on `platform` using the default
/// strategy for that platform.
pub fn build_locator(
    platform: Platform,
    candidate: &UiCandidate,
) -> Result<String, AutomationError> {
    match platform {
        Platform::Android => android::build_priority(candidate),
        Platform::Web => web::build_combined(candidate),
        Platform::Ios => Err(AutomationError::UnsupportedPlatform(
            "ios locator synthesis is not implemented".to_string(),
        )),
    }
}

/// Android entry point that also exposes the robust strategy.
pub fn build_android_locator(
    candidate: &UiCandidate,
    strategy: AndroidStrategy,
) -> Result<String, AutomationError> {
    match strategy {
        AndroidStrategy::Priority => android::build_priority(candidate),
        AndroidStrategy::Robust => android::build_robust(candidate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ios_is_rejected() {
        let c = UiCandidate {
            resource_id: "x".into(),
            ..Default::default()
        };
        assert!(matches!(
            build_locator(Platform::Ios, &c),
            Err(AutomationError::UnsupportedPlatform(_))
        ));
    }

    #[test]
    fn platform_picks_the_right_synthesizer() {
        let c = UiCandidate {
            resource_id: "login".into(),
            class_name: "button".into(),
            ..Default::default()
        };
        assert_eq!(build_locator(Platform::Android, &c).unwrap(), "id=login");
        assert_eq!(
            build_locator(Platform::Web, &c).unwrap(),
            "button[id=\"login\"]:visible"
        );
    }
}
