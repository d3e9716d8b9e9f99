//! Candidate collection from platform snapshots.

pub mod android;
pub mod filters;
pub mod web;

use crate::errors::AutomationError;
use crate::types::{ScreenSize, UiCandidate, UiNode};
use crate::Platform;

/// A platform snapshot from which candidates can be collected.
pub enum Snapshot {
    /// Accessibility-tree dump for a mobile screen.
    Tree(UiNode),
    /// Result of the interactive-elements script run in a live document.
    Dom(serde_json::Value),
}

/// Collect the candidate list for one instruction cycle.
///
/// The returned list is implicitly indexed 1..N in presentation order; that
/// index must never be reused across instructions.
pub fn collect_candidates(
    platform: Platform,
    snapshot: &Snapshot,
    screen: ScreenSize,
) -> Result<Vec<UiCandidate>, AutomationError> {
    match (platform, snapshot) {
        (Platform::Android, Snapshot::Tree(root)) => Ok(android::collect_candidates(
            root,
            screen,
            android::DEFAULT_ANDROID_CAP,
        )),
        (Platform::Web, Snapshot::Dom(value)) => {
            web::collect_from_script_result(value.clone(), web::DEFAULT_WEB_CAP)
        }
        (Platform::Ios, _) => Err(AutomationError::UnsupportedPlatform(
            "iOS candidate collection is not implemented".to_string(),
        )),
        (Platform::Android, Snapshot::Dom(_)) => Err(AutomationError::InvalidArgument(
            "android collection requires a tree snapshot".to_string(),
        )),
        (Platform::Web, Snapshot::Tree(_)) => Err(AutomationError::InvalidArgument(
            "web collection requires a DOM script result".to_string(),
        )),
    }
}
