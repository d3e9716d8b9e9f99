use thiserror::Error;

/// Failure taxonomy for the grounding core.
///
/// Selector, attribute and index failures fail closed: guessing a wrong
/// target is worse than an explicit stop. `AmbiguousSelector` is the only
/// kind with automatic recovery (the web click tool falls back to
/// coordinates or pins the first match), and `SessionInvalid` is recovered
/// transparently by the session guard.
#[derive(Error, Debug)]
pub enum AutomationError {
    /// Element index outside the `[1, N]` candidate range.
    #[error("element index {index} is out of range: candidate list has {len} elements (valid: 1..={len})")]
    InvalidIndex { index: i64, len: usize },

    /// No selector could be derived from the candidate's attributes.
    #[error("cannot build locator: {0}")]
    NoUsableAttributes(String),

    #[error("element not found: {0}")]
    ElementNotFound(String),

    /// A selector resolved to more than one element in the live document.
    #[error("selector matched multiple elements: {0}")]
    AmbiguousSelector(String),

    /// Tool name not registered for the active category.
    #[error("unsupported action: {0}")]
    UnsupportedAction(String),

    /// Platform path that is declared but not implemented (e.g. iOS).
    #[error("unsupported platform: {0}")]
    UnsupportedPlatform(String),

    /// Stale automation handle; recovered by re-acquisition, never surfaced.
    #[error("automation session is no longer valid: {0}")]
    SessionInvalid(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Failure surfaced by the external driver or model transport.
    #[error("platform error: {0}")]
    PlatformError(String),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}
