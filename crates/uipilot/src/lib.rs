//! Grounding core for UI automation agents.
//!
//! Turns a raw platform snapshot (Android accessibility tree or web DOM
//! scan) into a numbered list of actionable candidates, synthesizes stable
//! locators from their attributes, and executes agent tool calls against a
//! pluggable driver. When the tree has nothing usable, a visual grounding
//! service locates elements on the screenshot instead, and the Set-of-Mark
//! renderer draws the candidate list onto the frame for vision models.
//!
//! The typical instruction cycle:
//!
//! ```ignore
//! let candidates = collect::collect_candidates(Platform::Android, &snapshot, screen)?;
//! let marked = som::annotate(&screenshot_png, &candidates)?;
//! let dispatcher = Dispatcher::new(ToolRegistry::with_mobile_tools(), ToolCategory::Mobile, InteractionMode::Hybrid);
//! let ctx = ActionContext::new(&candidates).with_screenshot(&screenshot_png);
//! dispatcher.dispatch(&executor, "tap_element", &args, &ctx).await?;
//! ```
//!
//! Candidate indices are 1-based and positional; they expire with the cycle
//! that produced them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub mod collect;
pub mod dispatch;
pub mod errors;
pub mod grounding;
pub mod locator;
pub mod session;
pub mod som;
pub mod telemetry;
pub mod tools;
pub mod types;

pub use dispatch::{ActionContext, ActionExecutor, Dispatcher};
pub use errors::AutomationError;
pub use grounding::{
    ArbiterChoice, DetectedElement, ElementArbiter, GroundingResult, VisionBackend, VisualGrounder,
};
pub use session::{SessionGuard, SessionSource};
pub use tools::{ActionTool, InteractionMode, ToolCapabilities, ToolCategory, ToolRegistry};
pub use types::{BoundingBox, CandidateSource, ScreenSize, UiCandidate, UiNode};

/// Target platform of a driver session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Android,
    Ios,
    Web,
}

impl FromStr for Platform {
    type Err = AutomationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "android" => Ok(Self::Android),
            "ios" => Ok(Self::Ios),
            "web" | "browser" => Ok(Self::Web),
            other => Err(AutomationError::UnsupportedPlatform(format!(
                "unknown platform '{other}'"
            ))),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Android => write!(f, "android"),
            Self::Ios => write!(f, "ios"),
            Self::Web => write!(f, "web"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_parses_case_insensitively() {
        assert_eq!("Android".parse::<Platform>().unwrap(), Platform::Android);
        assert_eq!("browser".parse::<Platform>().unwrap(), Platform::Web);
        assert!("windows".parse::<Platform>().is_err());
    }
}
