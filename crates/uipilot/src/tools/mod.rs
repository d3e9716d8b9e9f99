//! Action tools and the capability-filtered registry.
//!
//! Every tool declares which grounding channels it works with. The registry
//! filters the exposed tool set by [`InteractionMode`] so an agent running in
//! locator-only mode never sees a coordinate tool and vice versa.

pub mod mobile;
pub mod web;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::dispatch::{ActionContext, ActionExecutor};
use crate::errors::AutomationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolCategory {
    Mobile,
    Web,
}

/// Which grounding channels a tool can act through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCapabilities {
    /// Accepts a candidate index and acts through a synthesized locator.
    pub works_on_locator: bool,
    /// Accepts a visual description and acts through screen coordinates.
    pub works_on_visual: bool,
    /// A dedicated visual twin exists, so visual mode can drop this tool.
    pub has_visual_equivalent: bool,
}

impl ToolCapabilities {
    pub const LOCATOR: Self = Self {
        works_on_locator: true,
        works_on_visual: false,
        has_visual_equivalent: false,
    };
    pub const LOCATOR_WITH_VISUAL_TWIN: Self = Self {
        works_on_locator: true,
        works_on_visual: false,
        has_visual_equivalent: true,
    };
    pub const VISUAL: Self = Self {
        works_on_locator: false,
        works_on_visual: true,
        has_visual_equivalent: false,
    };
    /// Device-level tools (back, scroll) that need no grounding at all.
    pub const UNIVERSAL: Self = Self {
        works_on_locator: true,
        works_on_visual: true,
        has_visual_equivalent: false,
    };
}

/// Which grounding channel the agent is allowed to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionMode {
    /// Tree candidates and synthesized locators only.
    #[default]
    Locator,
    /// Screenshot grounding and coordinates only.
    Visual,
    /// Everything.
    Hybrid,
}

impl FromStr for InteractionMode {
    type Err = AutomationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "locator" | "xml" => Ok(Self::Locator),
            "visual" => Ok(Self::Visual),
            "hybrid" => Ok(Self::Hybrid),
            other => Err(AutomationError::InvalidArgument(format!(
                "unknown interaction mode '{other}' (expected locator, visual or hybrid)"
            ))),
        }
    }
}

impl fmt::Display for InteractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Locator => write!(f, "locator"),
            Self::Visual => write!(f, "visual"),
            Self::Hybrid => write!(f, "hybrid"),
        }
    }
}

impl InteractionMode {
    /// Whether a tool with `caps` is exposed in this mode.
    ///
    /// Visual mode keeps locator tools that have no visual twin, because
    /// dropping them would leave whole actions (keyboard, scrolling) with no
    /// visual counterpart at all.
    pub fn admits(&self, caps: ToolCapabilities) -> bool {
        match self {
            Self::Locator => caps.works_on_locator,
            Self::Visual => {
                caps.works_on_visual || (caps.works_on_locator && !caps.has_visual_equivalent)
            }
            Self::Hybrid => true,
        }
    }
}

/// One executable action.
#[async_trait]
pub trait ActionTool: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn category(&self) -> ToolCategory;
    fn capabilities(&self) -> ToolCapabilities;
    /// JSON-schema fragment describing the tool's arguments.
    fn parameters_schema(&self) -> Value;

    async fn execute(
        &self,
        executor: &dyn ActionExecutor,
        args: &Value,
        ctx: &ActionContext<'_>,
    ) -> Result<Value, AutomationError>;
}

/// Tool collection indexed by category and name.
///
/// Names are only unique within a category (`go_back` exists for both
/// mobile and web), so every lookup is category-scoped.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<(ToolCategory, String), Box<dyn ActionTool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// All mobile tools, ready for dispatch.
    pub fn with_mobile_tools() -> Self {
        let mut registry = Self::new();
        for tool in mobile::all_tools() {
            registry.register(tool);
        }
        registry
    }

    /// All web tools, ready for dispatch.
    pub fn with_web_tools() -> Self {
        let mut registry = Self::new();
        for tool in web::all_tools() {
            registry.register(tool);
        }
        registry
    }

    /// Every tool of every category in one registry.
    pub fn with_all_tools() -> Self {
        let mut registry = Self::new();
        for tool in mobile::all_tools().into_iter().chain(web::all_tools()) {
            registry.register(tool);
        }
        registry
    }

    pub fn register(&mut self, tool: Box<dyn ActionTool>) {
        let category = tool.category();
        let name = tool.name();
        if self.tools.insert((category, name.to_string()), tool).is_some() {
            warn!("tool '{name}' ({category:?}) was already registered, replacing");
        } else {
            debug!("registered tool '{name}' ({category:?})");
        }
    }

    pub fn get(&self, category: ToolCategory, name: &str) -> Option<&dyn ActionTool> {
        self.tools
            .get(&(category, name.to_string()))
            .map(|t| t.as_ref())
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn get_by_category(&self, category: ToolCategory) -> Vec<&dyn ActionTool> {
        let mut tools: Vec<_> = self
            .tools
            .values()
            .filter(|t| t.category() == category)
            .map(|t| t.as_ref())
            .collect();
        tools.sort_by_key(|t| t.name());
        tools
    }

    /// Tools of `category` admitted under `mode`, sorted by name for stable
    /// prompts.
    pub fn get_for_mode(&self, category: ToolCategory, mode: InteractionMode) -> Vec<&dyn ActionTool> {
        let mut tools: Vec<_> = self
            .tools
            .values()
            .filter(|t| t.category() == category && mode.admits(t.capabilities()))
            .map(|t| t.as_ref())
            .collect();
        tools.sort_by_key(|t| t.name());
        tools
    }

    /// Function-call specs for the `category` tools admitted under `mode`.
    pub fn tool_specs(&self, category: ToolCategory, mode: InteractionMode) -> Vec<Value> {
        self.get_for_mode(category, mode)
            .into_iter()
            .map(|tool| {
                json!({
                    "type": "function",
                    "function": {
                        "name": tool.name(),
                        "description": tool.description(),
                        "parameters": tool.parameters_schema(),
                    }
                })
            })
            .collect()
    }
}
