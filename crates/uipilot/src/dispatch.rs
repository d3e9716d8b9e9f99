//! Action dispatch: route a named tool call to its implementation with the
//! per-instruction grounding context attached.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, instrument};

use crate::errors::AutomationError;
use crate::grounding::VisualGrounder;
use crate::tools::{InteractionMode, ToolCategory, ToolRegistry};
use crate::types::{ScreenSize, UiCandidate};

/// Driver-side sink for concrete UI actions.
///
/// Implementations translate an action keyword plus positional arguments into
/// a real driver call (Appium, Playwright, ...). The keyword vocabulary is
/// fixed by the tool implementations in [`crate::tools`].
#[async_trait]
pub trait ActionExecutor: Send + Sync {
    async fn run_action(&self, keyword: &str, args: &[Value]) -> Result<Value, AutomationError>;

    /// Capture the current frame as PNG. Multi-step visual tools need a
    /// fresh frame after their first action changed the screen.
    async fn capture_screenshot(&self) -> Result<Vec<u8>, AutomationError>;
}

/// Everything a tool may need to ground its arguments, scoped to one
/// instruction cycle. Candidate indices are 1-based positions into
/// `candidates` and expire with this context.
pub struct ActionContext<'a> {
    pub candidates: &'a [UiCandidate],
    pub screenshot_png: Option<&'a [u8]>,
    pub screen_size: Option<ScreenSize>,
    pub grounder: Option<&'a VisualGrounder>,
}

impl<'a> ActionContext<'a> {
    pub fn new(candidates: &'a [UiCandidate]) -> Self {
        Self {
            candidates,
            screenshot_png: None,
            screen_size: None,
            grounder: None,
        }
    }

    pub fn with_screenshot(mut self, png: &'a [u8]) -> Self {
        self.screenshot_png = Some(png);
        self
    }

    pub fn with_screen_size(mut self, size: ScreenSize) -> Self {
        self.screen_size = Some(size);
        self
    }

    pub fn with_grounder(mut self, grounder: &'a VisualGrounder) -> Self {
        self.grounder = Some(grounder);
        self
    }

    /// Resolve a 1-based candidate index against this cycle's list.
    pub fn resolve(&self, index: i64) -> Result<&'a UiCandidate, AutomationError> {
        let len = self.candidates.len();
        if index < 1 || index as usize > len {
            return Err(AutomationError::InvalidIndex { index, len });
        }
        Ok(&self.candidates[index as usize - 1])
    }

    /// Ground a natural-language element description on the current
    /// screenshot via the visual grounding service.
    pub async fn ground(&self, description: &str) -> Result<UiCandidate, AutomationError> {
        let grounder = self.grounder.ok_or_else(|| {
            AutomationError::InvalidArgument(
                "visual grounding requested but no grounder is configured".to_string(),
            )
        })?;
        let screenshot = self.screenshot_png.ok_or_else(|| {
            AutomationError::InvalidArgument(
                "visual grounding requested but no screenshot is attached".to_string(),
            )
        })?;
        grounder.ground(description, screenshot).await
    }
}

/// Routes tool calls by name within one category, honoring the configured
/// interaction mode.
pub struct Dispatcher {
    registry: ToolRegistry,
    category: ToolCategory,
    mode: InteractionMode,
}

impl Dispatcher {
    pub fn new(registry: ToolRegistry, category: ToolCategory, mode: InteractionMode) -> Self {
        Self {
            registry,
            category,
            mode,
        }
    }

    pub fn category(&self) -> ToolCategory {
        self.category
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Execute the named tool with `args` against `executor`.
    ///
    /// A tool that exists under another category, or is filtered out by the
    /// current mode, is treated exactly like an unknown tool, so neither
    /// restriction can be bypassed by guessing names.
    #[instrument(skip(self, executor, args, ctx), fields(category = ?self.category, mode = %self.mode))]
    pub async fn dispatch(
        &self,
        executor: &dyn ActionExecutor,
        name: &str,
        args: &Value,
        ctx: &ActionContext<'_>,
    ) -> Result<Value, AutomationError> {
        let tool = self
            .registry
            .get(self.category, name)
            .filter(|t| self.mode.admits(t.capabilities()))
            .ok_or_else(|| {
                AutomationError::UnsupportedAction(format!(
                    "no tool named '{name}' is available for {:?} in {} mode",
                    self.category, self.mode
                ))
            })?;
        info!("dispatching tool '{name}'");
        tool.execute(executor, args, ctx).await
    }
}

/// Read a required integer argument from a tool args object.
pub(crate) fn arg_i64(args: &Value, key: &str) -> Result<i64, AutomationError> {
    args.get(key).and_then(Value::as_i64).ok_or_else(|| {
        AutomationError::InvalidArgument(format!("missing or non-integer argument '{key}'"))
    })
}

/// Read a required string argument from a tool args object.
pub(crate) fn arg_str<'a>(args: &'a Value, key: &str) -> Result<&'a str, AutomationError> {
    args.get(key).and_then(Value::as_str).ok_or_else(|| {
        AutomationError::InvalidArgument(format!("missing or non-string argument '{key}'"))
    })
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Records every keyword invocation; optionally fails matching keywords
    /// with a canned error message.
    #[derive(Default)]
    pub struct RecordingExecutor {
        pub calls: Mutex<Vec<(String, Vec<Value>)>>,
        pub fail_keyword: Option<(String, String)>,
        /// PNG returned by `capture_screenshot`.
        pub screenshot: Vec<u8>,
    }

    impl RecordingExecutor {
        pub fn failing(keyword: &str, message: &str) -> Self {
            Self {
                fail_keyword: Some((keyword.to_string(), message.to_string())),
                ..Default::default()
            }
        }

        pub fn with_screenshot(screenshot: Vec<u8>) -> Self {
            Self {
                screenshot,
                ..Default::default()
            }
        }

        pub fn calls(&self) -> Vec<(String, Vec<Value>)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ActionExecutor for RecordingExecutor {
        async fn run_action(
            &self,
            keyword: &str,
            args: &[Value],
        ) -> Result<Value, AutomationError> {
            self.calls
                .lock()
                .unwrap()
                .push((keyword.to_string(), args.to_vec()));
            if let Some((fail, message)) = &self.fail_keyword {
                if fail == keyword {
                    return Err(AutomationError::PlatformError(message.clone()));
                }
            }
            Ok(Value::Null)
        }

        async fn capture_screenshot(&self) -> Result<Vec<u8>, AutomationError> {
            Ok(self.screenshot.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::RecordingExecutor;
    use super::*;
    use serde_json::json;

    #[test]
    fn index_resolution_is_one_based_and_bounded() {
        let candidates = vec![UiCandidate::default(), UiCandidate::default()];
        let ctx = ActionContext::new(&candidates);
        assert!(ctx.resolve(1).is_ok());
        assert!(ctx.resolve(2).is_ok());
        for bad in [0, 3, -1] {
            match ctx.resolve(bad) {
                Err(AutomationError::InvalidIndex { index, len }) => {
                    assert_eq!(index, bad);
                    assert_eq!(len, 2);
                }
                other => panic!("expected InvalidIndex, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn unknown_tool_is_unsupported() {
        let dispatcher = Dispatcher::new(
            ToolRegistry::with_mobile_tools(),
            ToolCategory::Mobile,
            InteractionMode::Hybrid,
        );
        let executor = RecordingExecutor::default();
        let ctx = ActionContext::new(&[]);
        let err = dispatcher
            .dispatch(&executor, "teleport", &json!({}), &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, AutomationError::UnsupportedAction(_)));
        assert!(executor.calls().is_empty());
    }

    #[tokio::test]
    async fn mode_filter_applies_at_dispatch_time() {
        let dispatcher = Dispatcher::new(
            ToolRegistry::with_mobile_tools(),
            ToolCategory::Mobile,
            InteractionMode::Locator,
        );
        let executor = RecordingExecutor::default();
        let ctx = ActionContext::new(&[]);
        // The visual tap exists in the registry but locator mode hides it.
        let err = dispatcher
            .dispatch(&executor, "click_visual_element", &json!({}), &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, AutomationError::UnsupportedAction(_)));
    }

    #[tokio::test]
    async fn category_scope_applies_at_dispatch_time() {
        // Both tool sets live in one registry; a web dispatcher must not
        // reach a mobile-only tool even by its exact name.
        let dispatcher = Dispatcher::new(
            ToolRegistry::with_all_tools(),
            ToolCategory::Web,
            InteractionMode::Hybrid,
        );
        let executor = RecordingExecutor::default();
        let ctx = ActionContext::new(&[]);
        let err = dispatcher
            .dispatch(&executor, "hide_keyboard", &json!({}), &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, AutomationError::UnsupportedAction(_)));
        assert!(executor.calls().is_empty());

        // The shared name resolves to the web tool under the web scope.
        dispatcher
            .dispatch(&executor, "go_back", &json!({}), &ctx)
            .await
            .unwrap();
        assert_eq!(executor.calls()[0].0, "Go Back");
    }

    #[tokio::test]
    async fn ground_without_grounder_is_rejected() {
        let ctx = ActionContext::new(&[]);
        let err = ctx.ground("a button").await.unwrap_err();
        assert!(matches!(err, AutomationError::InvalidArgument(_)));
    }
}
