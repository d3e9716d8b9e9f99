//! Mobile (Android) action tools.
//!
//! Locator tools resolve a 1-based candidate index, synthesize an Android
//! locator and hand the driver a keyword call. Gesture tools use percent
//! coordinates so they work on any screen size without grounding.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::dispatch::{arg_i64, arg_str, ActionContext, ActionExecutor};
use crate::errors::AutomationError;
use crate::locator::android;
use crate::tools::{ActionTool, ToolCapabilities, ToolCategory};

/// All mobile tools in registration order.
pub fn all_tools() -> Vec<Box<dyn ActionTool>> {
    vec![
        Box::new(TapElement),
        Box::new(InputText),
        Box::new(LongPressElement),
        Box::new(ScrollDown),
        Box::new(SwipeUp),
        Box::new(SwipeRight),
        Box::new(GoBack),
        Box::new(HideKeyboard),
        Box::new(ClickVisualElement),
    ]
}

fn index_schema(description: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "element_index": {
                "type": "integer",
                "description": description,
            }
        },
        "required": ["element_index"]
    })
}

fn empty_schema() -> Value {
    json!({ "type": "object", "properties": {} })
}

pub struct TapElement;

#[async_trait]
impl ActionTool for TapElement {
    fn name(&self) -> &'static str {
        "tap_element"
    }
    fn description(&self) -> &'static str {
        "Tap an element from the candidate list by its 1-based index."
    }
    fn category(&self) -> ToolCategory {
        ToolCategory::Mobile
    }
    fn capabilities(&self) -> ToolCapabilities {
        ToolCapabilities::LOCATOR_WITH_VISUAL_TWIN
    }
    fn parameters_schema(&self) -> Value {
        index_schema("1-based index of the element to tap")
    }

    async fn execute(
        &self,
        executor: &dyn ActionExecutor,
        args: &Value,
        ctx: &ActionContext<'_>,
    ) -> Result<Value, AutomationError> {
        let candidate = ctx.resolve(arg_i64(args, "element_index")?)?;
        let locator = android::build_priority(candidate)?;
        debug!("tapping {locator}");
        executor.run_action("Click Element", &[json!(locator)]).await?;
        Ok(json!({ "locator": locator }))
    }
}

pub struct InputText;

#[async_trait]
impl ActionTool for InputText {
    fn name(&self) -> &'static str {
        "input_text"
    }
    fn description(&self) -> &'static str {
        "Clear a text field from the candidate list and type new text into it."
    }
    fn category(&self) -> ToolCategory {
        ToolCategory::Mobile
    }
    fn capabilities(&self) -> ToolCapabilities {
        ToolCapabilities::LOCATOR
    }
    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "element_index": {
                    "type": "integer",
                    "description": "1-based index of the text field",
                },
                "text": {
                    "type": "string",
                    "description": "Text to type",
                }
            },
            "required": ["element_index", "text"]
        })
    }

    async fn execute(
        &self,
        executor: &dyn ActionExecutor,
        args: &Value,
        ctx: &ActionContext<'_>,
    ) -> Result<Value, AutomationError> {
        let candidate = ctx.resolve(arg_i64(args, "element_index")?)?;
        let text = arg_str(args, "text")?;
        let locator = android::build_priority(candidate)?;
        executor.run_action("Clear Text", &[json!(locator)]).await?;
        executor
            .run_action("Input Text", &[json!(locator), json!(text)])
            .await?;
        Ok(json!({ "locator": locator, "text": text }))
    }
}

pub struct LongPressElement;

#[async_trait]
impl ActionTool for LongPressElement {
    fn name(&self) -> &'static str {
        "long_press_element"
    }
    fn description(&self) -> &'static str {
        "Press and hold an element from the candidate list for two seconds."
    }
    fn category(&self) -> ToolCategory {
        ToolCategory::Mobile
    }
    fn capabilities(&self) -> ToolCapabilities {
        ToolCapabilities::LOCATOR
    }
    fn parameters_schema(&self) -> Value {
        index_schema("1-based index of the element to long-press")
    }

    async fn execute(
        &self,
        executor: &dyn ActionExecutor,
        args: &Value,
        ctx: &ActionContext<'_>,
    ) -> Result<Value, AutomationError> {
        let candidate = ctx.resolve(arg_i64(args, "element_index")?)?;
        let locator = android::build_priority(candidate)?;
        executor
            .run_action("Tap", &[json!(locator), json!(1), json!("2s")])
            .await?;
        Ok(json!({ "locator": locator }))
    }
}

/// A percent-coordinate swipe, shared by the three gesture tools.
async fn swipe(
    executor: &dyn ActionExecutor,
    from: (i64, i64),
    to: (i64, i64),
) -> Result<Value, AutomationError> {
    executor
        .run_action(
            "Swipe By Percent",
            &[
                json!(from.0),
                json!(from.1),
                json!(to.0),
                json!(to.1),
                json!("1s"),
            ],
        )
        .await?;
    Ok(json!({ "from": [from.0, from.1], "to": [to.0, to.1] }))
}

pub struct ScrollDown;

#[async_trait]
impl ActionTool for ScrollDown {
    fn name(&self) -> &'static str {
        "scroll_down"
    }
    fn description(&self) -> &'static str {
        "Scroll the screen content down by one viewport."
    }
    fn category(&self) -> ToolCategory {
        ToolCategory::Mobile
    }
    fn capabilities(&self) -> ToolCapabilities {
        ToolCapabilities::UNIVERSAL
    }
    fn parameters_schema(&self) -> Value {
        empty_schema()
    }

    async fn execute(
        &self,
        executor: &dyn ActionExecutor,
        _args: &Value,
        _ctx: &ActionContext<'_>,
    ) -> Result<Value, AutomationError> {
        swipe(executor, (50, 80), (50, 20)).await
    }
}

pub struct SwipeUp;

#[async_trait]
impl ActionTool for SwipeUp {
    fn name(&self) -> &'static str {
        "swipe_up"
    }
    fn description(&self) -> &'static str {
        "Swipe upward from the lower half of the screen."
    }
    fn category(&self) -> ToolCategory {
        ToolCategory::Mobile
    }
    fn capabilities(&self) -> ToolCapabilities {
        ToolCapabilities::UNIVERSAL
    }
    fn parameters_schema(&self) -> Value {
        empty_schema()
    }

    async fn execute(
        &self,
        executor: &dyn ActionExecutor,
        _args: &Value,
        _ctx: &ActionContext<'_>,
    ) -> Result<Value, AutomationError> {
        swipe(executor, (50, 80), (50, 20)).await
    }
}

pub struct SwipeRight;

#[async_trait]
impl ActionTool for SwipeRight {
    fn name(&self) -> &'static str {
        "swipe_right"
    }
    fn description(&self) -> &'static str {
        "Swipe from the left edge toward the right edge of the screen."
    }
    fn category(&self) -> ToolCategory {
        ToolCategory::Mobile
    }
    fn capabilities(&self) -> ToolCapabilities {
        ToolCapabilities::UNIVERSAL
    }
    fn parameters_schema(&self) -> Value {
        empty_schema()
    }

    async fn execute(
        &self,
        executor: &dyn ActionExecutor,
        _args: &Value,
        _ctx: &ActionContext<'_>,
    ) -> Result<Value, AutomationError> {
        swipe(executor, (20, 50), (80, 50)).await
    }
}

pub struct GoBack;

#[async_trait]
impl ActionTool for GoBack {
    fn name(&self) -> &'static str {
        "go_back"
    }
    fn description(&self) -> &'static str {
        "Press the device back button."
    }
    fn category(&self) -> ToolCategory {
        ToolCategory::Mobile
    }
    fn capabilities(&self) -> ToolCapabilities {
        ToolCapabilities::UNIVERSAL
    }
    fn parameters_schema(&self) -> Value {
        empty_schema()
    }

    async fn execute(
        &self,
        executor: &dyn ActionExecutor,
        _args: &Value,
        _ctx: &ActionContext<'_>,
    ) -> Result<Value, AutomationError> {
        executor.run_action("Go Back", &[]).await?;
        Ok(json!({ "action": "back" }))
    }
}

pub struct HideKeyboard;

#[async_trait]
impl ActionTool for HideKeyboard {
    fn name(&self) -> &'static str {
        "hide_keyboard"
    }
    fn description(&self) -> &'static str {
        "Dismiss the on-screen keyboard if it is open."
    }
    fn category(&self) -> ToolCategory {
        ToolCategory::Mobile
    }
    fn capabilities(&self) -> ToolCapabilities {
        ToolCapabilities::UNIVERSAL
    }
    fn parameters_schema(&self) -> Value {
        empty_schema()
    }

    async fn execute(
        &self,
        executor: &dyn ActionExecutor,
        _args: &Value,
        _ctx: &ActionContext<'_>,
    ) -> Result<Value, AutomationError> {
        executor.run_action("Hide Keyboard", &[]).await?;
        Ok(json!({ "action": "hide_keyboard" }))
    }
}

pub struct ClickVisualElement;

#[async_trait]
impl ActionTool for ClickVisualElement {
    fn name(&self) -> &'static str {
        "click_visual_element"
    }
    fn description(&self) -> &'static str {
        "Tap an element located on the screenshot by a natural-language description."
    }
    fn category(&self) -> ToolCategory {
        ToolCategory::Mobile
    }
    fn capabilities(&self) -> ToolCapabilities {
        ToolCapabilities::VISUAL
    }
    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "description": {
                    "type": "string",
                    "description": "What the element looks like or says",
                }
            },
            "required": ["description"]
        })
    }

    async fn execute(
        &self,
        executor: &dyn ActionExecutor,
        args: &Value,
        ctx: &ActionContext<'_>,
    ) -> Result<Value, AutomationError> {
        let description = arg_str(args, "description")?;
        let candidate = ctx.ground(description).await?;
        let (x, y) = candidate.bbox.center();
        debug!("visual tap at ({x}, {y}) for '{description}'");
        executor.run_action("Tap", &[json!([x, y])]).await?;
        Ok(json!({ "x": x, "y": y }))
    }
}
