//! Web (browser) action tools.
//!
//! The combined locators are specific on purpose, which occasionally makes
//! them match more than one node. When the driver reports a strict-mode
//! violation the click tool falls back to coordinates when the candidate has
//! a box, or pins the first match otherwise.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::dispatch::{arg_i64, arg_str, ActionContext, ActionExecutor};
use crate::errors::AutomationError;
use crate::locator::web;
use crate::tools::{ActionTool, ToolCapabilities, ToolCategory};

/// Tags that accept typed text.
const TEXT_INPUT_TAGS: &[&str] = &["input", "textarea"];

/// Input types that accept free text.
const TEXT_INPUT_TYPES: &[&str] = &[
    "text", "search", "email", "password", "tel", "url", "number", "",
];

/// All web tools in registration order.
pub fn all_tools() -> Vec<Box<dyn ActionTool>> {
    vec![
        Box::new(ClickElement),
        Box::new(InputText),
        Box::new(Hover),
        Box::new(PressKey),
        Box::new(ScrollDown),
        Box::new(ScrollUp),
        Box::new(ScrollToElement),
        Box::new(SelectOption),
        Box::new(GoBack),
        Box::new(ClickVisualElement),
        Box::new(InputTextVisual),
        Box::new(DoubleClickVisualElement),
        Box::new(ClearTextVisual),
        Box::new(ScrollToElementVisual),
        Box::new(SelectOptionVisual),
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

fn description_schema() -> Value {
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

fn empty_schema() -> Value {
    json!({ "type": "object", "properties": {} })
}

fn is_ambiguous(err: &AutomationError) -> bool {
    matches!(err, AutomationError::AmbiguousSelector(_))
        || err.to_string().contains("strict mode violation")
}

pub struct ClickElement;

#[async_trait]
impl ActionTool for ClickElement {
    fn name(&self) -> &'static str {
        "click_element"
    }
    fn description(&self) -> &'static str {
        "Click an element from the candidate list by its 1-based index."
    }
    fn category(&self) -> ToolCategory {
        ToolCategory::Web
    }
    fn capabilities(&self) -> ToolCapabilities {
        ToolCapabilities::LOCATOR_WITH_VISUAL_TWIN
    }
    fn parameters_schema(&self) -> Value {
        index_schema("1-based index of the element to click")
    }

    async fn execute(
        &self,
        executor: &dyn ActionExecutor,
        args: &Value,
        ctx: &ActionContext<'_>,
    ) -> Result<Value, AutomationError> {
        let candidate = ctx.resolve(arg_i64(args, "element_index")?)?;
        let locator = web::build_combined(candidate)?;
        match executor
            .run_action("Click with options", &[json!(locator), json!("force=True")])
            .await
        {
            Ok(_) => Ok(json!({ "locator": locator })),
            Err(err) if is_ambiguous(&err) => {
                if candidate.bbox.is_valid() {
                    let (x, y) = candidate.bbox.center();
                    warn!("'{locator}' matched multiple nodes, clicking at ({x}, {y})");
                    executor
                        .run_action("Mouse Button", &[json!("click"), json!(x), json!(y)])
                        .await?;
                    Ok(json!({ "locator": locator, "fallback": "coordinates", "x": x, "y": y }))
                } else {
                    let pinned = format!("{locator} >> nth=0");
                    warn!("'{locator}' matched multiple nodes, pinning first match");
                    executor.run_action("Click", &[json!(pinned)]).await?;
                    Ok(json!({ "locator": pinned, "fallback": "nth" }))
                }
            }
            Err(err) => Err(err),
        }
    }
}

pub struct InputText;

#[async_trait]
impl ActionTool for InputText {
    fn name(&self) -> &'static str {
        "input_text"
    }
    fn description(&self) -> &'static str {
        "Fill a text field from the candidate list with the given text."
    }
    fn category(&self) -> ToolCategory {
        ToolCategory::Web
    }
    fn capabilities(&self) -> ToolCapabilities {
        ToolCapabilities::LOCATOR_WITH_VISUAL_TWIN
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
                    "description": "Text to fill in",
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

        let tag = candidate.class_name.to_lowercase();
        let input_type = candidate.element_type.to_lowercase();
        if !TEXT_INPUT_TAGS.contains(&tag.as_str()) {
            return Err(AutomationError::InvalidArgument(format!(
                "cannot type into <{tag}>, element {} is not a text field",
                candidate.summary()
            )));
        }
        if tag == "input" && !TEXT_INPUT_TYPES.contains(&input_type.as_str()) {
            return Err(AutomationError::InvalidArgument(format!(
                "input type '{input_type}' does not accept typed text"
            )));
        }

        let locator = web::build_combined(candidate)?;
        executor
            .run_action("Fill Text", &[json!(locator), json!(text)])
            .await?;
        Ok(json!({ "locator": locator, "text": text }))
    }
}

pub struct Hover;

#[async_trait]
impl ActionTool for Hover {
    fn name(&self) -> &'static str {
        "hover"
    }
    fn description(&self) -> &'static str {
        "Move the mouse over an element from the candidate list."
    }
    fn category(&self) -> ToolCategory {
        ToolCategory::Web
    }
    fn capabilities(&self) -> ToolCapabilities {
        ToolCapabilities::LOCATOR_WITH_VISUAL_TWIN
    }
    fn parameters_schema(&self) -> Value {
        index_schema("1-based index of the element to hover")
    }

    async fn execute(
        &self,
        executor: &dyn ActionExecutor,
        args: &Value,
        ctx: &ActionContext<'_>,
    ) -> Result<Value, AutomationError> {
        let candidate = ctx.resolve(arg_i64(args, "element_index")?)?;
        let locator = web::build_combined(candidate)?;
        executor.run_action("Hover", &[json!(locator)]).await?;
        Ok(json!({ "locator": locator }))
    }
}

pub struct PressKey;

#[async_trait]
impl ActionTool for PressKey {
    fn name(&self) -> &'static str {
        "press_key"
    }
    fn description(&self) -> &'static str {
        "Press a keyboard key (for example Enter, Escape or Tab) on the page."
    }
    fn category(&self) -> ToolCategory {
        ToolCategory::Web
    }
    fn capabilities(&self) -> ToolCapabilities {
        ToolCapabilities::UNIVERSAL
    }
    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "key": {
                    "type": "string",
                    "description": "Key name, e.g. Enter",
                }
            },
            "required": ["key"]
        })
    }

    async fn execute(
        &self,
        executor: &dyn ActionExecutor,
        args: &Value,
        _ctx: &ActionContext<'_>,
    ) -> Result<Value, AutomationError> {
        let key = arg_str(args, "key")?;
        executor
            .run_action("Press Keys", &[json!("body"), json!(key)])
            .await?;
        Ok(json!({ "key": key }))
    }
}

pub struct ScrollDown;

#[async_trait]
impl ActionTool for ScrollDown {
    fn name(&self) -> &'static str {
        "scroll_down"
    }
    fn description(&self) -> &'static str {
        "Scroll the page down by one viewport height."
    }
    fn category(&self) -> ToolCategory {
        ToolCategory::Web
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
        executor
            .run_action("Scroll By", &[Value::Null, json!("height")])
            .await?;
        Ok(json!({ "direction": "down" }))
    }
}

pub struct ScrollUp;

#[async_trait]
impl ActionTool for ScrollUp {
    fn name(&self) -> &'static str {
        "scroll_up"
    }
    fn description(&self) -> &'static str {
        "Scroll the page up by one viewport height."
    }
    fn category(&self) -> ToolCategory {
        ToolCategory::Web
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
        executor
            .run_action("Scroll By", &[Value::Null, json!("-height")])
            .await?;
        Ok(json!({ "direction": "up" }))
    }
}

pub struct ScrollToElement;

#[async_trait]
impl ActionTool for ScrollToElement {
    fn name(&self) -> &'static str {
        "scroll_to_element"
    }
    fn description(&self) -> &'static str {
        "Scroll the page until an element from the candidate list is in view."
    }
    fn category(&self) -> ToolCategory {
        ToolCategory::Web
    }
    fn capabilities(&self) -> ToolCapabilities {
        ToolCapabilities::LOCATOR
    }
    fn parameters_schema(&self) -> Value {
        index_schema("1-based index of the element to scroll to")
    }

    async fn execute(
        &self,
        executor: &dyn ActionExecutor,
        args: &Value,
        ctx: &ActionContext<'_>,
    ) -> Result<Value, AutomationError> {
        let candidate = ctx.resolve(arg_i64(args, "element_index")?)?;
        let locator = web::build_combined(candidate)?;
        executor
            .run_action("Scroll To Element", &[json!(locator)])
            .await?;
        Ok(json!({ "locator": locator }))
    }
}

pub struct SelectOption;

#[async_trait]
impl ActionTool for SelectOption {
    fn name(&self) -> &'static str {
        "select_option"
    }
    fn description(&self) -> &'static str {
        "Select an option by visible text in a dropdown from the candidate list."
    }
    fn category(&self) -> ToolCategory {
        ToolCategory::Web
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
                    "description": "1-based index of the select element",
                },
                "option": {
                    "type": "string",
                    "description": "Visible text of the option to select",
                }
            },
            "required": ["element_index", "option"]
        })
    }

    async fn execute(
        &self,
        executor: &dyn ActionExecutor,
        args: &Value,
        ctx: &ActionContext<'_>,
    ) -> Result<Value, AutomationError> {
        let candidate = ctx.resolve(arg_i64(args, "element_index")?)?;
        let option = arg_str(args, "option")?;
        let locator = web::build_combined(candidate)?;
        executor
            .run_action(
                "Select Options By",
                &[json!(locator), json!("text"), json!(option)],
            )
            .await?;
        Ok(json!({ "locator": locator, "option": option }))
    }
}

pub struct GoBack;

#[async_trait]
impl ActionTool for GoBack {
    fn name(&self) -> &'static str {
        "go_back"
    }
    fn description(&self) -> &'static str {
        "Navigate back in the browser history."
    }
    fn category(&self) -> ToolCategory {
        ToolCategory::Web
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

pub struct ClickVisualElement;

#[async_trait]
impl ActionTool for ClickVisualElement {
    fn name(&self) -> &'static str {
        "click_visual_element"
    }
    fn description(&self) -> &'static str {
        "Click an element located on the screenshot by a natural-language description."
    }
    fn category(&self) -> ToolCategory {
        ToolCategory::Web
    }
    fn capabilities(&self) -> ToolCapabilities {
        ToolCapabilities::VISUAL
    }
    fn parameters_schema(&self) -> Value {
        description_schema()
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
        debug!("visual click at ({x}, {y}) for '{description}'");
        executor
            .run_action("Mouse Button", &[json!("click"), json!(x), json!(y)])
            .await?;
        Ok(json!({ "x": x, "y": y }))
    }
}

pub struct InputTextVisual;

#[async_trait]
impl ActionTool for InputTextVisual {
    fn name(&self) -> &'static str {
        "input_text_visual"
    }
    fn description(&self) -> &'static str {
        "Click a field located on the screenshot by description, then type into it."
    }
    fn category(&self) -> ToolCategory {
        ToolCategory::Web
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
                    "description": "What the field looks like or says",
                },
                "text": {
                    "type": "string",
                    "description": "Text to type",
                }
            },
            "required": ["description", "text"]
        })
    }

    async fn execute(
        &self,
        executor: &dyn ActionExecutor,
        args: &Value,
        ctx: &ActionContext<'_>,
    ) -> Result<Value, AutomationError> {
        let description = arg_str(args, "description")?;
        let text = arg_str(args, "text")?;
        let candidate = ctx.ground(description).await?;
        let (x, y) = candidate.bbox.center();
        executor
            .run_action("Mouse Button", &[json!("click"), json!(x), json!(y)])
            .await?;
        executor
            .run_action("Keyboard Input", &[json!("type"), json!(text)])
            .await?;
        Ok(json!({ "x": x, "y": y, "text": text }))
    }
}

pub struct DoubleClickVisualElement;

#[async_trait]
impl ActionTool for DoubleClickVisualElement {
    fn name(&self) -> &'static str {
        "double_click_visual_element"
    }
    fn description(&self) -> &'static str {
        "Double-click an element located on the screenshot by description."
    }
    fn category(&self) -> ToolCategory {
        ToolCategory::Web
    }
    fn capabilities(&self) -> ToolCapabilities {
        ToolCapabilities::VISUAL
    }
    fn parameters_schema(&self) -> Value {
        description_schema()
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
        executor
            .run_action(
                "Mouse Button",
                &[json!("click"), json!(x), json!(y), json!("clickCount=2")],
            )
            .await?;
        Ok(json!({ "x": x, "y": y }))
    }
}

pub struct ClearTextVisual;

#[async_trait]
impl ActionTool for ClearTextVisual {
    fn name(&self) -> &'static str {
        "clear_text_visual"
    }
    fn description(&self) -> &'static str {
        "Clear a field located on the screenshot by description: triple-click to select, then delete."
    }
    fn category(&self) -> ToolCategory {
        ToolCategory::Web
    }
    fn capabilities(&self) -> ToolCapabilities {
        ToolCapabilities::VISUAL
    }
    fn parameters_schema(&self) -> Value {
        description_schema()
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
        // Triple-click selects the field's whole content.
        for _ in 0..3 {
            executor
                .run_action("Mouse Button", &[json!("click"), json!(x), json!(y)])
                .await?;
        }
        executor
            .run_action("Keyboard Input", &[json!("press"), json!("Backspace")])
            .await?;
        Ok(json!({ "x": x, "y": y }))
    }
}

pub struct ScrollToElementVisual;

#[async_trait]
impl ActionTool for ScrollToElementVisual {
    fn name(&self) -> &'static str {
        "scroll_to_element_visual"
    }
    fn description(&self) -> &'static str {
        "Scroll the page until an element located on the screenshot by description is centered."
    }
    fn category(&self) -> ToolCategory {
        ToolCategory::Web
    }
    fn capabilities(&self) -> ToolCapabilities {
        ToolCapabilities::VISUAL
    }
    fn parameters_schema(&self) -> Value {
        description_schema()
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
        debug!("visual scroll toward ({x}, {y}) for '{description}'");
        let script = format!(
            "window.scrollTo({{top: {y} - window.innerHeight / 2, behavior: 'smooth'}});"
        );
        executor
            .run_action(
                "Evaluate JavaScript",
                &[json!("body >> nth=0"), json!(script)],
            )
            .await?;
        Ok(json!({ "x": x, "y": y }))
    }
}

pub struct SelectOptionVisual;

#[async_trait]
impl ActionTool for SelectOptionVisual {
    fn name(&self) -> &'static str {
        "select_option_visual"
    }
    fn description(&self) -> &'static str {
        "Open a dropdown located on the screenshot by description, then click one of its options."
    }
    fn category(&self) -> ToolCategory {
        ToolCategory::Web
    }
    fn capabilities(&self) -> ToolCapabilities {
        ToolCapabilities::VISUAL
    }
    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "dropdown_description": {
                    "type": "string",
                    "description": "What the dropdown looks like or says",
                },
                "option_description": {
                    "type": "string",
                    "description": "What the option to select looks like or says",
                }
            },
            "required": ["dropdown_description", "option_description"]
        })
    }

    async fn execute(
        &self,
        executor: &dyn ActionExecutor,
        args: &Value,
        ctx: &ActionContext<'_>,
    ) -> Result<Value, AutomationError> {
        let dropdown_description = arg_str(args, "dropdown_description")?;
        let option_description = arg_str(args, "option_description")?;

        let dropdown = ctx.ground(dropdown_description).await?;
        let (x, y) = dropdown.bbox.center();
        executor
            .run_action("Mouse Button", &[json!("click"), json!(x), json!(y)])
            .await?;
        executor.run_action("Sleep", &[json!("0.5s")]).await?;

        // The open dropdown changed the screen; ground the option on a
        // fresh frame.
        let grounder = ctx.grounder.ok_or_else(|| {
            AutomationError::InvalidArgument(
                "visual grounding requested but no grounder is configured".to_string(),
            )
        })?;
        let frame = executor.capture_screenshot().await?;
        let option = grounder.ground(option_description, &frame).await?;
        let (ox, oy) = option.bbox.center();
        debug!("selecting option at ({ox}, {oy}) for '{option_description}'");
        executor
            .run_action("Mouse Button", &[json!("click"), json!(ox), json!(oy)])
            .await?;
        Ok(json!({ "dropdown": [x, y], "option": [ox, oy] }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::testing::RecordingExecutor;
    use crate::grounding::testing::{blank_png, detected, fixed_grounder};
    use crate::types::{BoundingBox, UiCandidate};
    use std::collections::HashMap;

    fn button(bbox: BoundingBox) -> UiCandidate {
        UiCandidate {
            class_name: "button".into(),
            resource_id: "submit".into(),
            bbox,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn click_uses_forced_options() {
        let executor = RecordingExecutor::default();
        let list = vec![button(BoundingBox::default())];
        let ctx = ActionContext::new(&list);
        ClickElement
            .execute(&executor, &json!({ "element_index": 1 }), &ctx)
            .await
            .unwrap();
        assert_eq!(
            executor.calls(),
            vec![(
                "Click with options".to_string(),
                vec![json!("button[id=\"submit\"]:visible"), json!("force=True")]
            )]
        );
    }

    #[tokio::test]
    async fn strict_mode_falls_back_to_coordinates_when_box_is_known() {
        let executor = RecordingExecutor::failing(
            "Click with options",
            "strict mode violation: locator resolved to 3 elements",
        );
        let list = vec![button(BoundingBox::new(100, 200, 80, 40))];
        let ctx = ActionContext::new(&list);
        let result = ClickElement
            .execute(&executor, &json!({ "element_index": 1 }), &ctx)
            .await
            .unwrap();
        assert_eq!(result["fallback"], "coordinates");
        let calls = executor.calls();
        assert_eq!(calls[1].0, "Mouse Button");
        assert_eq!(calls[1].1, vec![json!("click"), json!(140), json!(220)]);
    }

    #[tokio::test]
    async fn strict_mode_pins_first_match_without_box() {
        let executor = RecordingExecutor::failing(
            "Click with options",
            "strict mode violation: locator resolved to 2 elements",
        );
        let list = vec![button(BoundingBox::default())];
        let ctx = ActionContext::new(&list);
        let result = ClickElement
            .execute(&executor, &json!({ "element_index": 1 }), &ctx)
            .await
            .unwrap();
        assert_eq!(result["fallback"], "nth");
        let calls = executor.calls();
        assert_eq!(calls[1].0, "Click");
        assert_eq!(
            calls[1].1,
            vec![json!("button[id=\"submit\"]:visible >> nth=0")]
        );
    }

    #[tokio::test]
    async fn other_driver_errors_propagate() {
        let executor =
            RecordingExecutor::failing("Click with options", "net::ERR_CONNECTION_RESET");
        let list = vec![button(BoundingBox::new(0, 0, 10, 10))];
        let ctx = ActionContext::new(&list);
        let err = ClickElement
            .execute(&executor, &json!({ "element_index": 1 }), &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, AutomationError::PlatformError(_)));
        assert_eq!(executor.calls().len(), 1);
    }

    #[tokio::test]
    async fn typing_into_a_button_is_rejected() {
        let executor = RecordingExecutor::default();
        let list = vec![button(BoundingBox::default())];
        let ctx = ActionContext::new(&list);
        let err = InputText
            .execute(
                &executor,
                &json!({ "element_index": 1, "text": "x" }),
                &ctx,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AutomationError::InvalidArgument(_)));
        assert!(executor.calls().is_empty());
    }

    #[tokio::test]
    async fn typing_into_a_checkbox_input_is_rejected() {
        let executor = RecordingExecutor::default();
        let list = vec![UiCandidate {
            class_name: "input".into(),
            element_type: "checkbox".into(),
            name: "agree".into(),
            ..Default::default()
        }];
        let ctx = ActionContext::new(&list);
        let err = InputText
            .execute(
                &executor,
                &json!({ "element_index": 1, "text": "x" }),
                &ctx,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AutomationError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn filling_an_email_input_works() {
        let executor = RecordingExecutor::default();
        let list = vec![UiCandidate {
            class_name: "input".into(),
            element_type: "email".into(),
            name: "user_email".into(),
            ..Default::default()
        }];
        let ctx = ActionContext::new(&list);
        InputText
            .execute(
                &executor,
                &json!({ "element_index": 1, "text": "a@b.c" }),
                &ctx,
            )
            .await
            .unwrap();
        let calls = executor.calls();
        assert_eq!(calls[0].0, "Fill Text");
        assert_eq!(
            calls[0].1,
            vec![
                json!("input[type=\"email\"][name=\"user_email\"]:visible"),
                json!("a@b.c")
            ]
        );
    }

    #[tokio::test]
    async fn scrolls_use_viewport_height() {
        let executor = RecordingExecutor::default();
        let ctx = ActionContext::new(&[]);
        ScrollDown.execute(&executor, &json!({}), &ctx).await.unwrap();
        ScrollUp.execute(&executor, &json!({}), &ctx).await.unwrap();
        let calls = executor.calls();
        assert_eq!(calls[0].1, vec![Value::Null, json!("height")]);
        assert_eq!(calls[1].1, vec![Value::Null, json!("-height")]);
    }

    #[tokio::test]
    async fn press_key_targets_the_document_body() {
        let executor = RecordingExecutor::default();
        let ctx = ActionContext::new(&[]);
        PressKey
            .execute(&executor, &json!({ "key": "Enter" }), &ctx)
            .await
            .unwrap();
        assert_eq!(
            executor.calls(),
            vec![("Press Keys".to_string(), vec![json!("body"), json!("Enter")])]
        );
    }

    #[test]
    fn hover_is_hidden_in_visual_mode() {
        use crate::tools::InteractionMode;
        assert!(!InteractionMode::Visual.admits(Hover.capabilities()));
        assert!(InteractionMode::Locator.admits(Hover.capabilities()));
    }

    // The fixture grounder always resolves to the 0.5..0.6 square, so on a
    // 1000x1000 frame every visual center lands at (550, 550).
    fn visual_fixture() -> (crate::grounding::VisualGrounder, Vec<u8>) {
        let mut elements = HashMap::new();
        elements.insert("4".to_string(), detected("country dropdown"));
        (fixed_grounder(elements, Some("4")), blank_png(1000, 1000))
    }

    #[tokio::test]
    async fn clear_text_visual_triple_clicks_then_deletes() {
        let (grounder, png) = visual_fixture();
        let executor = RecordingExecutor::default();
        let ctx = ActionContext::new(&[])
            .with_screenshot(&png)
            .with_grounder(&grounder);
        ClearTextVisual
            .execute(&executor, &json!({ "description": "search box" }), &ctx)
            .await
            .unwrap();
        let calls = executor.calls();
        assert_eq!(calls.len(), 4);
        for call in &calls[..3] {
            assert_eq!(call.0, "Mouse Button");
            assert_eq!(call.1, vec![json!("click"), json!(550), json!(550)]);
        }
        assert_eq!(
            calls[3],
            (
                "Keyboard Input".to_string(),
                vec![json!("press"), json!("Backspace")]
            )
        );
    }

    #[tokio::test]
    async fn scroll_to_element_visual_centers_via_javascript() {
        let (grounder, png) = visual_fixture();
        let executor = RecordingExecutor::default();
        let ctx = ActionContext::new(&[])
            .with_screenshot(&png)
            .with_grounder(&grounder);
        ScrollToElementVisual
            .execute(&executor, &json!({ "description": "footer links" }), &ctx)
            .await
            .unwrap();
        let calls = executor.calls();
        assert_eq!(calls[0].0, "Evaluate JavaScript");
        assert_eq!(calls[0].1[0], json!("body >> nth=0"));
        assert_eq!(
            calls[0].1[1],
            json!("window.scrollTo({top: 550 - window.innerHeight / 2, behavior: 'smooth'});")
        );
    }

    #[tokio::test]
    async fn select_option_visual_regrounds_on_a_fresh_frame() {
        let (grounder, png) = visual_fixture();
        let executor = RecordingExecutor::with_screenshot(blank_png(1000, 1000));
        let ctx = ActionContext::new(&[])
            .with_screenshot(&png)
            .with_grounder(&grounder);
        SelectOptionVisual
            .execute(
                &executor,
                &json!({
                    "dropdown_description": "country dropdown",
                    "option_description": "France"
                }),
                &ctx,
            )
            .await
            .unwrap();
        let calls = executor.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(
            calls[0],
            (
                "Mouse Button".to_string(),
                vec![json!("click"), json!(550), json!(550)]
            )
        );
        assert_eq!(calls[1], ("Sleep".to_string(), vec![json!("0.5s")]));
        assert_eq!(
            calls[2],
            (
                "Mouse Button".to_string(),
                vec![json!("click"), json!(550), json!(550)]
            )
        );
    }
}
