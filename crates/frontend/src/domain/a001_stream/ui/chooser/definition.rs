use super::widget::StreamChooserWidget;
use crate::shared::widget_registry::{self, BoundWidget, RegistryError, WidgetDefinition};
use serde_json::Value;
use std::rc::Rc;
use web_sys::Element;

pub const STREAM_CHOOSER_TYPE: &str = "wagtailstreaming.StreamChooser";

/// Packed form: `{"_type": "wagtailstreaming.StreamChooser", "_args": [html, idPattern]}`.
///
/// The id pattern must be present but is not used: ids come from `render`.
pub struct StreamChooserDefinition {
    html: String,
}

impl StreamChooserDefinition {
    pub fn from_args(args: &[Value]) -> Result<Box<dyn WidgetDefinition>, RegistryError> {
        let arg = |index: usize, what: &str| -> Result<String, RegistryError> {
            args.get(index)
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| RegistryError::InvalidArgs {
                    key: STREAM_CHOOSER_TYPE.to_string(),
                    reason: format!("expected {} at position {}", what, index),
                })
        };
        let html = arg(0, "html")?;
        arg(1, "id pattern")?;
        Ok(Box::new(Self { html }))
    }
}

/// Fill the `__NAME__` and `__ID__` slots of the widget template.
pub fn render_template(html: &str, name: &str, id: &str) -> String {
    html.replace("__NAME__", name).replace("__ID__", id)
}

impl WidgetDefinition for StreamChooserDefinition {
    fn render(
        &self,
        placeholder: &Element,
        name: &str,
        id: &str,
        initial_state: &Value,
    ) -> Result<Rc<dyn BoundWidget>, RegistryError> {
        placeholder.set_outer_html(&render_template(&self.html, name, id));
        let widget = StreamChooserWidget::bind(id)
            .ok_or_else(|| RegistryError::Render(format!("no stream chooser markup for '{}'", id)))?;
        BoundWidget::set_state(&widget, initial_state);
        Ok(Rc::new(widget))
    }
}

pub fn register() -> Result<(), RegistryError> {
    widget_registry::register(STREAM_CHOOSER_TYPE, StreamChooserDefinition::from_args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_template_fills_every_slot() {
        let html = r#"<div id="__ID__-chooser"><input name="__NAME__" id="__ID__"></div>"#;
        assert_eq!(
            render_template(html, "hero_stream", "id_hero_stream"),
            r#"<div id="id_hero_stream-chooser"><input name="hero_stream" id="id_hero_stream"></div>"#
        );
    }

    #[test]
    fn test_from_args() {
        let definition = StreamChooserDefinition::from_args(&[json!("<div></div>"), json!("id___ID__")]);
        assert!(definition.is_ok());
    }

    #[test]
    fn test_from_args_requires_id_pattern() {
        let err = StreamChooserDefinition::from_args(&[json!("<div></div>")])
            .err()
            .unwrap();
        assert_eq!(
            err,
            RegistryError::InvalidArgs {
                key: STREAM_CHOOSER_TYPE.to_string(),
                reason: "expected id pattern at position 1".to_string(),
            }
        );
    }

    #[test]
    fn test_unpack_registered_type() {
        let mut registry = widget_registry::WidgetRegistry::new();
        registry
            .register(STREAM_CHOOSER_TYPE, StreamChooserDefinition::from_args)
            .unwrap();
        let packed = json!({"_type": STREAM_CHOOSER_TYPE, "_args": ["<div></div>", "id___ID__"]});
        assert!(registry.unpack(&packed).is_ok());
    }
}
