//! Client-side widget registry.
//!
//! The server renders form widgets as placeholders carrying a packed
//! definition `{"_type": "<key>", "_args": [...]}` plus the field's name, id
//! and initial value. The registry maps each key to a constructor that turns
//! `_args` into a [`WidgetDefinition`], which then renders itself into the
//! placeholder. Registration happens once at module start; there is no
//! teardown.

use serde::Deserialize;
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use thiserror::Error;
use web_sys::Element;

use crate::shared::dom;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("widget type '{0}' is not registered")]
    UnknownType(String),
    #[error("widget type '{0}' is already registered")]
    DuplicateType(String),
    #[error("invalid arguments for '{key}': {reason}")]
    InvalidArgs { key: String, reason: String },
    #[error("invalid packed widget definition: {0}")]
    InvalidPacked(String),
    #[error("render failed: {0}")]
    Render(String),
}

/// A live widget bound to one form field.
pub trait BoundWidget {
    fn get_value(&self) -> Option<String>;
    fn get_state(&self) -> Value;
    fn set_state(&self, state: &Value);
    fn get_text_label(&self, max_length: Option<usize>) -> String;
    fn focus(&self);
}

/// An unpacked widget type, ready to render into placeholders.
pub trait WidgetDefinition {
    fn render(
        &self,
        placeholder: &Element,
        name: &str,
        id: &str,
        initial_state: &Value,
    ) -> Result<Rc<dyn BoundWidget>, RegistryError>;
}

pub type WidgetConstructor = fn(&[Value]) -> Result<Box<dyn WidgetDefinition>, RegistryError>;

#[derive(Debug, Deserialize)]
struct Packed {
    #[serde(rename = "_type")]
    key: String,
    #[serde(rename = "_args", default)]
    args: Vec<Value>,
}

#[derive(Default)]
pub struct WidgetRegistry {
    constructors: HashMap<String, WidgetConstructor>,
}

impl WidgetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, key: &str, constructor: WidgetConstructor) -> Result<(), RegistryError> {
        if self.constructors.contains_key(key) {
            return Err(RegistryError::DuplicateType(key.to_string()));
        }
        self.constructors.insert(key.to_string(), constructor);
        Ok(())
    }

    pub fn is_registered(&self, key: &str) -> bool {
        self.constructors.contains_key(key)
    }

    pub fn constructor(&self, key: &str) -> Result<WidgetConstructor, RegistryError> {
        self.constructors
            .get(key)
            .copied()
            .ok_or_else(|| RegistryError::UnknownType(key.to_string()))
    }

    /// Build the definition described by a packed `{"_type", "_args"}` value.
    pub fn unpack(&self, packed: &Value) -> Result<Box<dyn WidgetDefinition>, RegistryError> {
        let packed = Packed::deserialize(packed)
            .map_err(|e| RegistryError::InvalidPacked(e.to_string()))?;
        let constructor = self.constructor(&packed.key)?;
        constructor(&packed.args)
    }
}

thread_local! {
    static REGISTRY: RefCell<WidgetRegistry> = RefCell::new(WidgetRegistry::new());
}

pub fn register(key: &str, constructor: WidgetConstructor) -> Result<(), RegistryError> {
    REGISTRY.with(|r| r.borrow_mut().register(key, constructor))
}

pub fn unpack(packed: &Value) -> Result<Box<dyn WidgetDefinition>, RegistryError> {
    // The constructor runs outside the borrow so it may consult the registry itself.
    let packed_key = packed
        .get("_type")
        .and_then(Value::as_str)
        .ok_or_else(|| RegistryError::InvalidPacked("missing _type".to_string()))?
        .to_string();
    let constructor = REGISTRY.with(|r| r.borrow().constructor(&packed_key))?;
    let args = packed
        .get("_args")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    constructor(&args)
}

/// Placeholder attribute holding the packed definition.
pub const PLACEHOLDER_ATTR: &str = "data-widget";

/// Hydrate every `[data-widget]` placeholder under `root`.
///
/// A placeholder also carries `data-name`, `data-id` and, optionally,
/// `data-value` with the JSON initial state. Failures are logged per
/// placeholder and do not stop the others.
pub fn hydrate_placeholders(root: &Element) -> Vec<Rc<dyn BoundWidget>> {
    let mut widgets = Vec::new();
    for placeholder in dom::query_all(root, &format!("[{}]", PLACEHOLDER_ATTR)) {
        match hydrate_one(&placeholder) {
            Ok(widget) => widgets.push(widget),
            Err(e) => log::error!("widget hydration failed: {}", e),
        }
    }
    log::debug!("hydrated {} widget(s)", widgets.len());
    widgets
}

fn hydrate_one(placeholder: &Element) -> Result<Rc<dyn BoundWidget>, RegistryError> {
    let packed_text = placeholder.get_attribute(PLACEHOLDER_ATTR).unwrap_or_default();
    let packed: Value = serde_json::from_str(&packed_text)
        .map_err(|e| RegistryError::InvalidPacked(e.to_string()))?;
    let name = placeholder.get_attribute("data-name").unwrap_or_default();
    let id = placeholder.get_attribute("data-id").unwrap_or_default();
    let initial_state = match placeholder.get_attribute("data-value") {
        Some(text) => serde_json::from_str(&text)
            .map_err(|e| RegistryError::InvalidPacked(e.to_string()))?,
        None => Value::Null,
    };

    let definition = unpack(&packed)?;
    definition.render(placeholder, &name, &id, &initial_state)
}
