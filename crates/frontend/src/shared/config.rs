use once_cell::unsync::OnceCell;
use serde::Deserialize;

/// Client-side settings of the stream chooser.
///
/// Markup hooks and timings match the admin templates. A page may override
/// any of them with a JSON `<script type="application/json"
/// id="stream-chooser-config">` block; absent keys keep their defaults.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ChooserConfig {
    /// Quiet period after the last keystroke before a live search fires.
    pub search_debounce_ms: u32,
    /// Duration of one phase of the tab panel fade.
    pub tab_transition_ms: u32,
    pub results_selector: String,
    pub search_form_selector: String,
    pub search_input_selector: String,
    pub collection_selector: String,
    pub upload_form_selector: String,
    pub upload_title_selector: String,
    pub upload_file_name: String,
    pub upload_tags_name: String,
    pub upload_error_container: String,
    pub required_field_message: String,
}

impl Default for ChooserConfig {
    fn default() -> Self {
        Self {
            search_debounce_ms: 200,
            tab_transition_ms: 150,
            results_selector: "#stream-results".to_string(),
            search_form_selector: "form.video-search".to_string(),
            search_input_selector: "#id_q".to_string(),
            collection_selector: "#collection_chooser_collection_id".to_string(),
            upload_form_selector: "form.video-upload".to_string(),
            upload_title_selector: "#id_stream-chooser-upload-title".to_string(),
            upload_file_name: "stream-chooser-upload-file".to_string(),
            upload_tags_name: "stream-chooser-upload-tags".to_string(),
            upload_error_container: "#upload".to_string(),
            required_field_message: "This field is required.".to_string(),
        }
    }
}

const CONFIG_ELEMENT_ID: &str = "stream-chooser-config";

impl ChooserConfig {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    fn from_page() -> Self {
        let text = crate::shared::dom::document()
            .and_then(|doc| doc.get_element_by_id(CONFIG_ELEMENT_ID))
            .and_then(|el| el.text_content());
        match text {
            Some(text) => Self::from_json(&text).unwrap_or_else(|e| {
                log::warn!("invalid #{}: {}, using defaults", CONFIG_ELEMENT_ID, e);
                Self::default()
            }),
            None => Self::default(),
        }
    }
}

thread_local! {
    static CONFIG: OnceCell<ChooserConfig> = const { OnceCell::new() };
}

/// Page configuration, read once on first use.
pub fn config() -> ChooserConfig {
    CONFIG.with(|cell| cell.get_or_init(ChooserConfig::from_page).clone())
}
