use crate::domain::a001_stream::aggregate::ChosenStream;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Шаг поиска и загрузки.
pub const STEP_CHOOSER: &str = "chooser";
/// Финальный шаг: сервер вернул выбранный поток.
pub const STEP_STREAM_CHOSEN: &str = "video_chosen";
/// Промежуточный шаг с формой, которая отправляется на сервер.
pub const STEP_SELECT_FORMAT: &str = "select_format";

/// Имя ответа, передаваемого виджету, открывшему модальное окно.
pub const RESPONSE_STREAM_CHOSEN: &str = "streamChosen";

/// Один ответ протокола модального окна.
///
/// На каждый запрос сервер отвечает JSON-объектом
/// `{ "html": ..., "step": ..., <данные шага> }`. В `data` хранится весь объект,
/// обработчик шага читает свои поля через [`ModalStep::data_as`].
#[derive(Debug, Clone, PartialEq)]
pub struct ModalStep {
    pub html: Option<String>,
    pub step: String,
    pub data: serde_json::Value,
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    html: Option<String>,
    step: String,
}

impl ModalStep {
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        let data: serde_json::Value = serde_json::from_str(text)?;
        let envelope = Envelope::deserialize(&data)?;
        Ok(Self {
            html: envelope.html,
            step: envelope.step,
            data,
        })
    }

    pub fn data_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.data)
    }
}

fn default_error_label() -> String {
    "Server Error".to_string()
}

fn default_error_message() -> String {
    "Report this error to the server owner with the following:".to_string()
}

/// Данные шага `chooser`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChooserStepData {
    #[serde(default = "default_error_label")]
    pub error_label: String,
    #[serde(default = "default_error_message")]
    pub error_message: String,
    #[serde(default)]
    pub tag_autocomplete_url: Option<String>,
}

impl Default for ChooserStepData {
    fn default() -> Self {
        Self {
            error_label: default_error_label(),
            error_message: default_error_message(),
            tag_autocomplete_url: None,
        }
    }
}

/// Данные финального шага `video_chosen`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamChosenStepData {
    pub result: ChosenStream,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chooser_step() {
        let text = r#"{
            "html": "<div id=\"stream-results\"></div>",
            "step": "chooser",
            "error_label": "Server Error",
            "error_message": "Report this error",
            "tag_autocomplete_url": "/admin/tag-autocomplete/"
        }"#;
        let step = ModalStep::parse(text).unwrap();
        assert_eq!(step.step, STEP_CHOOSER);
        assert_eq!(step.html.as_deref(), Some("<div id=\"stream-results\"></div>"));

        let data: ChooserStepData = step.data_as().unwrap();
        assert_eq!(data.error_message, "Report this error");
        assert_eq!(data.tag_autocomplete_url.as_deref(), Some("/admin/tag-autocomplete/"));
    }

    #[test]
    fn test_chooser_step_defaults() {
        let step = ModalStep::parse(r#"{"html": "", "step": "chooser"}"#).unwrap();
        let data: ChooserStepData = step.data_as().unwrap();
        assert_eq!(data, ChooserStepData::default());
    }

    #[test]
    fn test_parse_chosen_step_without_html() {
        let text = r#"{"html": null, "step": "video_chosen",
            "result": {"id": 42, "title": "Clip A", "edit_url": "/edit/42/"}}"#;
        let step = ModalStep::parse(text).unwrap();
        assert_eq!(step.step, STEP_STREAM_CHOSEN);
        assert!(step.html.is_none());

        let data: StreamChosenStepData = step.data_as().unwrap();
        assert_eq!(data.result, ChosenStream::new(42, "Clip A", "/edit/42/"));
    }

    #[test]
    fn test_parse_rejects_missing_step() {
        assert!(ModalStep::parse(r#"{"html": "<p></p>"}"#).is_err());
        assert!(ModalStep::parse("<html>").is_err());
    }
}
