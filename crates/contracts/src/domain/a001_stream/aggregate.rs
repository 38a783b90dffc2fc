use crate::domain::common::AggregateId;
use serde::{Deserialize, Serialize};

// ============================================================================
// ID Type
// ============================================================================

/// Уникальный идентификатор видеопотока (stream)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StreamId(pub i64);

impl StreamId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl AggregateId for StreamId {
    fn as_string(&self) -> String {
        self.0.as_string()
    }

    fn from_string(s: &str) -> Result<Self, String> {
        i64::from_string(s).map(StreamId::new)
    }
}

impl std::fmt::Display for StreamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Chosen stream
// ============================================================================

/// Выбранный в модальном окне поток.
///
/// Приходит с сервера в ответе шага `video_chosen` и целиком заменяет
/// предыдущий выбор; частично не изменяется.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChosenStream {
    pub id: StreamId,
    pub title: String,
    #[serde(rename = "edit_url")]
    pub edit_url: String,
}

impl ChosenStream {
    pub fn new(id: i64, title: impl Into<String>, edit_url: impl Into<String>) -> Self {
        Self {
            id: StreamId::new(id),
            title: title.into(),
            edit_url: edit_url.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chosen_stream_from_server_json() {
        let json = r#"{"id": 42, "title": "Clip A", "edit_url": "/edit/42/"}"#;
        let stream: ChosenStream = serde_json::from_str(json).unwrap();
        assert_eq!(stream, ChosenStream::new(42, "Clip A", "/edit/42/"));
        assert_eq!(stream.id.as_string(), "42");
    }

    #[test]
    fn test_stream_id_from_string() {
        assert_eq!(StreamId::from_string(" 7 "), Ok(StreamId(7)));
        assert!(StreamId::from_string("abc").is_err());
    }
}
