use serde::{Deserialize, Serialize};

/// Порядок сортировки результатов поиска.
///
/// Сервер принимает только четыре значения; всё остальное трактуется как
/// `-created_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Ordering {
    #[serde(rename = "title")]
    Title,
    #[serde(rename = "-title")]
    TitleDesc,
    #[serde(rename = "created_at")]
    CreatedAt,
    #[default]
    #[serde(rename = "-created_at")]
    CreatedAtDesc,
}

impl Ordering {
    /// Разобрать значение атрибута `data-ordering`, неизвестное значение даёт порядок по умолчанию.
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "title" => Ordering::Title,
            "-title" => Ordering::TitleDesc,
            "created_at" => Ordering::CreatedAt,
            _ => Ordering::CreatedAtDesc,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Ordering::Title => "title",
            Ordering::TitleDesc => "-title",
            Ordering::CreatedAt => "created_at",
            Ordering::CreatedAtDesc => "-created_at",
        }
    }
}

/// Параметры GET-запроса к эндпоинту поиска.
///
/// Собирается заново для каждого поиска. `collection_id` отправляется всегда
/// (пустой строкой, если фильтр не задан): по наличию этого ключа сервер
/// отдаёт фрагмент результатов, а не всё модальное окно.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    #[serde(rename = "q", default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(rename = "collection_id", default)]
    pub collection_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,

    #[serde(rename = "p", default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ordering: Option<Ordering>,
}

impl SearchQuery {
    /// Запрос по тексту и коллекции. Пустой текст не отправляется.
    pub fn text(text: &str, collection_id: &str) -> Self {
        let text = text.trim();
        Self {
            text: (!text.is_empty()).then(|| text.to_string()),
            collection_id: collection_id.trim().to_string(),
            ..Default::default()
        }
    }

    pub fn with_tag(mut self, tag: Option<String>) -> Self {
        self.tag = tag.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn with_page(mut self, page: Option<u32>) -> Self {
        self.page = page;
        self
    }

    pub fn with_ordering(mut self, ordering: Option<Ordering>) -> Self {
        self.ordering = ordering;
        self
    }

    /// Нет ни текста, ни коллекции, ни тега: искать нечего.
    pub fn is_unfiltered(&self) -> bool {
        self.text.is_none() && self.collection_id.is_empty() && self.tag.is_none()
    }
}
