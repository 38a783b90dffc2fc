use contracts::domain::a001_stream::aggregate::ChosenStream;
use contracts::domain::common::AggregateId;

/// Selection state of one chooser widget.
///
/// The chosen stream is only ever replaced as a whole. `clear` blanks the
/// widget and empties its input but keeps the last stream around.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChooserState {
    item: Option<ChosenStream>,
    blank: bool,
}

impl Default for ChooserState {
    fn default() -> Self {
        Self {
            item: None,
            blank: true,
        }
    }
}

impl ChooserState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn choose(&mut self, item: ChosenStream) {
        self.item = Some(item);
        self.blank = false;
    }

    /// Initial hydration; `None` leaves everything as it was.
    pub fn set_state(&mut self, item: Option<ChosenStream>) -> bool {
        match item {
            Some(item) => {
                self.choose(item);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.blank = true;
    }

    pub fn item(&self) -> Option<&ChosenStream> {
        self.item.as_ref()
    }

    pub fn value(&self) -> Option<String> {
        self.item.as_ref().map(|item| item.id.as_string())
    }

    pub fn is_blank(&self) -> bool {
        self.blank
    }

    /// What the widget markup should show for the current state.
    pub fn view(&self) -> ChooserView {
        match (&self.item, self.blank) {
            (Some(item), false) => ChooserView {
                input_value: item.id.as_string(),
                label: Some(item.title.clone()),
                edit_url: Some(item.edit_url.clone()),
                blank: false,
            },
            _ => ChooserView {
                input_value: String::new(),
                label: None,
                edit_url: None,
                blank: true,
            },
        }
    }
}

/// Widget markup for one state. `None` fields leave the markup untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChooserView {
    pub input_value: String,
    pub label: Option<String>,
    pub edit_url: Option<String>,
    pub blank: bool,
}

/// Shorten `text` to at most `max_length` characters, ending with `…`.
///
/// `None` and zero mean no limit.
pub fn truncate_label(text: &str, max_length: Option<usize>) -> String {
    match max_length {
        Some(max) if max > 0 && text.chars().count() > max => {
            let mut short: String = text.chars().take(max - 1).collect();
            short.push('…');
            short
        }
        _ => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_blank() {
        let state = ChooserState::new();
        assert!(state.is_blank());
        assert_eq!(state.item(), None);
        assert_eq!(state.value(), None);
    }

    #[test]
    fn test_choose_replaces_item() {
        let mut state = ChooserState::new();
        state.choose(ChosenStream::new(42, "Clip A", "/edit/42/"));
        assert!(!state.is_blank());
        assert_eq!(state.value(), Some("42".to_string()));

        state.choose(ChosenStream::new(7, "Clip B", "/edit/7/"));
        assert_eq!(state.item(), Some(&ChosenStream::new(7, "Clip B", "/edit/7/")));
    }

    #[test]
    fn test_set_state_none_is_noop() {
        let mut state = ChooserState::new();
        state.choose(ChosenStream::new(42, "Clip A", "/edit/42/"));
        let before = state.clone();
        assert!(!state.set_state(None));
        assert_eq!(state, before);
    }

    #[test]
    fn test_clear_blanks_but_keeps_item() {
        let mut state = ChooserState::new();
        state.choose(ChosenStream::new(42, "Clip A", "/edit/42/"));
        state.clear();
        assert!(state.is_blank());
        assert_eq!(state.value(), Some("42".to_string()));
    }

    #[test]
    fn test_chosen_stream_fills_input_and_label() {
        let mut state = ChooserState::new();
        state.choose(ChosenStream::new(42, "Clip A", "/edit/42/"));
        assert_eq!(
            state.view(),
            ChooserView {
                input_value: "42".to_string(),
                label: Some("Clip A".to_string()),
                edit_url: Some("/edit/42/".to_string()),
                blank: false,
            }
        );
    }

    #[test]
    fn test_cleared_view_empties_input_only() {
        let mut state = ChooserState::new();
        state.choose(ChosenStream::new(42, "Clip A", "/edit/42/"));
        state.clear();
        let view = state.view();
        assert_eq!(view.input_value, "");
        assert!(view.blank);
        assert_eq!(view.label, None);
        assert_eq!(view, ChooserState::new().view());
    }

    #[test]
    fn test_truncate_label() {
        assert_eq!(truncate_label("Clip A", Some(5)), "Clip…");
        assert_eq!(truncate_label("Clip A", Some(6)), "Clip A");
        assert_eq!(truncate_label("Clip A", None), "Clip A");
        assert_eq!(truncate_label("Clip A", Some(0)), "Clip A");
        assert_eq!(truncate_label("", Some(3)), "");
    }

    #[test]
    fn test_truncate_label_counts_chars() {
        assert_eq!(truncate_label("Видеоролик", Some(6)), "Видео…");
        assert_eq!(truncate_label("ab", Some(1)), "…");
    }
}
