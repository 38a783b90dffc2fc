//! Tab state machine.
//!
//! Knows nothing about the DOM: every input returns the list of
//! [`TabEffect`]s the binding must apply, in order. Delays are relative to
//! the moment the effects are applied.

/// One tab button as found in the markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabSpec {
    /// Panel id, taken from the button's `href` without the leading `#`.
    pub id: String,
    /// The button was rendered with `aria-selected="true"`.
    pub preselected: bool,
    /// A panel with this id exists in the container.
    pub has_panel: bool,
}

impl TabSpec {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            preselected: false,
            has_panel: true,
        }
    }

    pub fn preselected(mut self) -> Self {
        self.preselected = true;
        self
    }

    pub fn without_panel(mut self) -> Self {
        self.has_panel = false;
        self
    }

    pub fn href(&self) -> String {
        format!("#{}", self.id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabOptions {
    pub animate: bool,
    pub disable_url: bool,
    pub transition_ms: u32,
}

impl Default for TabOptions {
    fn default() -> Self {
        Self {
            animate: false,
            disable_url: false,
            transition_ms: 150,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabEffect {
    /// `aria-selected` plus `tabindex` (removed when selected, `-1` otherwise).
    SetSelected { tab: usize, selected: bool },
    HideAllPanels,
    ShowPanel { panel: String, delay_ms: u32 },
    HidePanel { panel: String, delay_ms: u32 },
    AddAnimateClass { panel: String, delay_ms: u32 },
    RemoveAnimateClass { panel: String },
    Focus { tab: usize },
    /// Local `switch` event on the tab list.
    DispatchSwitch { tab: String },
    /// Global tab-changed notification.
    PublishTabChanged,
    /// Push `#<tab>` with state `{ tabContent: <tab> }`.
    PushHistory { tab: String },
    ScrollToTop { delay_ms: u32 },
}

/// Result of a key press on a focused tab button.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyOutcome {
    pub prevent_default: bool,
    pub effects: Vec<TabEffect>,
}

pub const KEY_LEFT: &str = "ArrowLeft";
pub const KEY_RIGHT: &str = "ArrowRight";
pub const KEY_HOME: &str = "Home";
pub const KEY_END: &str = "End";

pub struct TabController {
    tabs: Vec<TabSpec>,
    options: TabOptions,
    active: Option<usize>,
    initial_page_load: bool,
}

/// Strip everything a tab id cannot contain (keeps ASCII word chars, `-`, `#`).
pub fn sanitize_hash(hash: &str) -> String {
    hash.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '#'))
        .collect()
}

impl TabController {
    pub fn new(tabs: Vec<TabSpec>, options: TabOptions) -> Self {
        Self {
            tabs,
            options,
            active: None,
            initial_page_load: true,
        }
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active.map(|i| self.tabs[i].id.as_str())
    }

    pub fn index_by_href(&self, href: &str) -> Option<usize> {
        self.tabs.iter().position(|t| t.href() == href)
    }

    /// Choose the initial tab: URL fragment, then markup pre-selection, then the first tab.
    ///
    /// `url_hash` is the raw `location.hash` (with `#`), `history_tab` the
    /// `tabContent` of the current history state.
    pub fn initialize(&mut self, url_hash: &str, history_tab: Option<&str>) -> Vec<TabEffect> {
        if self.tabs.is_empty() {
            return Vec::new();
        }

        if !url_hash.is_empty() && !self.options.disable_url {
            let cleaned = sanitize_hash(url_hash);
            let index = self.index_by_href(&cleaned).unwrap_or(0);
            return self.select(index, history_tab);
        }

        if let Some(index) = self.tabs.iter().position(|t| t.preselected) {
            let mut effects = vec![TabEffect::HideAllPanels];
            effects.extend(self.select(index, history_tab));
            return effects;
        }

        self.select(0, history_tab)
    }

    fn deactivate(&self, new_index: usize, effects: &mut Vec<TabEffect>) {
        let Some(current) = self.active else {
            return;
        };
        if current == new_index {
            return;
        }
        let tab = &self.tabs[current];
        if !tab.has_panel {
            return;
        }

        if self.options.animate {
            effects.push(TabEffect::RemoveAnimateClass {
                panel: tab.id.clone(),
            });
            effects.push(TabEffect::HidePanel {
                panel: tab.id.clone(),
                delay_ms: self.options.transition_ms,
            });
        } else {
            effects.push(TabEffect::HidePanel {
                panel: tab.id.clone(),
                delay_ms: 0,
            });
        }
        effects.push(TabEffect::SetSelected {
            tab: current,
            selected: false,
        });
    }

    /// Make `index` the active tab.
    pub fn select(&mut self, index: usize, history_tab: Option<&str>) -> Vec<TabEffect> {
        let Some(tab) = self.tabs.get(index).cloned() else {
            return Vec::new();
        };

        let mut effects = Vec::new();
        self.deactivate(index, &mut effects);
        self.active = Some(index);
        effects.push(TabEffect::SetSelected {
            tab: index,
            selected: true,
        });

        if !tab.has_panel {
            return effects;
        }

        let t = self.options.transition_ms;
        if self.options.animate {
            effects.push(TabEffect::ShowPanel {
                panel: tab.id.clone(),
                delay_ms: t,
            });
            effects.push(TabEffect::AddAnimateClass {
                panel: tab.id.clone(),
                delay_ms: t * 2,
            });
        } else {
            effects.push(TabEffect::ShowPanel {
                panel: tab.id.clone(),
                delay_ms: 0,
            });
        }

        if self.initial_page_load {
            effects.push(TabEffect::ScrollToTop { delay_ms: t * 2 });
        }

        effects.push(TabEffect::DispatchSwitch {
            tab: tab.id.clone(),
        });
        effects.push(TabEffect::PublishTabChanged);

        if !self.options.disable_url
            && !self.initial_page_load
            && history_tab != Some(tab.id.as_str())
        {
            effects.push(TabEffect::PushHistory { tab: tab.id });
        }
        self.initial_page_load = false;

        effects
    }

    fn focus_and_select(&mut self, index: usize, history_tab: Option<&str>) -> Vec<TabEffect> {
        let mut effects = vec![TabEffect::Focus { tab: index }];
        effects.extend(self.select(index, history_tab));
        effects
    }

    /// Keyboard handling for the tab button at `focused`.
    pub fn on_key(&mut self, focused: usize, key: &str, history_tab: Option<&str>) -> KeyOutcome {
        let len = self.tabs.len();
        if len == 0 || focused >= len {
            return KeyOutcome::default();
        }
        let last = len - 1;

        match key {
            KEY_LEFT => {
                let target = if focused == 0 { last } else { focused - 1 };
                KeyOutcome {
                    prevent_default: false,
                    effects: self.focus_and_select(target, history_tab),
                }
            }
            KEY_RIGHT => {
                let target = if focused == last { 0 } else { focused + 1 };
                KeyOutcome {
                    prevent_default: false,
                    effects: self.focus_and_select(target, history_tab),
                }
            }
            KEY_HOME => KeyOutcome {
                prevent_default: true,
                effects: self.focus_and_select(0, history_tab),
            },
            KEY_END => KeyOutcome {
                prevent_default: true,
                effects: self.focus_and_select(last, history_tab),
            },
            _ => KeyOutcome::default(),
        }
    }

    /// Back/forward navigation landed on an entry recording `state_tab`.
    pub fn on_pop_state(&mut self, state_tab: Option<&str>) -> Vec<TabEffect> {
        let Some(tab_id) = state_tab else {
            return Vec::new();
        };
        match self.index_by_href(&format!("#{}", tab_id)) {
            Some(index) => self.focus_and_select(index, Some(tab_id)),
            None => Vec::new(),
        }
    }

    /// A `[data-tab-trigger]` link pointing at `href` was clicked.
    pub fn on_trigger(&mut self, href: &str, history_tab: Option<&str>) -> Vec<TabEffect> {
        match self.index_by_href(href) {
            Some(index) => self.focus_and_select(index, history_tab),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_tabs() -> TabController {
        TabController::new(
            vec![
                TabSpec::new("general"),
                TabSpec::new("content"),
                TabSpec::new("promote"),
            ],
            TabOptions::default(),
        )
    }

    fn shown_panels(effects: &[TabEffect]) -> Vec<&str> {
        effects
            .iter()
            .filter_map(|e| match e {
                TabEffect::ShowPanel { panel, .. } => Some(panel.as_str()),
                _ => None,
            })
            .collect()
    }

    fn pushes(effects: &[TabEffect]) -> Vec<&str> {
        effects
            .iter()
            .filter_map(|e| match e {
                TabEffect::PushHistory { tab } => Some(tab.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_sanitize_hash() {
        assert_eq!(sanitize_hash("#tab-details"), "#tab-details");
        assert_eq!(sanitize_hash("#de<tails>\"'"), "#details");
        assert_eq!(sanitize_hash("#a_b c"), "#a_bc");
    }

    #[test]
    fn test_initial_fragment_selects_without_history_entry() {
        let mut tabs = three_tabs();
        let effects = tabs.initialize("#promote", None);

        assert_eq!(tabs.active_id(), Some("promote"));
        assert_eq!(shown_panels(&effects), vec!["promote"]);
        assert!(pushes(&effects).is_empty());
        assert!(effects.contains(&TabEffect::ScrollToTop { delay_ms: 300 }));
        assert!(effects.contains(&TabEffect::PublishTabChanged));
    }

    #[test]
    fn test_unknown_fragment_falls_back_to_first() {
        let mut tabs = three_tabs();
        tabs.initialize("#missing", None);
        assert_eq!(tabs.active_id(), Some("general"));
    }

    #[test]
    fn test_fragment_ignored_when_url_disabled() {
        let mut tabs = TabController::new(
            vec![TabSpec::new("a"), TabSpec::new("b").preselected()],
            TabOptions {
                disable_url: true,
                ..TabOptions::default()
            },
        );
        let effects = tabs.initialize("#a", None);
        assert_eq!(tabs.active_id(), Some("b"));
        assert_eq!(effects.first(), Some(&TabEffect::HideAllPanels));

        let effects = tabs.select(0, None);
        assert!(pushes(&effects).is_empty());
    }

    #[test]
    fn test_preselected_hides_all_panels_first() {
        let mut tabs = TabController::new(
            vec![TabSpec::new("a"), TabSpec::new("b").preselected()],
            TabOptions::default(),
        );
        let effects = tabs.initialize("", None);
        assert_eq!(effects.first(), Some(&TabEffect::HideAllPanels));
        assert_eq!(tabs.active_id(), Some("b"));
    }

    #[test]
    fn test_empty_tab_set_is_untouched() {
        let mut tabs = TabController::new(Vec::new(), TabOptions::default());
        assert!(tabs.initialize("#x", None).is_empty());
        assert_eq!(tabs.active_id(), None);
        assert!(tabs.on_key(0, KEY_RIGHT, None).effects.is_empty());
    }

    #[test]
    fn test_switch_deactivates_previous_and_pushes_history() {
        let mut tabs = three_tabs();
        tabs.initialize("", None);
        let effects = tabs.select(1, None);

        assert_eq!(
            effects[..3],
            [
                TabEffect::HidePanel {
                    panel: "general".to_string(),
                    delay_ms: 0
                },
                TabEffect::SetSelected {
                    tab: 0,
                    selected: false
                },
                TabEffect::SetSelected {
                    tab: 1,
                    selected: true
                },
            ]
        );
        assert_eq!(pushes(&effects), vec!["content"]);
        assert!(!effects
            .iter()
            .any(|e| matches!(e, TabEffect::ScrollToTop { .. })));
    }

    #[test]
    fn test_no_history_push_when_state_already_matches() {
        let mut tabs = three_tabs();
        tabs.initialize("", None);
        let effects = tabs.select(2, Some("promote"));
        assert!(pushes(&effects).is_empty());
    }

    #[test]
    fn test_reselecting_active_tab_keeps_it_selected() {
        let mut tabs = three_tabs();
        tabs.initialize("", None);
        let effects = tabs.select(0, Some("general"));
        assert!(!effects
            .iter()
            .any(|e| matches!(e, TabEffect::SetSelected { selected: false, .. })));
        assert_eq!(tabs.active_id(), Some("general"));
    }

    #[test]
    fn test_arrow_keys_wrap() {
        let mut tabs = three_tabs();
        tabs.initialize("", None);

        let outcome = tabs.on_key(2, KEY_RIGHT, None);
        assert_eq!(outcome.effects.first(), Some(&TabEffect::Focus { tab: 0 }));
        assert!(!outcome.prevent_default);
        assert_eq!(tabs.active_id(), Some("general"));

        let outcome = tabs.on_key(0, KEY_LEFT, None);
        assert_eq!(outcome.effects.first(), Some(&TabEffect::Focus { tab: 2 }));
        assert_eq!(tabs.active_id(), Some("promote"));

        tabs.on_key(2, KEY_LEFT, None);
        assert_eq!(tabs.active_id(), Some("content"));
    }

    #[test]
    fn test_home_end_and_ignored_keys() {
        let mut tabs = three_tabs();
        tabs.initialize("#promote", None);

        tabs.select(0, Some("promote"));
        let outcome = tabs.on_key(0, KEY_HOME, Some("general"));
        assert!(outcome.prevent_default);
        assert_eq!(tabs.active_id(), Some("general"));
        assert!(pushes(&outcome.effects).is_empty());

        let outcome = tabs.on_key(0, KEY_END, Some("general"));
        assert!(outcome.prevent_default);
        assert_eq!(tabs.active_id(), Some("promote"));
        assert_eq!(pushes(&outcome.effects), vec!["promote"]);

        let outcome = tabs.on_key(2, "Enter", None);
        assert_eq!(outcome, KeyOutcome::default());
        assert_eq!(tabs.active_id(), Some("promote"));
    }

    #[test]
    fn test_animated_switch_is_two_phase() {
        let mut tabs = TabController::new(
            vec![TabSpec::new("a"), TabSpec::new("b")],
            TabOptions {
                animate: true,
                ..TabOptions::default()
            },
        );
        tabs.initialize("", None);
        let effects = tabs.select(1, None);

        assert!(effects.contains(&TabEffect::RemoveAnimateClass {
            panel: "a".to_string()
        }));
        assert!(effects.contains(&TabEffect::HidePanel {
            panel: "a".to_string(),
            delay_ms: 150
        }));
        assert!(effects.contains(&TabEffect::ShowPanel {
            panel: "b".to_string(),
            delay_ms: 150
        }));
        assert!(effects.contains(&TabEffect::AddAnimateClass {
            panel: "b".to_string(),
            delay_ms: 300
        }));
    }

    #[test]
    fn test_pop_state_and_trigger_focus_tab() {
        let mut tabs = three_tabs();
        tabs.initialize("", None);

        let effects = tabs.on_pop_state(Some("content"));
        assert_eq!(effects.first(), Some(&TabEffect::Focus { tab: 1 }));
        assert!(pushes(&effects).is_empty());
        assert!(tabs.on_pop_state(Some("nope")).is_empty());
        assert!(tabs.on_pop_state(None).is_empty());

        let effects = tabs.on_trigger("#promote", Some("content"));
        assert_eq!(effects.first(), Some(&TabEffect::Focus { tab: 2 }));
        assert_eq!(tabs.active_id(), Some("promote"));
    }

    #[test]
    fn test_missing_panel_only_updates_aria() {
        let mut tabs = TabController::new(
            vec![TabSpec::new("a"), TabSpec::new("b").without_panel()],
            TabOptions::default(),
        );
        tabs.initialize("", None);
        let effects = tabs.select(1, None);
        assert_eq!(
            effects.last(),
            Some(&TabEffect::SetSelected {
                tab: 1,
                selected: true
            })
        );
        assert!(shown_panels(&effects).is_empty());
    }
}
