//! Search session state machine for the chooser step.
//!
//! `Idle -> Searching -> (Idle | Error)`. A new search always cancels the
//! outstanding one first, and the in-flight token is cleared *before* the
//! replacement is dispatched, so a late completion of a cancelled request is
//! recognised by its stale token and discarded.

use contracts::usecases::u001_stream_chooser::request::{Ordering, SearchQuery};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Searching(RequestToken),
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// Abort the request carrying this token.
    Cancel(RequestToken),
    Fetch { token: RequestToken, query: SearchQuery },
    /// Put back the results markup captured when the step was opened.
    RestoreInitial,
    /// (Re)start the single-slot debounce timer.
    ScheduleSearch { generation: u64, delay_ms: u32 },
    /// Empty the free-text search field.
    ClearSearchInput,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ResponseOutcome<E> {
    /// Replace the results container with this markup.
    Render(String),
    /// The current request failed; keep the previous results.
    Failed(E),
    /// The request was cancelled or superseded.
    Discarded,
}

/// Current values of the search controls.
#[derive(Debug, Clone, Copy, Default)]
pub struct Filters<'a> {
    pub text: &'a str,
    pub collection_id: &'a str,
}

impl<'a> Filters<'a> {
    pub fn new(text: &'a str, collection_id: &'a str) -> Self {
        Self {
            text,
            collection_id,
        }
    }
}

pub struct SearchSession {
    state: SessionState,
    next_token: u64,
    generation: u64,
    debounce_ms: u32,
    tag: Option<String>,
    ordering: Option<Ordering>,
}

impl SearchSession {
    pub fn new(debounce_ms: u32) -> Self {
        Self {
            state: SessionState::Idle,
            next_token: 0,
            generation: 0,
            debounce_ms,
            tag: None,
            ordering: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    fn cancel(&mut self, commands: &mut Vec<SessionCommand>) {
        if let SessionState::Searching(token) = self.state {
            self.state = SessionState::Idle;
            commands.push(SessionCommand::Cancel(token));
        }
    }

    fn start(&mut self, query: SearchQuery, commands: &mut Vec<SessionCommand>) {
        self.cancel(commands);
        self.next_token += 1;
        let token = RequestToken(self.next_token);
        self.state = SessionState::Searching(token);
        commands.push(SessionCommand::Fetch { token, query });
    }

    /// A keystroke in the search field.
    pub fn on_input(&mut self) -> Vec<SessionCommand> {
        let mut commands = Vec::new();
        self.cancel(&mut commands);
        self.generation += 1;
        commands.push(SessionCommand::ScheduleSearch {
            generation: self.generation,
            delay_ms: self.debounce_ms,
        });
        commands
    }

    /// The debounce timer for `generation` fired.
    pub fn on_debounce_elapsed(&mut self, generation: u64, filters: Filters<'_>) -> Vec<SessionCommand> {
        if generation != self.generation {
            return Vec::new();
        }
        self.search(filters)
    }

    /// Form submit, collection change, or a debounced keystroke.
    pub fn search(&mut self, filters: Filters<'_>) -> Vec<SessionCommand> {
        let mut commands = Vec::new();
        // Any pending keystroke timer is now redundant.
        self.generation += 1;

        let query = SearchQuery::text(filters.text, filters.collection_id);
        // Typed filters replace a remembered tag; otherwise the tag alone still filters.
        let query = if query.text.is_some() || !query.collection_id.is_empty() {
            self.tag = None;
            query
        } else {
            query.with_tag(self.tag.clone())
        };
        if query.is_unfiltered() {
            self.cancel(&mut commands);
            commands.push(SessionCommand::RestoreInitial);
        } else {
            self.start(query, &mut commands);
        }
        commands
    }

    /// A pagination link was clicked.
    pub fn on_page(&mut self, page: u32, filters: Filters<'_>) -> Vec<SessionCommand> {
        let mut commands = Vec::new();
        let query = SearchQuery::text(filters.text, filters.collection_id)
            .with_tag(self.tag.clone())
            .with_page(Some(page))
            .with_ordering(self.ordering);
        self.start(query, &mut commands);
        commands
    }

    /// An ordering link was clicked; paging starts over.
    pub fn on_ordering(&mut self, ordering: Ordering, filters: Filters<'_>) -> Vec<SessionCommand> {
        let mut commands = Vec::new();
        self.ordering = Some(ordering);
        let query = SearchQuery::text(filters.text, filters.collection_id)
            .with_tag(self.tag.clone())
            .with_ordering(Some(ordering));
        self.start(query, &mut commands);
        commands
    }

    /// A suggested tag chip was clicked.
    pub fn on_tag(&mut self, tag: &str, collection_id: &str) -> Vec<SessionCommand> {
        let tag = tag.trim();
        if tag.is_empty() {
            return Vec::new();
        }
        let mut commands = vec![SessionCommand::ClearSearchInput];
        self.generation += 1;
        self.tag = Some(tag.to_string());
        let query = SearchQuery::text("", collection_id).with_tag(self.tag.clone());
        self.start(query, &mut commands);
        commands
    }

    /// Completion of the request identified by `token`.
    pub fn on_response<E>(&mut self, token: RequestToken, result: Result<String, E>) -> ResponseOutcome<E> {
        match self.state {
            SessionState::Searching(current) if current == token => {}
            _ => return ResponseOutcome::Discarded,
        }
        match result {
            Ok(html) => {
                self.state = SessionState::Idle;
                ResponseOutcome::Render(html)
            }
            Err(e) => {
                self.state = SessionState::Error;
                ResponseOutcome::Failed(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetches(commands: &[SessionCommand]) -> Vec<(RequestToken, SearchQuery)> {
        commands
            .iter()
            .filter_map(|c| match c {
                SessionCommand::Fetch { token, query } => Some((*token, query.clone())),
                _ => None,
            })
            .collect()
    }

    fn generation_of(commands: &[SessionCommand]) -> u64 {
        commands
            .iter()
            .find_map(|c| match c {
                SessionCommand::ScheduleSearch { generation, .. } => Some(*generation),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn test_only_last_keystroke_searches() {
        let mut session = SearchSession::new(200);
        let g1 = generation_of(&session.on_input());
        let g2 = generation_of(&session.on_input());
        let g3 = generation_of(&session.on_input());

        assert!(session.on_debounce_elapsed(g1, Filters::new("c", "")).is_empty());
        assert!(session.on_debounce_elapsed(g2, Filters::new("cl", "")).is_empty());
        let commands = session.on_debounce_elapsed(g3, Filters::new("clip", ""));
        let sent = fetches(&commands);
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].1.text.as_deref(), Some("clip"));
    }

    #[test]
    fn test_keystroke_uses_configured_delay_and_cancels_in_flight() {
        let mut session = SearchSession::new(200);
        let commands = session.search(Filters::new("clip", ""));
        let (token, _) = fetches(&commands)[0].clone();

        let commands = session.on_input();
        assert_eq!(commands[0], SessionCommand::Cancel(token));
        assert!(matches!(commands[1], SessionCommand::ScheduleSearch { delay_ms: 200, .. }));
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn test_superseded_response_is_discarded() {
        let mut session = SearchSession::new(200);
        let (a, _) = fetches(&session.search(Filters::new("a", "")))[0].clone();
        let commands = session.search(Filters::new("b", ""));
        assert_eq!(commands[0], SessionCommand::Cancel(a));
        let (b, _) = fetches(&commands)[0].clone();

        assert_eq!(
            session.on_response::<String>(a, Ok("<p>A</p>".to_string())),
            ResponseOutcome::Discarded
        );
        assert_eq!(
            session.on_response::<String>(b, Ok("<p>B</p>".to_string())),
            ResponseOutcome::Render("<p>B</p>".to_string())
        );
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(
            session.on_response::<String>(b, Ok("again".to_string())),
            ResponseOutcome::Discarded
        );
    }

    #[test]
    fn test_failure_moves_to_error_and_next_search_recovers() {
        let mut session = SearchSession::new(200);
        let (a, _) = fetches(&session.search(Filters::new("a", "")))[0].clone();
        assert_eq!(session.on_response(a, Err("timeout")), ResponseOutcome::Failed("timeout"));
        assert_eq!(session.state(), SessionState::Error);

        let commands = session.search(Filters::new("a", ""));
        assert!(!commands.iter().any(|c| matches!(c, SessionCommand::Cancel(_))));
        assert!(matches!(session.state(), SessionState::Searching(_)));
    }

    #[test]
    fn test_empty_filters_restore_initial_markup() {
        let mut session = SearchSession::new(200);
        let (a, _) = fetches(&session.search(Filters::new("a", "")))[0].clone();

        let commands = session.search(Filters::new("  ", ""));
        assert_eq!(
            commands,
            vec![SessionCommand::Cancel(a), SessionCommand::RestoreInitial]
        );
        assert_eq!(session.state(), SessionState::Idle);

        // Nothing outstanding: restoring again must not try to cancel.
        assert_eq!(
            session.search(Filters::default()),
            vec![SessionCommand::RestoreInitial]
        );
    }

    #[test]
    fn test_tag_is_remembered_until_text_search() {
        let mut session = SearchSession::new(200);
        let commands = session.on_tag(" nature ", "2");
        assert_eq!(commands[0], SessionCommand::ClearSearchInput);
        let query = fetches(&commands)[0].1.clone();
        assert_eq!(query.tag.as_deref(), Some("nature"));
        assert_eq!(query.collection_id, "2");
        assert!(query.text.is_none());

        let query = fetches(&session.on_page(2, Filters::new("", "2")))[0].1.clone();
        assert_eq!(query.tag.as_deref(), Some("nature"));
        assert_eq!(query.page, Some(2));

        // Clearing the collection keeps the tag filter alive.
        let query = fetches(&session.search(Filters::new("", "")))[0].1.clone();
        assert_eq!(query.tag.as_deref(), Some("nature"));

        let query = fetches(&session.search(Filters::new("clip", "")))[0].1.clone();
        assert!(query.tag.is_none());
        assert_eq!(session.tag(), None);
    }

    #[test]
    fn test_ordering_sticks_for_paging() {
        let mut session = SearchSession::new(200);
        let query = fetches(&session.on_ordering(Ordering::Title, Filters::new("clip", "")))[0]
            .1
            .clone();
        assert_eq!(query.ordering, Some(Ordering::Title));
        assert_eq!(query.page, None);

        let query = fetches(&session.on_page(3, Filters::new("clip", "")))[0].1.clone();
        assert_eq!(query.ordering, Some(Ordering::Title));
        assert_eq!(query.page, Some(3));
    }

    #[test]
    fn test_explicit_search_invalidates_pending_keystroke() {
        let mut session = SearchSession::new(200);
        let g = generation_of(&session.on_input());
        session.search(Filters::new("clip", ""));
        assert!(session.on_debounce_elapsed(g, Filters::new("clip", "")).is_empty());
    }

    #[test]
    fn test_blank_tag_is_ignored() {
        let mut session = SearchSession::new(200);
        assert!(session.on_tag("   ", "").is_empty());
        assert_eq!(session.state(), SessionState::Idle);
    }
}
