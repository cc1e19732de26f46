//! Debounced type-ahead over the current search index.
//!
//! ### States
//! - `Idle`: nothing pending
//! - `Typing`: a keystroke arrived; a query fires once the input has been
//!   quiet for the debounce period
//! - `Querying`: the index is being consulted for the latest text
//!
//! Each keystroke aborts the pending timer and bumps a generation counter.
//! A timer whose generation is no longer current does nothing, so only the
//! most recent keystroke can produce suggestions.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use eduform_core::{AppConfig, InstitutionRecord, Suggestion};

use crate::catalog::IndexHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Typing,
    Querying,
}

/// Observable state of one search field.
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestionState {
    pub text: String,
    pub phase: Phase,
    pub suggestions: Vec<Suggestion>,
    /// Whether the suggestion list is shown.
    pub open: bool,
    /// Record chosen from the list, cleared by further typing.
    pub selected: Option<InstitutionRecord>,
    generation: u64,
}

impl Default for SuggestionState {
    fn default() -> Self {
        Self {
            text: String::new(),
            phase: Phase::Idle,
            suggestions: Vec::new(),
            open: false,
            selected: None,
            generation: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionSettings {
    pub debounce: Duration,
    /// Suggestions shown while typing.
    pub inline_limit: usize,
    /// Results returned by a full submission.
    pub submit_limit: usize,
}

impl Default for SuggestionSettings {
    fn default() -> Self {
        Self { debounce: Duration::from_millis(300), inline_limit: 5, submit_limit: 50 }
    }
}

impl SuggestionSettings {
    pub fn from_app(config: &AppConfig) -> Self {
        Self {
            debounce: config.debounce(),
            inline_limit: config.suggestion_limit,
            submit_limit: config.search_limit,
        }
    }
}

/// Outcome of submitting the search field.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// A suggestion was picked; exactly that record.
    Selected(InstitutionRecord),
    /// Ranked matches for the typed text, possibly none.
    Matches(Vec<Suggestion>),
    EmptyQuery,
    /// No index has been published yet.
    NotReady,
}

/// Drives one search field.
pub struct SuggestionController {
    index: IndexHandle,
    settings: SuggestionSettings,
    state: Arc<watch::Sender<SuggestionState>>,
    pending: Option<JoinHandle<()>>,
}

impl SuggestionController {
    pub fn new(index: IndexHandle, settings: SuggestionSettings) -> Self {
        let (state, _) = watch::channel(SuggestionState::default());
        Self { index, settings, state: Arc::new(state), pending: None }
    }

    pub fn subscribe(&self) -> watch::Receiver<SuggestionState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> SuggestionState {
        self.state.borrow().clone()
    }

    /// Register new field text.
    ///
    /// Blank text clears the suggestions at once without querying.
    pub fn input(&mut self, text: impl Into<String>) {
        self.cancel_pending();
        let text = text.into();

        if text.trim().is_empty() {
            self.state.send_modify(|s| {
                s.text = text;
                s.generation += 1;
                s.phase = Phase::Idle;
                s.suggestions.clear();
                s.open = false;
                s.selected = None;
            });
            return;
        }

        let mut generation = 0;
        self.state.send_modify(|s| {
            s.text = text;
            s.generation += 1;
            s.phase = Phase::Typing;
            s.open = true;
            s.selected = None;
            generation = s.generation;
        });

        let state = Arc::clone(&self.state);
        let index = self.index.clone();
        let delay = self.settings.debounce;
        let limit = self.settings.inline_limit;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            run_query(&state, &index, generation, limit);
        }));
    }

    /// Pick a suggestion: the field takes its name and the list closes.
    pub fn select(&mut self, suggestion: &Suggestion) {
        self.cancel_pending();
        let record = suggestion.record.clone();
        self.state.send_modify(|s| {
            s.text = record.name.clone();
            s.generation += 1;
            s.phase = Phase::Idle;
            s.suggestions.clear();
            s.open = false;
            s.selected = Some(record);
        });
    }

    /// Close the list, keeping the text.
    pub fn dismiss(&self) {
        self.state.send_if_modified(|s| std::mem::replace(&mut s.open, false));
    }

    /// Resolve the field into a full search.
    pub fn submit(&mut self) -> SubmitOutcome {
        self.cancel_pending();

        let (mut text, mut selected) = (String::new(), None);
        self.state.send_modify(|s| {
            s.generation += 1;
            s.phase = Phase::Idle;
            s.open = false;
            text = s.text.clone();
            selected = s.selected.clone();
        });

        if let Some(record) = selected {
            return SubmitOutcome::Selected(record);
        }
        if text.trim().is_empty() {
            return SubmitOutcome::EmptyQuery;
        }

        match self.index.current() {
            Some(index) => {
                let matches = index.query(&text, self.settings.submit_limit);
                tracing::debug!(query = %text, matches = matches.len(), "search submitted");
                SubmitOutcome::Matches(matches)
            }
            None => SubmitOutcome::NotReady,
        }
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl Drop for SuggestionController {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

fn run_query(state: &watch::Sender<SuggestionState>, index: &IndexHandle, generation: u64, limit: usize) {
    let mut text = None;
    state.send_if_modified(|s| {
        if s.generation != generation {
            return false;
        }
        s.phase = Phase::Querying;
        text = Some(s.text.clone());
        true
    });
    let Some(text) = text else {
        return;
    };

    let suggestions = index.current().map(|idx| idx.query(&text, limit)).unwrap_or_default();
    tracing::debug!(query = %text, results = suggestions.len(), "suggestions ready");

    state.send_if_modified(|s| {
        if s.generation != generation {
            return false;
        }
        s.suggestions = suggestions;
        s.phase = Phase::Idle;
        true
    });
}
