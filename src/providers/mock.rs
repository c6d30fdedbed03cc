//! Mock capability implementations for tests.
//!
//! Mocks run everything synchronously and record what happened so tests can
//! assert on it. They are single-threaded, like the lists they sit beside.

use std::cell::{Cell, RefCell};

use serde::{Deserialize, Serialize};

use crate::error::{ObserverError, ProviderError, QueryResult};
use crate::event::{EventEmitter, Subscription};

use super::traits::{
    Animation, AnimationBuilder, AnimationSpec, LocationStrategy, PopStateEvent, Zone,
};

/// Emitted by [`MockZone::simulate_zone_exit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneTurn {
    /// Number of `run` calls completed so far.
    pub turns: u64,
}

/// Zone that runs tasks inline and lets tests fire "stable" events by hand.
#[derive(Debug, Default)]
pub struct MockZone {
    turns: Cell<u64>,
    outside_runs: Cell<u64>,
    on_stable: EventEmitter<ZoneTurn>,
}

impl MockZone {
    /// A zone with no completed turns and no stable observers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Completed `run` calls.
    #[must_use]
    pub fn turns(&self) -> u64 {
        self.turns.get()
    }

    /// Completed `run_outside` calls.
    #[must_use]
    pub fn outside_runs(&self) -> u64 {
        self.outside_runs.get()
    }

    /// Observe zone-stable events.
    pub fn on_stable<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&ZoneTurn) -> Result<(), ObserverError> + 'static,
    {
        self.on_stable.subscribe(observer)
    }

    /// Fire a zone-stable event, as if the zone had just gone idle.
    pub fn simulate_zone_exit(&self) -> Result<(), ObserverError> {
        self.on_stable.emit(&ZoneTurn {
            turns: self.turns.get(),
        })
    }
}

impl Zone for MockZone {
    fn run(&self, task: &mut dyn FnMut()) {
        task();
        self.turns.set(self.turns.get() + 1);
    }

    fn run_outside(&self, task: &mut dyn FnMut()) {
        task();
        self.outside_runs.set(self.outside_runs.get() + 1);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum UrlChange {
    Push(String),
    Replace(String),
}

impl UrlChange {
    fn url(&self) -> &str {
        match self {
            Self::Push(url) | Self::Replace(url) => url,
        }
    }
}

#[derive(Debug)]
struct LocationState {
    base_href: String,
    path: String,
    title: String,
    changes: Vec<UrlChange>,
    forward: Vec<UrlChange>,
}

/// In-memory location strategy that records every url change.
#[derive(Debug)]
pub struct MockLocationStrategy {
    state: RefCell<LocationState>,
    pop_state: EventEmitter<PopStateEvent>,
}

impl MockLocationStrategy {
    /// Strategy at path `/` under `base_href`.
    #[must_use]
    pub fn new(base_href: impl Into<String>) -> Self {
        Self {
            state: RefCell::new(LocationState {
                base_href: base_href.into(),
                path: "/".to_string(),
                title: String::new(),
                changes: Vec::new(),
                forward: Vec::new(),
            }),
            pop_state: EventEmitter::new(),
        }
    }

    /// External urls in the order they were visited. Replacements are
    /// prefixed with `replace: `.
    #[must_use]
    pub fn url_changes(&self) -> Vec<String> {
        self.state
            .borrow()
            .changes
            .iter()
            .map(|change| match change {
                UrlChange::Push(url) => url.clone(),
                UrlChange::Replace(url) => format!("replace: {url}"),
            })
            .collect()
    }

    /// Title passed to the most recent push/replace.
    #[must_use]
    pub fn title(&self) -> String {
        self.state.borrow().title.clone()
    }

    /// Set the current path and fire a pop-state event, as a browser would
    /// after the user navigates.
    pub fn simulate_pop_state(&self, url: impl Into<String>) -> Result<(), ObserverError> {
        let url = url.into();
        self.state.borrow_mut().path = url.clone();
        self.pop_state.emit(&PopStateEvent { url })
    }

    fn record(&self, title: &str, path: &str, query: &str, replace: bool) {
        let url = if query.is_empty() {
            path.to_string()
        } else {
            format!("{path}?{query}")
        };
        let external = self.prepare_external_url(&url);

        let mut state = self.state.borrow_mut();
        state.title = title.to_string();
        state.path = url;
        state.forward.clear();
        state.changes.push(if replace {
            UrlChange::Replace(external)
        } else {
            UrlChange::Push(external)
        });
    }
}

impl Default for MockLocationStrategy {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_BASE_HREF)
    }
}

impl LocationStrategy for MockLocationStrategy {
    fn path(&self) -> String {
        self.state.borrow().path.clone()
    }

    fn prepare_external_url(&self, internal: &str) -> String {
        let state = self.state.borrow();
        match internal.strip_prefix('/') {
            Some(rest) if state.base_href.ends_with('/') => format!("{}{rest}", state.base_href),
            _ => format!("{}{internal}", state.base_href),
        }
    }

    fn push_state(&self, title: &str, path: &str, query: &str) {
        self.record(title, path, query, false);
    }

    fn replace_state(&self, title: &str, path: &str, query: &str) {
        self.record(title, path, query, true);
    }

    fn back(&self) -> QueryResult<()> {
        let next_url = {
            let mut state = self.state.borrow_mut();
            let Some(popped) = state.changes.pop() else {
                return Err(ProviderError::HistoryExhausted { direction: "back" }.into());
            };
            state.forward.push(popped);
            state
                .changes
                .last()
                .map(|change| change.url().to_string())
                .unwrap_or_default()
        };
        self.simulate_pop_state(next_url)?;
        Ok(())
    }

    fn forward(&self) -> QueryResult<()> {
        let next_url = {
            let mut state = self.state.borrow_mut();
            let Some(change) = state.forward.pop() else {
                return Err(ProviderError::HistoryExhausted { direction: "forward" }.into());
            };
            let url = change.url().to_string();
            state.changes.push(change);
            url
        };
        self.simulate_pop_state(next_url)?;
        Ok(())
    }

    fn base_href(&self) -> String {
        self.state.borrow().base_href.clone()
    }

    fn on_pop_state(
        &self,
        observer: Box<dyn Fn(&PopStateEvent) -> Result<(), ObserverError>>,
    ) -> Subscription {
        self.pop_state.subscribe(observer)
    }
}

/// Animation builder whose animations complete the moment they start.
#[derive(Debug, Default)]
pub struct MockAnimationBuilder {
    started: RefCell<Vec<Animation>>,
}

impl MockAnimationBuilder {
    /// A builder with no recorded animations.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every animation started so far, oldest first.
    #[must_use]
    pub fn started(&self) -> Vec<Animation> {
        self.started.borrow().clone()
    }
}

impl AnimationBuilder for MockAnimationBuilder {
    fn start(&self, element: &str, spec: &AnimationSpec) -> Animation {
        let animation = Animation {
            element: element.to_string(),
            spec: spec.clone(),
            completed: true,
        };
        tracing::trace!(element, "mock animation completed");
        self.started.borrow_mut().push(animation.clone());
        animation
    }
}
