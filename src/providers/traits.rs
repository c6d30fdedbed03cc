//! Capability traits that application providers bind to implementations.
//!
//! Each capability is a trait. Production and test implementations are
//! interchangeable and picked when `ApplicationProviders` is composed:
//! - Inline implementations for embedded use
//! - Mock implementations for tests (see `providers::mock`)

use serde::{Deserialize, Serialize};

use crate::error::{ObserverError, ProviderError, QueryResult};
use crate::event::Subscription;

/// Execution context that tasks run in.
pub trait Zone {
    /// Run `task` inside the zone.
    fn run(&self, task: &mut dyn FnMut());

    /// Run `task` without zone bookkeeping.
    fn run_outside(&self, task: &mut dyn FnMut());
}

/// Zone that runs every task inline, with no instrumentation.
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectZone;

impl Zone for DirectZone {
    fn run(&self, task: &mut dyn FnMut()) {
        task();
    }

    fn run_outside(&self, task: &mut dyn FnMut()) {
        task();
    }
}

/// Event emitted when the current location is popped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopStateEvent {
    /// Path after the pop.
    pub url: String,
}

/// Reads and writes the application location.
pub trait LocationStrategy {
    /// Current internal path, including any query string.
    fn path(&self) -> String;

    /// Map an internal path to the externally visible url.
    fn prepare_external_url(&self, internal: &str) -> String;

    /// Navigate to `path`, recording a new history entry.
    fn push_state(&self, title: &str, path: &str, query: &str);

    /// Navigate to `path`, replacing the current history entry.
    fn replace_state(&self, title: &str, path: &str, query: &str);

    /// Move one entry back in history.
    ///
    /// # Errors
    ///
    /// `ProviderError::HistoryExhausted` when there is nothing to go back to,
    /// or the error of a pop-state observer.
    fn back(&self) -> QueryResult<()>;

    /// Move one entry forward in history.
    fn forward(&self) -> QueryResult<()>;

    /// The base href prefixed to external urls.
    fn base_href(&self) -> String;

    /// Observe pop-state events.
    fn on_pop_state(
        &self,
        observer: Box<dyn Fn(&PopStateEvent) -> Result<(), ObserverError>>,
    ) -> Subscription;
}

/// A CSS class animation request.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationSpec {
    pub add_classes: Vec<String>,
    pub remove_classes: Vec<String>,
    pub duration_ms: u64,
    pub delay_ms: u64,
}

impl AnimationSpec {
    /// Animation that adds `class`.
    #[must_use]
    pub fn add_class(class: impl Into<String>) -> Self {
        Self {
            add_classes: vec![class.into()],
            ..Self::default()
        }
    }

    /// Also remove `class`.
    #[must_use]
    pub fn removing(mut self, class: impl Into<String>) -> Self {
        self.remove_classes.push(class.into());
        self
    }

    /// Set the duration.
    #[must_use]
    pub const fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }
}

/// A started animation.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Animation {
    pub element: String,
    pub spec: AnimationSpec,
    pub completed: bool,
}

/// Starts CSS animations on elements.
pub trait AnimationBuilder {
    /// Start animating `element`.
    fn start(&self, element: &str, spec: &AnimationSpec) -> Animation;
}

/// The document an application renders into.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub url: String,
    pub title: String,
}

/// Source of the default document.
pub trait DocumentSource {
    /// Produce the default document.
    fn default_document(&self) -> Result<Document, ProviderError>;
}

/// Always yields the same document.
#[derive(Debug, Clone)]
pub struct StaticDocument(pub Document);

impl DocumentSource for StaticDocument {
    fn default_document(&self) -> Result<Document, ProviderError> {
        Ok(self.0.clone())
    }
}

/// Environment without a document, e.g. a server process with no DOM.
#[derive(Debug, Clone)]
pub struct NoDocument {
    /// Why no document exists.
    pub reason: String,
}

impl DocumentSource for NoDocument {
    fn default_document(&self) -> Result<Document, ProviderError> {
        Err(ProviderError::DocumentUnavailable {
            reason: self.reason.clone(),
        })
    }
}

/// Resolve the application document, treating an unavailable one as absent.
#[must_use]
pub fn app_document(source: &dyn DocumentSource) -> Option<Document> {
    match source.default_document() {
        Ok(doc) => Some(doc),
        Err(err) => {
            tracing::debug!(error = %err, "no application document");
            None
        }
    }
}
