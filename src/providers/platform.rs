//! Composition of application and platform providers.
//!
//! Providers are plain structs assembled once at startup. There is no global
//! registry: whoever builds an [`ApplicationProviders`] hands it to the code
//! that needs the capabilities.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::config::ApplicationConfig;
use crate::error::{ConfigError, ProviderError, QueryResult};

use super::mock::{MockAnimationBuilder, MockLocationStrategy, MockZone};
use super::traits::{
    app_document, AnimationBuilder, Document, DocumentSource, DirectZone, LocationStrategy,
    NoDocument, Zone,
};

/// Capabilities bound for one application.
pub struct ApplicationProviders {
    app_id: String,
    document: Option<Document>,
    zone: Rc<dyn Zone>,
    location: Rc<dyn LocationStrategy>,
    animation: Rc<dyn AnimationBuilder>,
}

impl ApplicationProviders {
    /// Start composing providers from `config`.
    #[must_use]
    pub fn builder(config: ApplicationConfig) -> ApplicationProvidersBuilder {
        ApplicationProvidersBuilder {
            config,
            document_source: None,
            zone: None,
            location: None,
            animation: None,
        }
    }

    /// Providers for server-side tests: every capability is a mock and no
    /// document is available.
    pub fn test_server(config: ApplicationConfig) -> QueryResult<TestServerProviders> {
        let zone = Rc::new(MockZone::new());
        let location = Rc::new(MockLocationStrategy::new(config.base_href.clone()));
        let animation = Rc::new(MockAnimationBuilder::new());

        let providers = Self::builder(config)
            .document_source(Rc::new(NoDocument {
                reason: "server platform has no DOM".to_string(),
            }))
            .zone(Rc::clone(&zone) as Rc<dyn Zone>)
            .location(Rc::clone(&location) as Rc<dyn LocationStrategy>)
            .animation(Rc::clone(&animation) as Rc<dyn AnimationBuilder>)
            .build()?;

        Ok(TestServerProviders {
            providers,
            zone,
            location,
            animation,
        })
    }

    /// Application id bound for this application.
    #[must_use]
    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// The application document, if the environment has one.
    #[must_use]
    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    /// The bound zone.
    #[must_use]
    pub fn zone(&self) -> &dyn Zone {
        self.zone.as_ref()
    }

    /// The bound location strategy.
    #[must_use]
    pub fn location(&self) -> &dyn LocationStrategy {
        self.location.as_ref()
    }

    /// The bound animation builder.
    #[must_use]
    pub fn animation(&self) -> &dyn AnimationBuilder {
        self.animation.as_ref()
    }
}

impl fmt::Debug for ApplicationProviders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApplicationProviders")
            .field("app_id", &self.app_id)
            .field("document", &self.document)
            .finish_non_exhaustive()
    }
}

/// Builder for [`ApplicationProviders`].
pub struct ApplicationProvidersBuilder {
    config: ApplicationConfig,
    document_source: Option<Rc<dyn DocumentSource>>,
    zone: Option<Rc<dyn Zone>>,
    location: Option<Rc<dyn LocationStrategy>>,
    animation: Option<Rc<dyn AnimationBuilder>>,
}

impl ApplicationProvidersBuilder {
    /// Where the application document comes from. Without one, the
    /// application has no document.
    #[must_use]
    pub fn document_source(mut self, source: Rc<dyn DocumentSource>) -> Self {
        self.document_source = Some(source);
        self
    }

    /// Zone binding. Defaults to [`DirectZone`].
    #[must_use]
    pub fn zone(mut self, zone: Rc<dyn Zone>) -> Self {
        self.zone = Some(zone);
        self
    }

    /// Location strategy binding. Required.
    #[must_use]
    pub fn location(mut self, location: Rc<dyn LocationStrategy>) -> Self {
        self.location = Some(location);
        self
    }

    /// Animation builder binding. Required.
    #[must_use]
    pub fn animation(mut self, animation: Rc<dyn AnimationBuilder>) -> Self {
        self.animation = Some(animation);
        self
    }

    /// Validate the config and bind every capability.
    ///
    /// # Errors
    ///
    /// Invalid config, or a missing location strategy / animation builder.
    pub fn build(self) -> QueryResult<ApplicationProviders> {
        self.config.validate()?;

        let location = self.location.ok_or(ConfigError::MissingProvider {
            capability: "location_strategy",
        })?;
        let animation = self.animation.ok_or(ConfigError::MissingProvider {
            capability: "animation_builder",
        })?;
        let zone = self
            .zone
            .unwrap_or_else(|| Rc::new(DirectZone) as Rc<dyn Zone>);
        let document = self
            .document_source
            .as_ref()
            .and_then(|source| app_document(source.as_ref()));

        tracing::debug!(
            app_id = %self.config.app_id,
            has_document = document.is_some(),
            "application providers composed"
        );

        Ok(ApplicationProviders {
            app_id: self.config.app_id,
            document,
            zone,
            location,
            animation,
        })
    }
}

/// Test-server providers together with typed handles on the mocks they bind.
#[allow(missing_docs)]
#[derive(Debug)]
pub struct TestServerProviders {
    pub providers: ApplicationProviders,
    pub zone: Rc<MockZone>,
    pub location: Rc<MockLocationStrategy>,
    pub animation: Rc<MockAnimationBuilder>,
}

type Initializer = Box<dyn Fn() -> Result<(), ProviderError>>;

/// Which DOM adapter the platform has installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomAdapterKind {
    /// Server-side adapter with no live document.
    Server,
}

#[derive(Debug, Default)]
struct PlatformState {
    dom_adapter: Option<DomAdapterKind>,
}

/// Platform-wide initializers, run once before any application starts.
///
/// Initializers are a multi-binding: every registered one runs, in
/// registration order.
pub struct PlatformProviders {
    initializers: Vec<(String, Initializer)>,
    state: Rc<RefCell<PlatformState>>,
}

impl PlatformProviders {
    /// A platform with no initializers and no DOM adapter.
    #[must_use]
    pub fn new() -> Self {
        Self {
            initializers: Vec::new(),
            state: Rc::new(RefCell::new(PlatformState::default())),
        }
    }

    /// Platform for server-side tests: installs the server DOM adapter.
    #[must_use]
    pub fn test_server() -> Self {
        let mut platform = Self::new();
        let state = Rc::clone(&platform.state);
        platform.add_initializer("server_tests", move || {
            state.borrow_mut().dom_adapter = Some(DomAdapterKind::Server);
            Ok(())
        });
        platform
    }

    /// Register an initializer after the existing ones.
    pub fn add_initializer<F>(&mut self, name: impl Into<String>, init: F)
    where
        F: Fn() -> Result<(), ProviderError> + 'static,
    {
        self.initializers.push((name.into(), Box::new(init)));
    }

    /// Builder-style [`add_initializer`](Self::add_initializer).
    #[must_use]
    pub fn with_initializer<F>(mut self, name: impl Into<String>, init: F) -> Self
    where
        F: Fn() -> Result<(), ProviderError> + 'static,
    {
        self.add_initializer(name, init);
        self
    }

    /// Registered initializer names, in run order.
    #[must_use]
    pub fn initializer_names(&self) -> Vec<&str> {
        self.initializers.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// The DOM adapter installed by initializers, if any.
    #[must_use]
    pub fn dom_adapter(&self) -> Option<DomAdapterKind> {
        self.state.borrow().dom_adapter
    }

    /// Run every initializer in order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// `ProviderError::InitializerFailed` naming the failing initializer.
    pub fn initialize(&self) -> QueryResult<()> {
        for (name, init) in &self.initializers {
            tracing::debug!(initializer = %name, "running platform initializer");
            init().map_err(|err| ProviderError::InitializerFailed {
                name: name.clone(),
                reason: err.to_string(),
            })?;
        }
        Ok(())
    }
}

impl Default for PlatformProviders {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PlatformProviders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlatformProviders")
            .field("initializers", &self.initializer_names())
            .field("state", &self.state.borrow())
            .finish()
    }
}
