//! Capability providers for applications and the platform.
//!
//! A capability (zone, location strategy, animation builder, document) is a
//! trait. `ApplicationProviders` binds each one to a concrete implementation
//! when the application is composed; tests bind the mocks from [`mock`].

/// Mock implementations for tests.
pub mod mock;
/// Application and platform provider composition.
pub mod platform;
mod traits;

pub use mock::{MockAnimationBuilder, MockLocationStrategy, MockZone, ZoneTurn};
pub use platform::{
    ApplicationProviders, ApplicationProvidersBuilder, DomAdapterKind, PlatformProviders,
    TestServerProviders,
};
pub use traits::{
    app_document, Animation, AnimationBuilder, AnimationSpec, DirectZone, Document,
    DocumentSource, LocationStrategy, NoDocument, PopStateEvent, StaticDocument, Zone,
};
