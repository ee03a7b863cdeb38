//! Scopes decide when a registered factory creates a new instance and when an existing one is
//! reused. A [Scope] wraps a [Factory] at registration time, so resolution itself stays unaware of
//! scoping.
//!
//! Note: scopes are per registration, not per type. Registering the same factory under two
//! different components with [Scope::Singleton] creates two independent singletons.

use crate::instance::{ComponentInstanceAnyPtr, Factory};
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// Name of [Scope::Singleton].
pub const SINGLETON: &str = "SINGLETON";

/// Name of [Scope::Prototype].
pub const PROTOTYPE: &str = "PROTOTYPE";

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum Scope {
    /// Creates a new instance on each request. Stateful components usually should be prototypes.
    #[default]
    Prototype,
    /// Creates the instance on first request and shares it afterwards. Concurrent first requests
    /// construct it only once. Failed constructions are not remembered.
    Singleton,
}

impl Scope {
    /// Wraps given factory according to this scope.
    pub fn apply(self, factory: Factory) -> Factory {
        match self {
            Scope::Prototype => factory,
            Scope::Singleton => {
                let instance: Arc<OnceCell<ComponentInstanceAnyPtr>> = Default::default();
                Arc::new(move || instance.get_or_try_init(|| factory()).cloned())
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Scope::Prototype => PROTOTYPE,
            Scope::Singleton => SINGLETON,
        }
    }
}
