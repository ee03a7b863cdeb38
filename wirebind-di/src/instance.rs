//! Type-erased component instances and the [ComponentResolver] contract, through which the
//! [Injector](crate::injector::Injector) obtains dependencies from a
//! [Registry](crate::registry::Registry) or a [Container](crate::container::Container).

use crate::component::Component;
use crate::error::ResolutionError;
use crate::qualifiers::Qualifiers;
use indexmap::IndexMap;
#[cfg(test)]
use mockall::automock;
use std::any::{type_name, Any};
use std::error::Error;
use std::sync::Arc;

pub type ComponentInstancePtr<T> = Arc<T>;

pub type ComponentInstanceAnyPtr = ComponentInstancePtr<dyn Any + Send + Sync + 'static>;

/// Shared error type returned by failing providers.
pub type ErrorPtr = Arc<dyn Error + Send + Sync>;

/// Zero-argument producer of a single instance for a registered [Component].
pub type Factory = Arc<dyn Fn() -> Result<ComponentInstanceAnyPtr, ErrorPtr> + Send + Sync>;

/// Instances keyed by the `name` qualifier of their providers.
pub type NamedInstances<T> = IndexMap<String, T>;

/// Requested shape of a resolution result. `named` is only valid together with `many`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct ResolveOptions {
    pub many: bool,
    pub named: bool,
}

impl ResolveOptions {
    pub const SINGLE: Self = Self {
        many: false,
        named: false,
    };

    pub const MANY: Self = Self {
        many: true,
        named: false,
    };

    pub const NAMED: Self = Self {
        many: true,
        named: true,
    };
}

/// Result of a resolution, shaped according to [ResolveOptions].
#[derive(Clone, Debug)]
pub enum Resolved {
    Single(ComponentInstanceAnyPtr),
    Many(Vec<ComponentInstanceAnyPtr>),
    Named(NamedInstances<ComponentInstanceAnyPtr>),
}

impl Resolved {
    pub fn into_single(self) -> Option<ComponentInstanceAnyPtr> {
        match self {
            Resolved::Single(instance) => Some(instance),
            _ => None,
        }
    }

    pub fn into_many(self) -> Option<Vec<ComponentInstanceAnyPtr>> {
        match self {
            Resolved::Many(instances) => Some(instances),
            _ => None,
        }
    }

    pub fn into_named(self) -> Option<NamedInstances<ComponentInstanceAnyPtr>> {
        match self {
            Resolved::Named(instances) => Some(instances),
            _ => None,
        }
    }
}

/// Generic source of component instances.
#[cfg_attr(test, automock)]
pub trait ComponentResolver {
    /// Returns the only instance satisfying the request. Fails when none or more than one
    /// provider matches.
    fn resolve_one(&self, request: &Component) -> Result<ComponentInstanceAnyPtr, ResolutionError>;

    /// Returns instances of all providers satisfying the request, possibly none.
    fn resolve_many(
        &self,
        request: &Component,
    ) -> Result<Vec<ComponentInstanceAnyPtr>, ResolutionError>;

    /// Returns instances of all satisfying providers which carry a `name` qualifier, keyed by it.
    fn resolve_named(
        &self,
        request: &Component,
    ) -> Result<NamedInstances<ComponentInstanceAnyPtr>, ResolutionError>;

    /// Dispatches to one of the other methods based on the given flags.
    fn resolve(
        &self,
        request: &Component,
        options: ResolveOptions,
    ) -> Result<Resolved, ResolutionError> {
        match (options.many, options.named) {
            (false, false) => self.resolve_one(request).map(Resolved::Single),
            (true, false) => self.resolve_many(request).map(Resolved::Many),
            (true, true) => self.resolve_named(request).map(Resolved::Named),
            (false, true) => Err(ResolutionError::NamedRequiresMany(request.to_string())),
        }
    }
}

/// Helper trait for [ComponentResolver] providing strongly-typed access.
pub trait TypedComponentResolver {
    /// Typesafe version of [ComponentResolver::resolve_one].
    fn instance_typed<T: Any + Send + Sync>(
        &self,
        qualifiers: Qualifiers,
    ) -> Result<ComponentInstancePtr<T>, ResolutionError>;

    /// Tries to get an instance like [TypedComponentResolver::instance_typed] does, but returns
    /// `None` when nothing satisfies the request.
    fn instance_option<T: Any + Send + Sync>(
        &self,
        qualifiers: Qualifiers,
    ) -> Result<Option<ComponentInstancePtr<T>>, ResolutionError>;

    /// Typesafe version of [ComponentResolver::resolve_many].
    fn instances_typed<T: Any + Send + Sync>(
        &self,
        qualifiers: Qualifiers,
    ) -> Result<Vec<ComponentInstancePtr<T>>, ResolutionError>;

    /// Typesafe version of [ComponentResolver::resolve_named].
    fn named_instances_typed<T: Any + Send + Sync>(
        &self,
        qualifiers: Qualifiers,
    ) -> Result<NamedInstances<ComponentInstancePtr<T>>, ResolutionError>;
}

impl<R: ComponentResolver + ?Sized> TypedComponentResolver for R {
    fn instance_typed<T: Any + Send + Sync>(
        &self,
        qualifiers: Qualifiers,
    ) -> Result<ComponentInstancePtr<T>, ResolutionError> {
        let request = Component::of::<T>(qualifiers);
        self.resolve_one(&request)
            .and_then(|instance| downcast(&request, instance))
    }

    fn instance_option<T: Any + Send + Sync>(
        &self,
        qualifiers: Qualifiers,
    ) -> Result<Option<ComponentInstancePtr<T>>, ResolutionError> {
        match self.instance_typed(qualifiers) {
            Ok(instance) => Ok(Some(instance)),
            Err(error) if error.is_unsatisfied() => Ok(None),
            Err(error) => Err(error),
        }
    }

    fn instances_typed<T: Any + Send + Sync>(
        &self,
        qualifiers: Qualifiers,
    ) -> Result<Vec<ComponentInstancePtr<T>>, ResolutionError> {
        let request = Component::of::<T>(qualifiers);
        self.resolve_many(&request)?
            .into_iter()
            .map(|instance| downcast(&request, instance))
            .collect()
    }

    fn named_instances_typed<T: Any + Send + Sync>(
        &self,
        qualifiers: Qualifiers,
    ) -> Result<NamedInstances<ComponentInstancePtr<T>>, ResolutionError> {
        let request = Component::of::<T>(qualifiers);
        self.resolve_named(&request)?
            .into_iter()
            .map(|(name, instance)| downcast(&request, instance).map(|instance| (name, instance)))
            .collect()
    }
}

/// Casts a type-erased instance to a concrete type.
pub fn downcast<T: Any + Send + Sync>(
    request: &Component,
    instance: ComponentInstanceAnyPtr,
) -> Result<ComponentInstancePtr<T>, ResolutionError> {
    instance
        .downcast::<T>()
        .map_err(|_| ResolutionError::IncompatibleComponent {
            component: request.to_string(),
            target_type: type_name::<T>(),
        })
}
