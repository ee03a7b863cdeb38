//! Functionality related to registering component factories. A [Registry] stores exactly one
//! [Factory] per unique [Component] and answers which of them satisfy a request.
//!
//! ```
//! use wirebind_di::instance::TypedComponentResolver;
//! use wirebind_di::qualifiers::{Qualifiers, NO_PARAMS};
//! use wirebind_di::registry::Registry;
//!
//! let mut registry = Registry::new();
//! registry.provide(Qualifiers::provider_default(), || 10_i32).unwrap();
//! registry
//!     .provide(Qualifiers::for_provider(["alternative"], NO_PARAMS).unwrap(), || 20_i32)
//!     .unwrap();
//!
//! let default = registry.instance_typed::<i32>(Qualifiers::injector_default()).unwrap();
//! let alternative = registry
//!     .instance_typed::<i32>(Qualifiers::from_tags(["alternative"]))
//!     .unwrap();
//!
//! assert_eq!((*default, *alternative), (10, 20));
//! ```

use crate::component::{Component, Constraint};
use crate::error::{RegistryError, ResolutionError};
use crate::instance::{
    ComponentInstanceAnyPtr, ComponentInstancePtr, ComponentResolver, ErrorPtr, Factory,
    NamedInstances, ResolveOptions, Resolved,
};
use crate::qualifiers::Qualifiers;
use crate::resolution::{
    instantiate_all, instantiate_named, resolve_candidates, select_one, Candidate,
};
use crate::scope::Scope;
use derivative::Derivative;
use fxhash::FxBuildHasher;
use indexmap::IndexMap;
use std::any::Any;
use std::fmt::Formatter;
use std::sync::Arc;
use tracing::debug;

/// Factories keyed by the component they provide, in registration order.
pub type FactoryMap = IndexMap<Component, Factory, FxBuildHasher>;

/// Store of component factories.
#[derive(Clone, Default, Derivative)]
#[derivative(Debug)]
pub struct Registry {
    #[derivative(Debug(format_with = "format_components"))]
    factories: FactoryMap,
}

impl Registry {
    pub fn new() -> Self {
        Default::default()
    }

    /// Adds a factory for given component. Fails if exactly the same component is already present.
    pub fn register(&mut self, component: Component, factory: Factory) -> Result<(), RegistryError> {
        if self.factories.contains_key(&component) {
            return Err(RegistryError::DuplicateRegistration(component.to_string()));
        }

        debug!("Registering provider for {component}.");
        self.factories.insert(component, factory);
        Ok(())
    }

    /// Adds a factory wrapped in given [Scope].
    #[inline]
    pub fn register_scoped(
        &mut self,
        component: Component,
        scope: Scope,
        factory: Factory,
    ) -> Result<(), RegistryError> {
        self.register(component, scope.apply(factory))
    }

    /// Registers an infallible factory for the Rust type it produces.
    pub fn provide<T, F>(&mut self, qualifiers: Qualifiers, factory: F) -> Result<(), RegistryError>
    where
        T: Any + Send + Sync,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.register(Component::of::<T>(qualifiers), typed_factory(factory))
    }

    /// Returns all registered components which satisfy the request and are accepted by the
    /// constraint.
    pub fn lookup(&self, request: &Component, constraint: &Constraint) -> FactoryMap {
        self.factories
            .iter()
            .filter(|(component, _)| component.satisfies(request) && constraint.accepts(component))
            .map(|(component, factory)| (component.clone(), factory.clone()))
            .collect()
    }

    pub(crate) fn candidates(
        &self,
        request: &Component,
        constraint: &Constraint,
        origin: Option<&str>,
    ) -> Vec<Candidate> {
        self.lookup(request, constraint)
            .into_iter()
            .map(|(component, factory)| Candidate {
                component,
                factory,
                origin: origin.map(str::to_string),
            })
            .collect()
    }

    /// Resolves the request among components accepted by the constraint, shaping the result
    /// according to the options.
    pub fn resolve_with(
        &self,
        request: &Component,
        options: ResolveOptions,
        constraint: &Constraint,
    ) -> Result<Resolved, ResolutionError> {
        resolve_candidates(request, options, self.candidates(request, constraint, None))
    }

    #[inline]
    pub fn contains(&self, component: &Component) -> bool {
        self.factories.contains_key(component)
    }

    /// Registered components in registration order.
    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.factories.keys()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl ComponentResolver for Registry {
    fn resolve_one(&self, request: &Component) -> Result<ComponentInstanceAnyPtr, ResolutionError> {
        select_one(request, self.candidates(request, &Constraint::always(), None))
    }

    fn resolve_many(
        &self,
        request: &Component,
    ) -> Result<Vec<ComponentInstanceAnyPtr>, ResolutionError> {
        instantiate_all(self.candidates(request, &Constraint::always(), None))
    }

    fn resolve_named(
        &self,
        request: &Component,
    ) -> Result<NamedInstances<ComponentInstanceAnyPtr>, ResolutionError> {
        instantiate_named(self.candidates(request, &Constraint::always(), None))
    }
}

/// Converts an infallible typed factory into a type-erased [Factory].
pub fn typed_factory<T, F>(factory: F) -> Factory
where
    T: Any + Send + Sync,
    F: Fn() -> T + Send + Sync + 'static,
{
    Arc::new(move || {
        Ok::<_, ErrorPtr>(ComponentInstancePtr::new(factory()) as ComponentInstanceAnyPtr)
    })
}

fn format_components(factories: &FactoryMap, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_list()
        .entries(factories.keys().map(ToString::to_string))
        .finish()
}

#[cfg(test)]
mod tests {
    use crate::component::{Component, Constraint};
    use crate::error::{RegistryError, ResolutionError};
    use crate::instance::{
        ComponentInstanceAnyPtr, ComponentResolver, ErrorPtr, ResolveOptions,
        TypedComponentResolver,
    };
    use crate::qualifiers::{Qualifiers, NO_PARAMS};
    use crate::registry::{typed_factory, Registry};
    use crate::scope::Scope;
    use std::fmt::{Display, Formatter};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Debug)]
    struct TestError;

    impl Display for TestError {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            f.write_str("test error")
        }
    }

    impl std::error::Error for TestError {}

    fn named(name: &str) -> Qualifiers {
        Qualifiers::for_provider([] as [&str; 0], [("name", name)]).unwrap()
    }

    fn int_request() -> Component {
        Component::of::<i32>(Qualifiers::injector_default())
    }

    #[test]
    fn should_register_definition() {
        let mut registry = Registry::new();
        registry
            .provide(Qualifiers::provider_default(), || 10_i32)
            .unwrap();

        assert!(registry.contains(&Component::of::<i32>(Qualifiers::provider_default())));
        assert_eq!(registry.len(), 1);
        assert_eq!(
            *registry
                .instance_typed::<i32>(Qualifiers::injector_default())
                .unwrap(),
            10
        );
    }

    #[test]
    fn should_not_register_duplicate_component() {
        let mut registry = Registry::new();
        registry
            .provide(Qualifiers::provider_default(), || 10_i32)
            .unwrap();

        assert_eq!(
            registry
                .provide(Qualifiers::from_tags(["any", "default"]), || 11_i32)
                .unwrap_err(),
            RegistryError::DuplicateRegistration("i32[any,default]".to_string())
        );
    }

    #[test]
    fn should_select_by_qualifiers() {
        let mut registry = Registry::new();
        registry
            .provide(Qualifiers::provider_default(), || 10_i32)
            .unwrap();
        registry
            .provide(
                Qualifiers::for_provider(["alternative"], NO_PARAMS).unwrap(),
                || 20_i32,
            )
            .unwrap();

        assert_eq!(
            *registry
                .instance_typed::<i32>(Qualifiers::injector_default())
                .unwrap(),
            10
        );
        assert_eq!(
            *registry
                .instance_typed::<i32>(Qualifiers::from_tags(["alternative"]))
                .unwrap(),
            20
        );
    }

    #[test]
    fn should_not_resolve_missing_component() {
        let registry = Registry::new();

        assert!(matches!(
            registry.resolve_one(&int_request()).unwrap_err(),
            ResolutionError::UnsatisfiedDependency { .. }
        ));
    }

    #[test]
    fn should_report_ambiguous_candidates() {
        let mut registry = Registry::new();
        registry
            .provide(Qualifiers::from_tags(["default", "any", "first"]), || 1_i32)
            .unwrap();
        registry
            .provide(Qualifiers::from_tags(["default", "any", "second"]), || 2_i32)
            .unwrap();

        let error = registry.resolve_one(&int_request()).unwrap_err();
        let message = error.to_string();

        assert!(matches!(
            error,
            ResolutionError::AmbiguousDependency { ref candidates, .. } if candidates.len() == 2
        ));
        assert!(message.contains("i32[any,default,first] | i32[any,default,second]"));
    }

    #[test]
    fn should_return_all_instances() {
        let mut registry = Registry::new();
        registry.provide(named("a"), || 1_i32).unwrap();
        registry.provide(named("b"), || 2_i32).unwrap();
        registry
            .provide(Qualifiers::provider_default(), || 3_i32)
            .unwrap();

        let mut values = registry
            .instances_typed::<i32>(Qualifiers::default())
            .unwrap()
            .into_iter()
            .map(|value| *value)
            .collect::<Vec<_>>();
        values.sort_unstable();

        assert_eq!(values, vec![1, 2, 3]);
    }

    #[test]
    fn should_return_empty_collection_when_nothing_matches() {
        let registry = Registry::new();

        assert!(registry.resolve_many(&int_request()).unwrap().is_empty());
        assert!(registry.resolve_named(&int_request()).unwrap().is_empty());
    }

    #[test]
    fn should_return_named_instances() {
        let mut registry = Registry::new();
        registry.provide(named("a"), || 1_i32).unwrap();
        registry.provide(named("b"), || 2_i32).unwrap();
        registry
            .provide(Qualifiers::provider_default(), || 3_i32)
            .unwrap();

        let instances = registry
            .named_instances_typed::<i32>(Qualifiers::default())
            .unwrap();

        assert_eq!(instances.len(), 2);
        assert_eq!(*instances["a"], 1);
        assert_eq!(*instances["b"], 2);
    }

    #[test]
    fn should_reject_colliding_names() {
        let mut registry = Registry::new();
        registry.provide(named("a"), || 1_i32).unwrap();
        registry
            .provide(
                Qualifiers::for_provider(["other"], [("name", "a")]).unwrap(),
                || 2_i32,
            )
            .unwrap();

        assert!(matches!(
            registry
                .resolve(&Component::of::<i32>(Qualifiers::default()), ResolveOptions::NAMED)
                .unwrap_err(),
            ResolutionError::AmbiguousDependency { .. }
        ));
    }

    #[test]
    fn should_reject_named_without_many() {
        let registry = Registry::new();

        assert!(matches!(
            registry
                .resolve(
                    &int_request(),
                    ResolveOptions {
                        many: false,
                        named: true
                    }
                )
                .unwrap_err(),
            ResolutionError::NamedRequiresMany(..)
        ));
    }

    #[test]
    fn should_apply_constraint() {
        let mut registry = Registry::new();
        registry.provide(named("a"), || 1_i32).unwrap();
        registry.provide(named("b"), || 2_i32).unwrap();

        let only_b = Constraint::new(|component| component.qualifiers().name() == Some("b"));
        let request = Component::of::<i32>(Qualifiers::default());

        assert_eq!(registry.lookup(&request, &only_b).len(), 1);

        let instance = registry
            .resolve_with(&request, ResolveOptions::SINGLE, &only_b)
            .unwrap()
            .into_single()
            .unwrap();
        assert_eq!(*instance.downcast::<i32>().unwrap(), 2);
    }

    #[test]
    fn should_not_invoke_factories_of_ambiguous_candidates() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut registry = Registry::new();

        for tag in ["first", "second"] {
            let counter = counter.clone();
            registry
                .provide(Qualifiers::from_tags(["default", "any", tag]), move || {
                    counter.fetch_add(1, Ordering::SeqCst)
                })
                .unwrap();
        }

        assert!(registry
            .resolve_one(&Component::of::<usize>(Qualifiers::injector_default()))
            .is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn should_forward_provider_error() {
        let mut registry = Registry::new();
        registry
            .register(
                Component::of::<i32>(Qualifiers::provider_default()),
                Arc::new(|| Err::<ComponentInstanceAnyPtr, _>(Arc::new(TestError) as ErrorPtr)),
            )
            .unwrap();

        assert!(matches!(
            registry.resolve_one(&int_request()).unwrap_err(),
            ResolutionError::ProviderFailed { .. }
        ));
    }

    #[test]
    fn should_register_singletons() {
        let mut registry = Registry::new();
        registry
            .register_scoped(
                Component::of::<String>(Qualifiers::provider_default()),
                Scope::Singleton,
                typed_factory(|| "shared".to_string()),
            )
            .unwrap();

        let request = Component::of::<String>(Qualifiers::injector_default());
        let first = registry.resolve_one(&request).unwrap();
        let second = registry.resolve_one(&request).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
    }
}
