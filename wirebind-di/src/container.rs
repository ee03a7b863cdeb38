//! Containers federate [Registries](Registry). Each [Container] owns a registry and a set of
//! dependency edges to other containers, each edge carrying a [Constraint] deciding which
//! components may be taken from the other side. Resolution gathers candidates from the local
//! registry and, transitively, from all dependencies, and only then decides the outcome - a single
//! candidate across the whole federation is resolved, more than one is ambiguous.
//!
//! ```
//! use wirebind_di::container::Container;
//! use wirebind_di::instance::TypedComponentResolver;
//! use wirebind_di::qualifiers::Qualifiers;
//! use wirebind_di::type_identity::TypeIdentity;
//!
//! let application = Container::new("application");
//! let database = Container::new("database");
//!
//! database.provide(Qualifiers::provider_default(), || 5432_u16).unwrap();
//! application.require_from(&database, TypeIdentity::of::<u16>(), Qualifiers::default());
//!
//! let port = application
//!     .instance_typed::<u16>(Qualifiers::injector_default())
//!     .unwrap();
//! assert_eq!(*port, 5432);
//! ```
//!
//! Containers are cheap handles - clones refer to the same container. Dependency edges hold strong
//! references, so containers referring to each other live as long as the process does.

use crate::component::{Component, Constraint};
use crate::error::{RegistryError, ResolutionError};
use crate::injector::signature::Signature;
use crate::injector::{Arguments, InjectedFunction, Injector};
use crate::instance::{
    ComponentInstanceAnyPtr, ComponentResolver, Factory, NamedInstances, ResolveOptions, Resolved,
};
use crate::qualifiers::Qualifiers;
use crate::registry::{FactoryMap, Registry};
use crate::resolution::{
    instantiate_all, instantiate_named, resolve_candidates, select_one, Candidate,
};
use crate::scope::Scope;
use crate::type_identity::TypeIdentity;
use fxhash::{FxBuildHasher, FxHashSet};
use indexmap::map::Entry;
use indexmap::IndexMap;
use std::any::Any;
use std::fmt::{Debug, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, trace};

static NEXT_CONTAINER_ID: AtomicU64 = AtomicU64::new(0);

/// Process-unique identity of a [Container].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ContainerId(u64);

impl Display for ContainerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Debug)]
struct Dependency {
    container: Container,
    constraint: Constraint,
}

type CandidateMap = IndexMap<(ContainerId, Component), Candidate, FxBuildHasher>;

struct ContainerInner {
    id: ContainerId,
    name: String,
    registry: RwLock<Registry>,
    dependencies: RwLock<IndexMap<ContainerId, Dependency, FxBuildHasher>>,
}

/// Named registry with constrained links to other containers.
///
/// A provider reached through several dependency paths counts as a single candidate, so a diamond
/// of containers over one provider resolves it rather than reporting ambiguity.
#[derive(Clone)]
pub struct Container {
    inner: Arc<ContainerInner>,
}

impl Container {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(ContainerInner {
                id: ContainerId(NEXT_CONTAINER_ID.fetch_add(1, Ordering::Relaxed)),
                name: name.into(),
                registry: Default::default(),
                dependencies: Default::default(),
            }),
        }
    }

    #[inline]
    pub fn id(&self) -> ContainerId {
        self.inner.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Registers a factory in the local registry.
    pub fn register(&self, component: Component, factory: Factory) -> Result<(), RegistryError> {
        self.write_registry().register(component, factory)
    }

    pub fn register_scoped(
        &self,
        component: Component,
        scope: Scope,
        factory: Factory,
    ) -> Result<(), RegistryError> {
        self.write_registry()
            .register_scoped(component, scope, factory)
    }

    /// Registers an infallible factory for the Rust type it produces.
    pub fn provide<T, F>(&self, qualifiers: Qualifiers, factory: F) -> Result<(), RegistryError>
    where
        T: Any + Send + Sync,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.write_registry().provide(qualifiers, factory)
    }

    /// Looks up matching factories in the local registry only.
    pub fn lookup(&self, request: &Component, constraint: &Constraint) -> FactoryMap {
        self.read_registry().lookup(request, constraint)
    }

    /// Resolves the request across the federation, taking only components accepted by the
    /// constraint.
    pub fn resolve_with(
        &self,
        request: &Component,
        options: ResolveOptions,
        constraint: &Constraint,
    ) -> Result<Resolved, ResolutionError> {
        resolve_candidates(request, options, self.candidates(request, constraint))
    }

    /// Makes this container see components of `other` accepted by the constraint. Adding another
    /// edge to the same container widens the existing one.
    pub fn depend_on(&self, other: &Container, constraint: Constraint) {
        let mut dependencies = self.write_dependencies();
        match dependencies.entry(other.id()) {
            Entry::Occupied(mut entry) => {
                let dependency = entry.get_mut();
                dependency.constraint = dependency.constraint.or(&constraint);
            }
            Entry::Vacant(entry) => {
                entry.insert(Dependency {
                    container: other.clone(),
                    constraint,
                });
            }
        }
    }

    /// Makes components of `other` which satisfy given target and qualifiers visible here.
    pub fn require_from(&self, other: &Container, target: TypeIdentity, qualifiers: Qualifiers) {
        let required = Component::new(target, qualifiers);
        debug!(
            "Container '{}' requires {} from '{}'.",
            self.name(),
            required,
            other.name()
        );

        self.depend_on(other, Constraint::satisfying(required));
    }

    /// Makes matching components of this container visible in `other`.
    #[inline]
    pub fn expose_to(&self, other: &Container, target: TypeIdentity, qualifiers: Qualifiers) {
        other.require_from(self, target, qualifiers);
    }

    /// Makes matching components visible in both directions.
    pub fn share_with(&self, other: &Container, target: TypeIdentity, qualifiers: Qualifiers) {
        self.require_from(other, target.clone(), qualifiers.clone());
        self.expose_to(other, target, qualifiers);
    }

    /// Checks if there's a direct dependency edge to `other`.
    pub fn depends_on(&self, other: &Container) -> bool {
        self.read_dependencies().contains_key(&other.id())
    }

    /// Wraps a function, so its injection points get resolved from this container on each call.
    pub fn inject<F, O>(&self, signature: Signature, function: F) -> InjectedFunction<Container, F>
    where
        F: Fn(Arguments) -> O,
    {
        InjectedFunction::new(Injector::new(signature), self.clone(), function)
    }

    fn candidates(&self, request: &Component, constraint: &Constraint) -> Vec<Candidate> {
        let mut path = FxHashSet::default();
        let mut found = CandidateMap::default();

        self.collect_candidates(request, constraint, &mut path, &mut found);

        trace!(
            "Found {} candidates for {} in container '{}'.",
            found.len(),
            request,
            self.name()
        );

        found.into_values().collect()
    }

    fn collect_candidates(
        &self,
        request: &Component,
        constraint: &Constraint,
        path: &mut FxHashSet<ContainerId>,
        found: &mut CandidateMap,
    ) {
        if !path.insert(self.id()) {
            trace!(
                "Skipping container '{}' already present on the resolution path.",
                self.name()
            );
            return;
        }

        let local = self
            .read_registry()
            .candidates(request, constraint, Some(self.name()));
        for candidate in local {
            found
                .entry((self.id(), candidate.component.clone()))
                .or_insert(candidate);
        }

        // snapshot, so no lock is held while visiting other containers
        let dependencies: Vec<_> = self.read_dependencies().values().cloned().collect();
        for dependency in dependencies {
            dependency.container.collect_candidates(
                request,
                &constraint.and(&dependency.constraint),
                path,
                found,
            );
        }

        path.remove(&self.id());
    }

    fn read_registry(&self) -> RwLockReadGuard<'_, Registry> {
        self.inner
            .registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write_registry(&self) -> RwLockWriteGuard<'_, Registry> {
        self.inner
            .registry
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn read_dependencies(
        &self,
    ) -> RwLockReadGuard<'_, IndexMap<ContainerId, Dependency, FxBuildHasher>> {
        self.inner
            .dependencies
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write_dependencies(
        &self,
    ) -> RwLockWriteGuard<'_, IndexMap<ContainerId, Dependency, FxBuildHasher>> {
        self.inner
            .dependencies
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl ComponentResolver for Container {
    fn resolve_one(&self, request: &Component) -> Result<ComponentInstanceAnyPtr, ResolutionError> {
        select_one(request, self.candidates(request, &Constraint::always()))
    }

    fn resolve_many(
        &self,
        request: &Component,
    ) -> Result<Vec<ComponentInstanceAnyPtr>, ResolutionError> {
        instantiate_all(self.candidates(request, &Constraint::always()))
    }

    fn resolve_named(
        &self,
        request: &Component,
    ) -> Result<NamedInstances<ComponentInstanceAnyPtr>, ResolutionError> {
        instantiate_named(self.candidates(request, &Constraint::always()))
    }
}

impl PartialEq for Container {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Container {}

impl Hash for Container {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl Debug for Container {
    // dependencies may form cycles, so only identity is printed
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("id", &self.id())
            .field("name", &self.name())
            .finish()
    }
}
