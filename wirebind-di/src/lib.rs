//! Qualifier-based dependency resolution.
//!
//! Components are described by a [TypeIdentity](type_identity::TypeIdentity) and a set of
//! [Qualifiers](qualifiers::Qualifiers). Providers register factories for components in a
//! [Registry](registry::Registry), and requests are answered with providers whose target is a
//! subtype of the requested one and whose qualifiers are a superset of the requested ones.
//!
//! Registries can be federated through [Containers](container::Container) - named registries with
//! constrained dependency edges to other containers. Resolution in a container considers the
//! whole federation reachable from it, and reports ambiguity across container boundaries.
//!
//! Finally, an [Injector](injector::Injector) binds arguments of a call described by a
//! [Signature](injector::signature::Signature), resolving injection points and passing the rest
//! through from the caller.
//!
//! ```
//! use wirebind_di::container::Container;
//! use wirebind_di::injector::signature::{InjectionSpec, ParameterSpec, Signature};
//! use wirebind_di::injector::Arguments;
//! use wirebind_di::qualifiers::Qualifiers;
//!
//! let container = Container::new("main");
//! container
//!     .provide(Qualifiers::provider_default(), || 40_i32)
//!     .unwrap();
//!
//! let signature = Signature::builder()
//!     .parameter(ParameterSpec::positional_or_keyword("offset"))
//!     .parameter(ParameterSpec::keyword_only("base").injected(InjectionSpec::of::<i32>()))
//!     .build()
//!     .unwrap();
//!
//! let add = container.inject(signature, |arguments: Arguments| {
//!     let offset = arguments.positional_typed::<i32>(0).unwrap();
//!     let base = arguments.keyword_typed::<i32>("base").unwrap();
//!     *offset + *base
//! });
//!
//! assert_eq!(add.call(Arguments::new().with_positional(2_i32)).unwrap(), 42);
//! ```

pub mod component;
pub mod container;
pub mod error;
pub mod injector;
pub mod instance;
pub mod qualifiers;
pub mod registry;
mod resolution;
pub mod scope;
pub mod type_identity;
