//! Identities of capabilities which can be provided and requested.
//!
//! A [TypeIdentity] is an explicit value rather than a reflection query. It can be a Rust type, an
//! abstract capability known only by name, or a callable signature used to model higher-order
//! providers. Any identity can be parameterized with arguments and can declare its supertypes:
//!
//! ```
//! use wirebind_di::type_identity::TypeIdentity;
//!
//! let repository = TypeIdentity::named("app::Repository");
//! let users = TypeIdentity::named("app::UserRepository")
//!     .with_arguments([TypeIdentity::of::<String>()])
//!     .with_supertype(repository.clone());
//!
//! assert!(users.is_subtype_of(&repository));
//! assert!(!repository.is_subtype_of(&users));
//! ```
//!
//! Subtyping only looks at the unparameterized origin, so `Repository<String>` is a subtype of
//! `Repository<u8>` and of plain `Repository`, and all callable identities match each other.

use derivative::Derivative;
use itertools::Itertools;
use std::any::{type_name, TypeId};
use std::borrow::Cow;
use std::fmt::{Display, Formatter};

/// The unparameterized part of a [TypeIdentity].
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeOrigin {
    Rust { id: TypeId, name: &'static str },
    Named(Cow<'static, str>),
    Callable,
}

/// Identity of a capability, possibly generic, with explicitly declared supertypes.
#[derive(Clone, Derivative)]
#[derivative(Eq, PartialEq, Hash, Debug)]
pub struct TypeIdentity {
    origin: TypeOrigin,
    arguments: Vec<TypeIdentity>,
    #[derivative(PartialEq = "ignore", Hash = "ignore")]
    supertypes: Vec<TypeIdentity>,
}

impl TypeIdentity {
    /// Identity of a Rust type.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::from_origin(TypeOrigin::Rust {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        })
    }

    /// Identity of an abstract capability with a stable, fully qualified name.
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Self::from_origin(TypeOrigin::Named(name.into()))
    }

    /// Identity of a callable taking `parameters` and returning `output`.
    pub fn callable(
        parameters: impl IntoIterator<Item = TypeIdentity>,
        output: TypeIdentity,
    ) -> Self {
        Self::from_origin(TypeOrigin::Callable)
            .with_arguments(parameters.into_iter().chain([output]))
    }

    /// Identity of `origin` parameterized with `arguments`.
    pub fn generic(origin: TypeIdentity, arguments: impl IntoIterator<Item = TypeIdentity>) -> Self {
        origin.with_arguments(arguments)
    }

    fn from_origin(origin: TypeOrigin) -> Self {
        Self {
            origin,
            arguments: vec![],
            supertypes: vec![],
        }
    }

    /// Replaces type arguments.
    pub fn with_arguments(mut self, arguments: impl IntoIterator<Item = TypeIdentity>) -> Self {
        self.arguments = arguments.into_iter().collect();
        self
    }

    /// Declares `supertype` as a type this identity can be used as.
    pub fn with_supertype(mut self, supertype: TypeIdentity) -> Self {
        self.supertypes.push(supertype);
        self
    }

    #[inline]
    pub fn origin(&self) -> &TypeOrigin {
        &self.origin
    }

    #[inline]
    pub fn arguments(&self) -> &[TypeIdentity] {
        &self.arguments
    }

    #[inline]
    pub fn is_generic(&self) -> bool {
        !self.arguments.is_empty()
    }

    /// Checks if this identity has the same origin as `other`, or declares (possibly
    /// transitively) a supertype with that origin.
    pub fn is_subtype_of(&self, other: &TypeIdentity) -> bool {
        self.origin == other.origin
            || self
                .supertypes
                .iter()
                .any(|supertype| supertype.is_subtype_of(other))
    }
}

impl Display for TypeIdentity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.origin {
            TypeOrigin::Callable => match self.arguments.split_last() {
                Some((output, parameters)) => {
                    write!(f, "fn({}) -> {}", parameters.iter().join(", "), output)
                }
                None => write!(f, "fn()"),
            },
            TypeOrigin::Rust { name, .. } => write_generic(f, name, &self.arguments),
            TypeOrigin::Named(name) => write_generic(f, name, &self.arguments),
        }
    }
}

fn write_generic(
    f: &mut Formatter<'_>,
    name: &str,
    arguments: &[TypeIdentity],
) -> std::fmt::Result {
    if arguments.is_empty() {
        write!(f, "{name}")
    } else {
        write!(f, "{name}<{}>", arguments.iter().join(", "))
    }
}
