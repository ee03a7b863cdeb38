//! One of the basic blocks of dependency resolution is a [Component] - a pair of a target
//! [TypeIdentity] and [Qualifiers]. The same structure describes both a registered provider and a
//! request for an instance. A provider satisfies a request if its target is a subtype of the
//! requested one, and its qualifiers are a superset of the requested ones:
//!
//! ```
//! use wirebind_di::component::Component;
//! use wirebind_di::qualifiers::Qualifiers;
//!
//! let provider = Component::of::<u16>(Qualifiers::provider_default());
//! let request = Component::of::<u16>(Qualifiers::injector_default());
//!
//! assert!(provider.satisfies(&request));
//! assert!(!request.satisfies(&provider));
//! ```

use crate::qualifiers::Qualifiers;
use crate::type_identity::TypeIdentity;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

/// Descriptor of a provided or requested component.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Component {
    target: TypeIdentity,
    qualifiers: Qualifiers,
}

impl Component {
    pub fn new(target: TypeIdentity, qualifiers: Qualifiers) -> Self {
        Self { target, qualifiers }
    }

    /// Creates a descriptor for a Rust type.
    pub fn of<T: ?Sized + 'static>(qualifiers: Qualifiers) -> Self {
        Self::new(TypeIdentity::of::<T>(), qualifiers)
    }

    #[inline]
    pub fn target(&self) -> &TypeIdentity {
        &self.target
    }

    #[inline]
    pub fn qualifiers(&self) -> &Qualifiers {
        &self.qualifiers
    }

    /// Checks if this component can be supplied for given request.
    pub fn satisfies(&self, request: &Component) -> bool {
        self.target.is_subtype_of(&request.target)
            && self.qualifiers.is_superset_of(&request.qualifiers)
    }
}

impl Display for Component {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]", self.target, self.qualifiers)
    }
}

/// Predicate restricting which components can be taken from a source. Constraints are cheap to
/// clone and compose.
#[derive(Clone)]
pub struct Constraint(Arc<dyn Fn(&Component) -> bool + Send + Sync>);

impl Constraint {
    pub fn new(predicate: impl Fn(&Component) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(predicate))
    }

    /// Constraint accepting everything.
    pub fn always() -> Self {
        Self::new(|_| true)
    }

    /// Constraint accepting components which satisfy `request`.
    pub fn satisfying(request: Component) -> Self {
        Self::new(move |component| component.satisfies(&request))
    }

    #[inline]
    pub fn accepts(&self, component: &Component) -> bool {
        (self.0)(component)
    }

    pub fn and(&self, other: &Constraint) -> Self {
        let (first, second) = (self.clone(), other.clone());
        Self::new(move |component| first.accepts(component) && second.accepts(component))
    }

    pub fn or(&self, other: &Constraint) -> Self {
        let (first, second) = (self.clone(), other.clone());
        Self::new(move |component| first.accepts(component) || second.accepts(component))
    }
}

impl Default for Constraint {
    fn default() -> Self {
        Self::always()
    }
}

impl Debug for Constraint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("Constraint")
    }
}
