//! Declarations of callable parameters. A [Signature] lists parameters in declaration order, each
//! with its passing convention and, for injection points, the [Component] to resolve.
//!
//! ```
//! use wirebind_di::injector::signature::{InjectionSpec, ParameterSpec, Signature};
//!
//! // fn(x: Inject<i32>, z, /, w, *, y: Inject<f64>, v)
//! let signature = Signature::builder()
//!     .parameter(ParameterSpec::positional_only("x").injected(InjectionSpec::of::<i32>()))
//!     .parameter(ParameterSpec::positional_only("z"))
//!     .parameter(ParameterSpec::positional_or_keyword("w"))
//!     .parameter(ParameterSpec::keyword_only("y").injected(InjectionSpec::of::<f64>()))
//!     .parameter(ParameterSpec::keyword_only("v"))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(signature.parameters().len(), 5);
//! ```

use crate::component::Component;
use crate::error::SignatureError;
use crate::qualifiers::Qualifiers;
use crate::type_identity::TypeIdentity;
use fxhash::FxHashSet;
use std::fmt::{Display, Formatter};

/// Passing convention of a parameter. The declaration order of kinds in a signature must follow
/// the order of variants.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum ParameterKind {
    PositionalOnly,
    PositionalOrKeyword,
    VarPositional,
    KeywordOnly,
    VarKeyword,
}

impl ParameterKind {
    #[inline]
    pub fn is_variadic(self) -> bool {
        matches!(self, ParameterKind::VarPositional | ParameterKind::VarKeyword)
    }
}

impl Display for ParameterKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ParameterKind::PositionalOnly => "positional-only",
            ParameterKind::PositionalOrKeyword => "positional-or-keyword",
            ParameterKind::VarPositional => "variadic positional",
            ParameterKind::KeywordOnly => "keyword-only",
            ParameterKind::VarKeyword => "variadic keyword",
        })
    }
}

/// Unvalidated injection metadata of a parameter. Qualifiers are checked and given injection point
/// defaults when the [Signature] is built.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InjectionSpec {
    target: TypeIdentity,
    tags: Vec<String>,
    params: Vec<(String, String)>,
}

impl InjectionSpec {
    pub fn new(target: TypeIdentity) -> Self {
        Self {
            target,
            tags: vec![],
            params: vec![],
        }
    }

    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::new(TypeIdentity::of::<T>())
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    fn into_component(self, parameter: &str) -> Result<Component, SignatureError> {
        Qualifiers::for_injector(self.tags, self.params)
            .map(|qualifiers| Component::new(self.target, qualifiers))
            .map_err(|source| SignatureError::InvalidInjection {
                parameter: parameter.to_string(),
                source,
            })
    }
}

/// Unvalidated declaration of a single parameter.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParameterSpec {
    name: String,
    kind: ParameterKind,
    injection: Option<InjectionSpec>,
}

impl ParameterSpec {
    pub fn new(name: impl Into<String>, kind: ParameterKind) -> Self {
        Self {
            name: name.into(),
            kind,
            injection: None,
        }
    }

    pub fn positional_only(name: impl Into<String>) -> Self {
        Self::new(name, ParameterKind::PositionalOnly)
    }

    pub fn positional_or_keyword(name: impl Into<String>) -> Self {
        Self::new(name, ParameterKind::PositionalOrKeyword)
    }

    pub fn var_positional(name: impl Into<String>) -> Self {
        Self::new(name, ParameterKind::VarPositional)
    }

    pub fn keyword_only(name: impl Into<String>) -> Self {
        Self::new(name, ParameterKind::KeywordOnly)
    }

    pub fn var_keyword(name: impl Into<String>) -> Self {
        Self::new(name, ParameterKind::VarKeyword)
    }

    /// Marks the parameter as an injection point.
    pub fn injected(mut self, injection: InjectionSpec) -> Self {
        self.injection = Some(injection);
        self
    }
}

/// Validated parameter declaration.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Parameter {
    name: String,
    kind: ParameterKind,
    component: Option<Component>,
}

impl Parameter {
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn kind(&self) -> ParameterKind {
        self.kind
    }

    /// Component to resolve, if this parameter is an injection point.
    #[inline]
    pub fn component(&self) -> Option<&Component> {
        self.component.as_ref()
    }

    #[inline]
    pub fn is_injected(&self) -> bool {
        self.component.is_some()
    }
}

/// Validated, immutable list of parameters of a callable.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Signature {
    parameters: Vec<Parameter>,
}

impl Signature {
    pub fn builder() -> SignatureBuilder {
        Default::default()
    }

    #[inline]
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters
            .iter()
            .find(|parameter| parameter.name == name)
    }
}

/// Builder for [Signature].
#[derive(Clone, Debug, Default)]
pub struct SignatureBuilder {
    parameters: Vec<ParameterSpec>,
}

impl SignatureBuilder {
    /// Appends a parameter declaration.
    pub fn parameter(mut self, parameter: ParameterSpec) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Validates declarations and builds resulting [Signature].
    pub fn build(self) -> Result<Signature, SignatureError> {
        let mut names = FxHashSet::default();
        let mut previous: Option<ParameterKind> = None;
        let mut parameters = Vec::with_capacity(self.parameters.len());

        for ParameterSpec {
            name,
            kind,
            injection,
        } in self.parameters
        {
            if !names.insert(name.clone()) {
                return Err(SignatureError::DuplicateParameter(name));
            }

            if let Some(previous) = previous {
                if kind < previous {
                    return Err(SignatureError::InvalidParameterOrder {
                        parameter: name,
                        kind: kind.to_string(),
                        previous: previous.to_string(),
                    });
                }

                if kind == previous && kind.is_variadic() {
                    return Err(SignatureError::DuplicateVariadic {
                        parameter: name,
                        kind: kind.to_string(),
                    });
                }
            }

            let component = injection
                .map(|injection| injection.into_component(&name))
                .transpose()?;

            previous = Some(kind);
            parameters.push(Parameter {
                name,
                kind,
                component,
            });
        }

        Ok(Signature { parameters })
    }
}
