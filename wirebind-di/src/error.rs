use crate::instance::ErrorPtr;
use itertools::Itertools;
use thiserror::Error;

/// Errors related to constructing and querying [Qualifiers](crate::qualifiers::Qualifiers).
#[derive(Error, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub enum QualifierError {
    #[error("Qualifier '{0}' cannot be used both as a tag and as a parameter key.")]
    TagParameterCollision(String),
    #[error("Qualifier parameter '{0}' was given more than once.")]
    DuplicateParameter(String),
    #[error("Qualifier parameter not found: {0}")]
    KeyNotFound(String),
}

/// Error related to registering component factories.
#[derive(Error, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub enum RegistryError {
    #[error("Cannot register multiple providers for '{0}'.")]
    DuplicateRegistration(String),
}

/// Errors related to resolving component instances.
#[derive(Error, Clone, Debug)]
pub enum ResolutionError {
    #[error("Cannot resolve dependency {request}.")]
    UnsatisfiedDependency { request: String },
    #[error("Dependency resolution for {request} is ambiguous: {}", .candidates.iter().join(" | "))]
    AmbiguousDependency {
        request: String,
        candidates: Vec<String>,
    },
    #[error("Named resolution of {0} requires many results.")]
    NamedRequiresMany(String),
    #[error("Provider for {component} failed: {source}")]
    ProviderFailed {
        component: String,
        source: ErrorPtr,
    },
    #[error("Tried to downcast component {component} to incompatible type: {target_type}")]
    IncompatibleComponent {
        component: String,
        target_type: &'static str,
    },
}

/// Errors related to declaring injectable [Signatures](crate::injector::signature::Signature).
#[derive(Error, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub enum SignatureError {
    #[error("Parameter '{0}' is declared more than once.")]
    DuplicateParameter(String),
    #[error("Parameter '{parameter}' of kind {kind} cannot follow a parameter of kind {previous}.")]
    InvalidParameterOrder {
        parameter: String,
        kind: String,
        previous: String,
    },
    #[error("Only one {kind} parameter is allowed, found another: {parameter}")]
    DuplicateVariadic { parameter: String, kind: String },
    #[error("Invalid injection metadata on parameter '{parameter}': {source}")]
    InvalidInjection {
        parameter: String,
        source: QualifierError,
    },
}

/// Errors related to binding call arguments with resolved dependencies.
#[derive(Error, Clone, Debug)]
pub enum BindError {
    #[error("Not enough positional arguments, missing value for '{0}'.")]
    InsufficientArguments(String),
    #[error("Too many positional arguments: {consumed} used, {given} given.")]
    TooManyArguments { consumed: usize, given: usize },
    #[error("Argument '{0}' was provided twice.")]
    DuplicateArgument(String),
    #[error("Unexpected keyword arguments: {}", .0.iter().join(", "))]
    UnexpectedKeywordArgument(Vec<String>),
    #[error("Cannot inject parameter '{parameter}': {source}")]
    Resolution {
        parameter: String,
        source: ResolutionError,
    },
}

impl ResolutionError {
    /// Checks if the error means nothing satisfied the request, as opposed to a real failure.
    #[inline]
    pub fn is_unsatisfied(&self) -> bool {
        matches!(self, ResolutionError::UnsatisfiedDependency { .. })
    }
}
