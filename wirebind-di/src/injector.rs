//! Binding of call arguments with resolved dependencies. An [Injector] takes the arguments given
//! by a caller and produces a complete argument set for a callable described by a
//! [Signature], filling injection points from a [ComponentResolver]. Binding follows the usual
//! rules of mixed positional and keyword calling conventions:
//!
//! 1. Positional parameters are filled in order, from the resolver for injection points and from
//!    the given positional arguments otherwise.
//! 2. A variadic positional parameter receives either all resolved instances, or the remaining
//!    given positional arguments.
//! 3. Remaining positional-or-keyword and keyword-only parameters are filled from the resolver or
//!    the given keyword arguments.
//! 4. A variadic keyword parameter receives either all named instances, or the remaining given
//!    keyword arguments.
//!
//! Arguments left over after binding result in an error.

pub mod signature;

use crate::component::Component;
use crate::error::{BindError, ResolutionError};
use crate::injector::signature::{Parameter, ParameterKind, Signature};
use crate::instance::{ComponentInstanceAnyPtr, ComponentInstancePtr, ComponentResolver};
use derivative::Derivative;
use indexmap::IndexMap;
use std::any::Any;
use tracing::trace;

/// Positional and keyword arguments of a call.
#[derive(Clone, Debug, Default)]
pub struct Arguments {
    pub positional: Vec<ComponentInstanceAnyPtr>,
    pub keyword: IndexMap<String, ComponentInstanceAnyPtr>,
}

impl Arguments {
    pub fn new() -> Self {
        Default::default()
    }

    /// Appends a positional argument.
    pub fn with_positional<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.positional.push(ComponentInstancePtr::new(value));
        self
    }

    /// Sets a keyword argument.
    pub fn with_keyword<T: Any + Send + Sync>(mut self, name: impl Into<String>, value: T) -> Self {
        self.keyword
            .insert(name.into(), ComponentInstancePtr::new(value));
        self
    }

    pub fn positional_typed<T: Any + Send + Sync>(
        &self,
        index: usize,
    ) -> Option<ComponentInstancePtr<T>> {
        self.positional
            .get(index)
            .and_then(|value| value.clone().downcast().ok())
    }

    pub fn keyword_typed<T: Any + Send + Sync>(&self, name: &str) -> Option<ComponentInstancePtr<T>> {
        self.keyword
            .get(name)
            .and_then(|value| value.clone().downcast().ok())
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keyword.is_empty()
    }
}

/// Binds call arguments for a given [Signature].
#[derive(Clone, Debug, Default)]
pub struct Injector {
    signature: Signature,
}

impl Injector {
    pub fn new(signature: Signature) -> Self {
        Self { signature }
    }

    #[inline]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Names of parameters being injection points.
    pub fn injected_parameters(&self) -> impl Iterator<Item = &str> {
        self.signature
            .parameters()
            .iter()
            .filter(|parameter| parameter.is_injected())
            .map(Parameter::name)
    }

    /// Produces complete arguments for the callable, given the arguments supplied by the caller.
    /// Dependencies are resolved anew on every call.
    pub fn bind<R: ComponentResolver + ?Sized>(
        &self,
        resolver: &R,
        arguments: Arguments,
    ) -> Result<Arguments, BindError> {
        let Arguments {
            positional,
            mut keyword,
        } = arguments;

        trace!(
            "Binding {} positional and {} keyword arguments.",
            positional.len(),
            keyword.len()
        );

        let parameters = self.signature.parameters();
        let given = positional.len();
        let mut supplied = positional.into_iter();
        let mut bound = Arguments::default();

        // first parameter not bound by position
        let mut unbound = 0;

        while let Some(parameter) = parameters.get(unbound) {
            let kind = parameter.kind();
            if !matches!(
                kind,
                ParameterKind::PositionalOnly | ParameterKind::PositionalOrKeyword
            ) {
                break;
            }

            let value = match parameter.component() {
                Some(component) => {
                    ensure_not_given(parameter, &keyword)?;
                    resolve_one(resolver, parameter, component)?
                }
                None => match supplied.next() {
                    Some(value) => {
                        ensure_not_given(parameter, &keyword)?;
                        value
                    }
                    None if kind == ParameterKind::PositionalOnly => {
                        return Err(BindError::InsufficientArguments(
                            parameter.name().to_string(),
                        ));
                    }
                    None => break,
                },
            };

            bound.positional.push(value);
            unbound += 1;
        }

        if let Some(variadic) = parameters
            .iter()
            .position(|parameter| parameter.kind() == ParameterKind::VarPositional)
        {
            let parameter = &parameters[variadic];
            ensure_not_given(parameter, &keyword)?;

            match parameter.component() {
                Some(component) => {
                    let values = resolver
                        .resolve_many(component)
                        .map_err(|source| resolution_error(parameter, source))?;

                    if !values.is_empty() {
                        // values can only be passed by position after all preceding parameters
                        for skipped in &parameters[unbound..variadic] {
                            let value = match skipped.component() {
                                Some(component) => resolve_one(resolver, skipped, component)?,
                                None => keyword.shift_remove(skipped.name()).ok_or_else(|| {
                                    BindError::InsufficientArguments(skipped.name().to_string())
                                })?,
                            };

                            bound.positional.push(value);
                        }

                        unbound = variadic;
                    }

                    bound.positional.extend(values);
                }
                None => bound.positional.extend(supplied.by_ref()),
            }
        }

        let remaining = supplied.len();
        if remaining > 0 {
            return Err(BindError::TooManyArguments {
                consumed: given - remaining,
                given,
            });
        }

        for parameter in &parameters[unbound..] {
            if !matches!(
                parameter.kind(),
                ParameterKind::PositionalOrKeyword | ParameterKind::KeywordOnly
            ) {
                continue;
            }

            if let Some(component) = parameter.component() {
                ensure_not_given(parameter, &keyword)?;

                let value = resolve_one(resolver, parameter, component)?;
                bound.keyword.insert(parameter.name().to_string(), value);
            } else if let Some(value) = keyword.shift_remove(parameter.name()) {
                bound.keyword.insert(parameter.name().to_string(), value);
            }
        }

        if let Some(parameter) = parameters
            .iter()
            .find(|parameter| parameter.kind() == ParameterKind::VarKeyword)
        {
            match parameter.component() {
                Some(component) => {
                    let named = resolver
                        .resolve_named(component)
                        .map_err(|source| resolution_error(parameter, source))?;

                    for (name, value) in named {
                        if bound.keyword.contains_key(&name) || keyword.contains_key(&name) {
                            return Err(BindError::DuplicateArgument(name));
                        }

                        bound.keyword.insert(name, value);
                    }
                }
                None => bound.keyword.extend(keyword.drain(..)),
            }
        }

        if !keyword.is_empty() {
            return Err(BindError::UnexpectedKeywordArgument(
                keyword.into_keys().collect(),
            ));
        }

        Ok(bound)
    }
}

/// Positional-only parameters never clash with keyword arguments of the same name.
fn ensure_not_given(
    parameter: &Parameter,
    keyword: &IndexMap<String, ComponentInstanceAnyPtr>,
) -> Result<(), BindError> {
    if parameter.kind() != ParameterKind::PositionalOnly && keyword.contains_key(parameter.name())
    {
        return Err(BindError::DuplicateArgument(parameter.name().to_string()));
    }

    Ok(())
}

fn resolve_one<R: ComponentResolver + ?Sized>(
    resolver: &R,
    parameter: &Parameter,
    component: &Component,
) -> Result<ComponentInstanceAnyPtr, BindError> {
    resolver
        .resolve_one(component)
        .map_err(|source| resolution_error(parameter, source))
}

fn resolution_error(parameter: &Parameter, source: ResolutionError) -> BindError {
    BindError::Resolution {
        parameter: parameter.name().to_string(),
        source,
    }
}

/// A function bound to a resolver. Each call binds the given arguments anew, so dependencies
/// registered after wrapping are visible.
#[derive(Derivative)]
#[derivative(Debug(bound = "R: std::fmt::Debug"))]
pub struct InjectedFunction<R, F> {
    injector: Injector,
    resolver: R,
    #[derivative(Debug = "ignore")]
    function: F,
}

impl<R, F> InjectedFunction<R, F> {
    pub fn new(injector: Injector, resolver: R, function: F) -> Self {
        Self {
            injector,
            resolver,
            function,
        }
    }

    #[inline]
    pub fn injector(&self) -> &Injector {
        &self.injector
    }

    /// Binds arguments and calls the wrapped function.
    pub fn call<O>(&self, arguments: Arguments) -> Result<O, BindError>
    where
        R: ComponentResolver,
        F: Fn(Arguments) -> O,
    {
        let arguments = self.injector.bind(&self.resolver, arguments)?;
        Ok((self.function)(arguments))
    }
}

#[cfg(test)]
mod tests {
    use crate::error::{BindError, ResolutionError};
    use crate::injector::signature::{InjectionSpec, ParameterSpec, Signature};
    use crate::injector::{Arguments, Injector};
    use crate::instance::{
        ComponentInstanceAnyPtr, ComponentInstancePtr, MockComponentResolver, NamedInstances,
    };
    use crate::type_identity::TypeIdentity;

    fn ptr<T: Send + Sync + 'static>(value: T) -> ComponentInstanceAnyPtr {
        ComponentInstancePtr::new(value)
    }

    fn render(value: &ComponentInstanceAnyPtr) -> String {
        if let Some(value) = value.downcast_ref::<i32>() {
            value.to_string()
        } else if let Some(value) = value.downcast_ref::<f64>() {
            value.to_string()
        } else if let Some(value) = value.downcast_ref::<&str>() {
            value.to_string()
        } else {
            "?".to_string()
        }
    }

    fn positional(arguments: &Arguments) -> Vec<String> {
        arguments.positional.iter().map(render).collect()
    }

    fn keyword(arguments: &Arguments) -> Vec<(String, String)> {
        arguments
            .keyword
            .iter()
            .map(|(name, value)| (name.clone(), render(value)))
            .collect()
    }

    fn pairs(expected: &[(&str, &str)]) -> Vec<(String, String)> {
        expected
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect()
    }

    // provides 5 for i32, 2.5 for f64, ["x", "y"] for many &str and {first: 1.5} for named f64
    fn resolver() -> MockComponentResolver {
        let mut resolver = MockComponentResolver::new();
        resolver.expect_resolve_one().returning(|request| {
            if request.target() == &TypeIdentity::of::<i32>() {
                Ok(ptr(5_i32))
            } else if request.target() == &TypeIdentity::of::<f64>() {
                Ok(ptr(2.5_f64))
            } else {
                Err(ResolutionError::UnsatisfiedDependency {
                    request: request.to_string(),
                })
            }
        });
        resolver.expect_resolve_many().returning(|request| {
            if request.target() == &TypeIdentity::of::<&str>() {
                Ok(vec![ptr("x"), ptr("y")])
            } else {
                Ok(vec![])
            }
        });
        resolver.expect_resolve_named().returning(|request| {
            let mut named = NamedInstances::new();
            if request.target() == &TypeIdentity::of::<f64>() {
                named.insert("first".to_string(), ptr(1.5_f64));
            }

            Ok(named)
        });
        resolver
    }

    fn injector(parameters: impl IntoIterator<Item = ParameterSpec>) -> Injector {
        Injector::new(
            parameters
                .into_iter()
                .fold(Signature::builder(), |builder, parameter| {
                    builder.parameter(parameter)
                })
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn should_bind_mixed_parameters() {
        // fn(x: Inject<i32>, z, /, w, *, y: Inject<f64>, v)
        let injector = injector([
            ParameterSpec::positional_only("x").injected(InjectionSpec::of::<i32>()),
            ParameterSpec::positional_only("z"),
            ParameterSpec::positional_or_keyword("w"),
            ParameterSpec::keyword_only("y").injected(InjectionSpec::of::<f64>()),
            ParameterSpec::keyword_only("v"),
        ]);

        let bound = injector
            .bind(
                &resolver(),
                Arguments::new()
                    .with_positional(1_i32)
                    .with_keyword("w", 2_i32)
                    .with_keyword("v", 3_i32),
            )
            .unwrap();

        assert_eq!(positional(&bound), vec!["5", "1"]);
        assert_eq!(
            keyword(&bound),
            pairs(&[("w", "2"), ("y", "2.5"), ("v", "3")])
        );
        assert_eq!(injector.injected_parameters().collect::<Vec<_>>(), vec!["x", "y"]);
    }

    #[test]
    fn should_pass_through_without_injection_points() {
        let injector = injector([
            ParameterSpec::positional_or_keyword("a"),
            ParameterSpec::positional_or_keyword("b"),
        ]);

        let bound = injector
            .bind(
                &MockComponentResolver::new(),
                Arguments::new().with_positional(1_i32).with_keyword("b", 2_i32),
            )
            .unwrap();

        assert_eq!(positional(&bound), vec!["1"]);
        assert_eq!(keyword(&bound), pairs(&[("b", "2")]));
    }

    #[test]
    fn should_reject_missing_positional_only_argument() {
        let injector = injector([ParameterSpec::positional_only("a")]);

        assert!(matches!(
            injector
                .bind(&MockComponentResolver::new(), Arguments::new())
                .unwrap_err(),
            BindError::InsufficientArguments(name) if name == "a"
        ));
    }

    #[test]
    fn should_reject_too_many_positional_arguments() {
        let injector = injector([ParameterSpec::positional_or_keyword("a")]);

        assert!(matches!(
            injector
                .bind(
                    &MockComponentResolver::new(),
                    Arguments::new().with_positional(1_i32).with_positional(2_i32),
                )
                .unwrap_err(),
            BindError::TooManyArguments {
                consumed: 1,
                given: 2
            }
        ));
    }

    #[test]
    fn should_reject_argument_given_twice() {
        let injector = injector([ParameterSpec::positional_or_keyword("a")]);

        assert!(matches!(
            injector
                .bind(
                    &MockComponentResolver::new(),
                    Arguments::new().with_positional(1_i32).with_keyword("a", 2_i32),
                )
                .unwrap_err(),
            BindError::DuplicateArgument(name) if name == "a"
        ));
    }

    #[test]
    fn should_reject_keyword_for_positionally_injected_parameter() {
        let injector = injector([
            ParameterSpec::positional_or_keyword("b").injected(InjectionSpec::of::<i32>())
        ]);

        assert!(matches!(
            injector
                .bind(&resolver(), Arguments::new().with_keyword("b", 1_i32))
                .unwrap_err(),
            BindError::DuplicateArgument(name) if name == "b"
        ));
    }

    #[test]
    fn should_reject_keyword_for_injected_parameter() {
        let injector = injector([
            ParameterSpec::keyword_only("c").injected(InjectionSpec::of::<i32>())
        ]);

        assert!(matches!(
            injector
                .bind(&resolver(), Arguments::new().with_keyword("c", 1_i32))
                .unwrap_err(),
            BindError::DuplicateArgument(name) if name == "c"
        ));
    }

    #[test]
    fn should_reject_keyword_named_as_variadic_positional() {
        let injector = injector([ParameterSpec::var_positional("rest")]);

        assert!(matches!(
            injector
                .bind(
                    &MockComponentResolver::new(),
                    Arguments::new().with_keyword("rest", 1_i32),
                )
                .unwrap_err(),
            BindError::DuplicateArgument(name) if name == "rest"
        ));
    }

    #[test]
    fn should_reject_unexpected_keywords() {
        let injector = injector([ParameterSpec::positional_or_keyword("a")]);

        assert!(matches!(
            injector
                .bind(
                    &MockComponentResolver::new(),
                    Arguments::new()
                        .with_keyword("a", 1_i32)
                        .with_keyword("b", 2_i32)
                        .with_keyword("c", 3_i32),
                )
                .unwrap_err(),
            BindError::UnexpectedKeywordArgument(names) if names == vec!["b", "c"]
        ));
    }

    #[test]
    fn should_collect_remaining_arguments_into_variadics() {
        let injector = injector([
            ParameterSpec::positional_or_keyword("a"),
            ParameterSpec::var_positional("rest"),
            ParameterSpec::var_keyword("kw"),
        ]);

        let bound = injector
            .bind(
                &MockComponentResolver::new(),
                Arguments::new()
                    .with_positional(1_i32)
                    .with_positional(2_i32)
                    .with_positional(3_i32)
                    .with_keyword("extra", 4_i32),
            )
            .unwrap();

        assert_eq!(positional(&bound), vec!["1", "2", "3"]);
        assert_eq!(keyword(&bound), pairs(&[("extra", "4")]));
    }

    #[test]
    fn should_inject_variadic_positional() {
        let injector = injector([
            ParameterSpec::positional_only("a"),
            ParameterSpec::var_positional("rest").injected(InjectionSpec::of::<&str>()),
        ]);

        let bound = injector
            .bind(&resolver(), Arguments::new().with_positional(1_i32))
            .unwrap();

        assert_eq!(positional(&bound), vec!["1", "x", "y"]);
    }

    #[test]
    fn should_bind_skipped_parameters_by_position_before_injected_variadic() {
        let injector = injector([
            ParameterSpec::positional_or_keyword("a"),
            ParameterSpec::positional_or_keyword("b").injected(InjectionSpec::of::<i32>()),
            ParameterSpec::var_positional("rest").injected(InjectionSpec::of::<&str>()),
        ]);

        let bound = injector
            .bind(&resolver(), Arguments::new().with_keyword("a", 1_i32))
            .unwrap();

        assert_eq!(positional(&bound), vec!["1", "5", "x", "y"]);
        assert!(bound.keyword.is_empty());
    }

    #[test]
    fn should_reject_unfilled_parameters_before_injected_variadic() {
        let injector = injector([
            ParameterSpec::positional_or_keyword("a"),
            ParameterSpec::var_positional("rest").injected(InjectionSpec::of::<&str>()),
        ]);

        assert!(matches!(
            injector.bind(&resolver(), Arguments::new()).unwrap_err(),
            BindError::InsufficientArguments(name) if name == "a"
        ));
    }

    #[test]
    fn should_leave_parameters_unfilled_for_empty_injected_variadic() {
        let injector = injector([
            ParameterSpec::positional_or_keyword("a"),
            ParameterSpec::var_positional("rest").injected(InjectionSpec::of::<u8>()),
        ]);

        let bound = injector.bind(&resolver(), Arguments::new()).unwrap();

        assert!(bound.is_empty());
    }

    #[test]
    fn should_inject_variadic_keyword() {
        let injector = injector([
            ParameterSpec::keyword_only("a"),
            ParameterSpec::var_keyword("kw").injected(InjectionSpec::of::<f64>()),
        ]);

        let bound = injector
            .bind(&resolver(), Arguments::new().with_keyword("a", 1_i32))
            .unwrap();

        assert_eq!(keyword(&bound), pairs(&[("a", "1"), ("first", "1.5")]));
    }

    #[test]
    fn should_reject_injected_names_colliding_with_keywords() {
        let injector = injector([
            ParameterSpec::keyword_only("first"),
            ParameterSpec::var_keyword("kw").injected(InjectionSpec::of::<f64>()),
        ]);

        assert!(matches!(
            injector
                .bind(&resolver(), Arguments::new().with_keyword("first", 1_i32))
                .unwrap_err(),
            BindError::DuplicateArgument(name) if name == "first"
        ));
    }

    #[test]
    fn should_report_failing_injection_point() {
        let injector = injector([
            ParameterSpec::positional_or_keyword("missing").injected(InjectionSpec::of::<u8>())
        ]);

        assert!(matches!(
            injector.bind(&resolver(), Arguments::new()).unwrap_err(),
            BindError::Resolution {
                parameter,
                source: ResolutionError::UnsatisfiedDependency { .. }
            } if parameter == "missing"
        ));
    }

    #[test]
    fn should_read_typed_arguments() {
        let arguments = Arguments::new()
            .with_positional(1_i32)
            .with_keyword("b", 2.5_f64);

        assert_eq!(arguments.positional_typed::<i32>(0).as_deref(), Some(&1));
        assert!(arguments.positional_typed::<f64>(0).is_none());
        assert_eq!(arguments.keyword_typed::<f64>("b").as_deref(), Some(&2.5));
        assert!(arguments.keyword_typed::<f64>("c").is_none());
    }
}
