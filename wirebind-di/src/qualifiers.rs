//! Qualifiers refine a component beyond its bare type. A qualifier is either a tag (a plain flag)
//! or a `key=value` parameter. A request matches a provider when the provider's qualifiers are a
//! superset of the requested ones:
//!
//! ```
//! use wirebind_di::qualifiers::{Qualifiers, NO_PARAMS};
//!
//! let provider = Qualifiers::for_provider(["primary"], [("name", "main")]).unwrap();
//! let request = Qualifiers::for_injector(["primary"], NO_PARAMS).unwrap();
//!
//! assert!(provider.is_superset_of(&request));
//! assert_eq!(provider.to_string(), "any,primary,name=main");
//! ```
//!
//! Providers and injection points use different defaults, so that an unqualified request only
//! picks unqualified providers: an empty provider set becomes `{default, any}` (and `any` is always
//! present), while an empty request becomes `{default}`.

use crate::error::QualifierError;
use itertools::Itertools;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};

/// Tag present on unqualified providers and requested by unqualified injection points.
pub const DEFAULT: &str = "default";

/// Tag present on every provider.
pub const ANY: &str = "any";

/// Parameter used to key the results of named resolution.
pub const NAME: &str = "name";

/// Empty parameter list for the constructors.
pub const NO_PARAMS: [(&str, &str); 0] = [];

/// Convenience empty tag list.
pub const NO_TAGS: [&str; 0] = [];

/// Immutable, order-independent set of tags and parameters.
#[derive(Clone, Default, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub struct Qualifiers {
    tags: BTreeSet<String>,
    params: BTreeMap<String, String>,
}

impl Qualifiers {
    /// Creates qualifiers from tags and parameters. Fails if a string is used both as a tag and a
    /// parameter key, or a parameter key repeats.
    pub fn new<T, K, V>(
        tags: impl IntoIterator<Item = T>,
        params: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Self, QualifierError>
    where
        T: Into<String>,
        K: Into<String>,
        V: Into<String>,
    {
        let tags: BTreeSet<String> = tags.into_iter().map(Into::into).collect();

        let mut map = BTreeMap::new();
        for (key, value) in params {
            let key = key.into();
            if tags.contains(&key) {
                return Err(QualifierError::TagParameterCollision(key));
            }

            if map.contains_key(&key) {
                return Err(QualifierError::DuplicateParameter(key));
            }

            map.insert(key, value.into());
        }

        Ok(Self { tags, params: map })
    }

    /// Creates qualifiers containing only tags, which can never collide.
    pub fn from_tags<T: Into<String>>(tags: impl IntoIterator<Item = T>) -> Self {
        Self {
            tags: tags.into_iter().map(Into::into).collect(),
            params: Default::default(),
        }
    }

    /// Creates qualifiers for a provider: `{default, any}` when empty, and `any` is always added.
    pub fn for_provider<T, K, V>(
        tags: impl IntoIterator<Item = T>,
        params: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Self, QualifierError>
    where
        T: Into<String>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::new(tags, params)?.into_provider()
    }

    /// Creates qualifiers for an injection point: `{default}` when empty.
    pub fn for_injector<T, K, V>(
        tags: impl IntoIterator<Item = T>,
        params: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Self, QualifierError>
    where
        T: Into<String>,
        K: Into<String>,
        V: Into<String>,
    {
        Ok(Self::new(tags, params)?.into_injector())
    }

    /// Qualifiers of an unqualified provider.
    pub fn provider_default() -> Self {
        Self::from_tags([DEFAULT, ANY])
    }

    /// Qualifiers of an unqualified injection point.
    pub fn injector_default() -> Self {
        Self::from_tags([DEFAULT])
    }

    /// Applies provider defaults to these qualifiers.
    pub fn into_provider(mut self) -> Result<Self, QualifierError> {
        if self.is_empty() {
            self.tags.insert(DEFAULT.to_string());
        }

        if self.params.contains_key(ANY) {
            return Err(QualifierError::TagParameterCollision(ANY.to_string()));
        }

        self.tags.insert(ANY.to_string());
        Ok(self)
    }

    /// Applies injection point defaults to these qualifiers.
    pub fn into_injector(self) -> Self {
        if self.is_empty() {
            Self::injector_default()
        } else {
            self
        }
    }

    /// Checks if every tag and every `key=value` pair of `other` is also present here.
    pub fn is_superset_of(&self, other: &Qualifiers) -> bool {
        self.tags.is_superset(&other.tags)
            && other
                .params
                .iter()
                .all(|(key, value)| self.params.get(key) == Some(value))
    }

    /// Mirror of [Qualifiers::is_superset_of].
    #[inline]
    pub fn is_subset_of(&self, other: &Qualifiers) -> bool {
        other.is_superset_of(self)
    }

    /// Checks if given string is present as a tag or as a parameter key.
    #[inline]
    pub fn contains(&self, qualifier: &str) -> bool {
        self.tags.contains(qualifier) || self.params.contains_key(qualifier)
    }

    /// Returns the value of given parameter. Tags have no value, so asking for one fails too.
    pub fn get(&self, key: &str) -> Result<&str, QualifierError> {
        self.params
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| QualifierError::KeyNotFound(key.to_string()))
    }

    /// Returns the [NAME] parameter, if present.
    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.params.get(NAME).map(String::as_str)
    }

    /// Tags in sorted order.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    /// Parameters sorted by key.
    pub fn params(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty() && self.params.is_empty()
    }
}

impl Display for Qualifiers {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            self.tags
                .iter()
                .cloned()
                .chain(
                    self.params
                        .iter()
                        .map(|(key, value)| format!("{key}={value}"))
                )
                .join(",")
        )
    }
}
