//! Classification of matching providers into resolution results. Both the registry and container
//! federation first collect [Candidate]s without invoking any factory, then decide whether the
//! request is satisfied, ambiguous or unsatisfied, and only then create instances.

use crate::component::Component;
use crate::error::ResolutionError;
use crate::instance::{ComponentInstanceAnyPtr, Factory, NamedInstances, ResolveOptions, Resolved};
use indexmap::map::Entry;
use indexmap::IndexMap;
use std::fmt::{Display, Formatter};
use tracing::trace;

/// A provider matching a request, with the name of the container it comes from, if any.
#[derive(Clone)]
pub(crate) struct Candidate {
    pub(crate) component: Component,
    pub(crate) factory: Factory,
    pub(crate) origin: Option<String>,
}

impl Candidate {
    fn instantiate(&self) -> Result<ComponentInstanceAnyPtr, ResolutionError> {
        trace!("Creating instance of {self}.");
        (self.factory)().map_err(|source| ResolutionError::ProviderFailed {
            component: self.to_string(),
            source,
        })
    }
}

impl Display for Candidate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.origin {
            Some(origin) => write!(f, "{} from '{}'", self.component, origin),
            None => write!(f, "{}", self.component),
        }
    }
}

pub(crate) fn resolve_candidates(
    request: &Component,
    options: ResolveOptions,
    candidates: Vec<Candidate>,
) -> Result<Resolved, ResolutionError> {
    match (options.many, options.named) {
        (false, false) => select_one(request, candidates).map(Resolved::Single),
        (true, false) => instantiate_all(candidates).map(Resolved::Many),
        (true, true) => instantiate_named(candidates).map(Resolved::Named),
        (false, true) => Err(ResolutionError::NamedRequiresMany(request.to_string())),
    }
}

pub(crate) fn select_one(
    request: &Component,
    mut candidates: Vec<Candidate>,
) -> Result<ComponentInstanceAnyPtr, ResolutionError> {
    match candidates.len() {
        0 => Err(ResolutionError::UnsatisfiedDependency {
            request: request.to_string(),
        }),
        1 => candidates.remove(0).instantiate(),
        _ => Err(ResolutionError::AmbiguousDependency {
            request: request.to_string(),
            candidates: candidates.iter().map(ToString::to_string).collect(),
        }),
    }
}

pub(crate) fn instantiate_all(
    candidates: Vec<Candidate>,
) -> Result<Vec<ComponentInstanceAnyPtr>, ResolutionError> {
    candidates.iter().map(Candidate::instantiate).collect()
}

/// Instantiates candidates carrying a name, failing before any factory is called if two of them
/// share one.
pub(crate) fn instantiate_named(
    candidates: Vec<Candidate>,
) -> Result<NamedInstances<ComponentInstanceAnyPtr>, ResolutionError> {
    let mut named: IndexMap<String, Candidate> = IndexMap::with_capacity(candidates.len());

    for candidate in candidates {
        let Some(name) = candidate.component.qualifiers().name() else {
            continue;
        };

        match named.entry(name.to_string()) {
            Entry::Occupied(entry) => {
                return Err(ResolutionError::AmbiguousDependency {
                    request: format!("name '{}'", entry.key()),
                    candidates: vec![entry.get().to_string(), candidate.to_string()],
                });
            }
            Entry::Vacant(entry) => {
                entry.insert(candidate);
            }
        }
    }

    named
        .into_iter()
        .map(|(name, candidate)| candidate.instantiate().map(|instance| (name, instance)))
        .collect()
}
