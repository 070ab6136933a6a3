use std::sync::Arc;

use thiserror::Error;

use crate::{
    key::ServiceKey,
    types::{DynError, TypeInfo},
};

/// Errors when trying to resolve a service
#[derive(Error, Debug, Clone)]
pub enum ResolveError {
    /// Neither a cached instance nor a registration exists for the key
    #[error("No service is registered for '{0}'")]
    NotRegistered(ServiceKey),

    /// A required constructor parameter could not be satisfied
    #[error("Cannot build '{target}': parameter '{parameter}' could not be resolved")]
    UnresolvableParameter {
        parameter: &'static str,
        target: TypeInfo,
        #[source]
        source: Box<ResolveError>,
    },

    /// The key is already being built further up the resolution path
    #[error("Circular dependency detected: {}", display_chain(.chain))]
    CyclicDependency { chain: Vec<ServiceKey> },

    /// A factory or constructor returned an error
    #[error("Factory for '{product}' failed - error: {error}")]
    FactoryFailed {
        product: ServiceKey,
        error: Arc<DynError>,
    },

    #[error("Failed to downcast, required: '{required_type}' actual: '{actual_type}'")]
    DowncastFailed {
        required_type: &'static str,
        actual_type: &'static str,
    },

    /// A constructor read an argument it never declared, or with another type
    #[error("'{target}' read argument '{parameter}' which was not declared with that type")]
    MissingArgument {
        parameter: &'static str,
        target: TypeInfo,
    },

    /// Error raised by a custom [Resolver](crate::resolver::Resolver)
    #[error("Error during resolution: {0}")]
    Other(Arc<DynError>),
}

fn display_chain(chain: &[ServiceKey]) -> String {
    chain
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}

impl ResolveError {
    pub fn other(error: impl Into<DynError>) -> Self {
        Self::Other(Arc::new(error.into()))
    }

    /// True for cycles, including ones nested in parameter errors
    pub fn is_cyclic(&self) -> bool {
        match self {
            ResolveError::CyclicDependency { .. } => true,
            ResolveError::UnresolvableParameter { source, .. } => source.is_cyclic(),
            _ => false,
        }
    }
}

/// Errors on a single setter injection point
///
/// These never leave [Container::inject](crate::container::Container::inject),
/// they are only logged.
#[derive(Error, Debug)]
pub enum InjectError {
    /// The dependency of the injection point could not be resolved
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    /// The setter itself failed
    #[error("Setter failed: {0}")]
    Setter(DynError),
}
