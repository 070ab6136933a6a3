use std::{collections::HashMap, fmt, sync::Arc};

use parking_lot::RwLock;

use crate::{
    constructor::{self, Constructable},
    errors::ResolveError,
    handle::DiHandle,
    key::ServiceKey,
    resolver::Resolver,
    types::{DependencyInfo, DynError, Injectable, Instance, TypeInfo},
};

/// How often a registration is constructed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    /// Built once on first resolution and shared afterwards
    #[default]
    Singleton,
    /// Built anew on every resolution
    Transient,
}

/// Erased construction function
pub(crate) type BuildFn =
    Arc<dyn Fn(&mut DiHandle<'_>) -> Result<Instance, ResolveError> + Send + Sync>;

/// Construction strategy of a registration
#[derive(Clone)]
pub(crate) enum Construction {
    /// The identity is a [Constructable] type, built by the constructor injector
    Constructor(BuildFn),
    /// A user supplied factory closure
    Factory(BuildFn),
}

impl Construction {
    pub(crate) fn build(&self, handle: &mut DiHandle<'_>) -> Result<Instance, ResolveError> {
        match self {
            Construction::Constructor(build) | Construction::Factory(build) => build(handle),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Construction::Constructor(_) => "constructor",
            Construction::Factory(_) => "factory",
        }
    }
}

/// A service registration, ready to be handed to
/// [Container::register](crate::container::Container::register)
///
/// ```
/// # use std::sync::Arc;
/// # use rigg_di::{Container, Registration};
/// struct Connection;
///
/// let container = Container::new();
/// container.register(
///     Registration::factory(|_| Ok(Arc::new(Connection)))
///         .named("primary")
///         .transient(),
/// );
/// assert!(container.resolve_named::<Connection>("primary").is_ok());
/// ```
pub struct Registration {
    pub(crate) key: ServiceKey,
    pub(crate) service: RegisteredService,
}

impl Registration {
    /// Register `T` itself; it is built by the constructor injector from its
    /// declared parameters
    pub fn constructor<T: Constructable>() -> Self {
        let dependencies = T::parameters()
            .iter()
            .map(|parameter| parameter.dependency.clone())
            .collect();

        Self::with_construction(
            TypeInfo::of::<T>(),
            Construction::Constructor(Arc::new(constructor::build::<T>)),
            dependencies,
        )
    }

    /// Register a factory closure producing the service
    ///
    /// The factory receives a [DiHandle] and may resolve other services through it.
    pub fn factory<T, F>(factory: F) -> Self
    where
        T: ?Sized + Injectable,
        F: Fn(&mut DiHandle<'_>) -> Result<Arc<T>, DynError> + Send + Sync + 'static,
    {
        let build: BuildFn = Arc::new(move |handle: &mut DiHandle<'_>| match factory(handle) {
            Ok(instance) => Ok(Instance::new(instance)),
            Err(error) => Err(factory_error(
                handle.building_key(TypeInfo::of::<T>()),
                error,
            )),
        });

        Self::with_construction(TypeInfo::of::<T>(), Construction::Factory(build), Vec::new())
    }

    fn with_construction(
        type_info: TypeInfo,
        construction: Construction,
        dependencies: Vec<DependencyInfo>,
    ) -> Self {
        Registration {
            key: ServiceKey::new(type_info, None),
            service: RegisteredService {
                lifecycle: Lifecycle::default(),
                construction,
                dependencies,
            },
        }
    }

    /// Register under a name, next to other registrations of the same identity
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.key.name = Some(name.into());
        self
    }

    pub fn lifecycle(mut self, lifecycle: Lifecycle) -> Self {
        self.service.lifecycle = lifecycle;
        self
    }

    pub fn singleton(self) -> Self {
        self.lifecycle(Lifecycle::Singleton)
    }

    pub fn transient(self) -> Self {
        self.lifecycle(Lifecycle::Transient)
    }

    /// Declare a dependency of a factory, so graph validation can see it
    pub fn depends_on<R: Resolver>(mut self) -> Self {
        self.service.dependencies.push(R::dependency_info());
        self
    }

    pub fn key(&self) -> &ServiceKey {
        &self.key
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("key", &self.key)
            .field("service", &self.service)
            .finish()
    }
}

/// Factory errors keep cycles visible, anything else is wrapped
fn factory_error(product: ServiceKey, error: DynError) -> ResolveError {
    match error.downcast::<ResolveError>() {
        Ok(resolve_error) if resolve_error.is_cyclic() => *resolve_error,
        Ok(resolve_error) => ResolveError::FactoryFailed {
            product,
            error: Arc::new(resolve_error as DynError),
        },
        Err(error) => ResolveError::FactoryFailed {
            product,
            error: Arc::new(error),
        },
    }
}

/// Stored part of a registration
#[derive(Clone)]
pub(crate) struct RegisteredService {
    pub lifecycle: Lifecycle,
    pub construction: Construction,
    pub dependencies: Vec<DependencyInfo>,
}

impl fmt::Debug for RegisteredService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredService")
            .field("lifecycle", &self.lifecycle)
            .field("construction", &self.construction.kind())
            .field("dependencies", &self.dependencies)
            .finish()
    }
}

/// Registrations by key - last write wins
#[derive(Default)]
pub(crate) struct RegistrationStore {
    entries: RwLock<HashMap<ServiceKey, Arc<RegisteredService>>>,
}

impl RegistrationStore {
    /// Stores the registration, returning true if it replaced another one
    pub fn insert(&self, registration: Registration) -> bool {
        let Registration { key, service } = registration;
        self.entries.write().insert(key, Arc::new(service)).is_some()
    }

    pub fn get(&self, key: &ServiceKey) -> Option<Arc<RegisteredService>> {
        self.entries.read().get(key).cloned()
    }

    pub fn contains(&self, key: &ServiceKey) -> bool {
        self.entries.read().contains_key(key)
    }

    pub fn snapshot(&self) -> Vec<(ServiceKey, Arc<RegisteredService>)> {
        self.entries
            .read()
            .iter()
            .map(|(key, service)| (key.clone(), service.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Connection;

    #[test]
    fn registration_defaults_to_unnamed_singleton() {
        let registration = Registration::factory(|_| Ok(Arc::new(Connection)));

        assert_eq!(registration.key(), &ServiceKey::of::<Connection>());
        assert_eq!(registration.service.lifecycle, Lifecycle::Singleton);
        assert!(registration.service.dependencies.is_empty());
    }

    #[test]
    fn store_overwrites_same_key() {
        let store = RegistrationStore::default();

        let first = Registration::factory(|_| Ok(Arc::new(Connection)));
        let second = Registration::factory(|_| Ok(Arc::new(Connection))).transient();
        let named = Registration::factory(|_| Ok(Arc::new(Connection))).named("replica");

        assert!(!store.insert(first));
        assert!(store.insert(second));
        assert!(!store.insert(named));

        let stored = store.get(&ServiceKey::of::<Connection>()).unwrap();
        assert_eq!(stored.lifecycle, Lifecycle::Transient);
        assert!(store.contains(&ServiceKey::named::<Connection>("replica")));
        assert_eq!(store.snapshot().len(), 2);
    }
}
