use std::{fmt::Debug, sync::Arc};

use once_cell::sync::Lazy;

use crate::{
    cache::SingletonCache,
    config::ContainerConfig,
    constructor::{self, Constructable},
    dependency_graph::{DependencyGraph, DependencyGraphErrors},
    errors::ResolveError,
    handle::DiHandle,
    key::ServiceKey,
    mapping::{TypeMapping, TypeMappingTable},
    registry::{Registration, RegistrationStore},
    resolver::Resolver,
    setter::{self, SetterInjectable},
    types::{Injectable, Instance, TypeInfo},
};

static GLOBAL: Lazy<Container> = Lazy::new(Container::new);

/// Process wide container, for glue code which cannot be handed one
///
/// Prefer creating a [Container] and passing it down.
pub fn global() -> &'static Container {
    &GLOBAL
}

/// Registry of services, their type mappings and their singletons
///
/// Cloning is cheap, all clones share the same state.
#[derive(Clone)]
pub struct Container(Arc<ContainerInner>);
struct ContainerInner {
    config: ContainerConfig,
    registrations: RegistrationStore,
    mappings: TypeMappingTable,
    singletons: SingletonCache,
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut services: Vec<(ServiceKey, String)> = self
            .registrations()
            .snapshot()
            .into_iter()
            .map(|(key, service)| {
                let state = if self.singletons().contains(&key) {
                    "singleton (built)".to_string()
                } else {
                    format!("{:?}", service.lifecycle).to_lowercase()
                };
                (key, state)
            })
            .collect();

        for key in self.singletons().keys() {
            if !self.registrations().contains(&key) {
                services.push((key, "instance".to_string()));
            }
        }
        services.sort();

        let mut map = f.debug_struct("Container");
        for (key, state) in &services {
            map.field(&key.to_string(), state);
        }
        map.finish()
    }
}

impl Container {
    pub fn new() -> Self {
        Self::with_config(ContainerConfig::default())
    }

    pub fn with_config(config: ContainerConfig) -> Self {
        Self(Arc::new(ContainerInner {
            config,
            registrations: RegistrationStore::default(),
            mappings: TypeMappingTable::default(),
            singletons: SingletonCache::default(),
        }))
    }

    pub fn config(&self) -> &ContainerConfig {
        &self.0.config
    }

    /// Stores a registration, replacing any earlier one under the same key.
    ///
    /// A singleton already built for the key is dropped from the cache, so
    /// the next resolution uses the new registration. A build of the old
    /// registration still in progress does not end up in the cache.
    pub fn register(&self, registration: Registration) -> &Self {
        let key = registration.key().clone();
        let lifecycle = registration.service.lifecycle;

        if self.registrations().insert(registration) {
            tracing::debug!("Replaced registration for {key} ({lifecycle:?})");
        } else {
            tracing::debug!("Registered {key} ({lifecycle:?})");
        }

        if self.singletons().remove(&key).is_some() {
            tracing::debug!("Dropped cached singleton of {key}");
        }
        self
    }

    /// Registers an already constructed service as a singleton
    ///
    /// `T` is the identity it is stored under, so a trait object can be
    /// registered by passing `Arc<dyn Trait>`.
    pub fn register_instance<T: ?Sized + Injectable>(&self, instance: Arc<T>) -> &Self {
        self.insert_instance(ServiceKey::of::<T>(), Instance::new(instance));
        self
    }

    pub fn register_named_instance<T: ?Sized + Injectable>(
        &self,
        name: &str,
        instance: Arc<T>,
    ) -> &Self {
        self.insert_instance(ServiceKey::named::<T>(name), Instance::new(instance));
        self
    }

    pub(crate) fn insert_instance(&self, key: ServiceKey, instance: Instance) {
        if self.singletons().insert(key.clone(), instance).is_some() {
            tracing::debug!("Replaced instance of {key}");
        } else {
            tracing::debug!("Registered instance of {key}");
        }
    }

    /// Redirects resolution of `A` to the registration of `C`
    ///
    /// `upcast` converts the concrete service into the abstract one, usually
    /// a plain coercion: `|c| c as Arc<dyn Trait>`.
    pub fn register_type_mapping<A, C, F>(&self, upcast: F) -> &Self
    where
        A: ?Sized + Injectable,
        C: ?Sized + Injectable,
        F: Fn(Arc<C>) -> Arc<A> + Send + Sync + 'static,
    {
        self.insert_type_mapping(TypeInfo::of::<A>(), TypeMapping::new(upcast));
        self
    }

    pub(crate) fn insert_type_mapping(&self, abstract_type: TypeInfo, mapping: TypeMapping) {
        let concrete = mapping.concrete;
        match self.mappings().insert(abstract_type, mapping) {
            Some(replaced) => tracing::debug!(
                "Remapped {abstract_type} to {concrete} (was {replaced})"
            ),
            None => tracing::debug!("Mapped {abstract_type} to {concrete}"),
        }
    }

    /// Resolves the unnamed registration of `T`
    pub fn resolve<T: ?Sized + Injectable>(&self) -> Result<Arc<T>, ResolveError> {
        self.resolve_with::<Arc<T>>(None)
    }

    pub fn resolve_named<T: ?Sized + Injectable>(
        &self,
        name: &str,
    ) -> Result<Arc<T>, ResolveError> {
        self.resolve_with::<Arc<T>>(Some(name))
    }

    /// Resolves any [Resolver], e.g. `Option<Arc<T>>`
    pub fn resolve_with<R: Resolver>(&self, name: Option<&str>) -> Result<R, ResolveError> {
        R::resolve(&mut self.handle(), name)
    }

    /// Builds a new, unregistered `T` through constructor injection
    pub fn build<T: Constructable>(&self) -> Result<T, ResolveError> {
        constructor::construct::<T>(&mut self.handle())
    }

    /// Fills the injection points of an existing instance, best effort.
    ///
    /// Never fails: points whose dependency cannot be resolved, or whose
    /// setter errors, are logged and left alone.
    pub fn inject<'a, T: SetterInjectable>(&self, instance: &'a mut T) -> &'a mut T {
        setter::inject(
            &mut self.handle(),
            instance,
            &self.config().skipped_injection_points,
        );
        instance
    }

    /// Whether resolving `T` under `name` would find an instance or registration
    pub fn contains<T: ?Sized + 'static>(&self, name: Option<&str>) -> bool {
        let type_info = TypeInfo::of::<T>();
        let type_info = self
            .mappings()
            .get(&type_info)
            .map_or(type_info, |mapping| mapping.concrete);
        let key = ServiceKey::new(type_info, name);

        self.singletons().contains(&key) || self.registrations().contains(&key)
    }

    /// Snapshot of the declared dependency graph
    pub fn graph(&self) -> DependencyGraph {
        DependencyGraph::new(self)
    }

    /// Checks for missing dependencies and cycles without building anything
    pub fn validate(&self) -> Result<(), DependencyGraphErrors> {
        self.graph().check()
    }

    fn handle(&self) -> DiHandle<'_> {
        DiHandle::new(self)
    }

    pub(crate) fn registrations(&self) -> &RegistrationStore {
        &self.0.registrations
    }

    pub(crate) fn mappings(&self) -> &TypeMappingTable {
        &self.0.mappings
    }

    pub(crate) fn singletons(&self) -> &SingletonCache {
        &self.0.singletons
    }
}
