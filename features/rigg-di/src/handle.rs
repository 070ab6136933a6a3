use std::sync::Arc;

use crate::{
    container::Container,
    errors::ResolveError,
    key::ServiceKey,
    registry::{Lifecycle, RegisteredService},
    resolver::Resolver,
    types::{Instance, TypeInfo},
};

/// DI Handle for resolving dependencies while a service is being built.
///
/// Factories and constructors receive a handle instead of the bare
/// [Container]: it carries the resolution path, which is how circular
/// dependencies are detected before they recurse.
pub struct DiHandle<'c> {
    container: &'c Container,
    path: Vec<ServiceKey>,
}

impl<'c> DiHandle<'c> {
    pub(crate) fn new(container: &'c Container) -> Self {
        DiHandle {
            container,
            path: Vec::new(),
        }
    }

    /// The container this handle resolves from
    pub fn container(&self) -> &'c Container {
        self.container
    }

    /// Keys currently being built, outermost first
    pub fn path(&self) -> &[ServiceKey] {
        &self.path
    }

    pub fn resolve<R: Resolver>(&mut self) -> Result<R, ResolveError> {
        R::resolve(self, None)
    }

    pub fn resolve_named<R: Resolver>(&mut self, name: &str) -> Result<R, ResolveError> {
        R::resolve(self, Some(name))
    }

    /// Resolves the identity, following a type mapping if one is registered.
    ///
    /// Mappings are followed for a single hop only: the concrete identity is
    /// looked up directly, even if it is mapped itself.
    pub fn resolve_instance(
        &mut self,
        type_info: TypeInfo,
        name: Option<&str>,
    ) -> Result<Instance, ResolveError> {
        let requested = ServiceKey::new(type_info, name);

        match self.container.mappings().get(&type_info) {
            Some(mapping) => {
                let concrete = requested.with_type(mapping.concrete);
                tracing::trace!("Resolving {requested} through mapping to {concrete}");
                let instance = self.resolve_key(&concrete)?;
                mapping.apply(&instance)
            }
            None => self.resolve_key(&requested),
        }
    }

    fn resolve_key(&mut self, key: &ServiceKey) -> Result<Instance, ResolveError> {
        let container = self.container;

        if let Some(instance) = container.singletons().get(key) {
            tracing::trace!("Using cached instance of {key}");
            return Ok(instance);
        }

        // Must happen before waiting on the singleton slot this thread may be filling
        if self.path.contains(key) {
            let mut chain = self.path.clone();
            chain.push(key.clone());
            return Err(ResolveError::CyclicDependency { chain });
        }

        let service = self.registration(key)?;
        match service.lifecycle {
            Lifecycle::Singleton => container.singletons().get_or_create(key, || {
                // The registration may have been replaced while the slot was acquired
                let service = self.registration(key)?;
                self.build(key, &service)
            }),
            Lifecycle::Transient => self.build(key, &service),
        }
    }

    fn registration(&self, key: &ServiceKey) -> Result<Arc<RegisteredService>, ResolveError> {
        self.container.registrations().get(key).ok_or_else(|| {
            tracing::debug!("Tried to resolve an unregistered service: {key}");
            ResolveError::NotRegistered(key.clone())
        })
    }

    fn build(
        &mut self,
        key: &ServiceKey,
        service: &Arc<RegisteredService>,
    ) -> Result<Instance, ResolveError> {
        self.path.push(key.clone());
        let result = service.construction.build(self);
        self.path.pop();

        if result.is_ok() {
            tracing::debug!("Constructed {:?} instance of {key}", service.lifecycle);
        }
        result
    }

    /// The key currently being built, used to label factory errors
    pub(crate) fn building_key(&self, fallback: TypeInfo) -> ServiceKey {
        self.path
            .last()
            .cloned()
            .unwrap_or_else(|| ServiceKey::new(fallback, None))
    }
}
