use std::sync::Arc;

use crate::{
    config::ContainerConfig,
    container::Container,
    dependency_graph::DependencyGraphErrors,
    key::ServiceKey,
    mapping::TypeMapping,
    registry::Registration,
    types::{Injectable, Instance, TypeInfo},
};

/// Collects registrations, instances and type mappings, then builds a
/// [Container] from them.
///
/// Unless disabled in the [ContainerConfig], `build` checks the dependency
/// graph first, so missing dependencies and cycles fail at startup instead
/// of at first resolution.
pub struct ContainerBuilder {
    config: ContainerConfig,
    /// Registered factories and constructors
    registrations: Vec<Registration>,
    /// Registered already created instances
    instances: Vec<(ServiceKey, Instance)>,
    mappings: Vec<(TypeInfo, TypeMapping)>,
}
impl Default for ContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerBuilder {
    pub fn new() -> Self {
        Self::with_config(ContainerConfig::default())
    }

    pub fn with_config(config: ContainerConfig) -> Self {
        ContainerBuilder {
            config,
            registrations: Vec::new(),
            instances: Vec::new(),
            mappings: Vec::new(),
        }
    }
}
impl ContainerBuilder {
    pub fn add_registration(mut self, registration: Registration) -> Self {
        self.registrations.push(registration);
        self
    }

    pub fn add_instance<T: ?Sized + Injectable>(mut self, instance: Arc<T>) -> Self {
        self.instances
            .push((ServiceKey::of::<T>(), Instance::new(instance)));
        self
    }

    pub fn add_named_instance<T: ?Sized + Injectable>(
        mut self,
        name: &str,
        instance: Arc<T>,
    ) -> Self {
        self.instances
            .push((ServiceKey::named::<T>(name), Instance::new(instance)));
        self
    }

    pub fn add_type_mapping<A, C, F>(mut self, upcast: F) -> Self
    where
        A: ?Sized + Injectable,
        C: ?Sized + Injectable,
        F: Fn(Arc<C>) -> Arc<A> + Send + Sync + 'static,
    {
        self.mappings
            .push((TypeInfo::of::<A>(), TypeMapping::new(upcast)));
        self
    }

    pub fn build(self) -> Result<Container, DependencyGraphErrors> {
        let ContainerBuilder {
            config,
            registrations,
            instances,
            mappings,
        } = self;

        tracing::debug!(
            "Building container with {} registrations, {} instances and {} type mappings",
            registrations.len(),
            instances.len(),
            mappings.len()
        );

        let container = Container::with_config(config);
        for registration in registrations {
            container.register(registration);
        }
        for (abstract_type, mapping) in mappings {
            container.insert_type_mapping(abstract_type, mapping);
        }
        // Last, so an instance shadows a registration of the same key
        for (key, instance) in instances {
            if container.registrations().contains(&key) {
                tracing::warn!("Instance of {key} shadows its registration");
            }
            container.insert_instance(key, instance);
        }

        if container.config().validate_on_build {
            container.validate()?;
        }

        Ok(container)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependency_graph::DependencyGraphError;

    struct Clock;
    struct Scheduler;

    #[test]
    fn build_validates_the_graph() {
        let result = ContainerBuilder::new()
            .add_registration(
                Registration::factory(|_| Ok(Arc::new(Scheduler))).depends_on::<Arc<Clock>>(),
            )
            .build();

        let errors = result.err().unwrap().errors;
        assert!(matches!(
            errors[0],
            DependencyGraphError::MissingDependency { .. }
        ));
    }

    #[test]
    fn validation_can_be_disabled() {
        let container = ContainerBuilder::with_config(ContainerConfig::new().validate_on_build(false))
            .add_registration(
                Registration::factory(|_| Ok(Arc::new(Scheduler))).depends_on::<Arc<Clock>>(),
            )
            .build()
            .unwrap();

        assert!(container.resolve::<Scheduler>().is_ok());
    }

    #[test]
    fn instances_satisfy_dependencies() {
        let container = ContainerBuilder::new()
            .add_instance(Arc::new(Clock))
            .add_named_instance("backup", Arc::new(Clock))
            .add_registration(
                Registration::factory(|di| {
                    di.resolve::<Arc<Clock>>()?;
                    Ok(Arc::new(Scheduler))
                })
                .depends_on::<Arc<Clock>>(),
            )
            .build()
            .unwrap();

        assert!(container.resolve::<Scheduler>().is_ok());
        assert!(!Arc::ptr_eq(
            &container.resolve::<Clock>().unwrap(),
            &container.resolve_named::<Clock>("backup").unwrap()
        ));
    }

    #[test]
    fn instance_shadows_registration_of_same_key() {
        let clock = Arc::new(Clock);
        let container = ContainerBuilder::new()
            .add_instance(clock.clone())
            .add_registration(Registration::factory(|_| Ok(Arc::new(Clock))))
            .build()
            .unwrap();

        assert!(Arc::ptr_eq(&clock, &container.resolve::<Clock>().unwrap()));
    }
}
