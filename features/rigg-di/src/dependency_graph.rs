use std::collections::{BTreeMap, HashSet};

use thiserror::Error;

use crate::{
    container::Container,
    key::ServiceKey,
    registry::Lifecycle,
    types::{DependencyInfo, TypeInfo},
};

/// Graph of all declared dependencies of a container
/// Used to check circular dependencies and enables visualization of the wiring
pub struct DependencyGraph {
    map: BTreeMap<ServiceKey, DependencyGraphEntry>,
    mappings: BTreeMap<TypeInfo, TypeInfo>,
}
impl DependencyGraph {
    pub fn new(container: &Container) -> Self {
        let mut graph = Self {
            map: Default::default(),
            mappings: container.mappings().snapshot().into_iter().collect(),
        };

        for (key, service) in container.registrations().snapshot() {
            graph.map.insert(
                key.clone(),
                DependencyGraphEntry {
                    key,
                    provider: Provider::Registration(service.lifecycle),
                    dependencies: service.dependencies.clone(),
                },
            );
        }

        // Instances have no dependencies, a registration under the same key wins
        for key in container.singletons().keys() {
            graph
                .map
                .entry(key.clone())
                .or_insert_with(|| DependencyGraphEntry {
                    key,
                    provider: Provider::Instance,
                    dependencies: Vec::new(),
                });
        }

        graph
    }

    /// All known services
    pub fn keys(&self) -> impl Iterator<Item = &ServiceKey> {
        self.map.keys()
    }

    /// Declared dependencies of a service
    pub fn dependencies_of(&self, key: &ServiceKey) -> Option<&[DependencyInfo]> {
        self.map.get(key).map(|entry| entry.dependencies.as_slice())
    }

    /// The key a dependency is resolved from, after a single mapping hop
    pub fn target_of(&self, dependency: &DependencyInfo) -> ServiceKey {
        let type_info = self
            .mappings
            .get(&dependency.type_info)
            .copied()
            .unwrap_or(dependency.type_info);
        ServiceKey::new(type_info, dependency.name.as_deref())
    }

    /// Validate the graph
    ///
    /// Returns a list of all issues
    pub fn check(&self) -> Result<(), DependencyGraphErrors> {
        let mut checked = HashSet::new();
        let mut errors = Vec::new();
        for entry in self.map.values() {
            let mut dependency_chain = Vec::new();
            check_recurse(
                self,
                &mut checked,
                &mut errors,
                &mut dependency_chain,
                entry,
            );
        }

        if !errors.is_empty() {
            return Err(DependencyGraphErrors { errors });
        }

        return Ok(());

        fn check_recurse<'g>(
            graph: &'g DependencyGraph,
            checked: &mut HashSet<&'g ServiceKey>,
            errors: &mut Vec<DependencyGraphError>,
            dependency_chain: &mut Vec<ServiceKey>,
            entry: &'g DependencyGraphEntry,
        ) {
            // Circular Dependency Check
            if let Some(start) = dependency_chain.iter().position(|key| key == &entry.key) {
                let mut chain = dependency_chain[start..].to_vec();
                chain.push(entry.key.clone()); // Add current so chain is complete

                errors.push(DependencyGraphError::CircularDependency {
                    from: dependency_chain[start].clone(),
                    to: dependency_chain[dependency_chain.len() - 1].clone(),
                    chain,
                });
                return;
            }

            // Skip other checks if already checked
            if !checked.insert(&entry.key) {
                return;
            };

            dependency_chain.push(entry.key.clone());

            for dependency in &entry.dependencies {
                let target = graph.target_of(dependency);
                let Some(next_entry) = graph.map.get(&target) else {
                    if !dependency.optional {
                        errors.push(DependencyGraphError::MissingDependency {
                            dependency: target,
                            required_by: entry.key.clone(),
                        });
                    }

                    continue;
                };

                check_recurse(graph, checked, errors, dependency_chain, next_entry);
            }

            dependency_chain.pop();
        }
    }
}

/// Where the service of an entry comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Registration(Lifecycle),
    Instance,
}

struct DependencyGraphEntry {
    key: ServiceKey,
    provider: Provider,
    dependencies: Vec<DependencyInfo>,
}

impl std::fmt::Display for DependencyGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for entry in self.map.values() {
            match entry.provider {
                Provider::Registration(lifecycle) => {
                    writeln!(f, "{} [{lifecycle:?}]", entry.key)?
                }
                Provider::Instance => writeln!(f, "{} [Instance]", entry.key)?,
            }
            for dependency in &entry.dependencies {
                let marker = if dependency.optional { "?" } else { "" };
                writeln!(f, "  -> {}{marker}", self.target_of(dependency))?;
            }
        }
        Ok(())
    }
}

#[derive(Error, Debug, Clone)]
pub enum DependencyGraphError {
    #[error("'{required_by}' needs '{dependency}' but it is missing")]
    MissingDependency {
        dependency: ServiceKey,
        required_by: ServiceKey,
    },
    #[error("A Circular Dependency exists between '{from}' and '{to}' through {chain:?}")]
    CircularDependency {
        from: ServiceKey,
        to: ServiceKey,
        chain: Vec<ServiceKey>,
    },
}
impl std::fmt::Display for DependencyGraphErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut display = Vec::new();
        display.push("The dependency graph had one or more errors:".to_string());
        for error in &self.errors {
            display.push(format!("- {}", error));
        }
        f.write_str(&display.join("\n"))
    }
}

#[derive(Error, Debug, Clone)]
pub struct DependencyGraphErrors {
    pub errors: Vec<DependencyGraphError>,
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{registry::Registration, types::DynError};

    struct Database;
    struct Repository;
    struct Ping;
    struct Pong;

    fn repository(_: &mut crate::handle::DiHandle<'_>) -> Result<Arc<Repository>, DynError> {
        Ok(Arc::new(Repository))
    }

    #[test]
    fn missing_dependency_is_reported() {
        let container = Container::new();
        container.register(Registration::factory(repository).depends_on::<Arc<Database>>());

        let errors = container.validate().unwrap_err().errors;
        assert_eq!(errors.len(), 1);
        match &errors[0] {
            DependencyGraphError::MissingDependency {
                dependency,
                required_by,
            } => {
                assert_eq!(dependency, &ServiceKey::of::<Database>());
                assert_eq!(required_by, &ServiceKey::of::<Repository>());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn optional_and_instance_dependencies_pass() {
        let container = Container::new();
        container
            .register_instance(Arc::new(Database))
            .register(
                Registration::factory(repository)
                    .depends_on::<Arc<Database>>()
                    .depends_on::<Option<Arc<Ping>>>(),
            );

        assert!(container.validate().is_ok());
        let graph = container.graph();
        assert_eq!(graph.keys().count(), 2);
        assert_eq!(
            graph
                .dependencies_of(&ServiceKey::of::<Repository>())
                .map(<[_]>::len),
            Some(2)
        );
    }

    #[test]
    fn cycles_are_reported_with_chain() {
        let container = Container::new();
        container
            .register(Registration::factory(|_| Ok(Arc::new(Ping))).depends_on::<Arc<Pong>>())
            .register(Registration::factory(|_| Ok(Arc::new(Pong))).depends_on::<Arc<Ping>>());

        let errors = container.validate().unwrap_err().errors;
        let cycle = errors
            .iter()
            .find_map(|error| match error {
                DependencyGraphError::CircularDependency { chain, .. } => Some(chain),
                _ => None,
            })
            .expect("cycle should be reported");

        assert_eq!(cycle.len(), 3);
        assert_eq!(cycle.first(), cycle.last());
    }

    #[test]
    fn dependencies_follow_type_mappings() {
        trait Store: Send + Sync {}
        struct MemoryStore;
        impl Store for MemoryStore {}

        let container = Container::new();
        container
            .register_type_mapping::<dyn Store, MemoryStore, _>(|store| store as Arc<dyn Store>)
            .register(Registration::factory(|_| Ok(Arc::new(MemoryStore))))
            .register(Registration::factory(repository).depends_on::<Arc<dyn Store>>());

        assert!(container.validate().is_ok());
        assert!(container.graph().to_string().contains("MemoryStore"));
    }
}
