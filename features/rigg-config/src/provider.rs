use std::{any::Any, collections::HashMap, sync::Arc};

use rigg_di::{Container, TypeInfo};

use crate::errors::ConfigError;

/// A provider to register all configs.
///
/// Configs can be registered and retrieved based on type.
#[derive(Default)]
pub struct ConfigProvider {
    configs: HashMap<TypeInfo, Arc<dyn Any + Send + Sync + 'static>>,
}

impl ConfigProvider {
    /// Initializes an empty Config Provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Retrieve a config with specified type.
    ///
    /// Returns `Ok(None)` if no config of this type was added.
    pub fn get_config<T: Send + Sync + 'static>(&self) -> Result<Option<Arc<T>>, ConfigError> {
        let type_info = TypeInfo::of::<T>();

        self.configs
            .get(&type_info)
            .map(|entry| entry.clone().downcast())
            .transpose()
            .map_err(|_| ConfigError::Missing(type_info))
    }

    /// Like [`ConfigProvider::get_config`], but a missing config is an error
    pub fn require_config<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, ConfigError> {
        self.get_config()?
            .ok_or_else(|| ConfigError::Missing(TypeInfo::of::<T>()))
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.configs.contains_key(&TypeInfo::of::<T>())
    }

    /// Add a config to the registry.
    ///
    /// If the config type is already registered, it will return a
    /// [`ConfigError`] runtime error
    pub fn add_config<T: Send + Sync + 'static>(
        &mut self,
        config: T,
    ) -> Result<&mut Self, ConfigError> {
        let type_info = TypeInfo::of::<T>();

        if self.configs.contains_key(&type_info) {
            return Err(ConfigError::AlreadyRegistered(type_info));
        }

        tracing::debug!("Added config {type_info}");
        self.configs.insert(type_info, Arc::new(config));
        Ok(self)
    }

    /// Can optionally add a config to the registry.
    ///
    /// If the config provided is `Some(T)`, it will be the same as calling [`ConfigProvider::add_config`]
    /// If the config provided is `None`, then the function just returns `Ok(self)` for chaining
    pub fn maybe_add_config<T: Send + Sync + 'static>(
        &mut self,
        config: Option<T>,
    ) -> Result<&mut Self, ConfigError> {
        match config {
            Some(c) => self.add_config(c),
            None => Ok(self),
        }
    }

    /// Registers the provider as an instance, making every config
    /// resolvable as [`Config<T>`](crate::config::Config)
    pub fn install(self, container: &Container) {
        tracing::debug!("Installing {} configs", self.configs.len());
        container.register_instance(Arc::new(self));
    }
}
