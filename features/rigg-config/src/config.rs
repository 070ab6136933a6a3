use std::{ops::Deref, sync::Arc};

use rigg_di::{DependencyInfo, DiHandle, ResolveError, Resolver, ServiceKey};

use crate::provider::ConfigProvider;

/// A wrapper type to allow for config injections
///
/// This provides a simple way to retrieve configs from the config registry,
/// and inject them into a constructor or factory as a dependency.
///
/// # Example
/// ```rust
/// use std::sync::Arc;
/// use rigg_config::{config::Config, provider::ConfigProvider};
/// use rigg_di::{Container, Registration};
///
/// struct ServerConfig {
///     port: u16,
/// }
///
/// struct Server {
///     port: u16,
/// }
///
/// let container = Container::new();
/// let mut provider = ConfigProvider::new();
/// provider.add_config(ServerConfig { port: 8080 }).unwrap();
/// provider.install(&container);
///
/// container.register(Registration::factory(|di| {
///     let config = di.resolve::<Config<ServerConfig>>()?;
///     Ok(Arc::new(Server { port: config.port }))
/// }));
///
/// assert_eq!(container.resolve::<Server>().unwrap().port, 8080);
/// ```
pub struct Config<T> {
    inner: Arc<T>,
}
impl<T> Deref for Config<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
impl<T> Config<T> {
    pub fn inner(&self) -> Arc<T> {
        self.inner.clone()
    }

    pub fn into_inner(self) -> Arc<T> {
        self.inner
    }
}

impl<T: Send + Sync + 'static> Resolver for Config<T> {
    /// Configs are not named, the name is ignored
    fn resolve(handle: &mut DiHandle<'_>, _name: Option<&str>) -> Result<Self, ResolveError> {
        let config_provider = handle.resolve::<Arc<ConfigProvider>>()?;

        let config = config_provider
            .get_config::<T>()
            .map_err(ResolveError::other)?
            .ok_or_else(|| ResolveError::NotRegistered(ServiceKey::of::<Config<T>>()))?;

        Ok(Config { inner: config })
    }

    fn dependency_info() -> DependencyInfo {
        DependencyInfo::required::<ConfigProvider>()
    }
}

#[cfg(test)]
mod tests {
    use rigg_di::Container;

    use super::*;

    struct ServerConfig {
        port: u16,
    }

    #[test]
    fn resolves_installed_config() {
        let container = Container::new();
        let mut provider = ConfigProvider::new();
        provider.add_config(ServerConfig { port: 80 }).unwrap();
        provider.install(&container);

        let config = container
            .resolve_with::<Config<ServerConfig>>(None)
            .unwrap();
        assert_eq!(config.port, 80);
        assert_eq!(config.into_inner().port, 80);
    }

    #[test]
    fn missing_config_is_not_registered() {
        let container = Container::new();
        ConfigProvider::new().install(&container);

        let err = container
            .resolve_with::<Config<ServerConfig>>(None)
            .err()
            .unwrap();
        assert!(matches!(
            err,
            ResolveError::NotRegistered(key) if key == ServiceKey::of::<Config<ServerConfig>>()
        ));
        assert!(container
            .resolve_with::<Option<Config<ServerConfig>>>(None)
            .unwrap()
            .is_none());
    }

    #[test]
    fn missing_provider_is_not_registered() {
        let container = Container::new();
        assert!(matches!(
            container.resolve_with::<Config<ServerConfig>>(None),
            Err(ResolveError::NotRegistered(key)) if key == ServiceKey::of::<ConfigProvider>()
        ));
    }
}
