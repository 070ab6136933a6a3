use rigg_di::TypeInfo;

/// Errors when registering or retrieving a config
#[derive(thiserror::Error, Debug, Clone)]
pub enum ConfigError {
    /// The required config is not known
    #[error("The config type {0} is not known")]
    Missing(TypeInfo),
    /// A config of this type was already added
    #[error("The config type {0} is already registered")]
    AlreadyRegistered(TypeInfo),
}
