use std::fmt;

use crate::types::TypeInfo;

/// Address of a registration or cached singleton: a service identity plus an
/// optional name telling apart several registrations of the same identity.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ServiceKey {
    pub type_info: TypeInfo,
    pub name: Option<String>,
}

impl ServiceKey {
    pub fn new(type_info: TypeInfo, name: Option<&str>) -> Self {
        ServiceKey {
            type_info,
            name: name.map(str::to_owned),
        }
    }

    /// Unnamed key for `T`
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::new(TypeInfo::of::<T>(), None)
    }

    /// Named key for `T`
    pub fn named<T: ?Sized + 'static>(name: &str) -> Self {
        Self::new(TypeInfo::of::<T>(), Some(name))
    }

    /// Same name, different identity
    pub(crate) fn with_type(&self, type_info: TypeInfo) -> Self {
        ServiceKey {
            type_info,
            name: self.name.clone(),
        }
    }
}

impl fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} (\"{}\")", self.type_info, name),
            None => write!(f, "{}", self.type_info),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn name_is_part_of_the_key() {
        let mut keys = HashSet::new();
        keys.insert(ServiceKey::of::<String>());
        keys.insert(ServiceKey::named::<String>("primary"));
        keys.insert(ServiceKey::named::<String>("primary"));
        keys.insert(ServiceKey::named::<u8>("primary"));

        assert_eq!(keys.len(), 3);
    }

    #[test]
    fn display_includes_name() {
        assert_eq!(ServiceKey::of::<u8>().to_string(), "u8");
        assert_eq!(ServiceKey::named::<u8>("port").to_string(), "u8 (\"port\")");
    }
}
