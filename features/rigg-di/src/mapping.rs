use std::{collections::HashMap, sync::Arc};

use parking_lot::RwLock;

use crate::{
    errors::ResolveError,
    types::{Injectable, Instance, TypeInfo},
};

type UpcastFn = Arc<dyn Fn(&Instance) -> Result<Instance, ResolveError> + Send + Sync>;

/// Redirection from an abstract identity to a concrete one
#[derive(Clone)]
pub(crate) struct TypeMapping {
    pub concrete: TypeInfo,
    upcast: UpcastFn,
}

impl TypeMapping {
    pub fn new<A, C, F>(upcast: F) -> Self
    where
        A: ?Sized + Injectable,
        C: ?Sized + Injectable,
        F: Fn(Arc<C>) -> Arc<A> + Send + Sync + 'static,
    {
        let upcast: UpcastFn = Arc::new(move |instance: &Instance| {
            let concrete = instance
                .downcast::<C>()
                .map_err(|actual_type| ResolveError::DowncastFailed {
                    required_type: std::any::type_name::<C>(),
                    actual_type,
                })?;
            Ok(Instance::new::<A>(upcast(concrete)))
        });

        TypeMapping {
            concrete: TypeInfo::of::<C>(),
            upcast,
        }
    }

    /// Turns an instance of the concrete identity into the abstract one
    pub fn apply(&self, instance: &Instance) -> Result<Instance, ResolveError> {
        (self.upcast)(instance)
    }
}

/// Abstract identity -> concrete identity, consulted once per resolution
#[derive(Default)]
pub(crate) struct TypeMappingTable {
    mappings: RwLock<HashMap<TypeInfo, TypeMapping>>,
}

impl TypeMappingTable {
    /// Records a mapping, returning the concrete identity it replaced
    pub fn insert(&self, abstract_type: TypeInfo, mapping: TypeMapping) -> Option<TypeInfo> {
        self.mappings
            .write()
            .insert(abstract_type, mapping)
            .map(|replaced| replaced.concrete)
    }

    pub fn get(&self, abstract_type: &TypeInfo) -> Option<TypeMapping> {
        self.mappings.read().get(abstract_type).cloned()
    }

    pub fn snapshot(&self) -> Vec<(TypeInfo, TypeInfo)> {
        self.mappings
            .read()
            .iter()
            .map(|(abstract_type, mapping)| (*abstract_type, mapping.concrete))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Store: Send + Sync {
        fn kind(&self) -> &'static str;
    }
    struct MemoryStore;
    impl Store for MemoryStore {
        fn kind(&self) -> &'static str {
            "memory"
        }
    }

    #[test]
    fn mapping_upcasts_concrete_instances() {
        let mapping = TypeMapping::new::<dyn Store, MemoryStore, _>(|store| store as Arc<dyn Store>);
        assert_eq!(mapping.concrete, TypeInfo::of::<MemoryStore>());

        let concrete = Arc::new(MemoryStore);
        let upcasted = mapping.apply(&Instance::new(concrete)).unwrap();

        assert_eq!(upcasted.info, TypeInfo::of::<dyn Store>());
        assert_eq!(upcasted.downcast::<dyn Store>().unwrap().kind(), "memory");
    }

    #[test]
    fn mapping_rejects_foreign_instances() {
        let mapping = TypeMapping::new::<dyn Store, MemoryStore, _>(|store| store as Arc<dyn Store>);
        let result = mapping.apply(&Instance::new(Arc::new(1_u8)));

        assert!(matches!(result, Err(ResolveError::DowncastFailed { .. })));
    }

    #[test]
    fn later_mapping_replaces_earlier() {
        let table = TypeMappingTable::default();
        let abstract_type = TypeInfo::of::<dyn Store>();

        assert_eq!(
            table.insert(
                abstract_type,
                TypeMapping::new::<dyn Store, MemoryStore, _>(|store| store as Arc<dyn Store>)
            ),
            None
        );
        assert_eq!(
            table.insert(
                abstract_type,
                TypeMapping::new::<dyn Store, MemoryStore, _>(|store| store as Arc<dyn Store>)
            ),
            Some(TypeInfo::of::<MemoryStore>())
        );
        assert_eq!(table.snapshot().len(), 1);
    }
}
