use std::{
    any::{Any, TypeId},
    sync::Arc,
};

/// All errors must be shareable across threads
pub type DynError = Box<dyn std::error::Error + Send + Sync>;

/// Anything the container hands out is shared behind an `Arc` and may be
/// resolved from any thread, so it needs to be Send + Sync + 'static.
///
/// Unsized types are allowed, which is how trait objects (`dyn Logger`)
/// become service identities.
pub trait Injectable: Send + Sync + 'static {}
impl<T: ?Sized + Send + Sync + 'static> Injectable for T {}

/// Type erased, shared service instance
///
/// The erased value is always an `Arc<T>` where `T` is the identity the
/// instance was stored under. Cloning an [Instance] clones that `Arc`,
/// so every clone points at the same service.
#[derive(Clone)]
pub struct Instance {
    pub info: TypeInfo,
    value: Arc<dyn Any + Send + Sync + 'static>,
}

impl Instance {
    pub(crate) fn new<T: ?Sized + Injectable>(instance: Arc<T>) -> Self {
        Instance {
            info: TypeInfo::of::<T>(),
            value: Arc::new(instance),
        }
    }

    /// Returns the shared service, or the actual type name on mismatch
    pub fn downcast<T: ?Sized + Injectable>(&self) -> Result<Arc<T>, &'static str> {
        match self.value.downcast_ref::<Arc<T>>() {
            Some(downcasted) => Ok(downcasted.clone()),
            None => Err(self.info.type_name),
        }
    }
}

impl std::fmt::Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Instance").field(&self.info.type_name).finish()
    }
}

/// Information about a declared dependency
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyInfo {
    /// The required Type
    pub type_info: TypeInfo,
    /// Registration name the dependency is looked up under
    pub name: Option<String>,
    /// If it is optional or required
    pub optional: bool,
}

impl DependencyInfo {
    pub fn required<T: ?Sized + 'static>() -> Self {
        DependencyInfo {
            type_info: TypeInfo::of::<T>(),
            name: None,
            optional: false,
        }
    }

    pub fn optional<T: ?Sized + 'static>() -> Self {
        DependencyInfo {
            optional: true,
            ..Self::required::<T>()
        }
    }
}

/// Type Name and Type Id
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct TypeInfo {
    pub type_name: &'static str,
    pub type_id: TypeId,
}
impl std::fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name)
    }
}
impl TypeInfo {
    pub fn of<T: 'static + ?Sized>() -> TypeInfo {
        TypeInfo {
            type_name: std::any::type_name::<T>(),
            type_id: TypeId::of::<T>(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Greeter: Send + Sync {
        fn greet(&self) -> String;
    }
    struct English;
    impl Greeter for English {
        fn greet(&self) -> String {
            "hello".to_string()
        }
    }

    #[test]
    fn instance_keeps_trait_objects_shared() {
        let greeter: Arc<dyn Greeter> = Arc::new(English);
        let instance = Instance::new(greeter.clone());

        let back = instance.downcast::<dyn Greeter>().unwrap();
        assert_eq!(back.greet(), "hello");
        assert!(Arc::ptr_eq(&greeter, &back));
        assert_eq!(instance.info, TypeInfo::of::<dyn Greeter>());
    }

    #[test]
    fn downcast_mismatch_reports_actual_type() {
        let instance = Instance::new(Arc::new(5_u32));
        let err = instance.downcast::<String>().unwrap_err();
        assert_eq!(err, std::any::type_name::<u32>());
    }
}
