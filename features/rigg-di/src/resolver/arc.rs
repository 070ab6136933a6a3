use std::{any::type_name, sync::Arc};

use crate::{
    errors::ResolveError,
    handle::DiHandle,
    resolver::Resolver,
    types::{DependencyInfo, Injectable, TypeInfo},
};

impl<T: ?Sized + Injectable> Resolver for Arc<T> {
    fn resolve(handle: &mut DiHandle<'_>, name: Option<&str>) -> Result<Self, ResolveError> {
        let resolved = handle.resolve_instance(TypeInfo::of::<T>(), name)?;

        resolved
            .downcast::<T>()
            .map_err(|actual_type| ResolveError::DowncastFailed {
                required_type: type_name::<T>(),
                actual_type,
            })
    }

    fn dependency_info() -> DependencyInfo {
        DependencyInfo::required::<T>()
    }
}

impl<Resolvable: Resolver> Resolver for Option<Resolvable> {
    fn resolve(handle: &mut DiHandle<'_>, name: Option<&str>) -> Result<Self, ResolveError> {
        match Resolvable::resolve(handle, name) {
            Ok(resolved) => Ok(Some(resolved)),
            // If the required type is not registered Option does not fail
            Err(ResolveError::NotRegistered(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn dependency_info() -> DependencyInfo {
        let original = Resolvable::dependency_info();
        DependencyInfo {
            optional: true,
            ..original
        }
    }
}
