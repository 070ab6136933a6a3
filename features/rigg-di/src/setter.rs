use std::collections::HashSet;

use crate::{
    errors::InjectError,
    handle::DiHandle,
    resolver::Resolver,
    types::{DependencyInfo, DynError, TypeInfo},
};

/// A type with post-construction injection points
pub trait SetterInjectable: Sized + 'static {
    fn injection_points() -> Vec<InjectionPoint<Self>>;
}

type ApplyFn<T> = Box<dyn Fn(&mut T, &mut DiHandle<'_>, Option<&str>) -> Result<(), InjectError>>;

/// A setter taking exactly one resolved dependency
pub struct InjectionPoint<T> {
    pub name: &'static str,
    pub dependency: DependencyInfo,
    apply: ApplyFn<T>,
}

impl<T: 'static> InjectionPoint<T> {
    /// An infallible setter
    pub fn new<R, F>(name: &'static str, setter: F) -> Self
    where
        R: Resolver,
        F: Fn(&mut T, R) + 'static,
    {
        Self::fallible(name, move |target: &mut T, value: R| {
            setter(target, value);
            Ok(())
        })
    }

    /// A setter which may reject the value
    pub fn fallible<R, F>(name: &'static str, setter: F) -> Self
    where
        R: Resolver,
        F: Fn(&mut T, R) -> Result<(), DynError> + 'static,
    {
        let apply: ApplyFn<T> = Box::new(
            move |target: &mut T, handle: &mut DiHandle<'_>, service_name: Option<&str>| {
                let value = R::resolve(handle, service_name)?;
                setter(target, value).map_err(InjectError::Setter)
            },
        );

        InjectionPoint {
            name,
            dependency: R::dependency_info(),
            apply,
        }
    }

    /// Resolve the dependency under a registration name
    pub fn named(mut self, service_name: impl Into<String>) -> Self {
        self.dependency.name = Some(service_name.into());
        self
    }
}

/// Best effort pass over all injection points of `instance`
///
/// Returns how many points were filled. Failing points are logged and skipped.
pub(crate) fn inject<T: SetterInjectable>(
    handle: &mut DiHandle<'_>,
    instance: &mut T,
    skipped: &HashSet<String>,
) -> usize {
    let target = TypeInfo::of::<T>();
    let mut injected = 0;

    for point in T::injection_points() {
        if skipped.contains(point.name) {
            tracing::trace!("Injection point '{}' of {target} is denylisted", point.name);
            continue;
        }

        match (point.apply)(instance, handle, point.dependency.name.as_deref()) {
            Ok(()) => injected += 1,
            Err(error) => {
                tracing::warn!(
                    "Skipping injection point '{}' of {target}: {error}",
                    point.name
                );
            }
        }
    }

    tracing::debug!("Injected {injected} dependencies into {target}");
    injected
}
