use crate::{errors::ResolveError, handle::DiHandle, types::DependencyInfo};

pub mod arc;

/// Allows custom behaviour on injection
///
/// Implemented for `Arc<T>` (a required service), `Option<R>` (a service
/// which may be missing) and by extension crates for their own wrappers.
pub trait Resolver: Sized + 'static {
    /// Resolve through the handle, under the given registration name
    fn resolve(handle: &mut DiHandle<'_>, name: Option<&str>) -> Result<Self, ResolveError>;

    fn dependency_info() -> DependencyInfo;
}
