//! Constructor injection
//!
//! A [Constructable] type declares its constructor parameters as an explicit
//! list of [Parameter]s. The injector resolves them in declaration order,
//! collects the results into [Arguments] and hands those to
//! [Constructable::construct].
//!
//! ```
//! # use std::sync::Arc;
//! # use rigg_di::{Arguments, Constructable, Container, DynError, Parameter, Registration};
//! struct Clock;
//!
//! struct Scheduler {
//!     clock: Arc<Clock>,
//!     workers: usize,
//! }
//!
//! impl Constructable for Scheduler {
//!     fn parameters() -> Vec<Parameter> {
//!         vec![
//!             Parameter::required::<Arc<Clock>>("clock"),
//!             Parameter::with_default::<Arc<usize>>("workers").named("workers"),
//!         ]
//!     }
//!
//!     fn construct(args: &mut Arguments) -> Result<Self, DynError> {
//!         Ok(Scheduler {
//!             clock: args.take("clock")?,
//!             workers: args.take_optional::<Arc<usize>>("workers")?.map_or(4, |n| *n),
//!         })
//!     }
//! }
//!
//! let container = Container::new();
//! container
//!     .register_instance(Arc::new(Clock))
//!     .register(Registration::constructor::<Scheduler>());
//!
//! let scheduler = container.resolve::<Scheduler>().unwrap();
//! assert_eq!(scheduler.workers, 4);
//! ```

use std::{
    any::Any,
    collections::{HashMap, HashSet},
    sync::Arc,
};

use crate::{
    errors::ResolveError,
    handle::DiHandle,
    resolver::Resolver,
    types::{DependencyInfo, DynError, Injectable, Instance, TypeInfo},
};

/// A type the container can build by itself
pub trait Constructable: Injectable + Sized {
    /// Constructor parameters, in the order they are resolved
    fn parameters() -> Vec<Parameter>;

    /// Builds the instance from the resolved parameters
    fn construct(args: &mut Arguments) -> Result<Self, DynError>;
}

type ResolveFn = fn(&mut DiHandle<'_>, Option<&str>) -> Result<Box<dyn Any>, ResolveError>;

/// A declared constructor parameter
pub struct Parameter {
    pub name: &'static str,
    pub dependency: DependencyInfo,
    has_default: bool,
    resolve: ResolveFn,
}

impl Parameter {
    /// A parameter which must be resolvable
    pub fn required<R: Resolver>(name: &'static str) -> Self {
        Parameter {
            name,
            dependency: R::dependency_info(),
            has_default: false,
            resolve: resolve_erased::<R>,
        }
    }

    /// A parameter the constructor has a default for
    ///
    /// If it cannot be resolved it is left out of the [Arguments].
    pub fn with_default<R: Resolver>(name: &'static str) -> Self {
        let mut parameter = Self::required::<R>(name);
        parameter.has_default = true;
        parameter.dependency.optional = true;
        parameter
    }

    /// Resolve the dependency under a registration name
    pub fn named(mut self, service_name: impl Into<String>) -> Self {
        self.dependency.name = Some(service_name.into());
        self
    }

    pub fn has_default(&self) -> bool {
        self.has_default
    }
}

impl std::fmt::Debug for Parameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parameter")
            .field("name", &self.name)
            .field("dependency", &self.dependency)
            .field("has_default", &self.has_default)
            .finish()
    }
}

fn resolve_erased<R: Resolver>(
    handle: &mut DiHandle<'_>,
    name: Option<&str>,
) -> Result<Box<dyn Any>, ResolveError> {
    R::resolve(handle, name).map(|resolved| Box::new(resolved) as Box<dyn Any>)
}

/// Resolved constructor arguments, by parameter name
pub struct Arguments {
    target: TypeInfo,
    declared: HashSet<&'static str>,
    values: HashMap<&'static str, Box<dyn Any>>,
}

impl Arguments {
    fn new(target: TypeInfo) -> Self {
        Arguments {
            target,
            declared: HashSet::new(),
            values: HashMap::new(),
        }
    }

    /// The type being constructed
    pub fn target(&self) -> TypeInfo {
        self.target
    }

    /// Takes a resolved argument
    pub fn take<R: Resolver>(&mut self, parameter: &'static str) -> Result<R, ResolveError> {
        self.take_optional(parameter)?
            .ok_or(ResolveError::MissingArgument {
                parameter,
                target: self.target,
            })
    }

    /// Takes an argument which may have been skipped in favour of its default
    pub fn take_optional<R: Resolver>(
        &mut self,
        parameter: &'static str,
    ) -> Result<Option<R>, ResolveError> {
        let missing = ResolveError::MissingArgument {
            parameter,
            target: self.target,
        };

        if !self.declared.contains(parameter) {
            return Err(missing);
        }

        match self.values.remove(parameter) {
            None => Ok(None),
            Some(value) => value.downcast::<R>().map(|value| Some(*value)).map_err(|_| missing),
        }
    }

    /// Returns the names of the parameters that were resolved and not yet taken
    pub fn remaining(&self) -> Vec<&'static str> {
        let mut remaining: Vec<_> = self.values.keys().copied().collect();
        remaining.sort_unstable();
        remaining
    }
}

/// Resolves the parameters of `T` and constructs it
pub(crate) fn construct<T: Constructable>(handle: &mut DiHandle<'_>) -> Result<T, ResolveError> {
    let target = TypeInfo::of::<T>();
    let mut arguments = Arguments::new(target);

    for parameter in T::parameters() {
        arguments.declared.insert(parameter.name);

        match (parameter.resolve)(handle, parameter.dependency.name.as_deref()) {
            Ok(value) => {
                arguments.values.insert(parameter.name, value);
            }
            // A cycle is a wiring error, defaults don't hide it
            Err(error) if error.is_cyclic() => return Err(error),
            Err(error) if parameter.has_default => {
                tracing::debug!(
                    "Parameter '{}' of {target} not resolved, using its default: {error}",
                    parameter.name
                );
            }
            Err(error) => {
                return Err(ResolveError::UnresolvableParameter {
                    parameter: parameter.name,
                    target,
                    source: Box::new(error),
                })
            }
        }
    }

    T::construct(&mut arguments).map_err(|error| match error.downcast::<ResolveError>() {
        Ok(resolve_error) => *resolve_error,
        Err(error) => ResolveError::FactoryFailed {
            product: handle.building_key(target),
            error: Arc::new(error),
        },
    })
}

/// Erased constructor used by constructor registrations
pub(crate) fn build<T: Constructable>(handle: &mut DiHandle<'_>) -> Result<Instance, ResolveError> {
    construct::<T>(handle).map(|instance| Instance::new(Arc::new(instance)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{container::Container, registry::Registration};

    struct Engine;

    struct Car {
        engine: Arc<Engine>,
        spare: Option<Arc<Engine>>,
        seats: u8,
    }

    impl Constructable for Car {
        fn parameters() -> Vec<Parameter> {
            vec![
                Parameter::required::<Arc<Engine>>("engine"),
                Parameter::required::<Option<Arc<Engine>>>("spare").named("spare"),
                Parameter::with_default::<Arc<u8>>("seats"),
            ]
        }

        fn construct(args: &mut Arguments) -> Result<Self, DynError> {
            Ok(Car {
                engine: args.take("engine")?,
                spare: args.take("spare")?,
                seats: args.take_optional::<Arc<u8>>("seats")?.map_or(5, |seats| *seats),
            })
        }
    }

    #[test]
    fn parameters_resolved_in_order_with_defaults() {
        let container = Container::new();
        container.register_instance(Arc::new(Engine));

        let car = container.build::<Car>().unwrap();
        assert!(car.spare.is_none());
        assert_eq!(car.seats, 5);

        container.register_instance(Arc::new(2_u8));
        let car = container.build::<Car>().unwrap();
        assert_eq!(car.seats, 2);
        assert!(Arc::ptr_eq(&car.engine, &container.resolve::<Engine>().unwrap()));
    }

    #[test]
    fn missing_required_parameter_is_named() {
        let container = Container::new();
        container.register(Registration::constructor::<Car>());

        let err = container.resolve::<Car>().err().unwrap();
        match err {
            ResolveError::UnresolvableParameter {
                parameter,
                target,
                source,
            } => {
                assert_eq!(parameter, "engine");
                assert_eq!(target, TypeInfo::of::<Car>());
                assert!(matches!(*source, ResolveError::NotRegistered(_)));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    struct Sloppy;

    impl Constructable for Sloppy {
        fn parameters() -> Vec<Parameter> {
            vec![Parameter::required::<Arc<Engine>>("engine")]
        }

        fn construct(args: &mut Arguments) -> Result<Self, DynError> {
            let _: Arc<Engine> = args.take("motor")?;
            Ok(Sloppy)
        }
    }

    #[test]
    fn undeclared_argument_is_reported() {
        let container = Container::new();
        container.register_instance(Arc::new(Engine));

        let err = container.build::<Sloppy>().err().unwrap();
        assert!(matches!(
            err,
            ResolveError::MissingArgument {
                parameter: "motor",
                ..
            }
        ));
    }

    #[test]
    fn arguments_downcast_checks_type() {
        let mut arguments = Arguments::new(TypeInfo::of::<Car>());
        arguments.declared.insert("engine");
        arguments
            .values
            .insert("engine", Box::new(Arc::new(Engine)) as Box<dyn Any>);
        assert_eq!(arguments.remaining(), vec!["engine"]);

        let wrong = arguments.take::<Arc<u8>>("engine");
        assert!(matches!(wrong, Err(ResolveError::MissingArgument { .. })));
        assert!(arguments.remaining().is_empty());
    }
}
