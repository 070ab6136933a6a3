//! Rigg DI is a runtime dependency injection container.
//!
//! Services are addressed by a [ServiceKey]: the type they are requested as
//! (which may be a trait object) plus an optional name. A key is backed by
//! either a [Registration] (a factory closure or a [Constructable] type, with
//! a [Lifecycle]) or by an instance registered up front.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use rigg_di::{Container, Registration};
//!
//! trait Logger: Send + Sync {
//!     fn log(&self, line: &str);
//! }
//!
//! struct StdoutLogger;
//! impl Logger for StdoutLogger {
//!     fn log(&self, line: &str) {
//!         println!("{line}");
//!     }
//! }
//!
//! struct Connection;
//!
//! let container = Container::new();
//! container
//!     .register(Registration::factory(|_| Ok(Arc::new(StdoutLogger))))
//!     .register_type_mapping::<dyn Logger, StdoutLogger, _>(|logger| logger as Arc<dyn Logger>)
//!     .register(Registration::factory(|_| Ok(Arc::new(Connection))).transient());
//!
//! // Singletons are shared
//! let a = container.resolve::<dyn Logger>().unwrap();
//! let b = container.resolve::<dyn Logger>().unwrap();
//! assert!(Arc::ptr_eq(&a, &b));
//!
//! // Transients are built on every resolution
//! let first = container.resolve::<Connection>().unwrap();
//! let second = container.resolve::<Connection>().unwrap();
//! assert!(!Arc::ptr_eq(&first, &second));
//! ```
//!
//! Rigg DI consists of the following components:
//!
//! 1. Registry, type mappings and singleton cache - the three stores behind a [Container]
//! 2. [DiHandle] and [Resolver] - resolution, with cycle detection
//! 3. [Constructable] - constructor injection from declared [Parameter]s
//! 4. [SetterInjectable] - best effort injection into existing instances
//! 5. [ContainerBuilder] and [DependencyGraph] - startup validation of the wiring

pub mod builder;
mod cache;
pub mod config;
pub mod constructor;
pub mod container;
pub mod dependency_graph;
pub mod errors;
pub mod handle;
pub mod key;
mod mapping;
pub mod registry;
pub mod resolver;
pub mod setter;
pub mod types;

pub use builder::ContainerBuilder;
pub use config::ContainerConfig;
pub use constructor::{Arguments, Constructable, Parameter};
pub use container::{global, Container};
pub use dependency_graph::{DependencyGraph, DependencyGraphError, DependencyGraphErrors};
pub use errors::{InjectError, ResolveError};
pub use handle::DiHandle;
pub use key::ServiceKey;
pub use registry::{Lifecycle, Registration};
pub use resolver::Resolver;
pub use setter::{InjectionPoint, SetterInjectable};
pub use types::{DependencyInfo, DynError, Injectable, Instance, TypeInfo};
