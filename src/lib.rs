//! # ferrous-injector
//!
//! Graph-building dependency injection with cycle detection and lazily
//! memoized, thread-safe suppliers.
//!
//! ## Features
//!
//! - **Explicit constructors**: closures of up to ten parameters, registered per key
//! - **Graph expansion**: a key's whole dependency graph is bound on first demand
//! - **Cycle detection**: direct cycles fail with the offending path
//! - **Deferred dependencies**: `Deferred<T>` parameters break cycles
//! - **Shared reads**: bound keys resolve under a read lock, readers never block each other
//! - **Lifecycle hooks**: post-construct callbacks and modules configured on first use
//!
//! ## Quick Start
//!
//! ```rust
//! use ferrous_injector::{ConstructorCollection, Resolver};
//! use std::sync::Arc;
//!
//! struct Database {
//!     connection_string: String,
//! }
//!
//! struct UserService {
//!     db: Arc<Database>,
//! }
//!
//! let mut services = ConstructorCollection::new();
//! services.add_singleton::<Database, _, _>(|| Database {
//!     connection_string: "postgres://localhost".to_string(),
//! });
//! services.add_transient::<UserService, _, _>(|db: Arc<Database>| UserService { db });
//!
//! let injector = services.build();
//! let user_service = injector.get_required::<UserService>();
//! assert_eq!(user_service.db.connection_string, "postgres://localhost");
//! ```
//!
//! ## Lifetimes
//!
//! - **Transient**: constructed on every resolution
//! - **Singleton**: constructed once, on first resolution
//! - **Eager singleton**: constructed once, as soon as it is bound
//!
//! ## Circular Dependencies
//!
//! ```rust
//! use ferrous_injector::{ConstructorCollection, Deferred, InjectError, Resolver};
//! use std::sync::Arc;
//!
//! struct Left { right: Arc<Right> }
//! struct Right { left: Arc<Left> }
//!
//! let mut services = ConstructorCollection::new();
//! services.add_transient::<Left, _, _>(|right: Arc<Right>| Left { right });
//! services.add_transient::<Right, _, _>(|left: Arc<Left>| Right { left });
//!
//! let injector = services.build();
//! assert!(matches!(injector.get::<Left>(), Err(InjectError::CycleDetected(_))));
//! ```
//!
//! Replacing either edge with a [`Deferred`] parameter makes the graph
//! resolvable; see [`Deferred`] for an example.
//!
//! ## Modules
//!
//! Declarative [`Binding`]s are grouped in [`Module`]s and applied with
//! [`Injector::configure`].

// Module declarations
pub mod adapter;
pub mod binding;
pub mod collection;
pub mod config;
pub mod deferred;
pub mod error;
pub mod executable;
pub mod inject;
pub mod injector;
pub mod key;
pub mod lifetime;
pub mod module;
pub mod observer;
pub mod supplier;
pub mod traits;

// Internal modules
mod graph;
mod registration;
mod store;

// Re-export core types
pub use adapter::{DefaultAdapter, InvocationAdapter, DEFAULT_MAX_ARITY};
pub use binding::{Binding, BindingTarget, Bindings};
pub use collection::ConstructorCollection;
pub use config::InjectorOptions;
pub use deferred::Deferred;
pub use error::{InjectError, InjectResult};
pub use executable::{AnyArc, AnySupplier, Args, Constructor, Executable};
pub use inject::{Inject, Qualified, Qualifier};
pub use injector::Injector;
pub use key::{key_of_type, Key};
pub use lifetime::Lifetime;
pub use module::{Module, ModuleRef};
pub use observer::{BuildObserver, TracingObserver};
pub use supplier::{Supplier, TypedSupplier};
pub use traits::{Resolver, ResolverCore};
