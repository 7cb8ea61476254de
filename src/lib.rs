//! Name-based dependency injection registry.
//!
//! # Simple use case
//!
//! ```
//! # use std::sync::Arc;
//! # use wirebox::*;
//! struct Config {
//!     max: u32,
//! }
//!
//! struct Database {
//!     pool_size: u32,
//! }
//!
//! impl Database {
//!     fn connect(config: Arc<Config>) -> Self {
//!         Database { pool_size: config.max }
//!     }
//! }
//!
//! # fn main() -> Result<(), ResolveError> {
//! let registry = Registry::new();
//!
//! // dependencies are declared by name, registration order does not matter
//! registry.singleton("db", Database::connect, &["config"]);
//! registry.factory("double", |cfg: Arc<Config>| cfg.max * 2, &["config"]);
//! registry.literal("config", Config { max: 5 });
//!
//! let double: Arc<u32> = registry.require("double")?;
//! assert_eq!(*double, 10);
//!
//! let db: Arc<Database> = registry.require("db")?;
//! assert_eq!(db.pool_size, 5);
//! assert!(Arc::ptr_eq(&db, &registry.require("db")?));
//!
//! // unknown names are not an error for `get`
//! assert!(registry.get::<Database>("cache")?.is_none());
//! # Ok(())
//! # }
//! ```
//!
//! # Mechanism
//!
//! Each name is associated with a descriptor holding the construction strategy ([Kind]) and the
//! ordered list of dependency names. Resolution is performed on request, not at registration:
//!
//! * [Kind::Literal] values are returned as they were registered.
//! * Other kinds first resolve their dependencies, depth-first and in declaration order, and
//!   pass them positionally to the producer.
//! * [Kind::Class] and [Kind::Factory] call the producer on every request.
//! * [Kind::Singleton] calls the producer on the first successful request only and caches the result.
//!
//! Producer parameters are `Arc<T>` for required dependencies or `Option<Arc<T>>` for optional
//! ones (see [Dependency]). Cyclic dependencies are not detected and overflow the stack.

mod descriptor;
mod registry;
mod resolve;

pub use descriptor::Kind;
pub use registry::Registry;
pub use resolve::{BoxError, Callable, Dependency, Injectable, Instance, ResolveError};
