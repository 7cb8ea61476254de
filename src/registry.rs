use std::any::type_name;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use crate::descriptor::{producer, try_producer, Descriptor, Entry, Kind};
use crate::resolve::{downcast, BoxError, Callable, Injectable, Instance, ResolveError};

/// Dependency injection registry.
///
/// Producers are registered under a name together with the names of their dependencies.
/// Resolving a name first resolves these dependencies (recursively, in declaration order)
/// and passes them positionally to the producer.
///
/// Registration and resolution only need a shared reference: a registry can be wrapped in an
/// [Arc] and used from several threads.
#[derive(Default)]
pub struct Registry {
    storage: RwLock<HashMap<String, Arc<Descriptor>>>,
}

impl Registry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&self, descriptor: Descriptor) {
        let kind = descriptor.kind();
        let name = descriptor.name().to_owned();
        let previous = self
            .storage
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.clone(), Arc::new(descriptor));

        match previous {
            Some(old) => tracing::debug!(%name, ?kind, previous = ?old.kind(), "replaced dependency"),
            None => tracing::debug!(%name, ?kind, "registered dependency"),
        }
    }

    fn descriptor(&self, name: &str) -> Option<Arc<Descriptor>> {
        self.storage
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Register a type that gets a new instance for each request
    pub fn class<T, Args, F>(&self, name: impl Into<String>, constructor: F, deps: &[&str])
    where
        T: Send + Sync + 'static,
        Args: Injectable + 'static,
        F: Callable<Args, T> + Send + Sync + 'static,
    {
        let name = name.into();
        let entry = Entry::Class(producer(&name, constructor));
        self.insert(Descriptor::new(name, deps, entry));
    }

    /// Register a type with a fallible constructor that gets a new instance for each request
    pub fn try_class<T, E, Args, F>(&self, name: impl Into<String>, constructor: F, deps: &[&str])
    where
        T: Send + Sync + 'static,
        E: Into<BoxError> + 'static,
        Args: Injectable + 'static,
        F: Callable<Args, Result<T, E>> + Send + Sync + 'static,
    {
        let name = name.into();
        let entry = Entry::Class(try_producer(&name, constructor));
        self.insert(Descriptor::new(name, deps, entry));
    }

    /// Register a type that has at most one instance.
    ///
    /// The instance is constructed lazily on the first request.
    pub fn singleton<T, Args, F>(&self, name: impl Into<String>, constructor: F, deps: &[&str])
    where
        T: Send + Sync + 'static,
        Args: Injectable + 'static,
        F: Callable<Args, T> + Send + Sync + 'static,
    {
        let name = name.into();
        let entry = Entry::Singleton {
            producer: producer(&name, constructor),
            instance: Default::default(),
        };
        self.insert(Descriptor::new(name, deps, entry));
    }

    /// Register a singleton with a fallible constructor.
    ///
    /// A failed construction is not cached: the next request tries again.
    pub fn try_singleton<T, E, Args, F>(
        &self,
        name: impl Into<String>,
        constructor: F,
        deps: &[&str],
    ) where
        T: Send + Sync + 'static,
        E: Into<BoxError> + 'static,
        Args: Injectable + 'static,
        F: Callable<Args, Result<T, E>> + Send + Sync + 'static,
    {
        let name = name.into();
        let entry = Entry::Singleton {
            producer: try_producer(&name, constructor),
            instance: Default::default(),
        };
        self.insert(Descriptor::new(name, deps, entry));
    }

    /// Register a factory function, called for each request
    pub fn factory<T, Args, F>(&self, name: impl Into<String>, factory: F, deps: &[&str])
    where
        T: Send + Sync + 'static,
        Args: Injectable + 'static,
        F: Callable<Args, T> + Send + Sync + 'static,
    {
        let name = name.into();
        let entry = Entry::Factory(producer(&name, factory));
        self.insert(Descriptor::new(name, deps, entry));
    }

    /// Register a fallible factory function, called for each request
    pub fn try_factory<T, E, Args, F>(&self, name: impl Into<String>, factory: F, deps: &[&str])
    where
        T: Send + Sync + 'static,
        E: Into<BoxError> + 'static,
        Args: Injectable + 'static,
        F: Callable<Args, Result<T, E>> + Send + Sync + 'static,
    {
        let name = name.into();
        let entry = Entry::Factory(try_producer(&name, factory));
        self.insert(Descriptor::new(name, deps, entry));
    }

    /// Register a value, returned as-is on each request
    pub fn literal<T: Send + Sync + 'static>(&self, name: impl Into<String>, value: T) {
        self.literal_shared(name, Arc::new(value));
    }

    /// Register a shared value, each request returns a clone of the same [Arc]
    pub fn literal_shared<T: Send + Sync + 'static>(&self, name: impl Into<String>, value: Arc<T>) {
        let entry = Entry::Literal(value);
        self.insert(Descriptor::new(name.into(), &[], entry));
    }

    /// Resolve a dependency without knowing its type.
    ///
    /// Returns `Ok(None)` if nothing is registered under this name.
    pub fn get_instance(&self, name: &str) -> Result<Option<Instance>, ResolveError> {
        let Some(descriptor) = self.descriptor(name) else {
            tracing::debug!(%name, "no dependency registered");
            return Ok(None);
        };
        tracing::trace!(%name, kind = ?descriptor.kind(), deps = ?descriptor.deps(), "resolving");
        descriptor.produce(self).map(Some)
    }

    /// Resolve a dependency.
    ///
    /// Returns `Ok(None)` if nothing is registered under this name, and an error if the
    /// registered value does not have the requested type or could not be produced.
    pub fn get<T: Send + Sync + 'static>(&self, name: &str) -> Result<Option<Arc<T>>, ResolveError> {
        self.get_instance(name)?
            .map(|instance| downcast(name, instance))
            .transpose()
    }

    /// Resolve a dependency that must be registered
    pub fn require<T: Send + Sync + 'static>(&self, name: &str) -> Result<Arc<T>, ResolveError> {
        self.get(name)?
            .ok_or_else(|| ResolveError::NotRegistered(name.to_owned()))
    }

    /// Call a function after injecting its parameter(s).
    ///
    /// The return value of the function is discarded. A parameter count that does not match
    /// `deps` is reported with the type name of the function.
    pub fn resolve<Args, R, F>(&self, f: F, deps: &[&str]) -> Result<(), ResolveError>
    where
        Args: Injectable,
        F: Callable<Args, R>,
    {
        let names: Vec<String> = deps.iter().map(|d| (*d).to_owned()).collect();
        let resolved = self.get_all(&names)?;
        f.call(Args::inject(type_name::<F>(), &names, resolved)?);
        Ok(())
    }

    /// Resolve a list of dependencies in order
    pub(crate) fn get_all(&self, names: &[String]) -> Result<Vec<Option<Instance>>, ResolveError> {
        names.iter().map(|name| self.get_instance(name)).collect()
    }

    /// Check whether a dependency is registered under this name
    pub fn contains(&self, name: &str) -> bool {
        self.storage
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Construction strategy of a registered dependency
    pub fn kind(&self, name: &str) -> Option<Kind> {
        self.descriptor(name).map(|d| d.kind())
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .storage
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Number of registered dependencies
    pub fn len(&self) -> usize {
        self.storage
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Check whether no dependency is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let storage = self.storage.read().unwrap_or_else(PoisonError::into_inner);
        let mut descriptors: Vec<&Arc<Descriptor>> = storage.values().collect();
        descriptors.sort_by(|a, b| a.name().cmp(b.name()));
        f.debug_struct("Registry")
            .field("descriptors", &descriptors)
            .finish()
    }
}
