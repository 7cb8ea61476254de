use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::registry::Registry;
use crate::resolve::{BoxError, Callable, Injectable, Instance, ResolveError};

/// Construction strategy of a registered dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// A new instance is constructed for every request
    Class,
    /// A single instance is constructed on first request and shared afterwards
    Singleton,
    /// The factory function is called for every request
    Factory,
    /// The registered value is returned as-is
    Literal,
}

/// Type-erased producer: receives the declared names and their resolved values in order.
pub(crate) type Producer =
    Arc<dyn Fn(&[String], Vec<Option<Instance>>) -> Result<Instance, ResolveError> + Send + Sync>;

/// Wrap an infallible typed function into a [Producer]
pub(crate) fn producer<T, Args, F>(name: &str, f: F) -> Producer
where
    T: Send + Sync + 'static,
    Args: Injectable + 'static,
    F: Callable<Args, T> + Send + Sync + 'static,
{
    let name = name.to_owned();
    Arc::new(move |names: &[String], resolved: Vec<Option<Instance>>| {
        let args = Args::inject(&name, names, resolved)?;
        Ok(Arc::new(f.call(args)) as Instance)
    })
}

/// Wrap a fallible typed function into a [Producer]
pub(crate) fn try_producer<T, E, Args, F>(name: &str, f: F) -> Producer
where
    T: Send + Sync + 'static,
    E: Into<BoxError> + 'static,
    Args: Injectable + 'static,
    F: Callable<Args, Result<T, E>> + Send + Sync + 'static,
{
    let name = name.to_owned();
    Arc::new(move |names: &[String], resolved: Vec<Option<Instance>>| {
        let args = Args::inject(&name, names, resolved)?;
        match f.call(args) {
            Ok(value) => Ok(Arc::new(value) as Instance),
            Err(err) => Err(ResolveError::ProducerFailed {
                name: name.clone(),
                source: err.into(),
            }),
        }
    })
}

pub(crate) enum Entry {
    Class(Producer),
    Singleton {
        producer: Producer,
        instance: OnceCell<Instance>,
    },
    Factory(Producer),
    Literal(Instance),
}

/// Registration record for one named dependency
pub(crate) struct Descriptor {
    name: String,
    deps: Vec<String>,
    entry: Entry,
}

impl Descriptor {
    pub(crate) fn new(name: String, deps: &[&str], entry: Entry) -> Self {
        let deps = if matches!(entry, Entry::Literal(_)) {
            Vec::new()
        } else {
            deps.iter().map(|d| (*d).to_owned()).collect()
        };
        Self { name, deps, entry }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Names of the dependencies, in the positional order used to call the producer
    pub fn deps(&self) -> &[String] {
        &self.deps
    }

    pub fn kind(&self) -> Kind {
        match self.entry {
            Entry::Class(_) => Kind::Class,
            Entry::Singleton { .. } => Kind::Singleton,
            Entry::Factory(_) => Kind::Factory,
            Entry::Literal(_) => Kind::Literal,
        }
    }

    /// Produce the value of this dependency, resolving its own dependencies through the registry.
    ///
    /// Dependencies are resolved on every call, including for an already constructed singleton.
    pub(crate) fn produce(&self, registry: &Registry) -> Result<Instance, ResolveError> {
        if let Entry::Literal(value) = &self.entry {
            return Ok(Arc::clone(value));
        }

        let resolved = registry.get_all(&self.deps)?;
        match &self.entry {
            Entry::Class(producer) | Entry::Factory(producer) => producer(&self.deps, resolved),
            Entry::Singleton { producer, instance } => instance
                .get_or_try_init(|| {
                    tracing::debug!(name = %self.name, "constructing singleton");
                    producer(&self.deps, resolved)
                })
                .map(Arc::clone),
            Entry::Literal(value) => Ok(Arc::clone(value)),
        }
    }
}

impl fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Descriptor");
        s.field("name", &self.name)
            .field("kind", &self.kind())
            .field("deps", &self.deps);
        if let Entry::Singleton { instance, .. } = &self.entry {
            s.field("constructed", &instance.get().is_some());
        }
        s.finish()
    }
}
