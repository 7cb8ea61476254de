//! Traits and structs supporting the resolution rules
//!
//! Resolved values are stored as type-erased [Instance]s. Producers are plain functions whose
//! parameters are injected positionally from the declared dependency names.
//!
//! * The [Dependency] trait converts one resolved (or missing) value into a typed parameter.
//!   It is implemented for `Arc<T>` (the dependency is required) and `Option<Arc<T>>`
//!   (a missing dependency is passed as `None`).
//! * The [Injectable] trait is implemented for tuples of [Dependency] and builds the whole
//!   argument list of a producer.
//! * The [Callable] trait is implemented for all functions with up to 10 arguments, using a
//!   tuple to wrap them all in a single type.

use std::any::{type_name, Any};
use std::sync::Arc;
use thiserror::Error;

/// A resolved value, shared and type-erased
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Error type returned by fallible producers
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors triggered while resolving a dependency
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("dependency `{0}` is not registered")]
    NotRegistered(String),
    #[error("dependency `{name}` does not hold a value of type `{expected}`")]
    TypeMismatch {
        name: String,
        expected: &'static str,
    },
    #[error("producer for `{name}` expects {expected} dependencies but {found} were declared")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("producer for `{name}` failed")]
    ProducerFailed {
        name: String,
        #[source]
        source: BoxError,
    },
}

/// Downcast an instance to the requested type
pub(crate) fn downcast<T: Send + Sync + 'static>(
    name: &str,
    instance: Instance,
) -> Result<Arc<T>, ResolveError> {
    instance
        .downcast::<T>()
        .map_err(|_| ResolveError::TypeMismatch {
            name: name.to_owned(),
            expected: type_name::<T>(),
        })
}

/// A single positional parameter of a producer
pub trait Dependency: Sized {
    /// Build the parameter from the value resolved for `name`, which is `None` if nothing
    /// was registered under that name.
    fn from_resolved(name: &str, instance: Option<Instance>) -> Result<Self, ResolveError>;
}

impl<T: Send + Sync + 'static> Dependency for Arc<T> {
    fn from_resolved(name: &str, instance: Option<Instance>) -> Result<Self, ResolveError> {
        match instance {
            Some(instance) => downcast(name, instance),
            None => Err(ResolveError::NotRegistered(name.to_owned())),
        }
    }
}

impl<T: Send + Sync + 'static> Dependency for Option<Arc<T>> {
    fn from_resolved(name: &str, instance: Option<Instance>) -> Result<Self, ResolveError> {
        instance.map(|i| downcast(name, i)).transpose()
    }
}

/// The full argument list of a producer
///
/// This trait is implemented for tuples of [Dependency]
pub trait Injectable: Sized {
    /// Number of positional parameters
    fn arity() -> usize;

    /// Convert the resolved values, in declaration order, into the argument tuple of the
    /// producer registered as `owner`
    fn inject(
        owner: &str,
        names: &[String],
        resolved: Vec<Option<Instance>>,
    ) -> Result<Self, ResolveError>;
}

/// A Callable has a ```call``` function with a single argument and a single return type.
pub trait Callable<Args, Ret> {
    fn call(&self, args: Args) -> Ret;
}

fn next_dependency<'a, D, I>(
    values: &mut I,
    owner: &str,
    expected: usize,
    found: usize,
) -> Result<D, ResolveError>
where
    D: Dependency,
    I: Iterator<Item = (&'a String, Option<Instance>)>,
{
    match values.next() {
        Some((name, instance)) => D::from_resolved(name, instance),
        None => Err(ResolveError::ArityMismatch {
            name: owner.to_owned(),
            expected,
            found,
        }),
    }
}

macro_rules! callable_tuple ({ $($param:ident)* } => {
    impl<Func, Ret, $($param,)*> Callable<($($param,)*), Ret> for Func
    where
        Func: Fn($($param),*) -> Ret,
    {
        #[inline]
        #[allow(non_snake_case)]
        fn call(&self, ($($param,)*): ($($param,)*)) -> Ret {
            (self)($($param,)*)
        }
    }

    #[allow(clippy::unused_unit)]
    impl<$($param: Dependency,)*> Injectable for ($($param,)*) {
        #[inline]
        fn arity() -> usize {
            <[&str]>::len(&[$(stringify!($param)),*])
        }

        #[inline]
        #[allow(unused_mut, unused_variables)]
        fn inject(
            owner: &str,
            names: &[String],
            resolved: Vec<Option<Instance>>,
        ) -> Result<Self, ResolveError> {
            let (expected, found) = (Self::arity(), names.len());
            if found != expected || resolved.len() != expected {
                return Err(ResolveError::ArityMismatch { name: owner.to_owned(), expected, found });
            }
            let mut values = names.iter().zip(resolved);
            Ok(($(next_dependency::<$param, _>(&mut values, owner, expected, found)?,)*))
        }
    }
});

callable_tuple! {}
callable_tuple! { A }
callable_tuple! { A B }
callable_tuple! { A B C }
callable_tuple! { A B C D }
callable_tuple! { A B C D E }
callable_tuple! { A B C D E F }
callable_tuple! { A B C D E F G }
callable_tuple! { A B C D E F G H }
callable_tuple! { A B C D E F G H I }
callable_tuple! { A B C D E F G H I J }
