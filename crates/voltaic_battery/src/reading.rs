//! Values that are either available now or once acquisition settles.

use futures::FutureExt;
use futures::future::BoxFuture;

/// A battery reading.
///
/// Once the battery handle is cached (or known to be unavailable) every
/// reading is `Ready`; only reads issued while acquisition is in flight are
/// `Pending`. Either way, `.await` yields the value.
pub enum Reading<T> {
    /// The value, computed synchronously.
    Ready(T),
    /// Resolves to the value when acquisition settles.
    Pending(BoxFuture<'static, T>),
}

impl<T> Reading<T> {
    /// Whether the value is available without awaiting.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Reading::Ready(_))
    }

    /// The value, if available without awaiting.
    #[must_use]
    pub fn ready(&self) -> Option<&T> {
        match self {
            Reading::Ready(value) => Some(value),
            Reading::Pending(_) => None,
        }
    }

    /// Takes the value, or hands the reading back if it is still pending.
    pub fn try_into_ready(self) -> Result<T, Self> {
        match self {
            Reading::Ready(value) => Ok(value),
            pending @ Reading::Pending(_) => Err(pending),
        }
    }

    /// Transforms the value, keeping readiness.
    pub fn map<U, F>(self, f: F) -> Reading<U>
    where
        T: Send + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        match self {
            Reading::Ready(value) => Reading::Ready(f(value)),
            Reading::Pending(pending) => Reading::Pending(pending.map(f).boxed()),
        }
    }
}

impl<T: Send + 'static> IntoFuture for Reading<T> {
    type Output = T;
    type IntoFuture = BoxFuture<'static, T>;

    fn into_future(self) -> Self::IntoFuture {
        match self {
            Reading::Ready(value) => futures::future::ready(value).boxed(),
            Reading::Pending(pending) => pending,
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Reading<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Reading::Ready(value) => f.debug_tuple("Ready").field(value).finish(),
            Reading::Pending(_) => f.write_str("Pending"),
        }
    }
}
