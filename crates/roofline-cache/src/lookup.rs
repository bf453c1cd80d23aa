use std::sync::Arc;

/// Outcome of reading one record.
///
/// Keeps "there is nothing" (`NotRequested`, `NotFound`) apart from "the
/// read failed" (`Failed`), so a UI can offer a retry only when a retry can
/// help.
#[derive(Debug, PartialEq)]
pub enum Lookup<T> {
    /// No read was issued (nobody loaded yet, or no foreign key to follow).
    NotRequested,
    Found(Arc<T>),
    /// The read succeeded and returned no row.
    NotFound,
    /// The read failed; the message is the store error.
    Failed(String),
}

impl<T> Lookup<T> {
    #[must_use]
    pub const fn found(&self) -> Option<&Arc<T>> {
        match self {
            Self::Found(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}

impl<T> Clone for Lookup<T> {
    fn clone(&self) -> Self {
        match self {
            Self::NotRequested => Self::NotRequested,
            Self::Found(value) => Self::Found(Arc::clone(value)),
            Self::NotFound => Self::NotFound,
            Self::Failed(message) => Self::Failed(message.clone()),
        }
    }
}

impl<T> Default for Lookup<T> {
    fn default() -> Self {
        Self::NotRequested
    }
}
