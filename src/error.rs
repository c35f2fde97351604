use thiserror::Error;

/// Failure of a strict lookup such as [`RobinHoodMap::at`](crate::RobinHoodMap::at).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Error)]
pub enum LookupError {
    #[error("key not found")]
    KeyNotFound,
}
