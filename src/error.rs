use thiserror::Error;

/// Errors returned by [`RankMap`](crate::RankMap) operations.
///
/// None of these leave the tree modified.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Error {
    /// No node with this key is in the tree.
    #[error("key {0} not found")]
    NotFound(i64),
    /// An insertion collided with an existing key.
    #[error("key {0} is already present")]
    DuplicateKey(i64),
    /// A select index was outside `1..=len`.
    #[error("index {index} is out of range for a tree of {len} nodes")]
    OutOfRange { index: usize, len: usize },
}

pub type Result<T, E = Error> = core::result::Result<T, E>;
