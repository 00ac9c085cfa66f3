use thiserror::Error;

use crate::node::NodeRef;

/// Result alias used by every fallible list operation
pub type Result<T> = std::result::Result<T, ListError>;

/// Failure reported by a duplicate hook
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct HookError {
    reason: String,
}

impl HookError {
    /// Creates a hook error carrying a human readable reason
    pub fn new(reason: impl Into<String>) -> Self {
        HookError {
            reason: reason.into(),
        }
    }

    /// Returns the reason given by the hook
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListError {
    /// Node storage could not grow. The list is unchanged.
    #[error("allocation failed while growing node storage")]
    Allocation,

    /// Copying the value at `position` failed. The partial copy has been released.
    #[error("duplication aborted at position {position}: {source}")]
    Duplication {
        position: usize,
        #[source]
        source: HookError,
    },

    /// The handle belongs to another list or its node was deleted.
    #[error("node {0} is not owned by this list")]
    InvalidNode(NodeRef),
}
