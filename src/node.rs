use std::fmt;

/// A node in the doubly linked list
///
/// Links are slot indices into the owning list's storage, so a node never
/// holds a pointer to its neighbours.
#[derive(Debug)]
pub(crate) struct Node<T> {
    pub(crate) value: T,
    pub(crate) prev: Option<u32>,
    pub(crate) next: Option<u32>,
}

impl<T> Node<T> {
    pub(crate) fn new(value: T) -> Self {
        Node {
            value,
            prev: None,
            next: None,
        }
    }
}

/// A storage slot. `generation` is bumped every time the slot is vacated,
/// which invalidates every [`NodeRef`] handed out for the previous occupant.
#[derive(Debug)]
pub(crate) struct Slot<T> {
    pub(crate) generation: u32,
    pub(crate) node: Option<Node<T>>,
}

/// Handle to a node owned by a [`List`](crate::List)
///
/// Handles are cheap to copy and stay valid until the node is deleted.
/// Using a handle on a list that does not own it is reported as
/// [`ListError::InvalidNode`](crate::ListError::InvalidNode).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef {
    pub(crate) list: u64,
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}#{}", self.list, self.index, self.generation)
    }
}

/// Traversal order of a [`Cursor`](crate::Cursor)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    /// Start at the head and follow `next` links
    #[default]
    Forward,
    /// Start at the tail and follow `prev` links
    Backward,
}
