use crate::error::Result;
use crate::list::List;
use crate::node::{Direction, NodeRef};

/// An external cursor over a [`List`]
///
/// The cursor borrows nothing: it caches the handle of the node it will
/// yield next and is handed the list on every step. The list may therefore
/// be mutated between steps. Deleting the node the cursor just yielded is
/// fine; deleting the node it is about to yield makes the next step fail
/// with [`ListError::InvalidNode`](crate::ListError::InvalidNode).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    next: Option<NodeRef>,
    direction: Direction,
}

impl Cursor {
    pub(crate) fn new(next: Option<NodeRef>, direction: Direction) -> Self {
        Cursor { next, direction }
    }

    pub(crate) fn reset(&mut self, next: Option<NodeRef>, direction: Direction) {
        self.next = next;
        self.direction = direction;
    }

    /// Returns the direction the cursor walks in
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Returns true once the cursor has walked past the last node
    pub fn is_exhausted(&self) -> bool {
        self.next.is_none()
    }

    /// Yields the current node and steps along the cursor's direction
    ///
    /// Returns `Ok(None)` once exhausted, and keeps doing so until the
    /// cursor is rewound.
    pub fn next<T, K: ?Sized>(&mut self, list: &List<T, K>) -> Result<Option<NodeRef>> {
        let Some(current) = self.next else {
            return Ok(None);
        };

        self.next = match self.direction {
            Direction::Forward => list.next_node(current)?,
            Direction::Backward => list.prev_node(current)?,
        };
        Ok(Some(current))
    }

    /// Like [`Cursor::next`], but yields the stored value
    pub fn next_value<'a, T, K: ?Sized>(&mut self, list: &'a List<T, K>) -> Result<Option<&'a T>> {
        match self.next(list)? {
            Some(node) => list.value(node).map(Some),
            None => Ok(None),
        }
    }
}
