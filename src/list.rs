use std::alloc::{Layout, handle_alloc_error};
use std::fmt;
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use log::{debug, trace, warn};

use crate::cursor::Cursor;
use crate::error::{HookError, ListError, Result};
use crate::hooks::{DuplicateFn, Hooks, MatchFn, ReleaseFn};
use crate::node::{Direction, Node, NodeRef, Slot};

static NEXT_LIST_ID: AtomicU64 = AtomicU64::new(1);

/// A doubly linked list over slot storage
///
/// Nodes live in a slab owned by the list and link to each other by slot
/// index. Handles ([`NodeRef`]) carry the owning list's id and the slot
/// generation, so a handle from another list or to a deleted node is
/// rejected instead of dereferenced.
///
/// Values are handed to the release hook (if any) when the list deletes
/// them: on [`List::delete`], [`List::clear`] and when the list is dropped.
/// Operations that return a value to the caller (`pop_*`, `remove`,
/// `into_iter`) never invoke it.
///
/// `K` is the key type taken by [`List::search_key`] and the match hook.
/// It defaults to the stored type.
pub struct List<T, K: ?Sized = T> {
    id: u64,
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    head: Option<u32>,
    tail: Option<u32>,
    length: usize,
    hooks: Hooks<T, K>,
}

impl<T> List<T> {
    /// Creates a new empty doubly linked list with no hooks installed
    pub fn new() -> Self {
        Self::with_hooks(Hooks::new())
    }

    /// Creates a new empty list with room for `capacity` nodes
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        let mut list = Self::new();
        list.reserve(capacity)?;
        Ok(list)
    }
}

impl<T, K: ?Sized> List<T, K> {
    /// Creates a new empty list using the given hooks
    pub fn with_hooks(hooks: Hooks<T, K>) -> Self {
        List {
            id: NEXT_LIST_ID.fetch_add(1, Ordering::Relaxed),
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            length: 0,
            hooks,
        }
    }

    /// Reserves room for at least `additional` more nodes
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        let vacant = self.free.len();
        let fresh = additional.saturating_sub(vacant);
        if fresh == 0 {
            return Ok(());
        }

        let total = self.slots.len().saturating_add(fresh);
        if total > u32::MAX as usize {
            warn!("list {}: node storage is limited to {} slots", self.id, u32::MAX);
            return Err(ListError::Allocation);
        }

        let result = self
            .slots
            .try_reserve(fresh)
            .and_then(|_| self.free.try_reserve(total - vacant));
        result.map_err(|err| {
            warn!("list {}: failed to reserve {} nodes: {}", self.id, fresh, err);
            ListError::Allocation
        })
    }

    /// Returns the length of the list
    pub fn len(&self) -> usize {
        self.length
    }

    /// Returns true if the list is empty
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns the head node, or `None` if the list is empty
    pub fn first(&self) -> Option<NodeRef> {
        self.head.map(|index| self.handle(index))
    }

    /// Returns the tail node, or `None` if the list is empty
    pub fn last(&self) -> Option<NodeRef> {
        self.tail.map(|index| self.handle(index))
    }

    // ========================================================================
    // Hooks
    // ========================================================================

    /// Returns the installed hooks
    pub fn hooks(&self) -> &Hooks<T, K> {
        &self.hooks
    }

    /// Replaces all three hooks at once
    pub fn set_hooks(&mut self, hooks: Hooks<T, K>) {
        self.hooks = hooks;
    }

    /// Installs the hook used to copy values in [`List::duplicate`]
    pub fn set_duplicate(&mut self, f: impl Fn(&T) -> std::result::Result<T, HookError> + 'static) {
        self.hooks.duplicate = Some(Rc::new(f));
    }

    /// Installs the hook that receives deleted values, including those already stored
    pub fn set_release(&mut self, f: impl Fn(T) + 'static) {
        self.hooks.release = Some(Rc::new(f));
    }

    /// Installs the hook used by [`List::search_key`]
    pub fn set_match(&mut self, f: impl Fn(&T, &K) -> bool + 'static) {
        self.hooks.matches = Some(Rc::new(f));
    }

    /// Removes the duplicate hook; copies fall back to `Clone`
    pub fn clear_duplicate(&mut self) {
        self.hooks.duplicate = None;
    }

    /// Removes the release hook; deleted values are simply dropped
    pub fn clear_release(&mut self) {
        self.hooks.release = None;
    }

    /// Removes the match hook; searches fall back to `PartialEq`
    pub fn clear_match(&mut self) {
        self.hooks.matches = None;
    }

    /// Returns the duplicate hook, if installed
    pub fn duplicate_hook(&self) -> Option<&DuplicateFn<T>> {
        self.hooks.duplicate.as_ref()
    }

    /// Returns the release hook, if installed
    pub fn release_hook(&self) -> Option<&ReleaseFn<T>> {
        self.hooks.release.as_ref()
    }

    /// Returns the match hook, if installed
    pub fn match_hook(&self) -> Option<&MatchFn<T, K>> {
        self.hooks.matches.as_ref()
    }

    // ========================================================================
    // Node access
    // ========================================================================

    /// Returns true if `node` is a live node of this list
    pub fn contains(&self, node: NodeRef) -> bool {
        self.resolve(node).is_ok()
    }

    /// Returns a reference to the value stored in `node`
    pub fn value(&self, node: NodeRef) -> Result<&T> {
        let index = self.resolve(node)?;
        Ok(&self.node(index).value)
    }

    /// Returns a mutable reference to the value stored in `node`
    pub fn value_mut(&mut self, node: NodeRef) -> Result<&mut T> {
        let index = self.resolve(node)?;
        Ok(&mut self.node_mut(index).value)
    }

    /// Returns the node following `node`, or `None` if `node` is the tail
    pub fn next_node(&self, node: NodeRef) -> Result<Option<NodeRef>> {
        let index = self.resolve(node)?;
        Ok(self.node(index).next.map(|next| self.handle(next)))
    }

    /// Returns the node preceding `node`, or `None` if `node` is the head
    pub fn prev_node(&self, node: NodeRef) -> Result<Option<NodeRef>> {
        let index = self.resolve(node)?;
        Ok(self.node(index).prev.map(|prev| self.handle(prev)))
    }

    // ========================================================================
    // Insertion
    // ========================================================================

    /// Adds an element to the front of the list
    /// Returns a handle to the newly inserted node
    pub fn push_front(&mut self, value: T) -> Result<NodeRef> {
        let index = self.alloc(value)?;
        self.link_front(index);
        Ok(self.handle(index))
    }

    /// Adds an element to the back of the list
    /// Returns a handle to the newly inserted node
    pub fn push_back(&mut self, value: T) -> Result<NodeRef> {
        let index = self.alloc(value)?;
        self.link_back(index);
        Ok(self.handle(index))
    }

    /// Inserts `value` right after `node` when `after` is true, right before it otherwise
    pub fn insert(&mut self, node: NodeRef, value: T, after: bool) -> Result<NodeRef> {
        let anchor = self.resolve(node)?;
        let index = self.alloc(value)?;
        if after {
            self.link_after(anchor, index);
        } else {
            self.link_before(anchor, index);
        }
        Ok(self.handle(index))
    }

    /// Inserts `value` right after `node`
    pub fn insert_after(&mut self, node: NodeRef, value: T) -> Result<NodeRef> {
        self.insert(node, value, true)
    }

    /// Inserts `value` right before `node`
    pub fn insert_before(&mut self, node: NodeRef, value: T) -> Result<NodeRef> {
        self.insert(node, value, false)
    }

    // ========================================================================
    // Deletion
    // ========================================================================

    /// Deletes `node`, handing its value to the release hook
    pub fn delete(&mut self, node: NodeRef) -> Result<()> {
        let value = self.remove(node)?;
        self.hooks.release(value);
        Ok(())
    }

    /// Unlinks `node` and returns its value to the caller
    pub fn remove(&mut self, node: NodeRef) -> Result<T> {
        let index = self.resolve(node)?;
        self.unlink(index);
        Ok(self.dealloc(index))
    }

    /// Removes and returns the element from the front of the list
    pub fn pop_front(&mut self) -> Option<T> {
        let index = self.head?;
        self.unlink(index);
        Some(self.dealloc(index))
    }

    /// Removes and returns the element from the back of the list
    pub fn pop_back(&mut self) -> Option<T> {
        let index = self.tail?;
        self.unlink(index);
        Some(self.dealloc(index))
    }

    /// Deletes every node head to tail, handing each value to the release hook
    pub fn clear(&mut self) {
        while let Some(value) = self.pop_front() {
            self.hooks.release(value);
        }
    }

    /// Tears the list down, releasing every value head to tail
    pub fn release(self) {
        drop(self);
    }

    // ========================================================================
    // Duplication, search, index, rotation
    // ========================================================================

    /// Copies the list, sharing its hooks
    ///
    /// Each value is copied through the duplicate hook, or cloned when no
    /// hook is installed. If a copy fails, the values copied so far are
    /// handed to the release hook and the source list is left untouched.
    pub fn duplicate(&self) -> Result<List<T, K>>
    where
        T: Clone,
    {
        self.duplicate_by(|value| self.hooks.duplicate(value))
    }

    /// Copies the list through the duplicate hook alone
    ///
    /// Works for values that are not `Clone`. Fails at position 0 when the
    /// list is not empty and no duplicate hook is installed.
    pub fn duplicate_with_hook(&self) -> Result<List<T, K>> {
        match &self.hooks.duplicate {
            Some(duplicate) => self.duplicate_by(|value| duplicate(value)),
            None if self.is_empty() => Ok(List::with_hooks(self.hooks.clone())),
            None => Err(ListError::Duplication {
                position: 0,
                source: HookError::new("no duplicate hook installed"),
            }),
        }
    }

    fn duplicate_by(
        &self,
        copy_value: impl Fn(&T) -> std::result::Result<T, HookError>,
    ) -> Result<List<T, K>> {
        let mut copy = List::with_hooks(self.hooks.clone());
        if copy.reserve(self.length).is_err() {
            return Err(ListError::Duplication {
                position: 0,
                source: HookError::new("node allocation failed"),
            });
        }

        for (position, value) in self.iter().enumerate() {
            let duplicated = match copy_value(value) {
                Ok(duplicated) => duplicated,
                Err(source) => {
                    debug!(
                        "list {}: duplicate hook failed at position {} ({}), releasing {} copied values",
                        self.id,
                        position,
                        source.reason(),
                        copy.length
                    );
                    return Err(ListError::Duplication { position, source });
                }
            };

            if copy.push_back(duplicated).is_err() {
                debug!("list {}: allocation failed at position {} while duplicating", self.id, position);
                return Err(ListError::Duplication {
                    position,
                    source: HookError::new("node allocation failed"),
                });
            }
        }

        debug!("list {}: duplicated {} values into list {}", self.id, copy.length, copy.id);
        Ok(copy)
    }

    /// Returns the first node, head to tail, whose value matches `key`
    ///
    /// Uses the match hook when installed, `PartialEq` otherwise. Note that
    /// the fallback compares by value: for `Rc` values two distinct
    /// allocations with equal contents match.
    pub fn search_key(&self, key: &K) -> Option<NodeRef>
    where
        T: PartialEq<K>,
    {
        self.search_by(|value| self.hooks.matches(value, key))
    }

    /// Returns the first node whose value matches `key` under the match hook
    ///
    /// Works for values without `PartialEq`. Returns `None` when no match
    /// hook is installed.
    pub fn search_with_hook(&self, key: &K) -> Option<NodeRef> {
        let matches = self.hooks.matches.as_ref()?;
        self.search_by(|value| matches(value, key))
    }

    /// Returns the first node, head to tail, whose value satisfies `predicate`
    pub fn search_by(&self, mut predicate: impl FnMut(&T) -> bool) -> Option<NodeRef> {
        let mut current = self.head;
        while let Some(index) = current {
            let node = self.node(index);
            if predicate(&node.value) {
                return Some(self.handle(index));
            }
            current = node.next;
        }
        None
    }

    /// Returns the node at `position`
    ///
    /// Non-negative positions count from the head (`0` is the head), negative
    /// positions count from the tail (`-1` is the tail).
    pub fn index(&self, position: isize) -> Option<NodeRef> {
        let (mut current, steps, forward) = if position >= 0 {
            (self.head, position.unsigned_abs(), true)
        } else {
            (self.tail, position.unsigned_abs() - 1, false)
        };

        if steps >= self.length {
            return None;
        }

        for _ in 0..steps {
            let node = self.node(current?);
            current = if forward { node.next } else { node.prev };
        }
        current.map(|index| self.handle(index))
    }

    /// Moves the tail node to the head
    pub fn rotate(&mut self) {
        if self.length < 2 {
            return;
        }
        if let Some(tail) = self.tail {
            self.unlink(tail);
            self.link_front(tail);
            trace!("list {}: rotated tail slot {} to head", self.id, tail);
        }
    }

    // ========================================================================
    // Cursors
    // ========================================================================

    /// Returns a cursor at the head (forward) or tail (backward)
    pub fn cursor(&self, direction: Direction) -> Cursor {
        let start = match direction {
            Direction::Forward => self.first(),
            Direction::Backward => self.last(),
        };
        Cursor::new(start, direction)
    }

    /// Moves `cursor` back to the head, walking forward
    pub fn rewind(&self, cursor: &mut Cursor) {
        cursor.reset(self.first(), Direction::Forward);
    }

    /// Moves `cursor` to the tail, walking backward
    pub fn rewind_tail(&self, cursor: &mut Cursor) {
        cursor.reset(self.last(), Direction::Backward);
    }

    // ========================================================================
    // Slot storage
    // ========================================================================

    fn handle(&self, index: u32) -> NodeRef {
        NodeRef {
            list: self.id,
            index,
            generation: self.slots[index as usize].generation,
        }
    }

    fn resolve(&self, node: NodeRef) -> Result<u32> {
        if node.list != self.id {
            return Err(ListError::InvalidNode(node));
        }
        match self.slots.get(node.index as usize) {
            Some(slot) if slot.generation == node.generation && slot.node.is_some() => {
                Ok(node.index)
            }
            _ => Err(ListError::InvalidNode(node)),
        }
    }

    fn node(&self, index: u32) -> &Node<T> {
        linked(&self.slots, index)
    }

    fn node_mut(&mut self, index: u32) -> &mut Node<T> {
        match &mut self.slots[index as usize].node {
            Some(node) => node,
            None => unreachable!("linked slot {index} is vacant"),
        }
    }

    fn alloc(&mut self, value: T) -> Result<u32> {
        if let Some(index) = self.free.pop() {
            self.slots[index as usize].node = Some(Node::new(value));
            return Ok(index);
        }

        self.reserve(1)?;
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            node: Some(Node::new(value)),
        });
        Ok(index)
    }

    /// Vacates an unlinked slot and returns its value
    fn dealloc(&mut self, index: u32) -> T {
        let slot = &mut self.slots[index as usize];
        let node = match slot.node.take() {
            Some(node) => node,
            None => unreachable!("slot {index} freed twice"),
        };
        slot.generation = slot.generation.wrapping_add(1);
        // capacity for every slot is reserved up front, so this never reallocates
        self.free.push(index);
        node.value
    }

    fn link_front(&mut self, index: u32) {
        let head = self.head;
        {
            let node = self.node_mut(index);
            node.prev = None;
            node.next = head;
        }
        match head {
            Some(head) => self.node_mut(head).prev = Some(index),
            None => self.tail = Some(index),
        }
        self.head = Some(index);
        self.length += 1;
    }

    fn link_back(&mut self, index: u32) {
        let tail = self.tail;
        {
            let node = self.node_mut(index);
            node.prev = tail;
            node.next = None;
        }
        match tail {
            Some(tail) => self.node_mut(tail).next = Some(index),
            None => self.head = Some(index),
        }
        self.tail = Some(index);
        self.length += 1;
    }

    fn link_after(&mut self, anchor: u32, index: u32) {
        let next = self.node(anchor).next;
        {
            let node = self.node_mut(index);
            node.prev = Some(anchor);
            node.next = next;
        }
        self.node_mut(anchor).next = Some(index);
        match next {
            Some(next) => self.node_mut(next).prev = Some(index),
            None => self.tail = Some(index),
        }
        self.length += 1;
    }

    fn link_before(&mut self, anchor: u32, index: u32) {
        let prev = self.node(anchor).prev;
        {
            let node = self.node_mut(index);
            node.prev = prev;
            node.next = Some(anchor);
        }
        self.node_mut(anchor).prev = Some(index);
        match prev {
            Some(prev) => self.node_mut(prev).next = Some(index),
            None => self.head = Some(index),
        }
        self.length += 1;
    }

    fn unlink(&mut self, index: u32) {
        let (prev, next) = {
            let node = self.node_mut(index);
            (node.prev.take(), node.next.take())
        };

        match prev {
            Some(prev) => self.node_mut(prev).next = next,
            // Removing head
            None => self.head = next,
        }
        match next {
            Some(next) => self.node_mut(next).prev = prev,
            // Removing tail
            None => self.tail = prev,
        }
        self.length -= 1;
    }
}

fn linked<T>(slots: &[Slot<T>], index: u32) -> &Node<T> {
    match &slots[index as usize].node {
        Some(node) => node,
        None => unreachable!("linked slot {index} is vacant"),
    }
}

impl<T, K: ?Sized> Default for List<T, K> {
    fn default() -> Self {
        Self::with_hooks(Hooks::default())
    }
}

impl<T, K: ?Sized> Drop for List<T, K> {
    fn drop(&mut self) {
        if self.length > 0 {
            trace!("list {}: releasing {} nodes", self.id, self.length);
        }
        self.clear();
    }
}

impl<T: fmt::Debug, K: ?Sized> fmt::Debug for List<T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T, K: ?Sized> Extend<T> for List<T, K> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            if self.push_back(value).is_err() {
                handle_alloc_error(Layout::new::<Slot<T>>());
            }
        }
    }
}

impl<T, K: ?Sized> FromIterator<T> for List<T, K> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = List::default();
        list.extend(iter);
        list
    }
}

// ============================================================================
// Iterators
// ============================================================================

/// An iterator over the doubly linked list that consumes the list
///
/// Values are handed to the caller; whatever is left when the iterator is
/// dropped goes through the release hook.
pub struct IntoIter<T, K: ?Sized = T>(List<T, K>);

impl<T, K: ?Sized> Iterator for IntoIter<T, K> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.0.length, Some(self.0.length))
    }
}

impl<T, K: ?Sized> DoubleEndedIterator for IntoIter<T, K> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.pop_back()
    }
}

impl<T, K: ?Sized> ExactSizeIterator for IntoIter<T, K> {}
impl<T, K: ?Sized> FusedIterator for IntoIter<T, K> {}

impl<T, K: ?Sized> IntoIterator for List<T, K> {
    type Item = T;
    type IntoIter = IntoIter<T, K>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter(self)
    }
}

/// An iterator over the doubly linked list that borrows the list
pub struct Iter<'a, T> {
    slots: &'a [Slot<T>],
    front: Option<u32>,
    back: Option<u32>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = linked(self.slots, self.front?);
        self.front = node.next;
        self.remaining -= 1;
        Some(&node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = linked(self.slots, self.back?);
        self.back = node.prev;
        self.remaining -= 1;
        Some(&node.value)
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

/// A mutable iterator over the doubly linked list that borrows the list mutably
pub struct IterMut<'a, T> {
    slots: *mut Slot<T>,
    front: Option<u32>,
    back: Option<u32>,
    remaining: usize,
    _marker: PhantomData<&'a mut T>,
}

impl<'a, T> IterMut<'a, T> {
    /// # Safety
    /// `index` must be a linked slot that this iterator has not yielded yet.
    unsafe fn slot(&mut self, index: u32) -> &'a mut Slot<T> {
        unsafe { &mut *self.slots.add(index as usize) }
    }
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        // SAFETY: front and back never cross while remaining > 0, so every
        // linked slot is yielded at most once.
        let node = unsafe { self.slot(self.front?) }.node.as_mut()?;
        self.front = node.next;
        self.remaining -= 1;
        Some(&mut node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> DoubleEndedIterator for IterMut<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        // SAFETY: see `next`.
        let node = unsafe { self.slot(self.back?) }.node.as_mut()?;
        self.back = node.prev;
        self.remaining -= 1;
        Some(&mut node.value)
    }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {}
impl<T> FusedIterator for IterMut<'_, T> {}

impl<'a, T, K: ?Sized> IntoIterator for &'a List<T, K> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, K: ?Sized> IntoIterator for &'a mut List<T, K> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T, K: ?Sized> List<T, K> {
    /// Returns an iterator over the list that borrows the list
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            slots: &self.slots,
            front: self.head,
            back: self.tail,
            remaining: self.length,
        }
    }

    /// Returns a mutable iterator over the list that borrows the list mutably
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut {
            slots: self.slots.as_mut_ptr(),
            front: self.head,
            back: self.tail,
            remaining: self.length,
            _marker: PhantomData,
        }
    }
}
