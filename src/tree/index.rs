//! Ordered index over intrusive nodes stored in a slab.
//!
//! ## Design
//!
//! `Tree` holds nothing but a root reference. Nodes are embedded in slab
//! entities (see [`Node`]) and every operation borrows the slab, so the same
//! entities can be indexed by several trees at once, one embedded node per
//! tree.
//!
//! ## Duplicate Keys
//!
//! Each key has exactly one BST participant, the head. Later arrivals at the
//! same key wait in the head's ring:
//!
//! ```text
//! key 7:  head(oldest) -> second -> third(newest) -> back to head
//! ```
//!
//! The head is always the oldest entry at its key, so the node returned by
//! `peek_min`/`peek_max` is exactly the one `pop_min`/`pop_max` detaches.
//! When a head with waiting entries is removed, the next-oldest entry takes
//! over its children and slot in O(1).
//!
//! ## Complexity
//!
//! | Operation | Complexity |
//! |-----------|------------|
//! | push | O(depth), O(1) past the search for a duplicate key |
//! | pop(key) | O(depth) |
//! | peek/pop min/max | O(depth) |
//! | has / get | O(depth) |
//! | remove(entity) | O(ring + depth), membership is checked first |
//!
//! No balancing is performed; depth follows the insertion pattern.

use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;

use slab::Slab;

use crate::tree::{Adapter, Node, Slot, StructureError, TreeError};

#[inline]
fn at<A: Adapter>(slab: &Slab<A::Entity>, key: usize) -> &Node {
    A::node(&slab[key])
}

#[inline]
fn at_mut<A: Adapter>(slab: &mut Slab<A::Entity>, key: usize) -> &mut Node {
    A::node_mut(&mut slab[key])
}

fn lookup<A: Adapter>(slab: &Slab<A::Entity>, key: usize) -> Result<&Node, StructureError> {
    slab.get(key).map(A::node).ok_or(StructureError::DanglingLink(key))
}

#[inline]
fn slot_of(node: &Node) -> Slot {
    node.slot.expect("head node without a slot")
}

/// Intrusive binary search tree keyed by `i64`.
///
/// Operations take the slab holding the entities and identify nodes by the
/// slab key of their entity.
///
/// ## Example
///
/// ```
/// use ordertree::tree::{Adapter, Node, Tree};
/// use slab::Slab;
///
/// struct Item { node: Node }
/// struct ByKey;
///
/// impl Adapter for ByKey {
///     type Entity = Item;
///     fn node(item: &Item) -> &Node { &item.node }
///     fn node_mut(item: &mut Item) -> &mut Node { &mut item.node }
/// }
///
/// let mut slab = Slab::new();
/// let mut tree: Tree<ByKey> = Tree::new();
///
/// for key in [5, 3, 8] {
///     let entity = slab.insert(Item { node: Node::new(key) });
///     tree.push(&mut slab, entity);
/// }
///
/// let min = tree.pop_min(&mut slab).unwrap();
/// assert_eq!(slab[min].node.key(), 3);
/// assert!(slab[min].node.is_free());
/// assert!(tree.has(&slab, 8));
/// ```
pub struct Tree<A: Adapter> {
    /// Topmost head, `None` when the tree is empty
    root: Option<usize>,

    _adapter: PhantomData<fn() -> A>,
}

impl<A: Adapter> fmt::Debug for Tree<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree").field("root", &self.root).finish()
    }
}

impl<A: Adapter> Default for Tree<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Adapter> Tree<A> {
    /// Create an empty tree
    pub const fn new() -> Self {
        Self {
            root: None,
            _adapter: PhantomData,
        }
    }

    /// Check if the tree holds no nodes
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Slab key of the root head
    #[inline]
    pub fn root(&self) -> Option<usize> {
        self.root
    }

    // ========================================================================
    // Insertion
    // ========================================================================

    /// Insert the node embedded in `entity`.
    ///
    /// The node's key must already be set. An existing key makes the node the
    /// newest entry in that key's ring; otherwise it becomes a new leaf.
    ///
    /// # Panics
    ///
    /// Panics if `entity` is not in the slab or its node is already attached.
    pub fn push(&mut self, slab: &mut Slab<A::Entity>, entity: usize) {
        if let Err(err) = self.try_push(slab, entity) {
            panic!("push precondition violated: {err}");
        }
    }

    /// Insert the node embedded in `entity`, reporting precondition
    /// violations instead of panicking.
    ///
    /// On error the tree and the node are left untouched.
    pub fn try_push(&mut self, slab: &mut Slab<A::Entity>, entity: usize) -> Result<(), TreeError> {
        let node = slab
            .get_mut(entity)
            .map(A::node_mut)
            .ok_or(TreeError::MissingEntity(entity))?;
        if !node.is_free() {
            return Err(TreeError::NodeAttached { entity });
        }
        node.owner = Some(entity);
        let key = node.key;

        let mut slot = Slot::Root;
        let mut cursor = self.root;
        while let Some(current) = cursor {
            let head = at::<A>(slab, current);
            match key.cmp(&head.key) {
                Ordering::Less => {
                    slot = Slot::Left(current);
                    cursor = head.left;
                }
                Ordering::Greater => {
                    slot = Slot::Right(current);
                    cursor = head.right;
                }
                Ordering::Equal => {
                    Self::enqueue(slab, current, entity);
                    return Ok(());
                }
            }
        }

        self.set_slot(slab, slot, Some(entity));
        Ok(())
    }

    /// Append `entity` at the tail of `head`'s ring
    fn enqueue(slab: &mut Slab<A::Entity>, head: usize, entity: usize) {
        let tail = at::<A>(slab, head).prev.unwrap_or(head);

        let node = at_mut::<A>(slab, entity);
        node.next = Some(head);
        node.prev = Some(tail);

        at_mut::<A>(slab, tail).next = Some(entity);
        at_mut::<A>(slab, head).prev = Some(entity);
    }

    /// Store `child` in the field named by `slot` and record the slot on it
    fn set_slot(&mut self, slab: &mut Slab<A::Entity>, slot: Slot, child: Option<usize>) {
        match slot {
            Slot::Root => self.root = child,
            Slot::Left(parent) => at_mut::<A>(slab, parent).left = child,
            Slot::Right(parent) => at_mut::<A>(slab, parent).right = child,
        }
        if let Some(child) = child {
            at_mut::<A>(slab, child).slot = Some(slot);
        }
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Slab key of the head for `key`, without detaching it
    pub fn get(&self, slab: &Slab<A::Entity>, key: i64) -> Option<usize> {
        let mut cursor = self.root;
        while let Some(current) = cursor {
            let node = at::<A>(slab, current);
            match key.cmp(&node.key) {
                Ordering::Less => cursor = node.left,
                Ordering::Greater => cursor = node.right,
                Ordering::Equal => return Some(current),
            }
        }
        None
    }

    /// Check if any node with `key` is in the tree
    #[inline]
    pub fn has(&self, slab: &Slab<A::Entity>, key: i64) -> bool {
        self.get(slab, key).is_some()
    }

    /// Head with the smallest key
    pub fn peek_min(&self, slab: &Slab<A::Entity>) -> Option<usize> {
        let mut current = self.root?;
        while let Some(left) = at::<A>(slab, current).left {
            current = left;
        }
        Some(current)
    }

    /// Head with the largest key
    pub fn peek_max(&self, slab: &Slab<A::Entity>) -> Option<usize> {
        let mut current = self.root?;
        while let Some(right) = at::<A>(slab, current).right {
            current = right;
        }
        Some(current)
    }

    /// Check if `entity`'s node is attached to this tree.
    ///
    /// Walks the entity's ring to its head, then the slots up to the root.
    pub fn contains(&self, slab: &Slab<A::Entity>, entity: usize) -> bool {
        let Some(item) = slab.get(entity) else {
            return false;
        };
        let node = A::node(item);
        if node.is_free() {
            return false;
        }

        let mut current = entity;
        let mut steps = 0;
        while at::<A>(slab, current).slot.is_none() {
            match at::<A>(slab, current).next {
                Some(next) if steps <= slab.len() => current = next,
                _ => return false,
            }
            steps += 1;
        }

        loop {
            match at::<A>(slab, current).slot {
                Some(Slot::Root) => return self.root == Some(current),
                Some(Slot::Left(parent)) | Some(Slot::Right(parent)) if steps <= slab.len() => {
                    current = parent;
                }
                _ => return false,
            }
            steps += 1;
        }
    }

    /// Number of entries sharing `entity`'s key ring (1 for a solitary node)
    pub fn chain_len(&self, slab: &Slab<A::Entity>, entity: usize) -> usize {
        let mut count = 1;
        let mut cursor = at::<A>(slab, entity).next;
        while let Some(current) = cursor {
            if current == entity {
                break;
            }
            count += 1;
            cursor = at::<A>(slab, current).next;
        }
        count
    }

    // ========================================================================
    // Removal
    // ========================================================================

    /// Remove the oldest entry with `key`
    pub fn pop(&mut self, slab: &mut Slab<A::Entity>, key: i64) -> Option<usize> {
        let head = self.get(slab, key)?;
        self.remove_head(slab, head);
        Some(head)
    }

    /// Remove the oldest entry at the smallest key
    pub fn pop_min(&mut self, slab: &mut Slab<A::Entity>) -> Option<usize> {
        let head = self.peek_min(slab)?;
        self.remove_head(slab, head);
        Some(head)
    }

    /// Remove the oldest entry at the largest key
    pub fn pop_max(&mut self, slab: &mut Slab<A::Entity>) -> Option<usize> {
        let head = self.peek_max(slab)?;
        self.remove_head(slab, head);
        Some(head)
    }

    /// Detach `entity`'s node wherever it sits: as a head or waiting in a
    /// ring.
    ///
    /// Returns `false` if the entity is missing or its node is free.
    ///
    /// # Panics
    ///
    /// Panics if the node is attached to a different tree.
    pub fn remove(&mut self, slab: &mut Slab<A::Entity>, entity: usize) -> bool {
        match self.try_remove(slab, entity) {
            Ok(()) => true,
            Err(err @ TreeError::ForeignNode { .. }) => panic!("remove precondition violated: {err}"),
            Err(_) => false,
        }
    }

    /// Detach `entity`'s node, reporting why it could not be removed.
    ///
    /// Membership is confirmed first by walking the ring to its head and the
    /// slots up to this tree's root, so the cost is O(ring + depth). On error
    /// neither this tree nor the node is touched.
    pub fn try_remove(&mut self, slab: &mut Slab<A::Entity>, entity: usize) -> Result<(), TreeError> {
        let node = slab.get(entity).map(A::node).ok_or(TreeError::MissingEntity(entity))?;
        if node.is_free() {
            return Err(TreeError::NodeFree { entity });
        }
        if !self.contains(slab, entity) {
            return Err(TreeError::ForeignNode { entity });
        }

        let node = at::<A>(slab, entity);
        if node.is_head() {
            self.remove_head(slab, entity);
            return Ok(());
        }

        if let (Some(next), Some(prev)) = (node.next, node.prev) {
            if next == prev {
                // The survivor is left alone in its ring
                let other = at_mut::<A>(slab, next);
                other.next = None;
                other.prev = None;
            } else {
                at_mut::<A>(slab, prev).next = Some(next);
                at_mut::<A>(slab, next).prev = Some(prev);
            }
        }
        at_mut::<A>(slab, entity).clear_links();
        Ok(())
    }

    /// Detach a head node and leave it free
    fn remove_head(&mut self, slab: &mut Slab<A::Entity>, head: usize) {
        match at::<A>(slab, head).next {
            Some(successor) => self.promote(slab, head, successor),
            None => self.splice(slab, head),
        }
        at_mut::<A>(slab, head).clear_links();
    }

    /// Hand `head`'s BST position to the next entry in its ring
    fn promote(&mut self, slab: &mut Slab<A::Entity>, head: usize, successor: usize) {
        let node = at::<A>(slab, head);
        let (left, right, slot) = (node.left, node.right, slot_of(node));
        let tail = node.prev.unwrap_or(successor);

        if tail == successor {
            let survivor = at_mut::<A>(slab, successor);
            survivor.next = None;
            survivor.prev = None;
        } else {
            at_mut::<A>(slab, successor).prev = Some(tail);
            at_mut::<A>(slab, tail).next = Some(successor);
        }

        let promoted = at_mut::<A>(slab, successor);
        promoted.left = left;
        promoted.right = right;
        if let Some(left) = left {
            at_mut::<A>(slab, left).slot = Some(Slot::Left(successor));
        }
        if let Some(right) = right {
            at_mut::<A>(slab, right).slot = Some(Slot::Right(successor));
        }
        self.set_slot(slab, slot, Some(successor));
    }

    /// Unlink a solitary head from the BST
    fn splice(&mut self, slab: &mut Slab<A::Entity>, head: usize) {
        let node = at::<A>(slab, head);
        let (left, right, slot) = (node.left, node.right, slot_of(node));

        match (left, right) {
            (None, child) | (child, None) => self.set_slot(slab, slot, child),
            (Some(left), Some(right)) => {
                // In-order successor: leftmost head of the right subtree.
                // It has no left child, so unlinking it is a one-child splice.
                let mut successor = right;
                while let Some(next) = at::<A>(slab, successor).left {
                    successor = next;
                }
                let successor_node = at::<A>(slab, successor);
                let (successor_slot, successor_right) = (slot_of(successor_node), successor_node.right);
                self.set_slot(slab, successor_slot, successor_right);

                // Re-read: unlinking may have rewritten head.right
                let right = at::<A>(slab, head).right;
                let promoted = at_mut::<A>(slab, successor);
                promoted.left = Some(left);
                promoted.right = right;
                at_mut::<A>(slab, left).slot = Some(Slot::Left(successor));
                if let Some(right) = right {
                    at_mut::<A>(slab, right).slot = Some(Slot::Right(successor));
                }
                self.set_slot(slab, slot, Some(successor));
            }
        }
    }

    /// Detach every node, leaving all of them free.
    ///
    /// Needed when the tree is dropped while its entities live on in the slab.
    pub fn clear(&mut self, slab: &mut Slab<A::Entity>) {
        let attached: Vec<usize> = self.iter(slab).collect();
        for entity in attached {
            at_mut::<A>(slab, entity).clear_links();
        }
        self.root = None;
    }

    // ========================================================================
    // Traversal
    // ========================================================================

    /// Entries in ascending key order, oldest first within a key
    pub fn iter<'a>(&self, slab: &'a Slab<A::Entity>) -> Iter<'a, A> {
        Iter::new(slab, self.root, false)
    }

    /// Entries in descending key order, oldest first within a key
    pub fn iter_rev<'a>(&self, slab: &'a Slab<A::Entity>) -> Iter<'a, A> {
        Iter::new(slab, self.root, true)
    }

    // ========================================================================
    // Structural Checks
    // ========================================================================

    /// Check every invariant of the tree and its rings.
    ///
    /// Verifies BST ordering over whole subtrees, that each head's slot names
    /// the field actually holding it, that rings are circular with mirrored
    /// links, that queued entries carry no tree links and share the head's
    /// key, and that every node's owner is its own slab key.
    ///
    /// Returns the number of attached entries.
    pub fn validate(&self, slab: &Slab<A::Entity>) -> Result<usize, StructureError> {
        struct Frame {
            node: usize,
            slot: Slot,
            lower: Option<(usize, i64)>,
            upper: Option<(usize, i64)>,
        }

        let limit = slab.len();

        let mut count = 0;
        let mut stack = Vec::new();
        if let Some(root) = self.root {
            stack.push(Frame {
                node: root,
                slot: Slot::Root,
                lower: None,
                upper: None,
            });
        }

        while let Some(frame) = stack.pop() {
            let node = lookup::<A>(slab, frame.node)?;
            count += 1;
            if count > limit {
                return Err(StructureError::Cycle { limit });
            }

            if node.slot != Some(frame.slot) {
                return Err(StructureError::SlotMismatch {
                    node: frame.node,
                    recorded: node.slot,
                    actual: frame.slot,
                });
            }
            if node.owner != Some(frame.node) {
                return Err(StructureError::OwnerMismatch {
                    node: frame.node,
                    owner: node.owner,
                });
            }
            if let Some((bound, bound_key)) = frame.upper {
                if node.key >= bound_key {
                    return Err(StructureError::LeftOrder {
                        node: bound,
                        key: bound_key,
                        child: frame.node,
                        child_key: node.key,
                    });
                }
            }
            if let Some((bound, bound_key)) = frame.lower {
                if node.key <= bound_key {
                    return Err(StructureError::RightOrder {
                        node: bound,
                        key: bound_key,
                        child: frame.node,
                        child_key: node.key,
                    });
                }
            }

            count += Self::validate_ring(slab, frame.node, node, limit)?;
            if count > limit {
                return Err(StructureError::Cycle { limit });
            }

            if let Some(left) = node.left {
                stack.push(Frame {
                    node: left,
                    slot: Slot::Left(frame.node),
                    lower: frame.lower,
                    upper: Some((frame.node, node.key)),
                });
            }
            if let Some(right) = node.right {
                stack.push(Frame {
                    node: right,
                    slot: Slot::Right(frame.node),
                    lower: Some((frame.node, node.key)),
                    upper: frame.upper,
                });
            }
        }

        Ok(count)
    }

    /// Check one head's ring, returning the number of queued entries
    fn validate_ring(
        slab: &Slab<A::Entity>,
        head: usize,
        head_node: &Node,
        limit: usize,
    ) -> Result<usize, StructureError> {
        let (mut cursor, back) = match (head_node.next, head_node.prev) {
            (None, None) => return Ok(0),
            (Some(next), Some(prev)) => (next, prev),
            _ => return Err(StructureError::HalfOpenRing { head, node: head }),
        };

        let mut queued = 0;
        let mut previous = head;
        while cursor != head {
            queued += 1;
            if queued > limit {
                return Err(StructureError::Cycle { limit });
            }

            let node = lookup::<A>(slab, cursor)?;
            if node.prev != Some(previous) {
                return Err(StructureError::BrokenRing {
                    head,
                    node: previous,
                    next: cursor,
                    back: node.prev,
                });
            }
            if node.slot.is_some() || node.left.is_some() || node.right.is_some() {
                return Err(StructureError::QueuedWithTreeLinks { head, node: cursor });
            }
            if node.key != head_node.key {
                return Err(StructureError::QueuedKeyMismatch {
                    head,
                    head_key: head_node.key,
                    node: cursor,
                    key: node.key,
                });
            }
            if node.owner != Some(cursor) {
                return Err(StructureError::OwnerMismatch {
                    node: cursor,
                    owner: node.owner,
                });
            }

            previous = cursor;
            cursor = node
                .next
                .ok_or(StructureError::HalfOpenRing { head, node: cursor })?;
        }

        if back != previous {
            return Err(StructureError::BrokenRing {
                head,
                node: previous,
                next: head,
                back: Some(back),
            });
        }
        Ok(queued)
    }
}

// ============================================================================
// Iterator
// ============================================================================

/// In-order traversal yielding slab keys in price-time priority.
///
/// Heads come in key order (ascending, or descending for
/// [`Tree::iter_rev`]); each head is followed by the rest of its ring,
/// oldest first.
pub struct Iter<'a, A: Adapter> {
    slab: &'a Slab<A::Entity>,
    stack: Vec<usize>,
    /// (head, next ring entry to yield)
    ring: Option<(usize, usize)>,
    reverse: bool,
}

impl<'a, A: Adapter> Iter<'a, A> {
    fn new(slab: &'a Slab<A::Entity>, root: Option<usize>, reverse: bool) -> Self {
        let mut iter = Self {
            slab,
            stack: Vec::new(),
            ring: None,
            reverse,
        };
        iter.descend(root);
        iter
    }

    /// Push the spine from `cursor` towards the first key in iteration order
    fn descend(&mut self, mut cursor: Option<usize>) {
        while let Some(current) = cursor {
            self.stack.push(current);
            let node = at::<A>(self.slab, current);
            cursor = if self.reverse { node.right } else { node.left };
        }
    }
}

impl<'a, A: Adapter> Iterator for Iter<'a, A> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if let Some((head, cursor)) = self.ring.take() {
            if cursor != head {
                self.ring = at::<A>(self.slab, cursor).next.map(|next| (head, next));
                return Some(cursor);
            }
        }

        let head = self.stack.pop()?;
        let node = at::<A>(self.slab, head);
        let child = if self.reverse { node.left } else { node.right };
        self.ring = node.next.map(|next| (head, next));
        self.descend(child);
        Some(head)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
