//! Intrusive tree node embedded inside a slab entity.
//!
//! ## Design
//!
//! A `Node` never lives on its own. It is a field of some payload entity
//! stored in a `Slab`, and every link it holds is the slab key of another
//! entity. The slab key of the embedding entity doubles as the node's
//! identity and as its owner reference.
//!
//! ## Links
//!
//! ```text
//!            slot (where am I held?)
//!              |
//!            [head] <-> member <-> member     (same-key FIFO ring)
//!            /    \
//!        left      right
//! ```
//!
//! - `left` / `right`: BST children (heads only)
//! - `slot`: the exact field holding this node: the tree root, or the
//!   parent's left or right child field
//! - `next` / `prev`: circular ring of entries sharing the key. Both `None`
//!   means the ring holds only this node.
//!
//! An entity can sit in several trees at once by embedding one `Node` per
//! tree and exposing each through its own [`Adapter`].

/// The field that currently references a head node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// The tree's root field
    Root,
    /// The left child field of the given parent
    Left(usize),
    /// The right child field of the given parent
    Right(usize),
}

impl Slot {
    /// Parent slab key, or `None` for the root slot
    #[inline]
    pub fn parent(self) -> Option<usize> {
        match self {
            Slot::Root => None,
            Slot::Left(parent) | Slot::Right(parent) => Some(parent),
        }
    }
}

/// Intrusive node for [`Tree`](crate::tree::Tree).
///
/// All link fields are slab keys. A freshly created node is free and can be
/// pushed once its key is set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Node {
    /// Ordering value (price ticks or identity number)
    pub(crate) key: i64,

    /// Left child (smaller keys)
    pub(crate) left: Option<usize>,

    /// Right child (greater keys)
    pub(crate) right: Option<usize>,

    /// Field holding this node, `None` unless the node is a head in a tree
    pub(crate) slot: Option<Slot>,

    /// Next entry in the same-key ring (newer, wrapping to the head)
    pub(crate) next: Option<usize>,

    /// Previous entry in the same-key ring (older, wrapping to the tail)
    pub(crate) prev: Option<usize>,

    /// Slab key of the embedding entity, recorded on first push
    pub(crate) owner: Option<usize>,
}

impl Node {
    /// Create a free node with the given key
    #[inline]
    pub fn new(key: i64) -> Self {
        Self {
            key,
            ..Self::default()
        }
    }

    /// The ordering key
    #[inline]
    pub fn key(&self) -> i64 {
        self.key
    }

    /// Set the ordering key.
    ///
    /// # Panics
    ///
    /// Panics if the node is attached to a tree; re-keying an attached node
    /// would silently break the ordering invariant.
    #[inline]
    pub fn set_key(&mut self, key: i64) {
        assert!(self.is_free(), "cannot re-key an attached node");
        self.key = key;
    }

    /// Slab key of the entity embedding this node, once it has been pushed
    #[inline]
    pub fn owner(&self) -> Option<usize> {
        self.owner
    }

    /// Check if the node is detached from every tree structure.
    ///
    /// A free node has no children, no slot, and a ring containing only
    /// itself. Nodes must be free before `push` and are free again after
    /// any removal.
    #[inline]
    pub fn is_free(&self) -> bool {
        self.left.is_none()
            && self.right.is_none()
            && self.slot.is_none()
            && self.next.is_none()
            && self.prev.is_none()
    }

    /// Check if this node is the BST participant for its key
    #[inline]
    pub fn is_head(&self) -> bool {
        self.slot.is_some()
    }

    /// Check if this node waits in another node's ring without a BST position
    #[inline]
    pub fn is_queued(&self) -> bool {
        self.slot.is_none() && self.next.is_some()
    }

    /// Reset every structural link. The key and owner are kept.
    #[inline]
    pub(crate) fn clear_links(&mut self) {
        self.left = None;
        self.right = None;
        self.slot = None;
        self.next = None;
        self.prev = None;
    }
}

/// Selects the [`Node`] a tree operates on inside an entity.
///
/// Implemented by zero-sized marker types, one per embedded node:
///
/// ```
/// use ordertree::tree::{Adapter, Node};
///
/// struct Quote {
///     bid_node: Node,
///     seq_node: Node,
/// }
///
/// struct ByBid;
///
/// impl Adapter for ByBid {
///     type Entity = Quote;
///     fn node(entity: &Quote) -> &Node { &entity.bid_node }
///     fn node_mut(entity: &mut Quote) -> &mut Node { &mut entity.bid_node }
/// }
/// ```
pub trait Adapter {
    /// The slab entity embedding the node
    type Entity;

    /// Borrow the embedded node
    fn node(entity: &Self::Entity) -> &Node;

    /// Mutably borrow the embedded node
    fn node_mut(entity: &mut Self::Entity) -> &mut Node;
}

// ============================================================================
// Unit Tests
// ============================================================================
