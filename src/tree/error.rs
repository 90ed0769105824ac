//! Error types for tree operations and structural checks.
//!
//! Missing keys and empty trees are not errors: those come back as `None`.
//! The types here cover programming errors only.

use thiserror::Error;

use crate::tree::Slot;

/// Precondition violations reported by [`Tree::try_push`](crate::tree::Tree::try_push)
/// and [`Tree::try_remove`](crate::tree::Tree::try_remove).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// The node is already part of a tree or a same-key ring
    #[error("node of entity {entity} is already attached")]
    NodeAttached { entity: usize },

    /// The slab holds no entity under this key
    #[error("no entity at slab key {0}")]
    MissingEntity(usize),

    /// The node is not attached to any tree
    #[error("node of entity {entity} is not attached")]
    NodeFree { entity: usize },

    /// The node is attached, but to a different tree
    #[error("node of entity {entity} belongs to another tree")]
    ForeignNode { entity: usize },
}

/// A broken invariant found by [`Tree::validate`](crate::tree::Tree::validate).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructureError {
    #[error("link to slab key {0} points at no entity")]
    DanglingLink(usize),

    #[error("node {node} records slot {recorded:?} but is held by {actual:?}")]
    SlotMismatch {
        node: usize,
        recorded: Option<Slot>,
        actual: Slot,
    },

    #[error("left child {child} (key {child_key}) is not below node {node} (key {key})")]
    LeftOrder {
        node: usize,
        key: i64,
        child: usize,
        child_key: i64,
    },

    #[error("right child {child} (key {child_key}) is not above node {node} (key {key})")]
    RightOrder {
        node: usize,
        key: i64,
        child: usize,
        child_key: i64,
    },

    #[error("ring of head {head}: {node}.next is {next} but {next}.prev is {back:?}")]
    BrokenRing {
        head: usize,
        node: usize,
        next: usize,
        back: Option<usize>,
    },

    #[error("ring of head {head}: {node} has half-open links")]
    HalfOpenRing { head: usize, node: usize },

    #[error("queued node {node} in ring of head {head} still has tree links")]
    QueuedWithTreeLinks { head: usize, node: usize },

    #[error("queued node {node} has key {key}, head {head} has key {head_key}")]
    QueuedKeyMismatch {
        head: usize,
        head_key: i64,
        node: usize,
        key: i64,
    },

    #[error("node at slab key {node} records owner {owner:?}")]
    OwnerMismatch { node: usize, owner: Option<usize> },

    #[error("walk visited more than {limit} nodes; links form a cycle")]
    Cycle { limit: usize },

    #[error("book count mismatch: {what} is {found}, expected {expected}")]
    CountMismatch {
        what: &'static str,
        found: usize,
        expected: usize,
    },
}
