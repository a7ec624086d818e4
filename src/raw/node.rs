use core::borrow::Borrow;

use smallvec::SmallVec;

use super::handle::Handle;

/// Minimum keys per non-root node (the tree's branching parameter N).
#[cfg(test)]
pub(crate) const BRANCH: usize = 2;
#[cfg(not(test))]
pub(crate) const BRANCH: usize = 32;

/// Maximum keys per node. A node may hold `ORDER + 1` keys only transiently,
/// inside the insertion call that splits it.
pub(crate) const ORDER: usize = 2 * BRANCH;
pub(crate) const MIN_KEYS: usize = BRANCH;

type Keys<K> = SmallVec<[K; ORDER + 1]>;
type Children = SmallVec<[Handle; ORDER + 2]>;

#[allow(clippy::large_enum_variant)]
pub(crate) enum Node<K> {
    Internal(InternalNode<K>),
    Leaf(LeafNode<K>),
}

/// Routing node: `keys[i]` is a copy of the minimum key in the subtree at
/// `children[i + 1]`. Child `i` holds keys below `keys[i]`; child `i > 0`
/// holds keys at or above `keys[i - 1]`.
pub(crate) struct InternalNode<K> {
    keys: Keys<K>,
    children: Children,
}

/// Leaf node: holds the actual set members plus the ascending chain link.
pub(crate) struct LeafNode<K> {
    next: Option<Handle>,
    keys: Keys<K>,
}

/// Result of a key search within a leaf.
pub(crate) enum SearchResult {
    /// Key present at this index.
    Found(usize),
    /// Key absent; index is its sorted insertion position.
    NotFound(usize),
}

impl<K> Node<K> {
    pub(crate) fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    pub(crate) fn as_leaf(&self) -> &LeafNode<K> {
        match self {
            Node::Leaf(leaf) => leaf,
            Node::Internal(_) => panic!("expected leaf node"),
        }
    }

    pub(crate) fn as_leaf_mut(&mut self) -> &mut LeafNode<K> {
        match self {
            Node::Leaf(leaf) => leaf,
            Node::Internal(_) => panic!("expected leaf node"),
        }
    }

    pub(crate) fn as_internal(&self) -> &InternalNode<K> {
        match self {
            Node::Internal(internal) => internal,
            Node::Leaf(_) => panic!("expected internal node"),
        }
    }

    pub(crate) fn as_internal_mut(&mut self) -> &mut InternalNode<K> {
        match self {
            Node::Internal(internal) => internal,
            Node::Leaf(_) => panic!("expected internal node"),
        }
    }

    pub(crate) fn key_count(&self) -> usize {
        match self {
            Node::Internal(internal) => internal.key_count(),
            Node::Leaf(leaf) => leaf.key_count(),
        }
    }
}

impl<K> InternalNode<K> {
    /// Creates the internal node produced by a root split.
    pub(crate) fn new_root(left: Handle, separator: K, right: Handle) -> Self {
        let mut keys = Keys::new();
        keys.push(separator);
        let mut children = Children::new();
        children.push(left);
        children.push(right);
        Self {
            keys,
            children,
        }
    }

    pub(crate) fn key_count(&self) -> usize {
        self.keys.len()
    }

    pub(crate) fn child_count(&self) -> usize {
        self.children.len()
    }

    pub(crate) fn is_overfull(&self) -> bool {
        self.keys.len() > ORDER
    }

    pub(crate) fn is_underfull(&self) -> bool {
        self.keys.len() < MIN_KEYS
    }

    #[inline]
    pub(crate) fn key(&self, index: usize) -> &K {
        &self.keys[index]
    }

    pub(crate) fn set_key(&mut self, index: usize, key: K) {
        self.keys[index] = key;
    }

    #[inline]
    pub(crate) fn child(&self, index: usize) -> Handle {
        self.children[index]
    }

    pub(crate) fn children(&self) -> &[Handle] {
        &self.children
    }

    /// Index of the child whose range contains `key`.
    ///
    /// A probe equal to a separator routes right: the separator is a copy of
    /// that right subtree's minimum, so the member itself lives there.
    #[inline]
    pub(crate) fn search_child<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        match self.keys.binary_search_by(|k| k.borrow().cmp(key)) {
            Ok(idx) => idx + 1,
            Err(idx) => idx,
        }
    }

    /// Absorbs a split child: `key` becomes the separator at `index` and
    /// `child` the subtree one slot after it.
    pub(crate) fn insert_child(&mut self, index: usize, key: K, child: Handle) {
        self.keys.insert(index, key);
        self.children.insert(index + 1, child);
    }

    /// Removes the separator at `index` and the child one slot after it.
    pub(crate) fn remove_child(&mut self, index: usize) -> (K, Handle) {
        let key = self.keys.remove(index);
        let child = self.children.remove(index + 1);
        (key, child)
    }

    /// Appends a key and a child at the end (redistribution into the left
    /// sibling).
    pub(crate) fn push_back(&mut self, key: K, child: Handle) {
        self.keys.push(key);
        self.children.push(child);
    }

    /// Removes the last key and child.
    pub(crate) fn pop_back(&mut self) -> (K, Handle) {
        let key = self.keys.pop().expect("`InternalNode::pop_back()` - node is empty!");
        let child = self.children.pop().expect("`InternalNode::pop_back()` - node is empty!");
        (key, child)
    }

    /// Prepends a key and a child (redistribution into the right sibling).
    pub(crate) fn push_front(&mut self, key: K, child: Handle) {
        self.keys.insert(0, key);
        self.children.insert(0, child);
    }

    /// Removes the first key and child.
    pub(crate) fn pop_front(&mut self) -> (K, Handle) {
        let key = self.keys.remove(0);
        let child = self.children.remove(0);
        (key, child)
    }

    /// Splits an overfull node. The left (this) node keeps `BRANCH` keys and
    /// `BRANCH + 1` children; the returned right node takes the same; the
    /// middle key - the minimum of the right half's subtree - is returned as
    /// the separator for the parent.
    pub(crate) fn split(&mut self) -> (K, InternalNode<K>) {
        let right = InternalNode {
            keys: self.keys.drain(BRANCH + 1..).collect(),
            children: self.children.drain(BRANCH + 1..).collect(),
        };
        let separator = self.keys.pop().expect("`InternalNode::split()` - node was not overfull!");
        (separator, right)
    }

    /// Merges a right sibling into this node, pulling the parent separator
    /// down as the key between the two halves.
    pub(crate) fn merge_with_right(&mut self, separator: K, mut right: InternalNode<K>) {
        self.keys.push(separator);
        self.keys.append(&mut right.keys);
        self.children.append(&mut right.children);
    }
}

impl<K> LeafNode<K> {
    pub(crate) fn new() -> Self {
        Self {
            next: None,
            keys: Keys::new(),
        }
    }

    pub(crate) fn key_count(&self) -> usize {
        self.keys.len()
    }

    pub(crate) fn is_overfull(&self) -> bool {
        self.keys.len() > ORDER
    }

    pub(crate) fn is_underfull(&self) -> bool {
        self.keys.len() < MIN_KEYS
    }

    pub(crate) fn next(&self) -> Option<Handle> {
        self.next
    }

    pub(crate) fn set_next(&mut self, next: Option<Handle>) {
        self.next = next;
    }

    #[inline]
    pub(crate) fn key(&self, index: usize) -> &K {
        &self.keys[index]
    }

    pub(crate) fn keys(&self) -> &[K] {
        &self.keys
    }

    #[inline]
    pub(crate) fn search<Q>(&self, key: &Q) -> SearchResult
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        match self.keys.binary_search_by(|k| k.borrow().cmp(key)) {
            Ok(idx) => SearchResult::Found(idx),
            Err(idx) => SearchResult::NotFound(idx),
        }
    }

    pub(crate) fn insert(&mut self, index: usize, key: K) {
        self.keys.insert(index, key);
    }

    pub(crate) fn remove(&mut self, index: usize) -> K {
        self.keys.remove(index)
    }

    /// Appends a key (redistribution into the left sibling).
    pub(crate) fn push_back(&mut self, key: K) {
        self.keys.push(key);
    }

    /// Removes the last key.
    pub(crate) fn pop_back(&mut self) -> K {
        self.keys.pop().expect("`LeafNode::pop_back()` - leaf is empty!")
    }

    /// Prepends a key (redistribution into the right sibling).
    pub(crate) fn push_front(&mut self, key: K) {
        self.keys.insert(0, key);
    }

    /// Removes the first key.
    pub(crate) fn pop_front(&mut self) -> K {
        self.keys.remove(0)
    }

    /// Takes ownership of all keys, leaving the leaf empty.
    pub(crate) fn take_keys(&mut self) -> Keys<K> {
        core::mem::take(&mut self.keys)
    }

    /// Splits an overfull leaf. The left (this) leaf keeps `BRANCH + 1` keys;
    /// the returned right leaf takes the remaining `BRANCH` and inherits this
    /// leaf's chain link. The caller relinks this leaf to the new sibling and
    /// hands the separator - the right leaf's minimum - to the parent.
    pub(crate) fn split(&mut self) -> (K, LeafNode<K>)
    where
        K: Clone,
    {
        let right = LeafNode {
            next: self.next,
            keys: self.keys.drain(BRANCH + 1..).collect(),
        };
        let separator = right.keys[0].clone();
        (separator, right)
    }

    /// Merges a right sibling into this leaf, splicing it out of the chain.
    pub(crate) fn merge_with_right(&mut self, mut right: LeafNode<K>) {
        self.keys.append(&mut right.keys);
        self.next = right.next;
    }
}
