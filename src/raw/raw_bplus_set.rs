use core::borrow::Borrow;
use core::fmt;
use core::fmt::Write as _;

use alloc::string::String;
use alloc::vec::Vec;

use super::arena::Arena;
use super::handle::Handle;
use super::node::{InternalNode, LeafNode, Node, ORDER, SearchResult};

/// The B+Tree engine backing `BPlusSet`.
///
/// Owns the node arena; the tree structure and the leaf chain are handles
/// into it. `root` is `None` exactly when the set is empty.
pub(crate) struct RawBPlusSet<K> {
    nodes: Arena<Node<K>>,
    root: Option<Handle>,
    /// First (leftmost) leaf; the start of the ascending chain.
    head: Option<Handle>,
    len: usize,
}

/// What an insertion into a subtree reports to its parent.
enum InsertResult<K> {
    /// Insertion completed without a split.
    Done,
    /// The subtree split; the parent must absorb the new right sibling under
    /// `separator` (a copy of that sibling's subtree minimum).
    Split { separator: K, right: Handle },
}

/// What an erase from a subtree reports to its parent.
enum EraseResult {
    /// Subtree still valid; nothing to do.
    Done,
    /// Subtree minimum changed; the parent must refresh the separator that
    /// routes into this subtree (and propagate if this is its first child).
    MinChanged,
    /// Subtree root dropped below minimum occupancy; the parent must merge it
    /// with a sibling or redistribute one entry across the boundary.
    Underflow,
}

impl<K> RawBPlusSet<K> {
    pub(crate) const fn new() -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
            head: None,
            len: 0,
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity.div_ceil(ORDER)),
            root: None,
            head: None,
            len: 0,
        }
    }

    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.head = None;
        self.len = 0;
    }

    pub(crate) fn head(&self) -> Option<Handle> {
        self.head
    }

    pub(crate) fn node(&self, handle: Handle) -> &Node<K> {
        self.nodes.get(handle)
    }

    /// The minimum key. O(1) through the chain head.
    pub(crate) fn first(&self) -> Option<&K> {
        let head = self.head?;
        Some(self.nodes.get(head).as_leaf().key(0))
    }

    /// The maximum key, by descending rightmost children.
    pub(crate) fn last(&self) -> Option<&K> {
        let mut current = self.root?;
        loop {
            match self.nodes.get(current) {
                Node::Internal(internal) => current = internal.child(internal.child_count() - 1),
                Node::Leaf(leaf) => return Some(leaf.key(leaf.key_count() - 1)),
            }
        }
    }

    /// Moves every key out in ascending order by walking the leaf chain,
    /// leaving the set empty. O(n), no rebalancing.
    pub(crate) fn drain_to_vec(&mut self) -> Vec<K> {
        let mut result = Vec::with_capacity(self.len);
        let mut current = self.head;

        while let Some(leaf_handle) = current {
            let leaf = self.nodes.get_mut(leaf_handle).as_leaf_mut();
            current = leaf.next();
            result.extend(leaf.take_keys());
        }

        self.clear();
        result
    }
}

impl<K: Ord + Clone> RawBPlusSet<K> {
    /// Descends from the root to the leaf slot holding `key`, if present.
    pub(crate) fn search<Q>(&self, key: &Q) -> Option<(Handle, usize)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.root?;

        loop {
            match self.nodes.get(current) {
                Node::Internal(internal) => {
                    current = internal.child(internal.search_child(key));
                }
                Node::Leaf(leaf) => {
                    return match leaf.search(key) {
                        SearchResult::Found(idx) => Some((current, idx)),
                        SearchResult::NotFound(_) => None,
                    };
                }
            }
        }
    }

    pub(crate) fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.search(key).is_some()
    }

    pub(crate) fn get<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let (leaf_handle, idx) = self.search(key)?;
        Some(self.nodes.get(leaf_handle).as_leaf().key(idx))
    }

    /// Inserts a key. Returns false (and changes nothing) if it was present.
    pub(crate) fn insert(&mut self, key: K) -> bool {
        if self.contains(&key) {
            return false;
        }

        let Some(root) = self.root else {
            let mut leaf = LeafNode::new();
            leaf.insert(0, key);
            let handle = self.nodes.alloc(Node::Leaf(leaf));
            self.root = Some(handle);
            self.head = Some(handle);
            self.len = 1;
            return true;
        };

        if let InsertResult::Split {
            separator,
            right,
        } = self.insert_rec(root, key)
        {
            let new_root = InternalNode::new_root(root, separator, right);
            self.root = Some(self.nodes.alloc(Node::Internal(new_root)));
        }

        self.len += 1;
        true
    }

    /// Recursive descent for insertion. The key is known to be absent.
    fn insert_rec(&mut self, node_handle: Handle, key: K) -> InsertResult<K> {
        if self.nodes.get(node_handle).is_leaf() {
            let leaf = self.nodes.get_mut(node_handle).as_leaf_mut();
            let idx = match leaf.search(&key) {
                SearchResult::NotFound(idx) => idx,
                SearchResult::Found(_) => unreachable!("duplicate key reached the leaf insert path"),
            };
            leaf.insert(idx, key);

            if leaf.is_overfull() {
                return self.split_leaf(node_handle);
            }
            return InsertResult::Done;
        }

        let internal = self.nodes.get(node_handle).as_internal();
        let child_idx = internal.search_child(&key);
        let child = internal.child(child_idx);

        match self.insert_rec(child, key) {
            InsertResult::Done => InsertResult::Done,
            InsertResult::Split {
                separator,
                right,
            } => {
                let internal = self.nodes.get_mut(node_handle).as_internal_mut();
                internal.insert_child(child_idx, separator, right);

                if internal.is_overfull() {
                    self.split_internal(node_handle)
                } else {
                    InsertResult::Done
                }
            }
        }
    }

    fn split_leaf(&mut self, leaf_handle: Handle) -> InsertResult<K> {
        let (separator, right) = self.nodes.get_mut(leaf_handle).as_leaf_mut().split();
        let right_handle = self.nodes.alloc(Node::Leaf(right));
        // left -> right -> old next; the right leaf took the old link in split().
        self.nodes.get_mut(leaf_handle).as_leaf_mut().set_next(Some(right_handle));

        InsertResult::Split {
            separator,
            right: right_handle,
        }
    }

    fn split_internal(&mut self, node_handle: Handle) -> InsertResult<K> {
        let (separator, right) = self.nodes.get_mut(node_handle).as_internal_mut().split();
        let right_handle = self.nodes.alloc(Node::Internal(right));

        InsertResult::Split {
            separator,
            right: right_handle,
        }
    }

    /// Removes a key. Returns false if it was absent.
    pub(crate) fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        if !self.contains(key) {
            return false;
        }

        let root = self.root.expect("`RawBPlusSet::remove()` - found a key in an empty tree!");

        if let EraseResult::Underflow = self.erase_rec(root, key) {
            // The root is exempt from minimum occupancy; it only collapses
            // when an internal root runs out of separators entirely.
            if let Node::Internal(internal) = self.nodes.get(root)
                && internal.key_count() == 0
            {
                let promoted = internal.child(0);
                self.nodes.free(root);
                self.root = Some(promoted);
            }
        }

        self.len -= 1;
        if self.len == 0 {
            self.clear();
        }
        true
    }

    /// Recursive descent for erasure. The key is known to be present.
    fn erase_rec<Q>(&mut self, node_handle: Handle, key: &Q) -> EraseResult
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        if self.nodes.get(node_handle).is_leaf() {
            let leaf = self.nodes.get_mut(node_handle).as_leaf_mut();
            let idx = match leaf.search(key) {
                SearchResult::Found(idx) => idx,
                SearchResult::NotFound(_) => unreachable!("missing key reached the leaf erase path"),
            };
            leaf.remove(idx);

            return if leaf.is_underfull() {
                EraseResult::Underflow
            } else if idx == 0 {
                EraseResult::MinChanged
            } else {
                EraseResult::Done
            };
        }

        let internal = self.nodes.get(node_handle).as_internal();
        let child_idx = internal.search_child(key);
        let child = internal.child(child_idx);

        match self.erase_rec(child, key) {
            EraseResult::Done => EraseResult::Done,
            EraseResult::MinChanged => {
                if child_idx == 0 {
                    // Our own subtree minimum changed with it.
                    EraseResult::MinChanged
                } else {
                    let min = self.subtree_min(child);
                    self.nodes.get_mut(node_handle).as_internal_mut().set_key(child_idx - 1, min);
                    EraseResult::Done
                }
            }
            EraseResult::Underflow => self.rebalance_child(node_handle, child_idx),
        }
    }

    /// A copy of the smallest key in the subtree: the leftmost leaf's first key.
    fn subtree_min(&self, node_handle: Handle) -> K {
        let mut current = node_handle;
        loop {
            match self.nodes.get(current) {
                Node::Internal(internal) => current = internal.child(0),
                Node::Leaf(leaf) => return leaf.key(0).clone(),
            }
        }
    }

    /// Repairs the underflowed child at `child_idx` against a sibling: the
    /// left sibling if the child is rightmost, otherwise the right one. The
    /// pair merges when their combined contents fit in one node; otherwise
    /// exactly one entry moves across the boundary.
    fn rebalance_child(&mut self, parent_handle: Handle, child_idx: usize) -> EraseResult {
        let parent = self.nodes.get(parent_handle).as_internal();
        let (left_idx, right_idx) = if child_idx == parent.child_count() - 1 {
            (child_idx - 1, child_idx)
        } else {
            (child_idx, child_idx + 1)
        };
        let left = parent.child(left_idx);
        let right = parent.child(right_idx);

        let combined = self.nodes.get(left).key_count() + self.nodes.get(right).key_count();
        if combined < ORDER {
            self.merge_children(parent_handle, child_idx, left_idx)
        } else {
            self.redistribute_children(parent_handle, child_idx, left_idx)
        }
    }

    /// Merges `children[left_idx + 1]` into `children[left_idx]` and drops
    /// the separator between them.
    fn merge_children(&mut self, parent_handle: Handle, child_idx: usize, left_idx: usize) -> EraseResult {
        let parent = self.nodes.get_mut(parent_handle).as_internal_mut();
        let (_, right_handle) = parent.remove_child(left_idx);
        let left_handle = parent.child(left_idx);

        match self.nodes.take(right_handle) {
            Node::Leaf(right) => {
                // The separator was a routing copy; leaves drop it.
                self.nodes.get_mut(left_handle).as_leaf_mut().merge_with_right(right);
            }
            Node::Internal(right) => {
                // The parent's separator copy is stale when the erase took the
                // right subtree's minimum out from under it (a rightmost child
                // underflow masks the minimum change), so the key pulled down
                // between the halves is read fresh from the right subtree.
                let separator = self.subtree_min(right.child(0));
                self.nodes.get_mut(left_handle).as_internal_mut().merge_with_right(separator, right);
            }
        }

        // The erase may have changed the left node's minimum when the left
        // node is the one that underflowed.
        if child_idx == left_idx && left_idx > 0 {
            let min = self.subtree_min(left_handle);
            self.nodes.get_mut(parent_handle).as_internal_mut().set_key(left_idx - 1, min);
        }

        let parent = self.nodes.get(parent_handle).as_internal();
        if parent.is_underfull() {
            EraseResult::Underflow
        } else if child_idx == 0 {
            EraseResult::MinChanged
        } else {
            EraseResult::Done
        }
    }

    /// Moves one entry from the fuller sibling into the underflowed one and
    /// recomputes the separators of both subtrees.
    fn redistribute_children(&mut self, parent_handle: Handle, child_idx: usize, left_idx: usize) -> EraseResult {
        let parent = self.nodes.get(parent_handle).as_internal();
        let left_handle = parent.child(left_idx);
        let right_handle = parent.child(left_idx + 1);
        let into_left = child_idx == left_idx;

        if self.nodes.get(left_handle).is_leaf() {
            let new_separator = if into_left {
                let key = self.nodes.get_mut(right_handle).as_leaf_mut().pop_front();
                self.nodes.get_mut(left_handle).as_leaf_mut().push_back(key);
                self.nodes.get(right_handle).as_leaf().key(0).clone()
            } else {
                let key = self.nodes.get_mut(left_handle).as_leaf_mut().pop_back();
                let right = self.nodes.get_mut(right_handle).as_leaf_mut();
                right.push_front(key);
                right.key(0).clone()
            };
            self.nodes.get_mut(parent_handle).as_internal_mut().set_key(left_idx, new_separator);
        } else {
            // A key descends into whichever node receives the migrated child;
            // the new parent separator is the minimum the moved entry exposes,
            // readable from the donor's own keys.
            let new_separator = if into_left {
                // The right subtree was untouched by the erase, so the parent
                // separator is an accurate copy of its minimum.
                let descending = self.nodes.get(parent_handle).as_internal().key(left_idx).clone();
                let (key, child) = self.nodes.get_mut(right_handle).as_internal_mut().pop_front();
                self.nodes.get_mut(left_handle).as_internal_mut().push_back(descending, child);
                key
            } else {
                // The erase was in the right subtree and may have taken the
                // minimum the parent separator copied, so the key pushed down
                // in front of the right node's first child is read fresh.
                let descending = self.subtree_min(self.nodes.get(right_handle).as_internal().child(0));
                let (key, child) = self.nodes.get_mut(left_handle).as_internal_mut().pop_back();
                self.nodes.get_mut(right_handle).as_internal_mut().push_front(descending, child);
                key
            };
            self.nodes.get_mut(parent_handle).as_internal_mut().set_key(left_idx, new_separator);
        }

        // As with merging: the erase may have changed the left node's minimum.
        if into_left && left_idx > 0 {
            let min = self.subtree_min(left_handle);
            self.nodes.get_mut(parent_handle).as_internal_mut().set_key(left_idx - 1, min);
        }

        if child_idx == 0 {
            EraseResult::MinChanged
        } else {
            EraseResult::Done
        }
    }
}

impl<K: fmt::Debug> RawBPlusSet<K> {
    /// Renders every node's contents and linkage, depth-first. Diagnostic
    /// only; the format is unstable.
    pub(crate) fn dump(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "len={} root={:?} head={:?}", self.len, self.root, self.head);
        if let Some(root) = self.root {
            self.dump_node(root, 0, &mut out);
        }
        out
    }

    fn dump_node(&self, handle: Handle, depth: usize, out: &mut String) {
        for _ in 0..depth {
            out.push_str("  ");
        }
        match self.nodes.get(handle) {
            Node::Leaf(leaf) => {
                let _ = writeln!(out, "[{}] leaf {:?} next={:?}", handle.to_index(), leaf.keys(), leaf.next());
            }
            Node::Internal(internal) => {
                let keys: Vec<&K> = (0..internal.key_count()).map(|i| internal.key(i)).collect();
                let _ = writeln!(out, "[{}] node {keys:?}", handle.to_index());
                for &child in internal.children() {
                    self.dump_node(child, depth + 1, out);
                }
            }
        }
    }
}
