use core::borrow::Borrow;
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::iter::FusedIterator;
use core::mem;

use alloc::string::String;
use alloc::vec::Vec;

use crate::raw::{Handle, RawBPlusSet};

/// An ordered set based on a B+Tree with linked leaves.
///
/// Every element lives in a leaf node; internal nodes hold routing copies of
/// key values only. The leaves are chained in ascending order, so iteration
/// walks the chain without revisiting the tree's interior.
///
/// Elements must implement [`Ord`] and [`Clone`]: the tree stores routing
/// copies of elements in its internal nodes, so cloning an element must be
/// cheap and must preserve its ordering.
///
/// It is a logic error for an item to be modified in such a way that the
/// item's ordering relative to any other item, as determined by the [`Ord`]
/// trait, changes while it is in the set. This is normally only possible
/// through [`Cell`], [`RefCell`], global state, I/O, or unsafe code. The
/// behavior resulting from such a logic error is not specified, but will be
/// encapsulated to the `BPlusSet` that observed the logic error and not
/// result in undefined behavior.
///
/// [`Cell`]: core::cell::Cell
/// [`RefCell`]: core::cell::RefCell
///
/// # Examples
///
/// ```
/// use bplus_set::BPlusSet;
///
/// // Type inference lets us omit an explicit type signature (which
/// // would be `BPlusSet<&str>` in this example).
/// let mut books = BPlusSet::new();
///
/// // Add some books.
/// books.insert("A Dance With Dragons");
/// books.insert("To Kill a Mockingbird");
/// books.insert("The Odyssey");
/// books.insert("The Great Gatsby");
///
/// // Check for a specific one.
/// if !books.contains("The Winds of Winter") {
///     println!("We have {} books, but The Winds of Winter ain't one.",
///              books.len());
/// }
///
/// // Remove a book.
/// books.remove("The Odyssey");
///
/// // Iterate over everything, in order.
/// for book in &books {
///     println!("{book}");
/// }
/// ```
///
/// A `BPlusSet` with a known list of items can be initialized from an array:
///
/// ```
/// use bplus_set::BPlusSet;
///
/// let set = BPlusSet::from([1, 2, 3]);
/// ```
pub struct BPlusSet<T> {
    raw: RawBPlusSet<T>,
}

/// An iterator over the items of a `BPlusSet`, in ascending order.
///
/// This `struct` is created by the [`iter`] method on [`BPlusSet`].
/// See its documentation for more.
///
/// # Examples
///
/// ```
/// use bplus_set::BPlusSet;
///
/// let set = BPlusSet::from([3, 1, 2]);
/// let mut iter = set.iter();
/// assert_eq!(iter.next(), Some(&1));
/// assert_eq!(iter.next(), Some(&2));
/// assert_eq!(iter.next(), Some(&3));
/// assert_eq!(iter.next(), None);
/// ```
///
/// [`iter`]: BPlusSet::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, T: 'a> {
    raw: &'a RawBPlusSet<T>,
    /// Current leaf, or `None` once the chain is exhausted.
    leaf: Option<Handle>,
    /// Position of the next item within the current leaf.
    offset: usize,
    remaining: usize,
}

/// An owning iterator over the items of a `BPlusSet` in ascending order.
///
/// This `struct` is created by the [`into_iter`] method on [`BPlusSet`]
/// (provided by the [`IntoIterator`] trait). See its documentation for more.
///
/// # Examples
///
/// ```
/// use bplus_set::BPlusSet;
///
/// let set = BPlusSet::from([1, 2, 3]);
/// let mut iter = set.into_iter();
/// assert_eq!(iter.next(), Some(1));
/// assert_eq!(iter.next(), Some(2));
/// assert_eq!(iter.next(), Some(3));
/// ```
///
/// [`into_iter`]: BPlusSet#method.into_iter
pub struct IntoIter<T> {
    inner: alloc::vec::IntoIter<T>,
}

impl<T> BPlusSet<T> {
    /// Makes a new, empty `BPlusSet`. No allocation is performed until the
    /// first insertion.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_set::BPlusSet;
    ///
    /// let mut set = BPlusSet::new();
    ///
    /// // entries can now be inserted into the empty set
    /// set.insert(1);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub const fn new() -> BPlusSet<T> {
        BPlusSet {
            raw: RawBPlusSet::new(),
        }
    }

    /// Makes a new, empty `BPlusSet` with room for at least `capacity`
    /// elements before the node storage reallocates.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_set::BPlusSet;
    ///
    /// let mut set = BPlusSet::with_capacity(1_000);
    /// set.insert(1);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(capacity)
    #[must_use]
    pub fn with_capacity(capacity: usize) -> BPlusSet<T> {
        BPlusSet {
            raw: RawBPlusSet::with_capacity(capacity),
        }
    }

    /// Returns the number of elements in the set.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_set::BPlusSet;
    ///
    /// let mut a = BPlusSet::new();
    /// assert_eq!(a.len(), 0);
    /// a.insert(1);
    /// assert_eq!(a.len(), 1);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the set contains no elements.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_set::BPlusSet;
    ///
    /// let mut a = BPlusSet::new();
    /// assert!(a.is_empty());
    /// a.insert(1);
    /// assert!(!a.is_empty());
    /// ```
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Clears the set, removing all elements and releasing the node storage.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_set::BPlusSet;
    ///
    /// let mut v = BPlusSet::new();
    /// v.insert(1);
    /// v.clear();
    /// assert!(v.is_empty());
    /// ```
    ///
    /// # Complexity
    ///
    /// O(n)
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Swaps the contents of two sets.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_set::BPlusSet;
    ///
    /// let mut a = BPlusSet::from([1, 2]);
    /// let mut b = BPlusSet::from([3]);
    ///
    /// a.swap(&mut b);
    ///
    /// assert_eq!(a.len(), 1);
    /// assert_eq!(b.len(), 2);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(1)
    pub fn swap(&mut self, other: &mut BPlusSet<T>) {
        mem::swap(&mut self.raw, &mut other.raw);
    }

    /// Gets an iterator over the values in the set, in sorted order.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_set::BPlusSet;
    ///
    /// let mut set = BPlusSet::new();
    /// set.insert(3);
    /// set.insert(2);
    /// set.insert(1);
    ///
    /// for value in set.iter() {
    ///     println!("{value}");
    /// }
    ///
    /// let first = set.iter().next().unwrap();
    /// assert_eq!(*first, 1);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(1) to create the iterator; O(1) amortized per step via linked leaves.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            raw: &self.raw,
            leaf: self.raw.head(),
            offset: 0,
            remaining: self.raw.len(),
        }
    }

    /// Returns the first element in the set, if any.
    /// This is the minimum element in the set.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_set::BPlusSet;
    ///
    /// let mut set = BPlusSet::new();
    /// assert_eq!(set.first(), None);
    /// set.insert(2);
    /// assert_eq!(set.first(), Some(&2));
    /// set.insert(1);
    /// assert_eq!(set.first(), Some(&1));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(1) - reads the head of the leaf chain.
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.raw.first()
    }

    /// Returns the last element in the set, if any.
    /// This is the maximum element in the set.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_set::BPlusSet;
    ///
    /// let mut set = BPlusSet::new();
    /// assert_eq!(set.last(), None);
    /// set.insert(1);
    /// assert_eq!(set.last(), Some(&1));
    /// set.insert(2);
    /// assert_eq!(set.last(), Some(&2));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.raw.last()
    }
}

impl<T: Ord + Clone> BPlusSet<T> {
    /// Returns `true` if the set contains a value.
    ///
    /// The value may be any borrowed form of the set's element type, but the
    /// ordering on the borrowed form *must* match the ordering on the
    /// element type.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_set::BPlusSet;
    ///
    /// let set = BPlusSet::from([1, 2, 3]);
    /// assert_eq!(set.contains(&1), true);
    /// assert_eq!(set.contains(&4), false);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.contains(value)
    }

    /// Returns a reference to the value in the set, if any, that is equal to
    /// the given value.
    ///
    /// The value may be any borrowed form of the set's element type, but the
    /// ordering on the borrowed form *must* match the ordering on the
    /// element type.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_set::BPlusSet;
    ///
    /// let set = BPlusSet::from([1, 2, 3]);
    /// assert_eq!(set.get(&2), Some(&2));
    /// assert_eq!(set.get(&4), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn get<Q>(&self, value: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.get(value)
    }

    /// Adds a value to the set.
    ///
    /// Returns whether the value was newly inserted. That is:
    ///
    /// - If the set did not previously contain an equal value, `true` is
    ///   returned.
    /// - If the set already contained an equal value, `false` is returned, and
    ///   the entry is not updated.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_set::BPlusSet;
    ///
    /// let mut set = BPlusSet::new();
    ///
    /// assert_eq!(set.insert(2), true);
    /// assert_eq!(set.insert(2), false);
    /// assert_eq!(set.len(), 1);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn insert(&mut self, value: T) -> bool {
        self.raw.insert(value)
    }

    /// If the set contains an element equal to the value, removes it from the
    /// set and drops it. Returns whether such an element was present.
    ///
    /// The value may be any borrowed form of the set's element type,
    /// but the ordering on the borrowed form *must* match the
    /// ordering on the element type.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_set::BPlusSet;
    ///
    /// let mut set = BPlusSet::new();
    /// set.insert(2);
    /// assert_eq!(set.remove(&2), true);
    /// assert_eq!(set.remove(&2), false);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn remove<Q>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.remove(value)
    }
}

impl<T: fmt::Debug> BPlusSet<T> {
    /// Renders the tree structure - every node's contents plus the leaf chain
    /// links - as a multi-line string. Intended for debugging; the output
    /// format is not stable.
    #[must_use]
    pub fn dump(&self) -> String {
        self.raw.dump()
    }
}

impl<T: Hash> Hash for BPlusSet<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for value in self {
            value.hash(state);
        }
    }
}

impl<T: PartialEq> PartialEq for BPlusSet<T> {
    fn eq(&self, other: &BPlusSet<T>) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for BPlusSet<T> {}

impl<T: PartialOrd> PartialOrd for BPlusSet<T> {
    fn partial_cmp(&self, other: &BPlusSet<T>) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<T: Ord> Ord for BPlusSet<T> {
    fn cmp(&self, other: &BPlusSet<T>) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<T: Clone + Ord> Clone for BPlusSet<T> {
    fn clone(&self) -> Self {
        self.iter().cloned().collect()
    }
}

impl<T: fmt::Debug> fmt::Debug for BPlusSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T> Default for BPlusSet<T> {
    fn default() -> Self {
        BPlusSet::new()
    }
}

impl<T: Ord + Clone> FromIterator<T> for BPlusSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = BPlusSet::new();
        set.extend(iter);
        set
    }
}

impl<T: Ord + Clone> Extend<T> for BPlusSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<'a, T: 'a + Ord + Copy> Extend<&'a T> for BPlusSet<T> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        for &value in iter {
            self.insert(value);
        }
    }
}

impl<T: Ord + Clone, const N: usize> From<[T; N]> for BPlusSet<T> {
    fn from(arr: [T; N]) -> Self {
        arr.into_iter().collect()
    }
}

impl<T> IntoIterator for BPlusSet<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    /// Gets an iterator for moving out the `BPlusSet`'s contents in ascending
    /// order.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_set::BPlusSet;
    ///
    /// let set = BPlusSet::from([1, 2, 3, 4]);
    ///
    /// let v: Vec<_> = set.into_iter().collect();
    /// assert_eq!(v, [1, 2, 3, 4]);
    /// ```
    fn into_iter(mut self) -> IntoIter<T> {
        IntoIter {
            inner: self.raw.drain_to_vec().into_iter(),
        }
    }
}

impl<'a, T> IntoIterator for &'a BPlusSet<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let handle = self.leaf?;
        let leaf = self.raw.node(handle).as_leaf();
        let value = leaf.key(self.offset);

        self.offset += 1;
        if self.offset == leaf.key_count() {
            self.leaf = leaf.next();
            self.offset = 0;
        }
        self.remaining -= 1;

        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Iter {
            raw: self.raw,
            leaf: self.leaf,
            offset: self.offset,
            remaining: self.remaining,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        self.inner.next_back()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<T> FusedIterator for IntoIter<T> {}

impl<T: fmt::Debug> fmt::Debug for IntoIter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.inner.as_slice()).finish()
    }
}

impl<T> Default for IntoIter<T> {
    /// Creates an empty `bplus_set::IntoIter`.
    ///
    /// ```
    /// # use bplus_set::bplus_set;
    /// let iter: bplus_set::IntoIter<u8> = Default::default();
    /// assert_eq!(iter.len(), 0);
    /// ```
    fn default() -> Self {
        IntoIter {
            inner: Vec::new().into_iter(),
        }
    }
}
