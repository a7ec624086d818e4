//! An ordered set backed by a B+Tree with linked leaves.
//!
//! This crate provides [`BPlusSet`], an in-memory set of unique, totally-ordered
//! keys. All elements live in leaf nodes; internal nodes hold routing copies of
//! their right subtrees' minimum keys. The leaves form a singly linked chain in
//! ascending order, so a full traversal never touches internal nodes:
//!
//! - [`insert`](BPlusSet::insert), [`remove`](BPlusSet::remove),
//!   [`contains`](BPlusSet::contains) - O(log n)
//! - [`iter`](BPlusSet::iter) - ascending order, O(n) via the leaf chain
//! - [`len`](BPlusSet::len) - O(1)
//!
//! # Example
//!
//! ```
//! use bplus_set::BPlusSet;
//!
//! let mut primes = BPlusSet::new();
//! primes.insert(5);
//! primes.insert(2);
//! primes.insert(3);
//! primes.insert(2); // already present, no effect
//!
//! assert_eq!(primes.len(), 3);
//! assert!(primes.contains(&3));
//! assert_eq!(primes.iter().copied().collect::<Vec<_>>(), [2, 3, 5]);
//! ```
//!
//! # Ordering
//!
//! Keys are compared with their intrinsic [`Ord`] implementation; there is no
//! pluggable comparator. Supplying a key type whose `Ord` is not a strict total
//! order is a logic error: the set will not exhibit undefined behavior, but
//! lookups and iteration order become unspecified.
//!
//! # Implementation
//!
//! Nodes are stored in a slot arena and addressed by compact handles, so the
//! tree owns no pointer graph: parent-to-child edges and the leaf chain are
//! plain indices, and freeing a node can never walk a non-owning link.

#![no_std]
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

extern crate alloc;

mod raw;

pub mod bplus_set;

pub use bplus_set::BPlusSet;
