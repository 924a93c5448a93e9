//! # neardup MinHash
//!
//! This crate turns text into fixed-length MinHash signatures whose
//! agreement rate estimates the Jaccard similarity of the underlying
//! shingle sets.
//!
//! ## Contract
//!
//! - A signature is a pure function of `(text, num_perm, seed)`: no I/O, no
//!   clocks, no global state.
//! - Signatures are only comparable when they share `seed` and `num_perm`;
//!   anything else is rejected with a [`ConfigurationError`].
//! - Shingle hashing (CRC-32) and coefficient generation (MT19937) are fixed
//!   so that independent implementations produce bit-identical signatures.
//!
//! ## Pipeline
//!
//! 1.  **Shingling**: text is lowercased, stripped down to word characters
//!     and spaces, and cut into overlapping 3-character windows.
//! 2.  **Base hash**: each shingle is hashed with CRC-32.
//! 3.  **Permutation**: for every permutation `(a, b)` the base hash is mapped
//!     through `(a * h + b) mod (2^61 - 1)` and truncated to 32 bits; the
//!     minimum per permutation is kept.
//!
//! ## Example Usage
//!
//! ```
//! use minhash::MinHash;
//!
//! let mut a = MinHash::new(128, 1).unwrap();
//! a.update("there is an apple");
//!
//! let mut b = MinHash::new(128, 1).unwrap();
//! b.update("there are apples");
//!
//! let similarity = a.jaccard(&b).unwrap();
//! assert!(similarity > 0.0 && similarity < 1.0);
//! ```
//!
pub mod config;
pub mod permutations;
pub mod shingles;
mod signature;

pub use crate::config::{ConfigurationError, MinHashConfig};
pub use crate::permutations::Permutations;
pub use crate::shingles::{base_hash, shingles, SHINGLE_SIZE};
pub use crate::signature::MinHash;

/// Modulus of the permutation family, `2^61 - 1`.
pub const MERSENNE_PRIME: u64 = (1 << 61) - 1;

/// Largest signature value and the initial value of every slot.
pub const MAX_HASH: u64 = (1 << 32) - 1;

/// Size of the 32-bit hash space; `num_perm` may not exceed it.
pub const HASH_RANGE: u64 = 1 << 32;
