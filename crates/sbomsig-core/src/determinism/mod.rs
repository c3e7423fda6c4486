//! Determinism primitives.
//!
//! Everything that feeds bytes into a signature lives here:
//! - `canonical_json`: canonical byte form of a JSON value with signature exclusion
//! - `exclusion`: the path grammar recording which `signature` fields were removed
//! - `hashing`: SHA-2 digests selected by algorithm
//! - `stable_sort`: explicit ordering helpers (no reliance on map iteration order)

pub mod canonical_json;
pub mod exclusion;
pub mod hashing;
pub mod stable_sort;
