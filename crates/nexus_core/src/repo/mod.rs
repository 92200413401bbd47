//! Record store contract and its SQLite implementation.
//!
//! # Responsibility
//! - Expose get-all / get-by-key / put / delete per collection.
//! - Keep SQL and document encoding inside the persistence boundary.
//!
//! # Invariants
//! - Every call is one statement scoped to a single collection.
//! - Point lookups report a missing key as `None`, never as an error.
//! - No cross-collection consistency is enforced: deleting software leaves
//!   licenses referencing it in place.

pub mod store;
