//! Storage for the check collection.
//!
//! The collection lives in memory behind one exclusive lock and is mirrored to a
//! single flat file; every mutation rewrites the whole file before it is committed.

pub mod check_store;
pub mod codec;

pub use check_store::FileCheckStore;
