//! Service layer for the endpoint health check registry.
//! - `storage` owns the durable, lock-guarded check collection.
//! - `health` validates input, derives ids and exposes the domain API.
//! - Errors are typed per layer; see `errors`.

pub mod errors;
pub mod health;
pub mod pagination;
pub mod storage;
