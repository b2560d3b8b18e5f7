//! Endpoint health check registry: id derivation, repository seam and service.

pub mod id;
pub mod repository;
pub mod service;

pub use repository::CheckRepository;
pub use service::{CheckService, ListPage};
