//! Domain records shared by the storage, service and HTTP layers.

pub mod check;

pub use check::Check;
