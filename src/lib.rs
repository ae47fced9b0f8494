//! Durable units: a router-owning base for stateful, identity-addressed compute.
//!
//! A unit is built from a state handle (identity + storage) and an
//! environment record, owns exactly one router, and forwards every request
//! to it. The `host` module runs units locally behind HTTP.

pub mod config;
pub mod counter;
pub mod host;
pub mod lifecycle;
pub mod observability;
pub mod prelude;
pub mod routing;
pub mod storage;
pub mod unit;

pub use config::HostConfig;
pub use host::{HostServer, Namespace};
pub use lifecycle::Shutdown;
pub use routing::{RequestRouter, UnitRouter};
pub use unit::{Unit, UnitOptions, DEFAULT_NAME};
