//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Init logging → Open storage → Build namespace → Bind
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain in-flight requests → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Units are never torn down explicitly; dropping the namespace drops them
//! - Storage snapshots are written on every mutation, so exit needs no flush

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
