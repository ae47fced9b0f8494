//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Unit construction, routing, storage and host:
//!     → tracing events with structured fields (unit.id, unit.name, path)
//!     → logging.rs (EnvFilter + fmt layer, text or JSON)
//!
//! Per request (inside each unit's router):
//!     → x-request-id set and propagated
//!     → tower-http TraceLayer spans
//! ```
//!
//! # Design Decisions
//! - Log level comes from the environment record handed to units
//! - Request ID flows from the front door into the unit's response

pub mod logging;

pub use logging::init_logging;
